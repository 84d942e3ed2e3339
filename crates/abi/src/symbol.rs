// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Exported symbol names
//!
//! Every native function is exported as `<prefix><name>`, for example
//! `SzEngine_addRecord`.

pub const ENGINE_PREFIX: &str = "SzEngine_";
pub const CONFIGMGR_PREFIX: &str = "SzConfigMgr_";
pub const CONFIG_PREFIX: &str = "SzConfig_";
pub const PRODUCT_PREFIX: &str = "SzProduct_";
pub const DIAGNOSTIC_PREFIX: &str = "SzDiagnostic_";

pub const GET_LAST_EXCEPTION: &str = "getLastException";
pub const GET_LAST_EXCEPTION_CODE: &str = "getLastExceptionCode";
pub const CLEAR_LAST_EXCEPTION: &str = "clearLastException";

/// Build the NUL terminated symbol name `prefix` + `name`
pub fn symbol_name(prefix: &str, name: &str) -> Vec<u8> {
	let mut symbol = Vec::with_capacity(prefix.len() + name.len() + 1);
	symbol.extend_from_slice(prefix.as_bytes());
	symbol.extend_from_slice(name.as_bytes());
	symbol.push(0);
	symbol
}
