// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Function tables, one per native component

pub mod config;
pub mod configmgr;
pub mod diagnostic;
pub mod engine;
pub mod product;

use crate::{ConfigMgrVTableFFI, ConfigVTableFFI, DiagnosticVTableFFI, EngineVTableFFI, ProductVTableFFI};

/// The complete set of function tables of one native library
#[repr(C)]
#[derive(Clone, Copy)]
pub struct NativeTablesFFI {
	pub engine: EngineVTableFFI,
	pub configmgr: ConfigMgrVTableFFI,
	pub config: ConfigVTableFFI,
	pub product: ProductVTableFFI,
	pub diagnostic: DiagnosticVTableFFI,
}
