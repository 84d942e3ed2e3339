// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! C ABI definitions for the native entity-resolution engine
//!
//! This crate describes the calling convention the gateway speaks: one
//! function table per native component, the buffer resize callback used for
//! variable length results, and the flag constants understood by the engine.
//! It contains no logic; the tables are filled either by resolving symbols
//! from the shared library or by an in-process implementation.

pub mod buffer;
pub mod component;
pub mod constants;
pub mod exception;
pub mod symbol;

pub use buffer::{HandleFFI, ResizeBufferFn, StatusFFI};
pub use component::{
	config::ConfigVTableFFI, configmgr::ConfigMgrVTableFFI, diagnostic::DiagnosticVTableFFI,
	engine::EngineVTableFFI, product::ProductVTableFFI, NativeTablesFFI,
};
pub use exception::ExceptionVTableFFI;
