// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Gateway to the native entity resolution engine.
//!
//! Every facade call is pinned to the calling OS thread for the duration of
//! the native call and of reading the thread-local exception it may leave
//! behind, so concurrent callers never see each other's errors.

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod bridge;
mod call;
mod cursor;
pub mod facade;
mod handle;
mod library;
mod native;

pub use call::{CallSettings, DEFAULT_EXCEPTION_BUFFER_SIZE};
pub use facade::{
	config::Config,
	configmgr::ConfigManager,
	diagnostic::Diagnostic,
	engine::{Engine, ExportIterator},
	product::Product,
};
pub use library::NativeLibrary;
