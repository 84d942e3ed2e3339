// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_char;

use crate::{ExceptionVTableFFI, HandleFFI, ResizeBufferFn, StatusFFI};

/// Virtual function table of the in-memory configuration component
///
/// Configuration documents are loaded into native memory and addressed by an
/// opaque handle until closed.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ConfigVTableFFI {
	pub exception: ExceptionVTableFFI,

	pub init: unsafe extern "C" fn(instance_name: *const c_char, settings: *const c_char, verbose: i64) -> StatusFFI,

	pub destroy: unsafe extern "C" fn() -> StatusFFI,

	/// Create a configuration from the engine's built-in template
	pub create: unsafe extern "C" fn(handle: *mut HandleFFI) -> StatusFFI,

	/// Load a configuration document
	pub load: unsafe extern "C" fn(config_definition: *const c_char, handle: *mut HandleFFI) -> StatusFFI,

	/// Serialize a loaded configuration
	pub save: unsafe extern "C" fn(
		handle: HandleFFI,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	/// Release a loaded configuration. The handle must not be used afterwards.
	pub close: unsafe extern "C" fn(handle: HandleFFI) -> StatusFFI,

	pub list_data_sources: unsafe extern "C" fn(
		handle: HandleFFI,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub add_data_source: unsafe extern "C" fn(
		handle: HandleFFI,
		data_source_code: *const c_char,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub delete_data_source: unsafe extern "C" fn(handle: HandleFFI, data_source_code: *const c_char) -> StatusFFI,
}
