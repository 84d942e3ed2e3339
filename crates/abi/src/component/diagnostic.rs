// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_char;

use crate::{ExceptionVTableFFI, ResizeBufferFn, StatusFFI};

/// Virtual function table of the diagnostic component
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DiagnosticVTableFFI {
	pub exception: ExceptionVTableFFI,

	pub init: unsafe extern "C" fn(instance_name: *const c_char, settings: *const c_char, verbose: i64) -> StatusFFI,

	pub init_with_config_id: unsafe extern "C" fn(
		instance_name: *const c_char,
		settings: *const c_char,
		config_id: i64,
		verbose: i64,
	) -> StatusFFI,

	pub reinit: unsafe extern "C" fn(config_id: i64) -> StatusFFI,

	pub destroy: unsafe extern "C" fn() -> StatusFFI,

	/// Run an insert benchmark against the datastore for `seconds_to_run` seconds
	pub check_datastore_performance: unsafe extern "C" fn(
		seconds_to_run: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub get_datastore_info:
		unsafe extern "C" fn(response: *mut *mut c_char, response_len: *mut usize, resize: ResizeBufferFn) -> StatusFFI,

	pub get_feature: unsafe extern "C" fn(
		feature_id: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	/// Delete every record in the datastore
	pub purge_repository: unsafe extern "C" fn() -> StatusFFI,
}
