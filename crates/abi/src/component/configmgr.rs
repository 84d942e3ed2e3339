// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_char;

use crate::{ExceptionVTableFFI, ResizeBufferFn, StatusFFI};

/// Virtual function table of the configuration manager component
///
/// The configuration manager stores configuration documents in the datastore
/// and tracks which one is the default.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ConfigMgrVTableFFI {
	pub exception: ExceptionVTableFFI,

	pub init: unsafe extern "C" fn(instance_name: *const c_char, settings: *const c_char, verbose: i64) -> StatusFFI,

	pub destroy: unsafe extern "C" fn() -> StatusFFI,

	/// Store a configuration document
	///
	/// # Parameters
	/// - `config_definition`: The JSON document
	/// - `config_comment`: Free-form description
	/// - `config_id`: Receives the id of the stored document
	pub add_config: unsafe extern "C" fn(
		config_definition: *const c_char,
		config_comment: *const c_char,
		config_id: *mut i64,
	) -> StatusFFI,

	pub get_config: unsafe extern "C" fn(
		config_id: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub get_config_list:
		unsafe extern "C" fn(response: *mut *mut c_char, response_len: *mut usize, resize: ResizeBufferFn) -> StatusFFI,

	/// # Parameters
	/// - `config_id`: Receives the default id, zero when none is set
	pub get_default_config_id: unsafe extern "C" fn(config_id: *mut i64) -> StatusFFI,

	pub set_default_config_id: unsafe extern "C" fn(config_id: i64) -> StatusFFI,

	/// Compare-and-swap of the default configuration id
	///
	/// Fails without side effects when the live default is not `current_default_config_id`.
	pub replace_default_config_id:
		unsafe extern "C" fn(current_default_config_id: i64, new_default_config_id: i64) -> StatusFFI,
}
