// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_char;

use crate::{ExceptionVTableFFI, HandleFFI, ResizeBufferFn, StatusFFI};

/// Virtual function table of the resolution engine component
///
/// Functions taking `(response, response_len, resize)` return a heap buffer
/// grown through `resize`; the caller owns it afterwards, on success and on
/// failure alike. All string arguments are NUL terminated.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct EngineVTableFFI {
	pub exception: ExceptionVTableFFI,

	/// Initialize with the default configuration of the datastore
	pub init: unsafe extern "C" fn(instance_name: *const c_char, settings: *const c_char, verbose: i64) -> StatusFFI,

	/// Initialize with an explicit configuration id
	pub init_with_config_id: unsafe extern "C" fn(
		instance_name: *const c_char,
		settings: *const c_char,
		config_id: i64,
		verbose: i64,
	) -> StatusFFI,

	/// Switch the running engine to another configuration
	pub reinit: unsafe extern "C" fn(config_id: i64) -> StatusFFI,

	pub destroy: unsafe extern "C" fn() -> StatusFFI,

	pub prime_engine: unsafe extern "C" fn() -> StatusFFI,

	pub get_active_config_id: unsafe extern "C" fn(config_id: *mut i64) -> StatusFFI,

	pub add_record: unsafe extern "C" fn(
		data_source_code: *const c_char,
		record_id: *const c_char,
		record_definition: *const c_char,
		flags: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub delete_record: unsafe extern "C" fn(
		data_source_code: *const c_char,
		record_id: *const c_char,
		flags: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub get_record: unsafe extern "C" fn(
		data_source_code: *const c_char,
		record_id: *const c_char,
		flags: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub get_entity_by_entity_id: unsafe extern "C" fn(
		entity_id: i64,
		flags: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub get_entity_by_record_id: unsafe extern "C" fn(
		data_source_code: *const c_char,
		record_id: *const c_char,
		flags: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub search_by_attributes: unsafe extern "C" fn(
		attributes: *const c_char,
		search_profile: *const c_char,
		flags: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	pub get_stats:
		unsafe extern "C" fn(response: *mut *mut c_char, response_len: *mut usize, resize: ResizeBufferFn) -> StatusFFI,

	/// # Returns
	/// - The number of pending redo records, negative on failure
	pub count_redo_records: unsafe extern "C" fn() -> i64,

	pub get_redo_record:
		unsafe extern "C" fn(response: *mut *mut c_char, response_len: *mut usize, resize: ResizeBufferFn) -> StatusFFI,

	pub process_redo_record: unsafe extern "C" fn(
		redo_record: *const c_char,
		flags: i64,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> StatusFFI,

	/// Open an export of all entities as JSON lines
	///
	/// # Parameters
	/// - `flags`: Controls the entity detail of every line
	/// - `handle`: Receives the export cursor
	pub export_json_entity_report: unsafe extern "C" fn(flags: i64, handle: *mut HandleFFI) -> StatusFFI,

	/// Open an export of all entities as CSV
	pub export_csv_entity_report:
		unsafe extern "C" fn(csv_column_list: *const c_char, flags: i64, handle: *mut HandleFFI) -> StatusFFI,

	/// Fetch the next chunk of an open export
	///
	/// # Returns
	/// - Length of the chunk written to `response`, zero once the export is exhausted, negative on failure
	pub fetch_next: unsafe extern "C" fn(
		handle: HandleFFI,
		response: *mut *mut c_char,
		response_len: *mut usize,
		resize: ResizeBufferFn,
	) -> i64,

	/// Release an export cursor. The handle must not be used afterwards.
	pub close_export: unsafe extern "C" fn(handle: HandleFFI) -> StatusFFI,
}
