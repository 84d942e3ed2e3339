// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_char;

use crate::{ExceptionVTableFFI, StatusFFI};

/// Virtual function table of the product component
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ProductVTableFFI {
	pub exception: ExceptionVTableFFI,

	pub init: unsafe extern "C" fn(instance_name: *const c_char, settings: *const c_char, verbose: i64) -> StatusFFI,

	pub destroy: unsafe extern "C" fn() -> StatusFFI,

	/// # Returns
	/// - A NUL terminated JSON document owned by the engine; never freed by the caller.
	///   Null signals failure.
	pub get_license: unsafe extern "C" fn() -> *const c_char,

	/// # Returns
	/// - A NUL terminated JSON document owned by the engine; never freed by the caller.
	///   Null signals failure.
	pub get_version: unsafe extern "C" fn() -> *const c_char,
}
