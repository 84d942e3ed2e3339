// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_char;

/// Last-exception accessors of a native component
///
/// The engine keeps the last failure per OS thread and per component. These
/// must be called on the thread that issued the failing call, before any
/// other call into the same component on that thread.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ExceptionVTableFFI {
	/// Copy the last exception message into `buffer`
	///
	/// # Parameters
	/// - `buffer`: Destination, NUL terminated on return
	/// - `size`: Capacity of `buffer` in bytes
	///
	/// # Returns
	/// - Number of bytes written excluding the terminator, negative if the message could not be read
	pub get_last_exception: unsafe extern "C" fn(buffer: *mut c_char, size: usize) -> i64,

	/// Numeric code of the last exception, zero if none is recorded
	pub get_last_exception_code: unsafe extern "C" fn() -> i64,

	/// Forget the last exception of the calling thread
	pub clear_last_exception: unsafe extern "C" fn(),
}
