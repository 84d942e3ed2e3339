// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Argument marshalling and result buffers for the native calling convention.

use std::{
	ffi::{CStr, CString, c_char},
	ptr,
};

use erbridge_abi::{ResizeBufferFn, buffer::resize_buffer};
use erbridge_type::{Error, Result};

/// Convert `value` into a NUL terminated string for the engine.
///
/// The returned `CString` owns the allocation and frees it when dropped, on
/// every exit path of the call that borrowed it.
pub(crate) fn c_string(operation: &'static str, argument: &'static str, value: &str) -> Result<CString> {
	CString::new(value).map_err(|_| Error::Marshal {
		operation,
		argument,
	})
}

/// A response buffer the engine fills through the resize callback.
///
/// The buffer is grown with `realloc` by the engine and released with `free`
/// when this value drops, whether the call succeeded or not.
pub(crate) struct ResponseBuffer {
	ptr: *mut c_char,
	len: usize,
}

impl ResponseBuffer {
	pub(crate) fn new() -> Self {
		Self {
			ptr: ptr::null_mut(),
			len: 0,
		}
	}

	pub(crate) fn ptr_mut(&mut self) -> *mut *mut c_char {
		&mut self.ptr
	}

	pub(crate) fn len_mut(&mut self) -> *mut usize {
		&mut self.len
	}

	pub(crate) fn resize_fn(&self) -> ResizeBufferFn {
		resize_buffer
	}

	/// Copy the NUL terminated text out of the buffer. An untouched buffer
	/// reads as the empty string.
	pub(crate) fn text(&self) -> String {
		if self.ptr.is_null() || self.len == 0 {
			return String::new();
		}
		// SAFETY: the engine writes a NUL terminated string into a buffer of
		// `len` bytes; the scan is bounded by that length.
		let bytes = unsafe { std::slice::from_raw_parts(self.ptr.cast::<u8>(), self.len) };
		let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
		String::from_utf8_lossy(&bytes[..end]).into_owned()
	}
}

impl Drop for ResponseBuffer {
	fn drop(&mut self) {
		if !self.ptr.is_null() {
			// SAFETY: the pointer was produced by `resize_buffer`, i.e. `realloc`
			unsafe { libc::free(self.ptr.cast()) };
			self.ptr = ptr::null_mut();
		}
	}
}

/// Copy a string owned by the engine. The engine keeps ownership; the
/// pointer is never freed here.
pub(crate) unsafe fn engine_owned_text(ptr: *const c_char) -> String {
	if ptr.is_null() {
		return String::new();
	}
	unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_c_string_rejects_interior_nul() {
		let err = c_string("add_record", "record_id", "a\0b").unwrap_err();
		match err {
			Error::Marshal {
				operation,
				argument,
			} => {
				assert_eq!(operation, "add_record");
				assert_eq!(argument, "record_id");
			}
			other => panic!("unexpected error: {other}"),
		}
		assert_eq!(c_string("add_record", "record_id", "1001").unwrap().as_bytes(), b"1001");
	}

	#[test]
	fn test_untouched_buffer_reads_empty() {
		let buffer = ResponseBuffer::new();
		assert_eq!(buffer.text(), "");
	}

	#[test]
	fn test_buffer_filled_through_resize() {
		let mut buffer = ResponseBuffer::new();
		unsafe {
			let resize = buffer.resize_fn();
			let ptr = resize(ptr::null_mut(), 6).cast::<c_char>();
			assert!(!ptr.is_null());
			ptr::copy_nonoverlapping(b"hello\0".as_ptr(), ptr.cast::<u8>(), 6);
			*buffer.ptr_mut() = ptr;
			*buffer.len_mut() = 6;
		}
		assert_eq!(buffer.text(), "hello");
	}

	#[test]
	fn test_engine_owned_null() {
		assert_eq!(unsafe { engine_owned_text(ptr::null()) }, "");
		assert_eq!(unsafe { engine_owned_text(c"4.0.0".as_ptr()) }, "4.0.0");
	}
}
