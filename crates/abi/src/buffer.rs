// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_void;

/// Status returned by every native call. Zero is success.
pub type StatusFFI = i64;

/// Opaque native handle (`uintptr_t`), e.g. an export cursor or an in-memory configuration.
pub type HandleFFI = usize;

/// Callback the engine uses to grow a caller supplied response buffer.
///
/// Has `realloc` semantics: `ptr` may be null, the returned pointer replaces
/// `ptr`, and null signals allocation failure.
pub type ResizeBufferFn = unsafe extern "C" fn(ptr: *mut c_void, size: usize) -> *mut c_void;

/// Default resize callback backed by the C allocator.
///
/// Buffers grown through this callback must be released with `libc::free`.
///
/// # Safety
/// `ptr` must be null or a pointer previously returned by this function.
pub unsafe extern "C" fn resize_buffer(ptr: *mut c_void, size: usize) -> *mut c_void {
	unsafe { libc::realloc(ptr, size) }
}
