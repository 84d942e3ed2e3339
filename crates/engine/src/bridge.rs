// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Exception bridge.
//!
//! The engine keeps the last error of each component in thread-local state.
//! After a failing call, and on the same thread, the bridge reads the message,
//! reads the code and clears the state, then builds an [`EngineError`]. The
//! clear runs from a guard, so it happens even if a read misbehaves.

use std::{ffi::c_char, time::Duration};

use erbridge_abi::ExceptionVTableFFI;
use erbridge_runtime::Affinity;
use erbridge_type::{Arguments, Component, EngineError};
use tracing::{debug, warn};

/// Clears the last exception when dropped.
struct ClearGuard<'a> {
	exception: &'a ExceptionVTableFFI,
}

impl Drop for ClearGuard<'_> {
	fn drop(&mut self) {
		// SAFETY: the exception functions take no pointers
		unsafe { (self.exception.clear_last_exception)() };
	}
}

pub(crate) struct Failed<'a> {
	pub(crate) component: Component,
	pub(crate) operation: &'static str,
	pub(crate) status: i64,
	pub(crate) arguments: &'a Arguments,
	pub(crate) elapsed: Duration,
}

pub(crate) fn bridge(
	affinity: &Affinity,
	exception: &ExceptionVTableFFI,
	buffer_size: usize,
	failed: Failed<'_>,
) -> EngineError {
	let _clear = ClearGuard {
		exception,
	};

	let message = read_message(exception, buffer_size).unwrap_or_else(|| {
		warn!(component = %failed.component, operation = failed.operation, "could not read last exception message");
		String::new()
	});
	// SAFETY: no arguments
	let code = unsafe { (exception.get_last_exception_code)() };

	if message.is_empty() {
		debug!(
			component = %failed.component,
			operation = failed.operation,
			status = failed.status,
			code,
			"native call failed without a message"
		);
	}

	EngineError::new(
		affinity,
		failed.component,
		failed.operation,
		failed.status,
		code,
		message,
		failed.arguments.clone(),
		failed.elapsed,
	)
}

/// Discard whatever exception the engine recorded, without building an error.
pub(crate) fn discard(exception: &ExceptionVTableFFI) {
	let _clear = ClearGuard {
		exception,
	};
}

fn read_message(exception: &ExceptionVTableFFI, buffer_size: usize) -> Option<String> {
	let size = buffer_size.max(1);
	let mut buffer = vec![0 as c_char; size];
	// SAFETY: the engine writes at most `size` bytes, NUL included
	let written = unsafe { (exception.get_last_exception)(buffer.as_mut_ptr(), size) };
	if written < 0 {
		return None;
	}

	let bytes: Vec<u8> = buffer.iter().map(|c| *c as u8).collect();
	let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len()).min(written as usize);
	Some(String::from_utf8_lossy(&bytes[..end]).trim().to_string())
}
