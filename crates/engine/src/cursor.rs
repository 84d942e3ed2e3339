// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Export cursors.
//!
//! A cursor is CLOSED until an export opens it, then OPEN until closed. An
//! empty chunk from the engine marks it exhausted; from then on fetches
//! return `None` without calling the engine again. A failing native fetch or
//! close leaves the cursor where it was.

use erbridge_abi::{EngineVTableFFI, HandleFFI};
use erbridge_type::{Error, ExportHandle, HandleKind, Result};
use tracing::debug;

use crate::{
	call::Scope,
	handle::{HandleRegistry, SharedEntry},
	native::ResponseBuffer,
};

#[derive(Debug, Default)]
pub(crate) struct ExportState {
	pub(crate) exhausted: bool,
	pub(crate) fetched: u64,
}

pub(crate) struct CursorManager {
	cursors: HandleRegistry<ExportState>,
}

impl CursorManager {
	pub(crate) fn new() -> Self {
		Self {
			cursors: HandleRegistry::new(),
		}
	}

	pub(crate) fn open_count(&self) -> usize {
		self.cursors.len()
	}

	pub(crate) fn register(&self, native: HandleFFI) -> ExportHandle {
		ExportHandle(self.cursors.insert(native, ExportState::default()))
	}

	fn entry(&self, handle: ExportHandle, operation: &'static str) -> Result<SharedEntry<ExportState>> {
		self.cursors.get(handle.0).ok_or_else(|| invalid(handle, operation))
	}

	pub(crate) fn fetch_next(
		&self,
		scope: &Scope<'_>,
		vtable: &EngineVTableFFI,
		handle: ExportHandle,
	) -> Result<Option<String>> {
		let entry = self.entry(handle, scope.operation())?;
		let mut entry = entry.lock();
		if entry.closed {
			return Err(invalid(handle, scope.operation()));
		}
		if entry.state.exhausted {
			return Ok(None);
		}

		let mut response = ResponseBuffer::new();
		// SAFETY: the native handle is open and the entry lock serializes its use
		let read = unsafe {
			(vtable.fetch_next)(entry.native, response.ptr_mut(), response.len_mut(), response.resize_fn())
		};
		if read < 0 {
			return Err(scope.fail(read).into());
		}

		let chunk = response.text();
		if read == 0 || chunk.is_empty() {
			entry.state.exhausted = true;
			debug!(%handle, fetched = entry.state.fetched, "export exhausted");
			return Ok(None);
		}
		entry.state.fetched += 1;
		Ok(Some(chunk))
	}

	pub(crate) fn close(&self, scope: &Scope<'_>, vtable: &EngineVTableFFI, handle: ExportHandle) -> Result<()> {
		let shared = self.entry(handle, scope.operation())?;
		let mut entry = shared.lock();
		if entry.closed {
			return Err(invalid(handle, scope.operation()));
		}

		// SAFETY: the native handle is open and the entry lock serializes its use
		let status = unsafe { (vtable.close_export)(entry.native) };
		scope.check(status)?;

		entry.closed = true;
		drop(entry);
		self.cursors.remove(handle.0);
		Ok(())
	}

	/// Close every cursor still open, ignoring native failures. Used when the
	/// engine is torn down.
	pub(crate) fn close_all(&self, scope: &Scope<'_>, vtable: &EngineVTableFFI) {
		for native in self.cursors.drain() {
			// SAFETY: drained handles were open and are no longer reachable
			let status = unsafe { (vtable.close_export)(native) };
			if status != 0 {
				scope.discard();
			}
		}
	}
}

fn invalid(handle: ExportHandle, operation: &'static str) -> Error {
	Error::InvalidHandleUsage {
		kind: HandleKind::Export,
		handle: handle.0,
		operation,
	}
}
