// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Simulated native engine.
//!
//! Every exported function is an `extern "C" fn` generic over the slot, so
//! `Simulator::<3>::tables()` and `Simulator::<4>::tables()` hand out distinct
//! function pointers that address distinct state. Failures are recorded the
//! way the real engine records them: per OS thread and per component, until
//! the caller clears them.

mod config;
mod configmgr;
mod diagnostic;
mod engine;
mod exception;
mod product;
mod world;

use std::{
	collections::HashMap,
	ffi::{CStr, c_char},
	ptr,
	sync::{
		Arc, LazyLock,
		atomic::{AtomicUsize, Ordering},
	},
	thread,
	time::Duration,
};

use erbridge_abi::{NativeTablesFFI, ResizeBufferFn, StatusFFI};
use erbridge_type::Component;
use parking_lot::Mutex;

use self::world::World;

pub(crate) const FAILURE_STATUS: StatusFFI = -2;

/// A failure the simulated engine reports through its last-exception state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
	pub(crate) code: i64,
	pub(crate) message: String,
	pub(crate) poisoned: bool,
}

impl Failure {
	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
			poisoned: false,
		}
	}

	/// A failure whose message reads back as empty text.
	pub fn empty_message(code: i64) -> Self {
		Self::new(code, "")
	}

	/// A failure whose message cannot be read at all: `get-last-exception`
	/// reports a negative length. The code is still readable.
	pub fn poisoned(code: i64, message: impl Into<String>) -> Self {
		Self {
			poisoned: true,
			..Self::new(code, message)
		}
	}

	pub fn code(&self) -> i64 {
		self.code
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub(crate) fn invalid_parameters() -> Self {
		Self::new(2, "0002E|Invalid function call parameters")
	}

	pub(crate) fn not_initialized() -> Self {
		Self::new(48, "0048E|G2 module is not initialized")
	}

	pub(crate) fn invalid_handle(handle: usize) -> Self {
		Self::new(3, format!("0003E|Invalid handle [{handle}]"))
	}

	pub(crate) fn unknown_config(config_id: i64) -> Self {
		Self::new(7221, format!("7221E|No engine configuration registered with ID [{config_id}]"))
	}
}

pub(crate) type SimResult<T> = Result<T, Failure>;

static SLOTS: LazyLock<Mutex<HashMap<usize, Arc<SlotState>>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

pub(crate) struct SlotState {
	pub(crate) world: Mutex<World>,
	injected: Mutex<Vec<(Component, &'static str, Failure)>>,
	calls: Mutex<HashMap<(Component, &'static str), usize>>,
	clears: Mutex<HashMap<Component, usize>>,
	in_flight: AtomicUsize,
	latency: Mutex<Duration>,
}

impl SlotState {
	fn new() -> Self {
		Self {
			world: Mutex::new(World::new()),
			injected: Mutex::new(Vec::new()),
			calls: Mutex::new(HashMap::new()),
			clears: Mutex::new(HashMap::new()),
			in_flight: AtomicUsize::new(0),
			latency: Mutex::new(Duration::ZERO),
		}
	}

	fn take_injected(&self, component: Component, operation: &'static str) -> Option<Failure> {
		let mut injected = self.injected.lock();
		let idx = injected.iter().position(|(c, o, _)| *c == component && *o == operation)?;
		Some(injected.remove(idx).2)
	}

	pub(crate) fn record_clear(&self, component: Component) {
		*self.clears.lock().entry(component).or_default() += 1;
	}
}

pub(crate) fn slot<const S: usize>() -> Arc<SlotState> {
	SLOTS.lock().entry(S).or_insert_with(|| Arc::new(SlotState::new())).clone()
}

/// Runs the body of one simulated native function: counts the call, applies
/// injected failures and latency, and records a failure in the calling
/// thread's last-exception state.
pub(crate) fn run<const S: usize, T>(
	component: Component,
	operation: &'static str,
	body: impl FnOnce(&mut World) -> SimResult<T>,
) -> Option<T> {
	let state = slot::<S>();
	*state.calls.lock().entry((component, operation)).or_default() += 1;
	state.in_flight.fetch_add(1, Ordering::SeqCst);

	let result = match state.take_injected(component, operation) {
		Some(failure) => Err(failure),
		None => {
			let latency = *state.latency.lock();
			if !latency.is_zero() {
				thread::sleep(latency);
			}
			body(&mut state.world.lock())
		}
	};

	state.in_flight.fetch_sub(1, Ordering::SeqCst);

	match result {
		Ok(value) => Some(value),
		Err(failure) => {
			exception::set::<S>(component, failure);
			None
		}
	}
}

pub(crate) fn status<const S: usize>(
	component: Component,
	operation: &'static str,
	body: impl FnOnce(&mut World) -> SimResult<()>,
) -> StatusFFI {
	match run::<S, _>(component, operation, body) {
		Some(()) => 0,
		None => FAILURE_STATUS,
	}
}

/// Like [`status`], writing the produced text into the caller's buffer.
/// `None` leaves the buffer untouched.
pub(crate) unsafe fn respond<const S: usize>(
	component: Component,
	operation: &'static str,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
	body: impl FnOnce(&mut World) -> SimResult<Option<String>>,
) -> StatusFFI {
	let text = match run::<S, _>(component, operation, body) {
		Some(text) => text,
		None => return FAILURE_STATUS,
	};
	let Some(text) = text else {
		return 0;
	};
	if unsafe { write_response(&text, response, response_len, resize) } {
		0
	} else {
		exception::set::<S>(component, Failure::new(5, "0005E|Unable to allocate response buffer"));
		FAILURE_STATUS
	}
}

pub(crate) unsafe fn write_response(
	text: &str,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> bool {
	if response.is_null() || response_len.is_null() {
		return false;
	}
	let needed = text.len() + 1;
	unsafe {
		let mut buffer = *response;
		if buffer.is_null() || *response_len < needed {
			buffer = resize(buffer.cast(), needed).cast();
			if buffer.is_null() {
				return false;
			}
			*response = buffer;
			*response_len = needed;
		}
		ptr::copy_nonoverlapping(text.as_ptr(), buffer.cast::<u8>(), text.len());
		*buffer.add(text.len()) = 0;
	}
	true
}

pub(crate) unsafe fn read_str(ptr: *const c_char) -> SimResult<String> {
	if ptr.is_null() {
		return Err(Failure::invalid_parameters());
	}
	let text = unsafe { CStr::from_ptr(ptr) };
	text.to_str().map(str::to_string).map_err(|_| Failure::invalid_parameters())
}

pub(crate) unsafe fn write_out<T>(out: *mut T, value: T) -> SimResult<()> {
	if out.is_null() {
		return Err(Failure::invalid_parameters());
	}
	unsafe { out.write(value) };
	Ok(())
}

/// Handle to one slot of the simulated engine.
pub struct Simulator<const SLOT: usize>;

impl<const SLOT: usize> Simulator<SLOT> {
	/// Function tables addressing this slot.
	pub fn tables() -> NativeTablesFFI {
		NativeTablesFFI {
			engine: engine::vtable::<SLOT>(),
			configmgr: configmgr::vtable::<SLOT>(),
			config: config::vtable::<SLOT>(),
			product: product::vtable::<SLOT>(),
			diagnostic: diagnostic::vtable::<SLOT>(),
		}
	}

	/// Drop all data, injected failures and counters of this slot. Exceptions
	/// pending on other threads are left alone.
	pub fn reset() {
		let state = slot::<SLOT>();
		*state.world.lock() = World::new();
		state.injected.lock().clear();
		state.calls.lock().clear();
		state.clears.lock().clear();
		*state.latency.lock() = Duration::ZERO;
		exception::forget::<SLOT>();
	}

	/// Make the next call of `operation` on `component` fail with `failure`,
	/// whichever thread makes it.
	pub fn fail_next(component: Component, operation: &'static str, failure: Failure) {
		slot::<SLOT>().injected.lock().push((component, operation, failure));
	}

	/// Delay every native call by `latency` while holding no lock.
	pub fn set_latency(latency: Duration) {
		*slot::<SLOT>().latency.lock() = latency;
	}

	pub fn call_count(component: Component, operation: &'static str) -> usize {
		slot::<SLOT>().calls.lock().get(&(component, operation)).copied().unwrap_or(0)
	}

	/// Total native calls made against this slot.
	pub fn total_calls() -> usize {
		slot::<SLOT>().calls.lock().values().sum()
	}

	pub fn clear_count(component: Component) -> usize {
		slot::<SLOT>().clears.lock().get(&component).copied().unwrap_or(0)
	}

	pub fn in_flight() -> usize {
		slot::<SLOT>().in_flight.load(Ordering::SeqCst)
	}

	/// Whether the calling thread has an uncleared exception on `component`.
	pub fn pending_exception(component: Component) -> bool {
		exception::pending::<SLOT>(component)
	}

	/// Simulate an exception left behind by some earlier call on this thread.
	pub fn set_pending_exception(component: Component, failure: Failure) {
		exception::set::<SLOT>(component, failure);
	}

	pub fn default_config_id() -> i64 {
		slot::<SLOT>().world.lock().default_config_id
	}

	pub fn record_count() -> usize {
		slot::<SLOT>().world.lock().records.len()
	}

	pub fn open_exports() -> usize {
		slot::<SLOT>().world.lock().exports.len()
	}

	pub fn open_documents() -> usize {
		slot::<SLOT>().world.lock().documents.len()
	}

	pub fn is_initialized(component: Component) -> bool {
		slot::<SLOT>().world.lock().is_ready(component)
	}
}
