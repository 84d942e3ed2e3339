// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	panic::{AssertUnwindSafe, catch_unwind},
	thread,
};

use tracing::warn;

/// Run `f` on a new, detached OS thread.
///
/// The caller never waits for `f`. A panic inside `f` is caught and logged so
/// it cannot reach the caller. Returns `false` if the thread could not be
/// spawned.
pub fn spawn_detached<F>(name: &str, f: F) -> bool
where
	F: FnOnce() + Send + 'static,
{
	let thread_name = name.to_string();
	let result = thread::Builder::new().name(name.to_string()).spawn(move || {
		if let Err(panic) = catch_unwind(AssertUnwindSafe(f)) {
			warn!(thread = %thread_name, panic = %panic_message(panic.as_ref()), "detached task panicked");
		}
	});

	match result {
		Ok(_) => true,
		Err(err) => {
			warn!(thread = %name, error = %err, "failed to spawn detached task");
			false
		}
	}
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
	if let Some(s) = panic.downcast_ref::<&str>() {
		s.to_string()
	} else if let Some(s) = panic.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic".to_string()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use crossbeam_channel::bounded;

	use super::*;

	#[test]
	fn test_spawn_detached_runs() {
		let (tx, rx) = bounded(1);
		assert!(spawn_detached("test-detached", move || {
			tx.send(thread::current().name().map(str::to_string)).unwrap();
		}));
		let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
		assert_eq!(name.as_deref(), Some("test-detached"));
	}

	#[test]
	fn test_panic_does_not_escape() {
		let (tx, rx) = bounded::<()>(1);
		assert!(spawn_detached("test-panicking", move || {
			let _tx = tx;
			panic!("boom");
		}));
		// the sender is dropped during unwinding
		assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
	}

	#[test]
	fn test_panic_message() {
		let s: Box<dyn std::any::Any + Send> = Box::new("static");
		assert_eq!(panic_message(s.as_ref()), "static");
		let s: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
		assert_eq!(panic_message(s.as_ref()), "owned");
		let s: Box<dyn std::any::Any + Send> = Box::new(42);
		assert_eq!(panic_message(s.as_ref()), "unknown panic");
	}
}
