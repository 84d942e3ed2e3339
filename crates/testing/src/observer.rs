// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Observer test doubles.

use std::{
	sync::atomic::{AtomicUsize, Ordering},
	time::Duration,
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use erbridge_observer::{Notification, Observer};
use parking_lot::Mutex;

/// Counts notifications, optionally only those of one operation.
pub struct CountingObserver {
	id: String,
	operation: Option<&'static str>,
	count: AtomicUsize,
	errors: AtomicUsize,
}

impl CountingObserver {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			operation: None,
			count: AtomicUsize::new(0),
			errors: AtomicUsize::new(0),
		}
	}

	/// Count only notifications of `operation`.
	pub fn for_operation(id: impl Into<String>, operation: &'static str) -> Self {
		Self {
			operation: Some(operation),
			..Self::new(id)
		}
	}

	pub fn count(&self) -> usize {
		self.count.load(Ordering::SeqCst)
	}

	/// Counted notifications that carried an error.
	pub fn errors(&self) -> usize {
		self.errors.load(Ordering::SeqCst)
	}
}

impl Observer for CountingObserver {
	fn id(&self) -> &str {
		&self.id
	}

	fn update(&self, notification: &Notification) {
		if self.operation.is_some_and(|op| op != notification.operation) {
			return;
		}
		if notification.is_error() {
			self.errors.fetch_add(1, Ordering::SeqCst);
		}
		self.count.fetch_add(1, Ordering::SeqCst);
	}
}

/// Keeps every notification it receives.
pub struct RecordingObserver {
	id: String,
	seen: Mutex<Vec<Notification>>,
}

impl RecordingObserver {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			seen: Mutex::new(Vec::new()),
		}
	}

	pub fn notifications(&self) -> Vec<Notification> {
		self.seen.lock().clone()
	}

	pub fn of(&self, operation: &str) -> Vec<Notification> {
		self.seen.lock().iter().filter(|n| n.operation == operation).cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.seen.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.seen.lock().is_empty()
	}
}

impl Observer for RecordingObserver {
	fn id(&self) -> &str {
		&self.id
	}

	fn update(&self, notification: &Notification) {
		self.seen.lock().push(notification.clone());
	}
}

/// Blocks inside `update` for notifications of one operation until the test
/// releases it.
pub struct BlockingObserver {
	id: String,
	operation: &'static str,
	entered_tx: Sender<()>,
	entered_rx: Receiver<()>,
	release_tx: Sender<()>,
	release_rx: Receiver<()>,
	completed: AtomicUsize,
}

impl BlockingObserver {
	pub fn new(id: impl Into<String>, operation: &'static str) -> Self {
		let (entered_tx, entered_rx) = unbounded();
		let (release_tx, release_rx) = unbounded();
		Self {
			id: id.into(),
			operation,
			entered_tx,
			entered_rx,
			release_tx,
			release_rx,
			completed: AtomicUsize::new(0),
		}
	}

	/// Wait until a delivery is blocked inside `update`.
	pub fn wait_entered(&self, timeout: Duration) -> bool {
		self.entered_rx.recv_timeout(timeout).is_ok()
	}

	/// Let one blocked delivery finish.
	pub fn release(&self) {
		let _ = self.release_tx.send(());
	}

	pub fn completed(&self) -> usize {
		self.completed.load(Ordering::SeqCst)
	}
}

impl Observer for BlockingObserver {
	fn id(&self) -> &str {
		&self.id
	}

	fn update(&self, notification: &Notification) {
		if notification.operation != self.operation {
			return;
		}
		let _ = self.entered_tx.send(());
		let _ = self.release_rx.recv_timeout(Duration::from_secs(10));
		self.completed.fetch_add(1, Ordering::SeqCst);
	}
}
