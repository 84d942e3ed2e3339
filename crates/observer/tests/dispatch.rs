// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use erbridge_observer::{Notification, Notifier, Observer};
use erbridge_type::Component;

/// Blocks inside `update` until released.
struct Gate {
	id: String,
	entered: Sender<&'static str>,
	release: Receiver<()>,
	finished: AtomicUsize,
}

impl Observer for Gate {
	fn id(&self) -> &str {
		&self.id
	}

	fn update(&self, notification: &Notification) {
		if notification.operation != "add_record" {
			return;
		}
		let _ = self.entered.send(notification.operation);
		let _ = self.release.recv_timeout(Duration::from_secs(5));
		self.finished.fetch_add(1, Ordering::SeqCst);
	}
}

struct Counter {
	id: String,
	count: AtomicUsize,
}

impl Observer for Counter {
	fn id(&self) -> &str {
		&self.id
	}

	fn update(&self, notification: &Notification) {
		if notification.operation == "add_record" {
			self.count.fetch_add(1, Ordering::SeqCst);
		}
	}
}

struct Panicking;

impl Observer for Panicking {
	fn id(&self) -> &str {
		"panicking"
	}

	fn update(&self, _notification: &Notification) {
		panic!("observer failure");
	}
}

fn wait_until(cond: impl Fn() -> bool) {
	let deadline = Instant::now() + Duration::from_secs(5);
	while !cond() {
		assert!(Instant::now() < deadline, "condition not reached in time");
		std::thread::sleep(Duration::from_millis(5));
	}
}

fn counter(id: &str) -> Arc<Counter> {
	Arc::new(Counter {
		id: id.to_string(),
		count: AtomicUsize::new(0),
	})
}

#[test]
fn test_blocked_observer_does_not_delay_caller_or_others() {
	let notifier = Notifier::new(Component::Engine);
	let (entered_tx, entered_rx) = unbounded();
	let (release_tx, release_rx) = bounded(0);
	let gate = Arc::new(Gate {
		id: "gate".to_string(),
		entered: entered_tx,
		release: release_rx,
		finished: AtomicUsize::new(0),
	});
	let fast = counter("fast");
	notifier.register(gate.clone()).unwrap();
	notifier.register(fast.clone()).unwrap();

	let started = Instant::now();
	notifier.notify(8001, "add_record", BTreeMap::new, None);
	assert!(started.elapsed() < Duration::from_secs(1));

	entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
	wait_until(|| fast.count.load(Ordering::SeqCst) == 1);
	assert_eq!(gate.finished.load(Ordering::SeqCst), 0);

	release_tx.send(()).unwrap();
	wait_until(|| gate.finished.load(Ordering::SeqCst) == 1);
}

#[test]
fn test_unregister_during_inflight_delivery() {
	let notifier = Notifier::new(Component::Engine);
	let (entered_tx, entered_rx) = unbounded();
	let (release_tx, release_rx) = bounded(0);
	let gate = Arc::new(Gate {
		id: "gate".to_string(),
		entered: entered_tx,
		release: release_rx,
		finished: AtomicUsize::new(0),
	});
	notifier.register(gate.clone()).unwrap();

	notifier.notify(8001, "add_record", BTreeMap::new, None);
	entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

	notifier.unregister("gate").unwrap();
	assert!(!notifier.has_observers());

	// the delivery dispatched before removal still completes
	release_tx.send(()).unwrap();
	wait_until(|| gate.finished.load(Ordering::SeqCst) == 1);

	// nothing dispatched after removal reaches it
	notifier.notify(8001, "add_record", BTreeMap::new, None);
	std::thread::sleep(Duration::from_millis(50));
	assert_eq!(gate.finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_panicking_observer_is_isolated() {
	let notifier = Notifier::new(Component::Engine);
	let healthy = counter("healthy");
	notifier.register(Arc::new(Panicking)).unwrap();
	notifier.register(healthy.clone()).unwrap();

	for _ in 0..3 {
		notifier.notify(8001, "add_record", BTreeMap::new, None);
	}
	wait_until(|| healthy.count.load(Ordering::SeqCst) == 3);
}

#[test]
fn test_concurrent_register_and_notify() {
	let notifier = Arc::new(Notifier::new(Component::Engine));
	let stable = counter("stable");
	notifier.register(stable.clone()).unwrap();

	let mut handles = Vec::new();
	for t in 0..4 {
		let notifier = notifier.clone();
		handles.push(std::thread::spawn(move || {
			for i in 0..25 {
				let id = format!("churn-{t}-{i}");
				notifier.register(counter(&id)).unwrap();
				notifier.notify(8001, "add_record", BTreeMap::new, None);
				notifier.unregister(&id).unwrap();
			}
		}));
	}
	for handle in handles {
		handle.join().unwrap();
	}

	wait_until(|| stable.count.load(Ordering::SeqCst) == 100);
	assert_eq!(notifier.registry().len(), 1);
}
