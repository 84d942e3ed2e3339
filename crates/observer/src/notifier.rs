// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeMap, sync::Arc, time::SystemTime};

use erbridge_runtime::spawn_detached;
use erbridge_type::{Component, ObserverError};
use parking_lot::RwLock;
use tracing::{trace, warn};

use crate::{Notification, Observer, ObserverRegistry};

pub const REGISTER_OBSERVER: u32 = 8702;
pub const UNREGISTER_OBSERVER: u32 = 8704;

/// Per-facade notification front end: the observer registry plus the origin
/// tag and subject id stamped on every notification.
pub struct Notifier {
	component: Component,
	registry: ObserverRegistry,
	origin: RwLock<String>,
}

impl Notifier {
	pub fn new(component: Component) -> Self {
		Self {
			component,
			registry: ObserverRegistry::new(),
			origin: RwLock::new(String::new()),
		}
	}

	pub fn component(&self) -> Component {
		self.component
	}

	pub fn registry(&self) -> &ObserverRegistry {
		&self.registry
	}

	pub fn origin(&self) -> String {
		self.origin.read().clone()
	}

	pub fn set_origin(&self, origin: impl Into<String>) {
		*self.origin.write() = origin.into();
	}

	pub fn has_observers(&self) -> bool {
		self.registry.has_observers()
	}

	/// Registers `observer`. The new observer is itself notified of its
	/// registration. A rejected registration is announced, with the error, to
	/// the observers already registered.
	pub fn register(&self, observer: Arc<dyn Observer>) -> Result<(), ObserverError> {
		let id = observer.id().to_string();
		let result = self.registry.register(observer);
		let error = result.as_ref().err().map(ToString::to_string);
		self.notify(REGISTER_OBSERVER, "register_observer", || observer_details(&id), error);
		result
	}

	/// Unregisters the observer with `id`. The leaving observer still receives
	/// the notification; an unknown id is announced, with the error, to the
	/// observers registered now.
	pub fn unregister(&self, id: &str) -> Result<(), ObserverError> {
		match self.registry.unregister(id) {
			Ok(removed) => {
				let mut observers = self.registry.snapshot();
				observers.push(removed);
				self.dispatch(observers, UNREGISTER_OBSERVER, "unregister_observer", || observer_details(id), None);
				Ok(())
			}
			Err(err) => {
				self.notify(
					UNREGISTER_OBSERVER,
					"unregister_observer",
					|| observer_details(id),
					Some(err.to_string()),
				);
				Err(err)
			}
		}
	}

	/// Fans out one notification to every observer registered at the time of
	/// the call. Returns without waiting for any delivery.
	pub fn notify<D>(&self, message_id: u32, operation: &'static str, details: D, error: Option<String>)
	where
		D: FnOnce() -> BTreeMap<String, String>,
	{
		self.dispatch(self.registry.snapshot(), message_id, operation, details, error);
	}

	fn dispatch<D>(
		&self,
		observers: Vec<Arc<dyn Observer>>,
		message_id: u32,
		operation: &'static str,
		details: D,
		error: Option<String>,
	) where
		D: FnOnce() -> BTreeMap<String, String>,
	{
		if observers.is_empty() {
			return;
		}

		let notification = Arc::new(Notification {
			origin: self.origin(),
			subject_id: self.component.subject_id(),
			message_id,
			operation,
			details: details(),
			error,
			emitted_at: SystemTime::now(),
		});

		trace!(
			component = %self.component,
			operation,
			message_id,
			observers = observers.len(),
			"dispatching notification"
		);

		for observer in observers {
			let notification = notification.clone();
			let thread_name = format!("erbridge-notify-{}", self.component);
			if !spawn_detached(&thread_name, move || observer.update(&notification)) {
				warn!(component = %self.component, operation, "notification dropped");
			}
		}
	}
}

fn observer_details(id: &str) -> BTreeMap<String, String> {
	let mut details = BTreeMap::new();
	details.insert("observerID".to_string(), id.to_string());
	details
}
