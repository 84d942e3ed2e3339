// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use erbridge_type::ObserverError;
use parking_lot::RwLock;

use crate::Observer;

/// Thread-safe set of observers.
///
/// Dispatch and `has_observers` only take the read lock, registration and
/// removal take the write lock.
#[derive(Default)]
pub struct ObserverRegistry {
	observers: RwLock<Vec<Arc<dyn Observer>>>,
}

impl ObserverRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&self, observer: Arc<dyn Observer>) -> Result<(), ObserverError> {
		let mut observers = self.observers.write();
		if observers.iter().any(|o| o.id() == observer.id()) {
			return Err(ObserverError::Duplicate(observer.id().to_string()));
		}
		observers.push(observer);
		Ok(())
	}

	pub fn unregister(&self, id: &str) -> Result<Arc<dyn Observer>, ObserverError> {
		let mut observers = self.observers.write();
		match observers.iter().position(|o| o.id() == id) {
			Some(idx) => Ok(observers.remove(idx)),
			None => Err(ObserverError::Unknown(id.to_string())),
		}
	}

	pub fn contains(&self, id: &str) -> bool {
		self.observers.read().iter().any(|o| o.id() == id)
	}

	pub fn has_observers(&self) -> bool {
		!self.observers.read().is_empty()
	}

	pub fn len(&self) -> usize {
		self.observers.read().len()
	}

	pub fn is_empty(&self) -> bool {
		!self.has_observers()
	}

	/// Observers registered right now. Later changes to the registry do not
	/// affect the returned list.
	pub fn snapshot(&self) -> Vec<Arc<dyn Observer>> {
		self.observers.read().clone()
	}
}
