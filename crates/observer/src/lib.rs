// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Observers of gateway operations.
//!
//! Every facade owns a [`Notifier`]. After each operation, successful or not,
//! the notifier takes a snapshot of the registered observers and delivers one
//! [`Notification`] to each of them on its own detached thread. The caller
//! never waits for delivery, and a slow or panicking observer affects nobody
//! but itself.

mod notification;
mod notifier;
mod registry;

pub use notification::Notification;
pub use notifier::Notifier;
pub use registry::ObserverRegistry;

/// A subscriber to gateway notifications.
pub trait Observer: Send + Sync + 'static {
	/// Unique id within one registry.
	fn id(&self) -> &str;

	/// Called on a delivery thread, never on the thread of the operation.
	fn update(&self, notification: &Notification);
}
