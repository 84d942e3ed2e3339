// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! One facade per native component.

/// Observer management shared by every facade. Expects a `gateway` field.
macro_rules! impl_observable {
	($facade:ty) => {
		impl $facade {
			/// Register `observer` for notifications of this facade's calls.
			pub fn register_observer(
				&self,
				observer: std::sync::Arc<dyn erbridge_observer::Observer>,
			) -> erbridge_type::Result<()> {
				self.gateway.notifier().register(observer).map_err(Into::into)
			}

			pub fn unregister_observer(&self, id: &str) -> erbridge_type::Result<()> {
				self.gateway.notifier().unregister(id).map_err(Into::into)
			}

			pub fn has_observers(&self) -> bool {
				self.gateway.notifier().has_observers()
			}

			/// Correlation tag attached to every notification.
			pub fn observer_origin(&self) -> String {
				self.gateway.notifier().origin()
			}

			pub fn set_observer_origin(&self, origin: impl Into<String>) {
				self.gateway.notifier().set_origin(origin)
			}

			pub fn is_destroyed(&self) -> bool {
				self.gateway.is_destroyed()
			}
		}
	};
}

pub(crate) use impl_observable;

pub mod config;
pub mod configmgr;
pub mod diagnostic;
pub mod engine;
pub mod product;

pub(crate) fn verbose_flag(verbose: bool) -> i64 {
	i64::from(verbose)
}
