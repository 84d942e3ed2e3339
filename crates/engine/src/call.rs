// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The composition every facade method goes through.
//!
//! A call is checked against the lifecycle, logged on entry, run pinned to the
//! calling OS thread, bridged into an [`EngineError`] on failure, reported to
//! observers whatever the outcome, and logged on exit.

use std::{
	collections::BTreeMap,
	fmt::{Display, Formatter},
	sync::atomic::{AtomicBool, Ordering},
	time::{Duration, Instant},
};

use erbridge_abi::{ExceptionVTableFFI, StatusFFI};
use erbridge_observer::Notifier;
use erbridge_runtime::{Affinity, pinned};
use erbridge_type::{Arguments, Component, EngineError, Error, Result, arguments::DEFAULT_MAX_ARGUMENT_LEN};
use tracing::{debug, trace};

use crate::{
	bridge::{self, Failed},
	native::ResponseBuffer,
};

pub const DEFAULT_EXCEPTION_BUFFER_SIZE: usize = 65535;

/// Tunables shared by every call of a facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSettings {
	/// Size of the buffer the last exception message is read into.
	pub exception_buffer_size: usize,
	/// Byte cap of each argument in errors, logs and notifications.
	pub max_argument_len: usize,
}

impl Default for CallSettings {
	fn default() -> Self {
		Self {
			exception_buffer_size: DEFAULT_EXCEPTION_BUFFER_SIZE,
			max_argument_len: DEFAULT_MAX_ARGUMENT_LEN,
		}
	}
}

/// A facade operation: its name and the message id its notifications carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Operation {
	pub(crate) name: &'static str,
	pub(crate) message_id: u32,
}

impl Operation {
	pub(crate) const fn new(name: &'static str, message_id: u32) -> Self {
		Self {
			name,
			message_id,
		}
	}
}

/// Structured record of one finished call.
pub(crate) struct CallRecord<'a> {
	pub(crate) component: Component,
	pub(crate) operation: &'static str,
	pub(crate) arguments: &'a Arguments,
	pub(crate) elapsed: Duration,
	pub(crate) error: Option<&'a Error>,
}

impl CallRecord<'_> {
	fn log(&self) {
		let elapsed_us = self.elapsed.as_micros() as u64;
		match self.error {
			None => trace!(
				component = %self.component,
				operation = self.operation,
				arguments = %self.arguments,
				elapsed_us,
				outcome = "ok",
				"native call finished"
			),
			Some(err) => {
				trace!(
					component = %self.component,
					operation = self.operation,
					arguments = %self.arguments,
					elapsed_us,
					outcome = %err,
					"native call finished"
				);
				debug!(component = %self.component, operation = self.operation, error = %err, "native call failed");
			}
		}
	}
}

impl Display for CallRecord<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}({}) in {:?}", self.component, self.operation, self.arguments, self.elapsed)?;
		match self.error {
			None => f.write_str(": ok"),
			Some(err) => write!(f, ": {err}"),
		}
	}
}

/// Everything a facade needs to issue calls against one native component.
pub(crate) struct Gateway {
	component: Component,
	exception: ExceptionVTableFFI,
	notifier: Notifier,
	settings: CallSettings,
	destroyed: AtomicBool,
}

impl Gateway {
	pub(crate) fn new(component: Component, exception: ExceptionVTableFFI, settings: CallSettings) -> Self {
		Self {
			component,
			exception,
			notifier: Notifier::new(component),
			settings,
			destroyed: AtomicBool::new(false),
		}
	}

	pub(crate) fn notifier(&self) -> &Notifier {
		&self.notifier
	}

	pub(crate) fn arguments(&self) -> Arguments {
		Arguments::new(self.settings.max_argument_len)
	}

	pub(crate) fn is_destroyed(&self) -> bool {
		self.destroyed.load(Ordering::Acquire)
	}

	pub(crate) fn mark_destroyed(&self) {
		self.destroyed.store(true, Ordering::Release);
	}

	/// Run `invoke` as one gateway call of `operation`.
	pub(crate) fn call<T, F>(&self, operation: Operation, arguments: Arguments, invoke: F) -> Result<T>
	where
		F: FnOnce(&Scope<'_>) -> Result<T>,
	{
		let started = Instant::now();
		trace!(
			component = %self.component,
			operation = operation.name,
			arguments = %arguments,
			"native call"
		);

		let result = if self.is_destroyed() {
			Err(Error::Destroyed {
				component: self.component,
			})
		} else {
			pinned(|affinity| {
				let scope = Scope {
					gateway: self,
					affinity,
					operation: operation.name,
					arguments: &arguments,
					started,
				};
				invoke(&scope)
			})
		};

		let record = CallRecord {
			component: self.component,
			operation: operation.name,
			arguments: &arguments,
			elapsed: started.elapsed(),
			error: result.as_ref().err(),
		};
		record.log();

		self.notifier.notify(
			operation.message_id,
			operation.name,
			|| details(&arguments),
			result.as_ref().err().map(ToString::to_string),
		);

		result
	}
}

/// The pinned part of a call. Only exists on the thread that makes the
/// native call, so errors built from it read that thread's exception state.
pub(crate) struct Scope<'a> {
	gateway: &'a Gateway,
	affinity: &'a Affinity,
	operation: &'static str,
	arguments: &'a Arguments,
	started: Instant,
}

impl Scope<'_> {
	pub(crate) fn operation(&self) -> &'static str {
		self.operation
	}

	/// `Ok` for a zero status, otherwise the bridged engine error.
	pub(crate) fn check(&self, status: StatusFFI) -> Result<()> {
		if status == 0 {
			Ok(())
		} else {
			Err(self.fail(status).into())
		}
	}

	/// Bridge the exception of the failed native call that returned `status`.
	pub(crate) fn fail(&self, status: StatusFFI) -> EngineError {
		bridge::bridge(
			self.affinity,
			&self.gateway.exception,
			self.gateway.settings.exception_buffer_size,
			Failed {
				component: self.gateway.component,
				operation: self.operation,
				status,
				arguments: self.arguments,
				elapsed: self.started.elapsed(),
			},
		)
	}

	/// Run a native call that answers through a response buffer and copy the
	/// answer out. The buffer is freed on every path.
	pub(crate) fn respond<F>(&self, invoke: F) -> Result<String>
	where
		F: FnOnce(&mut ResponseBuffer) -> StatusFFI,
	{
		let mut response = ResponseBuffer::new();
		let status = invoke(&mut response);
		self.check(status)?;
		Ok(response.text())
	}

	/// Drop the exception left by a native call whose failure is not reported.
	pub(crate) fn discard(&self) {
		bridge::discard(&self.gateway.exception);
	}
}

fn details(arguments: &Arguments) -> BTreeMap<String, String> {
	arguments.iter().map(|(name, value)| (name.to_string(), value.to_string())).collect()
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use erbridge_testing::{CountingObserver, Failure, Simulator, util::wait::wait_until};

	use super::*;

	const PRIME: Operation = Operation::new("prime_engine", 8026);

	fn gateway<const S: usize>() -> Gateway {
		Gateway::new(Component::Engine, Simulator::<S>::tables().engine.exception, CallSettings::default())
	}

	#[test]
	fn test_success_notifies_once() {
		let gateway = gateway::<9300>();
		let counter = Arc::new(CountingObserver::for_operation("counter", "prime_engine"));
		gateway.notifier().register(counter.clone()).unwrap();

		gateway.call(PRIME, gateway.arguments(), |_| Ok(())).unwrap();

		wait_until(|| counter.count() == 1, "notification not delivered");
		assert_eq!(counter.errors(), 0);
	}

	#[test]
	fn test_failure_bridges_and_notifies() {
		let gateway = gateway::<9301>();
		let counter = Arc::new(CountingObserver::for_operation("counter", "prime_engine"));
		gateway.notifier().register(counter.clone()).unwrap();

		Simulator::<9301>::set_pending_exception(Component::Engine, Failure::new(48, "0048E|not initialized"));
		let err = gateway.call(PRIME, gateway.arguments(), |scope| scope.check(-2)).unwrap_err();

		let engine = err.engine_error().unwrap();
		assert_eq!(engine.code(), 48);
		assert_eq!(engine.operation(), "prime_engine");
		assert!(!Simulator::<9301>::pending_exception(Component::Engine));

		wait_until(|| counter.errors() == 1, "failure not delivered");
		assert_eq!(counter.count(), 1);
	}

	#[test]
	fn test_destroyed_gateway_never_invokes() {
		let gateway = gateway::<9302>();
		gateway.mark_destroyed();
		let mut invoked = false;
		let err = gateway
			.call(PRIME, gateway.arguments(), |_| {
				invoked = true;
				Ok(())
			})
			.unwrap_err();
		assert!(!invoked);
		assert!(matches!(err, Error::Destroyed { component: Component::Engine }));
	}

	#[test]
	fn test_call_record_display() {
		let arguments = Arguments::new(8).with("flags", 0);
		let record = CallRecord {
			component: Component::Engine,
			operation: "get_stats",
			arguments: &arguments,
			elapsed: Duration::from_millis(2),
			error: None,
		};
		assert_eq!(record.to_string(), "engine.get_stats(flags=0) in 2ms: ok");
	}
}
