// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	time::Duration,
};

use erbridge_runtime::Affinity;

use crate::{Arguments, Component};

/// A failing native call, bridged out of the engine's thread-local
/// last-exception state.
///
/// Construction requires the [`Affinity`] token of the call that failed, so an
/// `EngineError` can only be built on the thread that made the call while the
/// token is still live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
	component: Component,
	operation: &'static str,
	status: i64,
	code: i64,
	message: String,
	arguments: Arguments,
	elapsed: Duration,
}

impl EngineError {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		affinity: &Affinity,
		component: Component,
		operation: &'static str,
		status: i64,
		code: i64,
		message: impl Into<String>,
		arguments: Arguments,
		elapsed: Duration,
	) -> Self {
		affinity.debug_assert_current();

		let mut message = message.into();
		if message.trim().is_empty() {
			message = format!("{component}.{operation} failed with status {status}");
		}

		Self {
			component,
			operation,
			status,
			code,
			message,
			arguments,
			elapsed,
		}
	}

	pub fn component(&self) -> Component {
		self.component
	}

	pub fn operation(&self) -> &'static str {
		self.operation
	}

	/// Status returned by the failing native function.
	pub fn status(&self) -> i64 {
		self.status
	}

	/// Error code reported by the engine, `0` if it reported none.
	pub fn code(&self) -> i64 {
		self.code
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn arguments(&self) -> &Arguments {
		&self.arguments
	}

	pub fn elapsed(&self) -> Duration {
		self.elapsed
	}
}

impl Display for EngineError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}.{}] E{}: {}", self.component, self.operation, self.code, self.message)
	}
}

impl std::error::Error for EngineError {}
