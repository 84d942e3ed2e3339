// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

mod diagnostic;
mod engine;

pub use diagnostic::Diagnostic;
pub use engine::EngineError;

use crate::{Component, HandleKind};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ObserverError {
	#[error("observer '{0}' is already registered")]
	Duplicate(String),

	#[error("observer '{0}' is not registered")]
	Unknown(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A native call returned a failing status.
	#[error(transparent)]
	Native(#[from] EngineError),

	#[error("invalid {kind} handle {handle} in {operation}: not open")]
	InvalidHandleUsage {
		kind: HandleKind,
		handle: u64,
		operation: &'static str,
	},

	#[error("default configuration id is no longer {expected}, refusing to replace it with {replacement}")]
	ConcurrentModificationRejected {
		expected: i64,
		replacement: i64,
		#[source]
		source: EngineError,
	},

	#[error(transparent)]
	Observer(#[from] ObserverError),

	#[error("argument '{argument}' of {operation} contains an interior NUL byte")]
	Marshal {
		operation: &'static str,
		argument: &'static str,
	},

	#[error("{component} has been destroyed")]
	Destroyed {
		component: Component,
	},

	#[error("native library: {0}")]
	Library(String),

	#[error("configuration: {0}")]
	Config(String),

	#[error("runtime: {0}")]
	Runtime(String),
}

impl Error {
	/// The engine error behind this failure, if a native call failed.
	pub fn engine_error(&self) -> Option<&EngineError> {
		match self {
			Error::Native(err) => Some(err),
			Error::ConcurrentModificationRejected {
				source,
				..
			} => Some(source),
			_ => None,
		}
	}

	pub fn is_invalid_handle(&self) -> bool {
		matches!(self, Error::InvalidHandleUsage { .. })
	}

	pub fn diagnostic(&self) -> Diagnostic {
		diagnostic::of(self)
	}
}

impl From<erbridge_runtime::PoolError> for Error {
	fn from(err: erbridge_runtime::PoolError) -> Self {
		Error::Runtime(err.to_string())
	}
}
