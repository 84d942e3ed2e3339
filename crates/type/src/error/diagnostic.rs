// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use serde::Serialize;

use super::{Error, ObserverError};

/// Stable, machine readable description of an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
	pub code: String,
	pub message: String,
	pub help: Option<String>,
}

pub(super) fn of(err: &Error) -> Diagnostic {
	let (code, help) = match err {
		Error::Native(_) => ("NATIVE_001", None),
		Error::InvalidHandleUsage {
			..
		} => ("HANDLE_001", Some("handles are valid from open until close; open a new one")),
		Error::ConcurrentModificationRejected {
			..
		} => ("CONFIG_001", Some("read the current default configuration id and retry the replacement")),
		Error::Observer(ObserverError::Duplicate(_)) => {
			("OBSERVER_001", Some("unregister the existing observer first or pick a different id"))
		}
		Error::Observer(ObserverError::Unknown(_)) => ("OBSERVER_002", None),
		Error::Marshal {
			..
		} => ("MARSHAL_001", Some("strings passed to the engine must not contain NUL bytes")),
		Error::Destroyed {
			..
		} => ("LIFECYCLE_001", Some("create a new instance through the factory")),
		Error::Library(_) => ("LIBRARY_001", Some("check the library path and that all symbols are exported")),
		Error::Config(_) => ("GATEWAY_001", None),
		Error::Runtime(_) => ("RUNTIME_001", None),
	};

	Diagnostic {
		code: code.to_string(),
		message: err.to_string(),
		help: help.map(str::to_string),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Component, HandleKind};

	#[test]
	fn test_invalid_handle() {
		let err = Error::InvalidHandleUsage {
			kind: HandleKind::Export,
			handle: 9,
			operation: "fetch_next",
		};
		let diagnostic = err.diagnostic();
		assert_eq!(diagnostic.code, "HANDLE_001");
		assert_eq!(diagnostic.message, "invalid export handle 9 in fetch_next: not open");
		assert!(diagnostic.help.is_some());
	}

	#[test]
	fn test_observer_errors() {
		let err = Error::from(ObserverError::Duplicate("audit".to_string()));
		assert_eq!(err.diagnostic().code, "OBSERVER_001");
		assert_eq!(err.to_string(), "observer 'audit' is already registered");

		let err = Error::from(ObserverError::Unknown("audit".to_string()));
		assert_eq!(err.diagnostic().code, "OBSERVER_002");
	}

	#[test]
	fn test_destroyed() {
		let err = Error::Destroyed {
			component: Component::Product,
		};
		assert_eq!(err.diagnostic().code, "LIFECYCLE_001");
		assert_eq!(err.to_string(), "product has been destroyed");
	}
}
