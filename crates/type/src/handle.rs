// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
	Export,
	Config,
}

impl Display for HandleKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			HandleKind::Export => f.write_str("export"),
			HandleKind::Config => f.write_str("config"),
		}
	}
}

/// Gateway-issued id of an open export cursor.
///
/// The native handle behind it never leaves the gateway. Ids are never reused,
/// so a stale id can always be told apart from a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportHandle(pub u64);

/// Gateway-issued id of an in-memory configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigHandle(pub u64);

impl ExportHandle {
	pub const KIND: HandleKind = HandleKind::Export;
}

impl ConfigHandle {
	pub const KIND: HandleKind = HandleKind::Config;
}

impl Display for ExportHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "export#{}", self.0)
	}
}

impl Display for ConfigHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "config#{}", self.0)
	}
}

impl From<ExportHandle> for u64 {
	fn from(handle: ExportHandle) -> Self {
		handle.0
	}
}

impl From<ConfigHandle> for u64 {
	fn from(handle: ConfigHandle) -> Self {
		handle.0
	}
}
