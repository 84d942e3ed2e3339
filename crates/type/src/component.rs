// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A native engine component. Each component keeps its own thread-local
/// last-exception state and has its own subject id in notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
	Config,
	ConfigMgr,
	Diagnostic,
	Engine,
	Product,
}

impl Component {
	pub const ALL: [Component; 5] = [
		Component::Config,
		Component::ConfigMgr,
		Component::Diagnostic,
		Component::Engine,
		Component::Product,
	];

	/// Subject id attached to every notification emitted by this component.
	pub const fn subject_id(self) -> u32 {
		match self {
			Component::Config => 6001,
			Component::ConfigMgr => 6002,
			Component::Diagnostic => 6003,
			Component::Engine => 6004,
			Component::Product => 6006,
		}
	}

	pub const fn name(self) -> &'static str {
		match self {
			Component::Config => "config",
			Component::ConfigMgr => "configmgr",
			Component::Diagnostic => "diagnostic",
			Component::Engine => "engine",
			Component::Product => "product",
		}
	}
}

impl Display for Component {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}
