// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use erbridge_type::{Error, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Changes the active log filter at runtime.
#[derive(Clone)]
pub struct LogLevelHandle {
	inner: reload::Handle<EnvFilter, Registry>,
}

impl LogLevelHandle {
	pub(crate) fn new(inner: reload::Handle<EnvFilter, Registry>) -> Self {
		Self {
			inner,
		}
	}

	/// Replace the filter with `directives`, e.g. `"debug"` or
	/// `"info,erbridge_engine=trace"`. A malformed directive leaves the
	/// current filter in place.
	pub fn set_level(&self, directives: &str) -> Result<()> {
		let filter = EnvFilter::try_new(directives)
			.map_err(|e| Error::Config(format!("invalid log directive '{directives}': {e}")))?;
		self.inner.reload(filter).map_err(|e| Error::Runtime(format!("log filter reload failed: {e}")))?;
		info!(directives, "log level changed");
		Ok(())
	}

	/// The active filter, rendered as directives.
	pub fn current(&self) -> Option<String> {
		self.inner.with_current(ToString::to_string).ok()
	}
}
