// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use erbridge_type::{Error, Result};
use tracing::Dispatch;
use tracing_subscriber::{
	EnvFilter, Layer, Registry,
	fmt::{self, MakeWriter, writer::BoxMakeWriter},
	layer::SubscriberExt,
	reload,
	util::SubscriberInitExt,
};

use crate::LogLevelHandle;

pub const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
	#[default]
	Plain,
	Json,
}

/// Builder for the process-wide subscriber
pub struct TracingBuilder {
	level: String,
	format: LogFormat,
	use_env: bool,
	with_target: bool,
	with_thread_names: bool,
	writer: BoxMakeWriter,
}

impl TracingBuilder {
	pub fn new() -> Self {
		Self {
			level: DEFAULT_LEVEL.to_string(),
			format: LogFormat::Plain,
			use_env: true,
			with_target: true,
			with_thread_names: true,
			writer: BoxMakeWriter::new(std::io::stderr),
		}
	}

	/// Directives used when `RUST_LOG` is unset or ignored.
	pub fn level(mut self, level: impl Into<String>) -> Self {
		self.level = level.into();
		self
	}

	pub fn format(mut self, format: LogFormat) -> Self {
		self.format = format;
		self
	}

	pub fn json(self) -> Self {
		self.format(LogFormat::Json)
	}

	/// Whether `RUST_LOG` takes precedence over [`level`](Self::level).
	pub fn use_env(mut self, use_env: bool) -> Self {
		self.use_env = use_env;
		self
	}

	pub fn with_target(mut self, with_target: bool) -> Self {
		self.with_target = with_target;
		self
	}

	pub fn with_thread_names(mut self, with_thread_names: bool) -> Self {
		self.with_thread_names = with_thread_names;
		self
	}

	pub fn writer<W>(mut self, writer: W) -> Self
	where
		W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
	{
		self.writer = BoxMakeWriter::new(writer);
		self
	}

	fn filter(&self) -> Result<EnvFilter> {
		if self.use_env {
			if let Ok(filter) = EnvFilter::try_from_default_env() {
				return Ok(filter);
			}
		}
		EnvFilter::try_new(&self.level).map_err(|e| Error::Config(format!("invalid log directive '{}': {e}", self.level)))
	}

	/// Build the subscriber without installing it.
	pub fn build(self) -> Result<(Dispatch, LogLevelHandle)> {
		let (filter, handle) = reload::Layer::new(self.filter()?);

		let output = match self.format {
			LogFormat::Plain => fmt::layer()
				.with_target(self.with_target)
				.with_thread_names(self.with_thread_names)
				.with_writer(self.writer)
				.boxed(),
			LogFormat::Json => fmt::layer()
				.json()
				.with_target(self.with_target)
				.with_thread_names(self.with_thread_names)
				.with_writer(self.writer)
				.boxed(),
		};

		let subscriber = Registry::default().with(filter).with(output);
		Ok((Dispatch::new(subscriber), LogLevelHandle::new(handle)))
	}

	/// Install the subscriber as the global default. Fails if one is
	/// already installed.
	pub fn init(self) -> Result<LogLevelHandle> {
		let (dispatch, handle) = self.build()?;
		dispatch.try_init().map_err(|e| Error::Config(format!("tracing subscriber already installed: {e}")))?;
		Ok(handle)
	}
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_invalid_level_is_config_error() {
		let err = TracingBuilder::new().use_env(false).level("erbridge=notalevel").build().err().unwrap();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn test_defaults() {
		let builder = TracingBuilder::default();
		assert_eq!(builder.level, DEFAULT_LEVEL);
		assert_eq!(builder.format, LogFormat::Plain);
		assert!(builder.use_env);
	}
}
