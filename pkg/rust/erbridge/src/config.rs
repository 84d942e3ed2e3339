// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{path::PathBuf, str::FromStr};

use erbridge_engine::{CallSettings, DEFAULT_EXCEPTION_BUFFER_SIZE};
use erbridge_type::{Error, Result, arguments::DEFAULT_MAX_ARGUMENT_LEN};

use crate::defaults::{INSTANCE_NAME, PINNED_WORKERS, SETTINGS};

pub const ENV_INSTANCE_NAME: &str = "ERBRIDGE_INSTANCE_NAME";
pub const ENV_SETTINGS: &str = "ERBRIDGE_SETTINGS";
pub const ENV_CONFIG_ID: &str = "ERBRIDGE_CONFIG_ID";
pub const ENV_VERBOSE_LOGGING: &str = "ERBRIDGE_VERBOSE_LOGGING";
pub const ENV_LIBRARY_PATH: &str = "ERBRIDGE_LIBRARY_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
	pub instance_name: String,
	/// Engine settings JSON, passed through unparsed.
	pub settings: String,
	/// Configuration to initialize with instead of the registered default.
	pub config_id: Option<i64>,
	pub verbose_logging: bool,
	pub library_path: Option<PathBuf>,
	pub exception_buffer_size: usize,
	pub max_argument_len: usize,
	pub pinned_workers: usize,
}

impl GatewayConfig {
	pub fn new() -> Self {
		Self {
			instance_name: INSTANCE_NAME.to_string(),
			settings: SETTINGS.to_string(),
			config_id: None,
			verbose_logging: false,
			library_path: None,
			exception_buffer_size: DEFAULT_EXCEPTION_BUFFER_SIZE,
			max_argument_len: DEFAULT_MAX_ARGUMENT_LEN,
			pinned_workers: PINNED_WORKERS,
		}
	}

	/// Defaults overlaid with the `ERBRIDGE_*` environment variables that
	/// are set and non-empty.
	pub fn from_env() -> Result<Self> {
		Self::new().overlay(|name| std::env::var(name).ok())
	}

	/// Overlay values found through `lookup`. Empty values are ignored.
	pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

		if let Some(instance_name) = lookup(ENV_INSTANCE_NAME) {
			self.instance_name = instance_name;
		}
		if let Some(settings) = lookup(ENV_SETTINGS) {
			self.settings = settings;
		}
		if let Some(config_id) = lookup(ENV_CONFIG_ID) {
			self.config_id = Some(parse(ENV_CONFIG_ID, &config_id)?);
		}
		if let Some(verbose) = lookup(ENV_VERBOSE_LOGGING) {
			self.verbose_logging = parse_bool(ENV_VERBOSE_LOGGING, &verbose)?;
		}
		if let Some(path) = lookup(ENV_LIBRARY_PATH) {
			self.library_path = Some(PathBuf::from(path));
		}
		Ok(self)
	}

	pub fn with_instance_name(mut self, instance_name: impl Into<String>) -> Self {
		self.instance_name = instance_name.into();
		self
	}

	pub fn with_settings(mut self, settings: impl Into<String>) -> Self {
		self.settings = settings.into();
		self
	}

	pub fn with_config_id(mut self, config_id: i64) -> Self {
		self.config_id = Some(config_id);
		self
	}

	pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
		self.verbose_logging = verbose;
		self
	}

	pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.library_path = Some(path.into());
		self
	}

	pub fn with_exception_buffer_size(mut self, size: usize) -> Self {
		self.exception_buffer_size = size;
		self
	}

	pub fn with_max_argument_len(mut self, len: usize) -> Self {
		self.max_argument_len = len;
		self
	}

	pub fn with_pinned_workers(mut self, workers: usize) -> Self {
		self.pinned_workers = workers;
		self
	}

	pub fn call_settings(&self) -> CallSettings {
		CallSettings {
			exception_buffer_size: self.exception_buffer_size,
			max_argument_len: self.max_argument_len,
		}
	}

	/// Configuration id handed to `initialize`; zero selects the default.
	pub(crate) fn initial_config_id(&self) -> i64 {
		self.config_id.unwrap_or(0)
	}
}

impl Default for GatewayConfig {
	fn default() -> Self {
		Self::new()
	}
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T>
where
	T::Err: std::fmt::Display,
{
	value.trim().parse().map_err(|e| Error::Config(format!("{name}: invalid value '{value}': {e}")))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(Error::Config(format!("{name}: invalid value '{value}': expected a boolean"))),
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn test_defaults() {
		let config = GatewayConfig::default();
		assert_eq!(config.exception_buffer_size, 65535);
		assert_eq!(config.max_argument_len, 256);
		assert_eq!(config.pinned_workers, 2);
		assert_eq!(config.initial_config_id(), 0);
		assert!(config.library_path.is_none());
	}

	#[test]
	fn test_overlay() {
		let config = GatewayConfig::new()
			.overlay(env(&[
				(ENV_INSTANCE_NAME, "loader"),
				(ENV_CONFIG_ID, "4019066234"),
				(ENV_VERBOSE_LOGGING, "true"),
				(ENV_LIBRARY_PATH, "/opt/senzing/lib/libSz.so"),
				(ENV_SETTINGS, ""),
			]))
			.unwrap();
		assert_eq!(config.instance_name, "loader");
		assert_eq!(config.config_id, Some(4019066234));
		assert!(config.verbose_logging);
		assert_eq!(config.library_path, Some(PathBuf::from("/opt/senzing/lib/libSz.so")));
		assert_eq!(config.settings, SETTINGS);
	}

	#[test]
	fn test_malformed_number() {
		let err = GatewayConfig::new().overlay(env(&[(ENV_CONFIG_ID, "12ab")])).unwrap_err();
		assert!(matches!(err, Error::Config(ref msg) if msg.contains(ENV_CONFIG_ID)));

		let err = GatewayConfig::new().overlay(env(&[(ENV_VERBOSE_LOGGING, "maybe")])).unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn test_builder_setters() {
		let config = GatewayConfig::new().with_config_id(7).with_max_argument_len(32).with_exception_buffer_size(128);
		let settings = config.call_settings();
		assert_eq!(settings.max_argument_len, 32);
		assert_eq!(settings.exception_buffer_size, 128);
		assert_eq!(config.initial_config_id(), 7);
	}
}
