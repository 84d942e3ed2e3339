// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Thread-safe gateway to a native entity resolution engine.
//!
//! ```no_run
//! use erbridge::{Factory, GatewayConfig, flags};
//!
//! # fn main() -> erbridge::Result<()> {
//! let factory = Factory::new(GatewayConfig::from_env()?)?;
//! let engine = factory.engine()?;
//! engine.add_record("CUSTOMERS", "1001", r#"{"NAME_FULL":"Robert Smith"}"#, flags::NO_FLAGS)?;
//! factory.destroy()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod factory;
mod version;

pub use config::{
	ENV_CONFIG_ID, ENV_INSTANCE_NAME, ENV_LIBRARY_PATH, ENV_SETTINGS, ENV_VERBOSE_LOGGING, GatewayConfig,
};
pub use erbridge_abi::constants as flags;
pub use erbridge_engine::{
	CallSettings, Config, ConfigManager, DEFAULT_EXCEPTION_BUFFER_SIZE, Diagnostic, Engine, ExportIterator,
	NativeLibrary, Product,
};
pub use erbridge_observer::{Notification, Observer};
pub use erbridge_sub_tracing::{LogFormat, LogLevelHandle, TracingBuilder};
pub use erbridge_type::{
	Component, ConfigHandle, EngineError, Error, ExportHandle, HandleKind, ObserverError, Result,
};
pub use factory::Factory;
pub use version::version_number;

/// Default configuration values
pub mod defaults {
	/// Instance name reported to the engine
	pub const INSTANCE_NAME: &str = "erbridge";

	/// Engine settings used when none are given
	pub const SETTINGS: &str = "{}";

	/// Threads kept for [`Factory::run_pinned`](crate::Factory::run_pinned)
	pub const PINNED_WORKERS: usize = 2;
}
