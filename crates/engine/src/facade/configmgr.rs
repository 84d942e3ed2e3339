// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Configuration manager facade: the datastore's registry of configuration
//! documents and its default configuration id.

use std::sync::Arc;

use erbridge_abi::ConfigMgrVTableFFI;
use erbridge_type::{Component, Error, Result};
use tracing::debug;

use super::{impl_observable, verbose_flag};
use crate::{
	call::{CallSettings, Gateway, Operation, Scope},
	library::NativeLibrary,
	native::c_string,
};

const REGISTER_CONFIG: Operation = Operation::new("register_config", 8001);
const DESTROY: Operation = Operation::new("destroy", 8002);
const GET_CONFIG: Operation = Operation::new("get_config", 8003);
const GET_CONFIGS: Operation = Operation::new("get_configs", 8004);
const GET_DEFAULT_CONFIG_ID: Operation = Operation::new("get_default_config_id", 8005);
const INITIALIZE: Operation = Operation::new("initialize", 8006);
const REPLACE_DEFAULT_CONFIG_ID: Operation = Operation::new("replace_default_config_id", 8007);
const SET_DEFAULT_CONFIG_ID: Operation = Operation::new("set_default_config_id", 8008);
const SET_DEFAULT_CONFIG: Operation = Operation::new("set_default_config", 8009);

pub struct ConfigManager {
	library: Arc<NativeLibrary>,
	gateway: Gateway,
}

impl_observable!(ConfigManager);

impl ConfigManager {
	pub fn new(library: Arc<NativeLibrary>, settings: CallSettings) -> Self {
		let gateway = Gateway::new(Component::ConfigMgr, library.configmgr().exception, settings);
		Self {
			library,
			gateway,
		}
	}

	fn vtable(&self) -> &ConfigMgrVTableFFI {
		self.library.configmgr()
	}

	pub fn initialize(&self, instance_name: &str, settings: &str, verbose: bool) -> Result<()> {
		let arguments = self
			.gateway
			.arguments()
			.with("instance_name", instance_name)
			.with("settings", settings)
			.with("verbose", verbose);
		self.gateway.call(INITIALIZE, arguments, |scope| {
			let instance = c_string(INITIALIZE.name, "instance_name", instance_name)?;
			let settings = c_string(INITIALIZE.name, "settings", settings)?;
			// SAFETY: both strings outlive the call
			scope.check(unsafe { (self.vtable().init)(instance.as_ptr(), settings.as_ptr(), verbose_flag(verbose)) })
		})
	}

	pub fn destroy(&self) -> Result<()> {
		self.gateway.call(DESTROY, self.gateway.arguments(), |scope| {
			// SAFETY: no arguments
			scope.check(unsafe { (self.vtable().destroy)() })
		})?;
		self.gateway.mark_destroyed();
		Ok(())
	}

	/// Store a configuration document and return its id. Storing does not
	/// make it the default.
	pub fn register_config(&self, definition: &str, comment: &str) -> Result<i64> {
		let arguments = self.gateway.arguments().with("definition", definition).with("comment", comment);
		self.gateway.call(REGISTER_CONFIG, arguments, |scope| self.add_config(scope, definition, comment))
	}

	pub fn get_config(&self, config_id: i64) -> Result<String> {
		let arguments = self.gateway.arguments().with("config_id", config_id);
		self.gateway.call(GET_CONFIG, arguments, |scope| {
			scope.respond(|response| unsafe {
				(self.vtable().get_config)(config_id, response.ptr_mut(), response.len_mut(), response.resize_fn())
			})
		})
	}

	/// JSON listing of every stored configuration.
	pub fn get_configs(&self) -> Result<String> {
		self.gateway.call(GET_CONFIGS, self.gateway.arguments(), |scope| {
			scope.respond(|response| unsafe {
				(self.vtable().get_config_list)(response.ptr_mut(), response.len_mut(), response.resize_fn())
			})
		})
	}

	/// The default configuration id, zero when none is set.
	pub fn get_default_config_id(&self) -> Result<i64> {
		self.gateway.call(GET_DEFAULT_CONFIG_ID, self.gateway.arguments(), |scope| self.default_config_id(scope))
	}

	pub fn set_default_config_id(&self, config_id: i64) -> Result<()> {
		let arguments = self.gateway.arguments().with("config_id", config_id);
		self.gateway.call(SET_DEFAULT_CONFIG_ID, arguments, |scope| self.set_default(scope, config_id))
	}

	/// Make `replacement` the default only if the default is still
	/// `expected`. Losing that race is `ConcurrentModificationRejected`; any
	/// other refusal stays a native failure.
	pub fn replace_default_config_id(&self, expected: i64, replacement: i64) -> Result<()> {
		let arguments = self.gateway.arguments().with("expected", expected).with("replacement", replacement);
		self.gateway.call(REPLACE_DEFAULT_CONFIG_ID, arguments, |scope| {
			// SAFETY: plain integer arguments
			let status = unsafe { (self.vtable().replace_default_config_id)(expected, replacement) };
			if status == 0 {
				return Ok(());
			}
			let source = scope.fail(status);

			let mut current = 0i64;
			// SAFETY: out pointer to a live local
			if unsafe { (self.vtable().get_default_config_id)(&mut current) } != 0 {
				scope.discard();
				return Err(source.into());
			}
			if current != expected {
				debug!(expected, current, replacement, "default configuration changed concurrently");
				return Err(Error::ConcurrentModificationRejected {
					expected,
					replacement,
					source,
				});
			}
			Err(source.into())
		})
	}

	/// Store `definition` and make it the default, on one pinned thread.
	/// Returns the new id.
	pub fn set_default_config(&self, definition: &str, comment: &str) -> Result<i64> {
		let arguments = self.gateway.arguments().with("definition", definition).with("comment", comment);
		self.gateway.call(SET_DEFAULT_CONFIG, arguments, |scope| {
			let config_id = self.add_config(scope, definition, comment)?;
			self.set_default(scope, config_id)?;
			Ok(config_id)
		})
	}

	fn add_config(&self, scope: &Scope<'_>, definition: &str, comment: &str) -> Result<i64> {
		let definition = c_string(scope.operation(), "definition", definition)?;
		let comment = c_string(scope.operation(), "comment", comment)?;
		let mut config_id = 0i64;
		// SAFETY: both strings outlive the call, out pointer to a live local
		scope.check(unsafe { (self.vtable().add_config)(definition.as_ptr(), comment.as_ptr(), &mut config_id) })?;
		Ok(config_id)
	}

	fn default_config_id(&self, scope: &Scope<'_>) -> Result<i64> {
		let mut config_id = 0i64;
		// SAFETY: out pointer to a live local
		scope.check(unsafe { (self.vtable().get_default_config_id)(&mut config_id) })?;
		Ok(config_id)
	}

	fn set_default(&self, scope: &Scope<'_>, config_id: i64) -> Result<()> {
		// SAFETY: plain integer argument
		scope.check(unsafe { (self.vtable().set_default_config_id)(config_id) })
	}
}
