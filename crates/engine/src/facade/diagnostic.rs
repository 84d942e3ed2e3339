// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use erbridge_abi::DiagnosticVTableFFI;
use erbridge_type::{Component, Result};
use tracing::info;

use super::{impl_observable, verbose_flag};
use crate::{
	call::{CallSettings, Gateway, Operation},
	library::NativeLibrary,
	native::c_string,
};

const CHECK_DATASTORE_PERFORMANCE: Operation = Operation::new("check_datastore_performance", 8001);
const DESTROY: Operation = Operation::new("destroy", 8002);
const GET_DATASTORE_INFO: Operation = Operation::new("get_datastore_info", 8003);
const GET_FEATURE: Operation = Operation::new("get_feature", 8004);
const INITIALIZE: Operation = Operation::new("initialize", 8005);
const PURGE_REPOSITORY: Operation = Operation::new("purge_repository", 8007);
const REINITIALIZE: Operation = Operation::new("reinitialize", 8008);

pub struct Diagnostic {
	library: Arc<NativeLibrary>,
	gateway: Gateway,
}

impl_observable!(Diagnostic);

impl Diagnostic {
	pub fn new(library: Arc<NativeLibrary>, settings: CallSettings) -> Self {
		let gateway = Gateway::new(Component::Diagnostic, library.diagnostic().exception, settings);
		Self {
			library,
			gateway,
		}
	}

	fn vtable(&self) -> &DiagnosticVTableFFI {
		self.library.diagnostic()
	}

	/// Initialize against the default configuration, or `config_id` when it
	/// is non-zero.
	pub fn initialize(&self, instance_name: &str, settings: &str, config_id: i64, verbose: bool) -> Result<()> {
		let arguments = self
			.gateway
			.arguments()
			.with("instance_name", instance_name)
			.with("settings", settings)
			.with("config_id", config_id)
			.with("verbose", verbose);
		self.gateway.call(INITIALIZE, arguments, |scope| {
			let instance = c_string(INITIALIZE.name, "instance_name", instance_name)?;
			let settings = c_string(INITIALIZE.name, "settings", settings)?;
			let vt = self.vtable();
			// SAFETY: both strings outlive the call
			let status = unsafe {
				if config_id == 0 {
					(vt.init)(instance.as_ptr(), settings.as_ptr(), verbose_flag(verbose))
				} else {
					(vt.init_with_config_id)(instance.as_ptr(), settings.as_ptr(), config_id, verbose_flag(verbose))
				}
			};
			scope.check(status)
		})
	}

	pub fn reinitialize(&self, config_id: i64) -> Result<()> {
		let arguments = self.gateway.arguments().with("config_id", config_id);
		self.gateway.call(REINITIALIZE, arguments, |scope| {
			// SAFETY: plain integer argument
			scope.check(unsafe { (self.vtable().reinit)(config_id) })
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

	/// Benchmark datastore inserts for `seconds` seconds.
	pub fn check_datastore_performance(&self, seconds: i64) -> Result<String> {
		let arguments = self.gateway.arguments().with("seconds", seconds);
		self.gateway.call(CHECK_DATASTORE_PERFORMANCE, arguments, |scope| {
			scope.respond(|response| unsafe {
				(self.vtable().check_datastore_performance)(
					seconds,
					response.ptr_mut(),
					response.len_mut(),
					response.resize_fn(),
				)
			})
		})
	}

	pub fn get_datastore_info(&self) -> Result<String> {
		self.gateway.call(GET_DATASTORE_INFO, self.gateway.arguments(), |scope| {
			scope.respond(|response| unsafe {
				(self.vtable().get_datastore_info)(response.ptr_mut(), response.len_mut(), response.resize_fn())
			})
		})
	}

	pub fn get_feature(&self, feature_id: i64) -> Result<String> {
		let arguments = self.gateway.arguments().with("feature_id", feature_id);
		self.gateway.call(GET_FEATURE, arguments, |scope| {
			scope.respond(|response| unsafe {
				(self.vtable().get_feature)(feature_id, response.ptr_mut(), response.len_mut(), response.resize_fn())
			})
		})
	}

	/// Delete every record in the datastore.
	pub fn purge_repository(&self) -> Result<()> {
		self.gateway.call(PURGE_REPOSITORY, self.gateway.arguments(), |scope| {
			// SAFETY: no arguments
			scope.check(unsafe { (self.vtable().purge_repository)() })?;
			info!("repository purged");
			Ok(())
		})
	}
}
