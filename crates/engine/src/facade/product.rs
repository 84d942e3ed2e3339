// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Product facade: version and license documents of the engine.

use std::{ffi::c_char, sync::Arc};

use erbridge_abi::ProductVTableFFI;
use erbridge_type::{Component, Result};

use super::{impl_observable, verbose_flag};
use crate::{
	call::{CallSettings, Gateway, Operation, Scope},
	library::NativeLibrary,
	native::{c_string, engine_owned_text},
};

const DESTROY: Operation = Operation::new("destroy", 8001);
const GET_LICENSE: Operation = Operation::new("get_license", 8002);
const GET_VERSION: Operation = Operation::new("get_version", 8003);
const INITIALIZE: Operation = Operation::new("initialize", 8004);

/// Status reported for a document call that returned null.
const NULL_DOCUMENT: i64 = -1;

pub struct Product {
	library: Arc<NativeLibrary>,
	gateway: Gateway,
}

impl_observable!(Product);

impl Product {
	pub fn new(library: Arc<NativeLibrary>, settings: CallSettings) -> Self {
		let gateway = Gateway::new(Component::Product, library.product().exception, settings);
		Self {
			library,
			gateway,
		}
	}

	fn vtable(&self) -> &ProductVTableFFI {
		self.library.product()
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

	pub fn get_license(&self) -> Result<String> {
		self.gateway.call(GET_LICENSE, self.gateway.arguments(), |scope| {
			// SAFETY: no arguments
			document(scope, unsafe { (self.vtable().get_license)() })
		})
	}

	pub fn get_version(&self) -> Result<String> {
		self.gateway.call(GET_VERSION, self.gateway.arguments(), |scope| {
			// SAFETY: no arguments
			document(scope, unsafe { (self.vtable().get_version)() })
		})
	}
}

/// Copy a document the engine keeps ownership of. Null is a failure.
fn document(scope: &Scope<'_>, ptr: *const c_char) -> Result<String> {
	if ptr.is_null() {
		return Err(scope.fail(NULL_DOCUMENT).into());
	}
	// SAFETY: non-null documents are NUL terminated and live as long as the engine
	Ok(unsafe { engine_owned_text(ptr) })
}
