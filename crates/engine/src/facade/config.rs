// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! In-memory configuration documents. Each document opened through
//! [`Config::create_config`] or [`Config::import_config`] is addressed by a
//! [`ConfigHandle`] until it is closed.

use std::sync::Arc;

use erbridge_abi::{ConfigVTableFFI, HandleFFI};
use erbridge_type::{Component, ConfigHandle, Error, HandleKind, Result};

use super::{impl_observable, verbose_flag};
use crate::{
	call::{CallSettings, Gateway, Operation, Scope},
	handle::{Entry, HandleRegistry},
	library::NativeLibrary,
	native::c_string,
};

const ADD_DATA_SOURCE: Operation = Operation::new("add_data_source", 8001);
const CLOSE_CONFIG: Operation = Operation::new("close_config", 8002);
const CREATE_CONFIG: Operation = Operation::new("create_config", 8003);
const DELETE_DATA_SOURCE: Operation = Operation::new("delete_data_source", 8004);
const DESTROY: Operation = Operation::new("destroy", 8005);
const EXPORT_CONFIG: Operation = Operation::new("export_config", 8006);
const INITIALIZE: Operation = Operation::new("initialize", 8007);
const GET_DATA_SOURCES: Operation = Operation::new("get_data_sources", 8008);
const IMPORT_CONFIG: Operation = Operation::new("import_config", 8009);

pub struct Config {
	library: Arc<NativeLibrary>,
	gateway: Gateway,
	documents: HandleRegistry<()>,
}

impl_observable!(Config);

impl Config {
	pub fn new(library: Arc<NativeLibrary>, settings: CallSettings) -> Self {
		let gateway = Gateway::new(Component::Config, library.config().exception, settings);
		Self {
			library,
			gateway,
			documents: HandleRegistry::new(),
		}
	}

	fn vtable(&self) -> &ConfigVTableFFI {
		self.library.config()
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

	/// Close every open document, then release the component.
	pub fn destroy(&self) -> Result<()> {
		self.gateway.call(DESTROY, self.gateway.arguments(), |scope| {
			for native in self.documents.drain() {
				// SAFETY: drained handles were open and are no longer reachable
				if unsafe { (self.vtable().close)(native) } != 0 {
					scope.discard();
				}
			}
			// SAFETY: no arguments
			scope.check(unsafe { (self.vtable().destroy)() })
		})?;
		self.gateway.mark_destroyed();
		Ok(())
	}

	/// Open a new document from the engine's template.
	pub fn create_config(&self) -> Result<ConfigHandle> {
		self.gateway.call(CREATE_CONFIG, self.gateway.arguments(), |scope| {
			let mut native: HandleFFI = 0;
			// SAFETY: out pointer to a live local
			scope.check(unsafe { (self.vtable().create)(&mut native) })?;
			Ok(ConfigHandle(self.documents.insert(native, ())))
		})
	}

	/// Open a document from its JSON definition.
	pub fn import_config(&self, definition: &str) -> Result<ConfigHandle> {
		let arguments = self.gateway.arguments().with("definition", definition);
		self.gateway.call(IMPORT_CONFIG, arguments, |scope| {
			let definition = c_string(IMPORT_CONFIG.name, "definition", definition)?;
			let mut native: HandleFFI = 0;
			// SAFETY: the definition outlives the call, out pointer to a live local
			scope.check(unsafe { (self.vtable().load)(definition.as_ptr(), &mut native) })?;
			Ok(ConfigHandle(self.documents.insert(native, ())))
		})
	}

	/// Serialize an open document.
	pub fn export_config(&self, handle: ConfigHandle) -> Result<String> {
		let arguments = self.gateway.arguments().with("handle", handle);
		self.gateway.call(EXPORT_CONFIG, arguments, |scope| {
			self.with_open(scope, handle, |entry| {
				scope.respond(|response| unsafe {
					(self.vtable().save)(entry.native, response.ptr_mut(), response.len_mut(), response.resize_fn())
				})
			})
		})
	}

	pub fn get_data_sources(&self, handle: ConfigHandle) -> Result<String> {
		let arguments = self.gateway.arguments().with("handle", handle);
		self.gateway.call(GET_DATA_SOURCES, arguments, |scope| {
			self.with_open(scope, handle, |entry| {
				scope.respond(|response| unsafe {
					(self.vtable().list_data_sources)(
						entry.native,
						response.ptr_mut(),
						response.len_mut(),
						response.resize_fn(),
					)
				})
			})
		})
	}

	pub fn add_data_source(&self, handle: ConfigHandle, data_source_code: &str) -> Result<String> {
		let arguments = self.gateway.arguments().with("handle", handle).with("data_source", data_source_code);
		self.gateway.call(ADD_DATA_SOURCE, arguments, |scope| {
			let code = c_string(ADD_DATA_SOURCE.name, "data_source", data_source_code)?;
			self.with_open(scope, handle, |entry| {
				scope.respond(|response| unsafe {
					(self.vtable().add_data_source)(
						entry.native,
						code.as_ptr(),
						response.ptr_mut(),
						response.len_mut(),
						response.resize_fn(),
					)
				})
			})
		})
	}

	pub fn delete_data_source(&self, handle: ConfigHandle, data_source_code: &str) -> Result<()> {
		let arguments = self.gateway.arguments().with("handle", handle).with("data_source", data_source_code);
		self.gateway.call(DELETE_DATA_SOURCE, arguments, |scope| {
			let code = c_string(DELETE_DATA_SOURCE.name, "data_source", data_source_code)?;
			self.with_open(scope, handle, |entry| {
				// SAFETY: the document is open and its entry lock is held
				scope.check(unsafe { (self.vtable().delete_data_source)(entry.native, code.as_ptr()) })
			})
		})
	}

	/// Release an open document. A failing native close leaves it open.
	pub fn close_config(&self, handle: ConfigHandle) -> Result<()> {
		let arguments = self.gateway.arguments().with("handle", handle);
		self.gateway.call(CLOSE_CONFIG, arguments, |scope| {
			self.with_open(scope, handle, |entry| {
				// SAFETY: the document is open and its entry lock is held
				scope.check(unsafe { (self.vtable().close)(entry.native) })?;
				entry.closed = true;
				Ok(())
			})?;
			self.documents.remove(handle.0);
			Ok(())
		})
	}

	/// Documents opened and not yet closed.
	pub fn open_configs(&self) -> usize {
		self.documents.len()
	}

	/// Run `f` on an open document while holding its entry lock.
	fn with_open<T>(
		&self,
		scope: &Scope<'_>,
		handle: ConfigHandle,
		f: impl FnOnce(&mut Entry<()>) -> Result<T>,
	) -> Result<T> {
		let shared = self.documents.get(handle.0).ok_or_else(|| invalid(handle, scope.operation()))?;
		let mut entry = shared.lock();
		if entry.closed {
			return Err(invalid(handle, scope.operation()));
		}
		f(&mut entry)
	}
}

fn invalid(handle: ConfigHandle, operation: &'static str) -> Error {
	Error::InvalidHandleUsage {
		kind: HandleKind::Config,
		handle: handle.0,
		operation,
	}
}
