// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Entity resolution engine facade.

use std::sync::Arc;

use erbridge_abi::{EngineVTableFFI, HandleFFI};
use erbridge_type::{Component, ExportHandle, Result};
use tracing::warn;

use super::{impl_observable, verbose_flag};
use crate::{
	call::{CallSettings, Gateway, Operation},
	cursor::CursorManager,
	library::NativeLibrary,
	native::c_string,
};

const ADD_RECORD: Operation = Operation::new("add_record", 8001);
const CLOSE_EXPORT_REPORT: Operation = Operation::new("close_export_report", 8002);
const COUNT_REDO_RECORDS: Operation = Operation::new("count_redo_records", 8003);
const DELETE_RECORD: Operation = Operation::new("delete_record", 8004);
const DESTROY: Operation = Operation::new("destroy", 8005);
const EXPORT_CSV_ENTITY_REPORT: Operation = Operation::new("export_csv_entity_report", 8006);
const EXPORT_JSON_ENTITY_REPORT: Operation = Operation::new("export_json_entity_report", 8008);
const FETCH_NEXT: Operation = Operation::new("fetch_next", 8010);
const GET_ACTIVE_CONFIG_ID: Operation = Operation::new("get_active_config_id", 8017);
const GET_ENTITY_BY_ENTITY_ID: Operation = Operation::new("get_entity_by_entity_id", 8018);
const GET_ENTITY_BY_RECORD_ID: Operation = Operation::new("get_entity_by_record_id", 8019);
const GET_RECORD: Operation = Operation::new("get_record", 8020);
const GET_REDO_RECORD: Operation = Operation::new("get_redo_record", 8021);
const GET_STATS: Operation = Operation::new("get_stats", 8022);
const INITIALIZE: Operation = Operation::new("initialize", 8025);
const PRIME_ENGINE: Operation = Operation::new("prime_engine", 8026);
const PROCESS_REDO_RECORD: Operation = Operation::new("process_redo_record", 8027);
const REINITIALIZE: Operation = Operation::new("reinitialize", 8030);
const SEARCH_BY_ATTRIBUTES: Operation = Operation::new("search_by_attributes", 8031);

pub struct Engine {
	library: Arc<NativeLibrary>,
	gateway: Gateway,
	cursors: CursorManager,
}

impl_observable!(Engine);

impl Engine {
	pub fn new(library: Arc<NativeLibrary>, settings: CallSettings) -> Self {
		let gateway = Gateway::new(Component::Engine, library.engine().exception, settings);
		Self {
			library,
			gateway,
			cursors: CursorManager::new(),
		}
	}

	fn vtable(&self) -> &EngineVTableFFI {
		self.library.engine()
	}

	/// Initialize the engine. A `config_id` of zero starts it with the
	/// registered default configuration.
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

	/// Close every export still open and release the engine. Afterwards every
	/// method fails with `Destroyed`.
	pub fn destroy(&self) -> Result<()> {
		self.gateway.call(DESTROY, self.gateway.arguments(), |scope| {
			self.cursors.close_all(scope, self.vtable());
			// SAFETY: no arguments
			scope.check(unsafe { (self.vtable().destroy)() })
		})?;
		self.gateway.mark_destroyed();
		Ok(())
	}

	pub fn prime_engine(&self) -> Result<()> {
		self.gateway.call(PRIME_ENGINE, self.gateway.arguments(), |scope| {
			// SAFETY: no arguments
			scope.check(unsafe { (self.vtable().prime_engine)() })
		})
	}

	pub fn get_active_config_id(&self) -> Result<i64> {
		self.gateway.call(GET_ACTIVE_CONFIG_ID, self.gateway.arguments(), |scope| {
			let mut config_id = 0i64;
			// SAFETY: out pointer to a live local
			scope.check(unsafe { (self.vtable().get_active_config_id)(&mut config_id) })?;
			Ok(config_id)
		})
	}

	/// Add or replace a record. The response is empty unless `flags` asks
	/// for the affected entities with `WITH_INFO`.
	pub fn add_record(&self, data_source: &str, record_id: &str, definition: &str, flags: i64) -> Result<String> {
		let arguments = self
			.gateway
			.arguments()
			.with("data_source", data_source)
			.with("record_id", record_id)
			.with("definition", definition)
			.with("flags", flags);
		self.gateway.call(ADD_RECORD, arguments, |scope| {
			let data_source = c_string(ADD_RECORD.name, "data_source", data_source)?;
			let record_id = c_string(ADD_RECORD.name, "record_id", record_id)?;
			let definition = c_string(ADD_RECORD.name, "definition", definition)?;
			scope.respond(|response| unsafe {
				(self.vtable().add_record)(
					data_source.as_ptr(),
					record_id.as_ptr(),
					definition.as_ptr(),
					flags,
					response.ptr_mut(),
					response.len_mut(),
					response.resize_fn(),
				)
			})
		})
	}

	pub fn delete_record(&self, data_source: &str, record_id: &str, flags: i64) -> Result<String> {
		let arguments = self
			.gateway
			.arguments()
			.with("data_source", data_source)
			.with("record_id", record_id)
			.with("flags", flags);
		self.gateway.call(DELETE_RECORD, arguments, |scope| {
			let data_source = c_string(DELETE_RECORD.name, "data_source", data_source)?;
			let record_id = c_string(DELETE_RECORD.name, "record_id", record_id)?;
			scope.respond(|response| unsafe {
				(self.vtable().delete_record)(
					data_source.as_ptr(),
					record_id.as_ptr(),
					flags,
					response.ptr_mut(),
					response.len_mut(),
					response.resize_fn(),
				)
			})
		})
	}

	pub fn get_record(&self, data_source: &str, record_id: &str, flags: i64) -> Result<String> {
		let arguments = self
			.gateway
			.arguments()
			.with("data_source", data_source)
			.with("record_id", record_id)
			.with("flags", flags);
		self.gateway.call(GET_RECORD, arguments, |scope| {
			let data_source = c_string(GET_RECORD.name, "data_source", data_source)?;
			let record_id = c_string(GET_RECORD.name, "record_id", record_id)?;
			scope.respond(|response| unsafe {
				(self.vtable().get_record)(
					data_source.as_ptr(),
					record_id.as_ptr(),
					flags,
					response.ptr_mut(),
					response.len_mut(),
					response.resize_fn(),
				)
			})
		})
	}

	pub fn get_entity_by_entity_id(&self, entity_id: i64, flags: i64) -> Result<String> {
		let arguments = self.gateway.arguments().with("entity_id", entity_id).with("flags", flags);
		self.gateway.call(GET_ENTITY_BY_ENTITY_ID, arguments, |scope| {
			scope.respond(|response| unsafe {
				(self.vtable().get_entity_by_entity_id)(
					entity_id,
					flags,
					response.ptr_mut(),
					response.len_mut(),
					response.resize_fn(),
				)
			})
		})
	}

	pub fn get_entity_by_record_id(&self, data_source: &str, record_id: &str, flags: i64) -> Result<String> {
		let arguments = self
			.gateway
			.arguments()
			.with("data_source", data_source)
			.with("record_id", record_id)
			.with("flags", flags);
		self.gateway.call(GET_ENTITY_BY_RECORD_ID, arguments, |scope| {
			let data_source = c_string(GET_ENTITY_BY_RECORD_ID.name, "data_source", data_source)?;
			let record_id = c_string(GET_ENTITY_BY_RECORD_ID.name, "record_id", record_id)?;
			scope.respond(|response| unsafe {
				(self.vtable().get_entity_by_record_id)(
					data_source.as_ptr(),
					record_id.as_ptr(),
					flags,
					response.ptr_mut(),
					response.len_mut(),
					response.resize_fn(),
				)
			})
		})
	}

	pub fn search_by_attributes(&self, attributes: &str, search_profile: &str, flags: i64) -> Result<String> {
		let arguments = self
			.gateway
			.arguments()
			.with("attributes", attributes)
			.with("search_profile", search_profile)
			.with("flags", flags);
		self.gateway.call(SEARCH_BY_ATTRIBUTES, arguments, |scope| {
			let attributes = c_string(SEARCH_BY_ATTRIBUTES.name, "attributes", attributes)?;
			let search_profile = c_string(SEARCH_BY_ATTRIBUTES.name, "search_profile", search_profile)?;
			scope.respond(|response| unsafe {
				(self.vtable().search_by_attributes)(
					attributes.as_ptr(),
					search_profile.as_ptr(),
					flags,
					response.ptr_mut(),
					response.len_mut(),
					response.resize_fn(),
				)
			})
		})
	}

	pub fn get_stats(&self) -> Result<String> {
		self.gateway.call(GET_STATS, self.gateway.arguments(), |scope| {
			scope.respond(|response| unsafe {
				(self.vtable().get_stats)(response.ptr_mut(), response.len_mut(), response.resize_fn())
			})
		})
	}

	pub fn count_redo_records(&self) -> Result<i64> {
		self.gateway.call(COUNT_REDO_RECORDS, self.gateway.arguments(), |scope| {
			// SAFETY: no arguments
			let count = unsafe { (self.vtable().count_redo_records)() };
			if count < 0 {
				return Err(scope.fail(count).into());
			}
			Ok(count)
		})
	}

	/// Next pending redo record, empty when there is none.
	pub fn get_redo_record(&self) -> Result<String> {
		self.gateway.call(GET_REDO_RECORD, self.gateway.arguments(), |scope| {
			scope.respond(|response| unsafe {
				(self.vtable().get_redo_record)(response.ptr_mut(), response.len_mut(), response.resize_fn())
			})
		})
	}

	pub fn process_redo_record(&self, redo_record: &str, flags: i64) -> Result<String> {
		let arguments = self.gateway.arguments().with("redo_record", redo_record).with("flags", flags);
		self.gateway.call(PROCESS_REDO_RECORD, arguments, |scope| {
			let redo_record = c_string(PROCESS_REDO_RECORD.name, "redo_record", redo_record)?;
			scope.respond(|response| unsafe {
				(self.vtable().process_redo_record)(
					redo_record.as_ptr(),
					flags,
					response.ptr_mut(),
					response.len_mut(),
					response.resize_fn(),
				)
			})
		})
	}

	/// Open a JSON export of every entity. Stream it with
	/// [`fetch_next`](Self::fetch_next) and release it with
	/// [`close_export_report`](Self::close_export_report).
	pub fn export_json_entity_report(&self, flags: i64) -> Result<ExportHandle> {
		let arguments = self.gateway.arguments().with("flags", flags);
		self.gateway.call(EXPORT_JSON_ENTITY_REPORT, arguments, |scope| {
			let mut native: HandleFFI = 0;
			// SAFETY: out pointer to a live local
			scope.check(unsafe { (self.vtable().export_json_entity_report)(flags, &mut native) })?;
			Ok(self.cursors.register(native))
		})
	}

	/// Open a CSV export with the given comma separated columns; `*` selects
	/// the engine's default columns.
	pub fn export_csv_entity_report(&self, columns: &str, flags: i64) -> Result<ExportHandle> {
		let arguments = self.gateway.arguments().with("columns", columns).with("flags", flags);
		self.gateway.call(EXPORT_CSV_ENTITY_REPORT, arguments, |scope| {
			let columns = c_string(EXPORT_CSV_ENTITY_REPORT.name, "columns", columns)?;
			let mut native: HandleFFI = 0;
			// SAFETY: the column list outlives the call, out pointer to a live local
			scope.check(unsafe { (self.vtable().export_csv_entity_report)(columns.as_ptr(), flags, &mut native) })?;
			Ok(self.cursors.register(native))
		})
	}

	/// Next chunk of an open export. `None` once the export is exhausted,
	/// on this and every later call until the export is closed.
	pub fn fetch_next(&self, handle: ExportHandle) -> Result<Option<String>> {
		let arguments = self.gateway.arguments().with("handle", handle);
		self.gateway.call(FETCH_NEXT, arguments, |scope| self.cursors.fetch_next(scope, self.vtable(), handle))
	}

	/// Close an open export. Closing it again, or closing a handle that was
	/// never opened, is `InvalidHandleUsage`.
	pub fn close_export_report(&self, handle: ExportHandle) -> Result<()> {
		let arguments = self.gateway.arguments().with("handle", handle);
		self.gateway.call(CLOSE_EXPORT_REPORT, arguments, |scope| self.cursors.close(scope, self.vtable(), handle))
	}

	/// Stream a JSON export, closing it when the iterator is exhausted or
	/// dropped.
	pub fn export_json_entity_report_iter(&self, flags: i64) -> Result<ExportIterator<'_>> {
		let handle = self.export_json_entity_report(flags)?;
		Ok(ExportIterator::new(self, handle))
	}

	/// Stream a CSV export, closing it when the iterator is exhausted or
	/// dropped.
	pub fn export_csv_entity_report_iter(&self, columns: &str, flags: i64) -> Result<ExportIterator<'_>> {
		let handle = self.export_csv_entity_report(columns, flags)?;
		Ok(ExportIterator::new(self, handle))
	}

	/// Exports opened and not yet closed.
	pub fn open_exports(&self) -> usize {
		self.cursors.open_count()
	}
}

/// Chunks of one export. Yields an error at most once, after which it is
/// finished.
pub struct ExportIterator<'a> {
	engine: &'a Engine,
	handle: Option<ExportHandle>,
}

impl<'a> ExportIterator<'a> {
	fn new(engine: &'a Engine, handle: ExportHandle) -> Self {
		Self {
			engine,
			handle: Some(handle),
		}
	}

	pub fn handle(&self) -> Option<ExportHandle> {
		self.handle
	}
}

impl Iterator for ExportIterator<'_> {
	type Item = Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		let handle = self.handle?;
		match self.engine.fetch_next(handle) {
			Ok(Some(chunk)) => Some(Ok(chunk)),
			Ok(None) => {
				self.handle = None;
				self.engine.close_export_report(handle).err().map(Err)
			}
			Err(err) => {
				self.handle = None;
				if let Err(close) = self.engine.close_export_report(handle) {
					warn!(%handle, error = %close, "failed to close export after fetch error");
				}
				Some(Err(err))
			}
		}
	}
}

impl Drop for ExportIterator<'_> {
	fn drop(&mut self) {
		if let Some(handle) = self.handle.take() {
			if let Err(err) = self.engine.close_export_report(handle) {
				warn!(%handle, error = %err, "failed to close abandoned export");
			}
		}
	}
}
