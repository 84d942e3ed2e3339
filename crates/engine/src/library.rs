// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The native engine library: the function tables of every component,
//! resolved from a shared library or supplied in process.

use std::{ffi::OsStr, fmt::Debug, path::PathBuf};

use erbridge_abi::{
	ConfigMgrVTableFFI, ConfigVTableFFI, DiagnosticVTableFFI, EngineVTableFFI, ExceptionVTableFFI, NativeTablesFFI,
	ProductVTableFFI,
	symbol::{
		CLEAR_LAST_EXCEPTION, CONFIG_PREFIX, CONFIGMGR_PREFIX, DIAGNOSTIC_PREFIX, ENGINE_PREFIX,
		GET_LAST_EXCEPTION, GET_LAST_EXCEPTION_CODE, PRODUCT_PREFIX, symbol_name,
	},
};
use erbridge_type::{Error, Result};
use libloading::Library;
use tracing::{debug, info};

pub struct NativeLibrary {
	name: String,
	tables: NativeTablesFFI,
	// keeps the resolved function pointers valid
	_library: Option<Library>,
}

impl Debug for NativeLibrary {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NativeLibrary").field("name", &self.name).finish_non_exhaustive()
	}
}

impl NativeLibrary {
	/// Use function tables supplied in process.
	pub fn from_tables(name: impl Into<String>, tables: NativeTablesFFI) -> Self {
		Self {
			name: name.into(),
			tables,
			_library: None,
		}
	}

	/// Load the shared library at `path` and resolve every exported function.
	pub fn load(path: impl AsRef<OsStr>) -> Result<Self> {
		let path = path.as_ref();
		let name = PathBuf::from(path).display().to_string();
		debug!(library = %name, "loading native library");

		// SAFETY: loading runs the library's initializers; the engine library
		// is trusted by whoever configured its path
		let library = unsafe { Library::new(path) }.map_err(|e| Error::Library(format!("{name}: {e}")))?;
		let tables = resolve_tables(&library)?;

		info!(library = %name, "native library loaded");
		Ok(Self {
			name,
			tables,
			_library: Some(library),
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn tables(&self) -> &NativeTablesFFI {
		&self.tables
	}

	pub fn engine(&self) -> &EngineVTableFFI {
		&self.tables.engine
	}

	pub fn configmgr(&self) -> &ConfigMgrVTableFFI {
		&self.tables.configmgr
	}

	pub fn config(&self) -> &ConfigVTableFFI {
		&self.tables.config
	}

	pub fn product(&self) -> &ProductVTableFFI {
		&self.tables.product
	}

	pub fn diagnostic(&self) -> &DiagnosticVTableFFI {
		&self.tables.diagnostic
	}
}

/// Resolve `prefix` + `name` from `library` as a function pointer of type `T`.
fn resolve<T: Copy>(library: &Library, prefix: &str, name: &str) -> Result<T> {
	let symbol = symbol_name(prefix, name);
	// SAFETY: `T` is the `extern "C"` signature this symbol is exported with
	let resolved = unsafe { library.get::<T>(symbol.as_slice()) };
	resolved.map(|s| *s).map_err(|e| Error::Library(format!("{prefix}{name}: {e}")))
}

fn resolve_exception(library: &Library, prefix: &str) -> Result<ExceptionVTableFFI> {
	Ok(ExceptionVTableFFI {
		get_last_exception: resolve(library, prefix, GET_LAST_EXCEPTION)?,
		get_last_exception_code: resolve(library, prefix, GET_LAST_EXCEPTION_CODE)?,
		clear_last_exception: resolve(library, prefix, CLEAR_LAST_EXCEPTION)?,
	})
}

fn resolve_tables(library: &Library) -> Result<NativeTablesFFI> {
	let p = ENGINE_PREFIX;
	let engine = EngineVTableFFI {
		exception: resolve_exception(library, p)?,
		init: resolve(library, p, "init")?,
		init_with_config_id: resolve(library, p, "initWithConfigID")?,
		reinit: resolve(library, p, "reinit")?,
		destroy: resolve(library, p, "destroy")?,
		prime_engine: resolve(library, p, "primeEngine")?,
		get_active_config_id: resolve(library, p, "getActiveConfigID")?,
		add_record: resolve(library, p, "addRecord")?,
		delete_record: resolve(library, p, "deleteRecord")?,
		get_record: resolve(library, p, "getRecord")?,
		get_entity_by_entity_id: resolve(library, p, "getEntityByEntityID")?,
		get_entity_by_record_id: resolve(library, p, "getEntityByRecordID")?,
		search_by_attributes: resolve(library, p, "searchByAttributes")?,
		get_stats: resolve(library, p, "getStats")?,
		count_redo_records: resolve(library, p, "countRedoRecords")?,
		get_redo_record: resolve(library, p, "getRedoRecord")?,
		process_redo_record: resolve(library, p, "processRedoRecord")?,
		export_json_entity_report: resolve(library, p, "exportJSONEntityReport")?,
		export_csv_entity_report: resolve(library, p, "exportCSVEntityReport")?,
		fetch_next: resolve(library, p, "fetchNext")?,
		close_export: resolve(library, p, "closeExport")?,
	};

	let p = CONFIGMGR_PREFIX;
	let configmgr = ConfigMgrVTableFFI {
		exception: resolve_exception(library, p)?,
		init: resolve(library, p, "init")?,
		destroy: resolve(library, p, "destroy")?,
		add_config: resolve(library, p, "addConfig")?,
		get_config: resolve(library, p, "getConfig")?,
		get_config_list: resolve(library, p, "getConfigList")?,
		get_default_config_id: resolve(library, p, "getDefaultConfigID")?,
		set_default_config_id: resolve(library, p, "setDefaultConfigID")?,
		replace_default_config_id: resolve(library, p, "replaceDefaultConfigID")?,
	};

	let p = CONFIG_PREFIX;
	let config = ConfigVTableFFI {
		exception: resolve_exception(library, p)?,
		init: resolve(library, p, "init")?,
		destroy: resolve(library, p, "destroy")?,
		create: resolve(library, p, "create")?,
		load: resolve(library, p, "load")?,
		save: resolve(library, p, "save")?,
		close: resolve(library, p, "close")?,
		list_data_sources: resolve(library, p, "listDataSources")?,
		add_data_source: resolve(library, p, "addDataSource")?,
		delete_data_source: resolve(library, p, "deleteDataSource")?,
	};

	let p = PRODUCT_PREFIX;
	let product = ProductVTableFFI {
		exception: resolve_exception(library, p)?,
		init: resolve(library, p, "init")?,
		destroy: resolve(library, p, "destroy")?,
		get_license: resolve(library, p, "license")?,
		get_version: resolve(library, p, "version")?,
	};

	let p = DIAGNOSTIC_PREFIX;
	let diagnostic = DiagnosticVTableFFI {
		exception: resolve_exception(library, p)?,
		init: resolve(library, p, "init")?,
		init_with_config_id: resolve(library, p, "initWithConfigID")?,
		reinit: resolve(library, p, "reinit")?,
		destroy: resolve(library, p, "destroy")?,
		check_datastore_performance: resolve(library, p, "checkDatastorePerformance")?,
		get_datastore_info: resolve(library, p, "getDatastoreInfo")?,
		get_feature: resolve(library, p, "getFeature")?,
		purge_repository: resolve(library, p, "purgeRepository")?,
	};

	Ok(NativeTablesFFI {
		engine,
		configmgr,
		config,
		product,
		diagnostic,
	})
}
