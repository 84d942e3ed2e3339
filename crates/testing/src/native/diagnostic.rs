// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ffi::c_char;

use erbridge_abi::{DiagnosticVTableFFI, ResizeBufferFn, StatusFFI};
use erbridge_type::Component;
use serde_json::json;

use super::{Failure, exception, read_str, respond, status};

const DIAGNOSTIC: Component = Component::Diagnostic;

unsafe extern "C" fn init<const S: usize>(instance: *const c_char, settings: *const c_char, verbose: i64) -> StatusFFI {
	unsafe { init_with_config_id::<S>(instance, settings, 0, verbose) }
}

unsafe extern "C" fn init_with_config_id<const S: usize>(
	instance: *const c_char,
	settings: *const c_char,
	config_id: i64,
	_verbose: i64,
) -> StatusFFI {
	let args = unsafe { (read_str(instance), read_str(settings)) };
	status::<S>(DIAGNOSTIC, "init", |world| {
		args.0?;
		args.1?;
		world.resolve_config(config_id)?;
		world.start(DIAGNOSTIC);
		Ok(())
	})
}

unsafe extern "C" fn reinit<const S: usize>(config_id: i64) -> StatusFFI {
	status::<S>(DIAGNOSTIC, "reinit", |world| {
		world.require(DIAGNOSTIC)?;
		if !world.configs.contains_key(&config_id) {
			return Err(Failure::unknown_config(config_id));
		}
		Ok(())
	})
}

unsafe extern "C" fn destroy<const S: usize>() -> StatusFFI {
	status::<S>(DIAGNOSTIC, "destroy", |world| world.stop(DIAGNOSTIC))
}

unsafe extern "C" fn check_datastore_performance<const S: usize>(
	seconds_to_run: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(DIAGNOSTIC, "check_datastore_performance", response, response_len, resize, |world| {
			world.require(DIAGNOSTIC)?;
			if seconds_to_run < 0 {
				return Err(Failure::invalid_parameters());
			}
			Ok(Some(json!({
				"numRecordsInserted": seconds_to_run * 1000,
				"insertTime": seconds_to_run * 1000,
			})
			.to_string()))
		})
	}
}

unsafe extern "C" fn get_datastore_info<const S: usize>(
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(DIAGNOSTIC, "get_datastore_info", response, response_len, resize, |world| {
			world.require(DIAGNOSTIC)?;
			Ok(Some(json!({
				"dataStores": [{"id": "CORE", "type": "simulated", "location": "memory"}]
			})
			.to_string()))
		})
	}
}

unsafe extern "C" fn get_feature<const S: usize>(
	feature_id: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(DIAGNOSTIC, "get_feature", response, response_len, resize, |world| {
			world.require(DIAGNOSTIC)?;
			if feature_id <= 0 {
				return Err(Failure::new(57, format!("0057E|Unknown feature ID [{feature_id}]")));
			}
			Ok(Some(json!({"LIB_FEAT_ID": feature_id, "FTYPE_CODE": "NAME", "ELEMENTS": []}).to_string()))
		})
	}
}

unsafe extern "C" fn purge_repository<const S: usize>() -> StatusFFI {
	status::<S>(DIAGNOSTIC, "purge_repository", |world| {
		world.require(DIAGNOSTIC)?;
		world.records.clear();
		world.redo.clear();
		Ok(())
	})
}

pub(crate) fn vtable<const S: usize>() -> DiagnosticVTableFFI {
	DiagnosticVTableFFI {
		exception: exception::vtable::<S, { exception::DIAGNOSTIC }>(),
		init: init::<S>,
		init_with_config_id: init_with_config_id::<S>,
		reinit: reinit::<S>,
		destroy: destroy::<S>,
		check_datastore_performance: check_datastore_performance::<S>,
		get_datastore_info: get_datastore_info::<S>,
		get_feature: get_feature::<S>,
		purge_repository: purge_repository::<S>,
	}
}
