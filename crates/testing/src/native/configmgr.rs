// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ffi::c_char;

use erbridge_abi::{ConfigMgrVTableFFI, ResizeBufferFn, StatusFFI};
use erbridge_type::Component;
use serde_json::{Value, json};

use super::{Failure, exception, read_str, respond, status, write_out};

const CONFIGMGR: Component = Component::ConfigMgr;

unsafe extern "C" fn init<const S: usize>(instance: *const c_char, settings: *const c_char, _verbose: i64) -> StatusFFI {
	let args = unsafe { (read_str(instance), read_str(settings)) };
	status::<S>(CONFIGMGR, "init", |world| {
		args.0?;
		args.1?;
		world.start(CONFIGMGR);
		Ok(())
	})
}

unsafe extern "C" fn destroy<const S: usize>() -> StatusFFI {
	status::<S>(CONFIGMGR, "destroy", |world| world.stop(CONFIGMGR))
}

unsafe extern "C" fn add_config<const S: usize>(
	definition: *const c_char,
	comment: *const c_char,
	config_id: *mut i64,
) -> StatusFFI {
	let args = unsafe { (read_str(definition), read_str(comment)) };
	status::<S>(CONFIGMGR, "add_config", |world| {
		world.require(CONFIGMGR)?;
		let (definition, comment) = (args.0?, args.1?);
		serde_json::from_str::<Value>(&definition)
			.map_err(|_| Failure::new(2, "0002E|Invalid configuration definition"))?;
		let id = world.add_config(definition, comment);
		unsafe { write_out(config_id, id) }
	})
}

unsafe extern "C" fn get_config<const S: usize>(
	config_id: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(CONFIGMGR, "get_config", response, response_len, resize, |world| {
			world.require(CONFIGMGR)?;
			let config = world.configs.get(&config_id).ok_or_else(|| Failure::unknown_config(config_id))?;
			Ok(Some(config.definition.clone()))
		})
	}
}

unsafe extern "C" fn get_config_list<const S: usize>(
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(CONFIGMGR, "get_config_list", response, response_len, resize, |world| {
			world.require(CONFIGMGR)?;
			let configs: Vec<Value> = world
				.configs
				.iter()
				.map(|(id, config)| json!({"CONFIG_ID": id, "CONFIG_COMMENT": config.comment}))
				.collect();
			Ok(Some(json!({ "CONFIGS": configs }).to_string()))
		})
	}
}

unsafe extern "C" fn get_default_config_id<const S: usize>(config_id: *mut i64) -> StatusFFI {
	status::<S>(CONFIGMGR, "get_default_config_id", |world| {
		world.require(CONFIGMGR)?;
		unsafe { write_out(config_id, world.default_config_id) }
	})
}

unsafe extern "C" fn set_default_config_id<const S: usize>(config_id: i64) -> StatusFFI {
	status::<S>(CONFIGMGR, "set_default_config_id", |world| {
		world.require(CONFIGMGR)?;
		if !world.configs.contains_key(&config_id) {
			return Err(Failure::unknown_config(config_id));
		}
		world.default_config_id = config_id;
		Ok(())
	})
}

unsafe extern "C" fn replace_default_config_id<const S: usize>(current: i64, replacement: i64) -> StatusFFI {
	status::<S>(CONFIGMGR, "replace_default_config_id", |world| {
		world.require(CONFIGMGR)?;
		if !world.configs.contains_key(&replacement) {
			return Err(Failure::unknown_config(replacement));
		}
		if world.default_config_id != current {
			return Err(Failure::new(
				7245,
				format!("7245E|Current configuration ID does not match specified data [{current}]"),
			));
		}
		world.default_config_id = replacement;
		Ok(())
	})
}

pub(crate) fn vtable<const S: usize>() -> ConfigMgrVTableFFI {
	ConfigMgrVTableFFI {
		exception: exception::vtable::<S, { exception::CONFIGMGR }>(),
		init: init::<S>,
		destroy: destroy::<S>,
		add_config: add_config::<S>,
		get_config: get_config::<S>,
		get_config_list: get_config_list::<S>,
		get_default_config_id: get_default_config_id::<S>,
		set_default_config_id: set_default_config_id::<S>,
		replace_default_config_id: replace_default_config_id::<S>,
	}
}
