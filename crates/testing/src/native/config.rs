// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ffi::c_char;

use erbridge_abi::{ConfigVTableFFI, HandleFFI, ResizeBufferFn, StatusFFI};
use erbridge_type::Component;
use serde_json::{Value, json};

use super::{
	Failure, SimResult, exception, read_str, respond, status,
	world::{TEMPLATE_DATA_SOURCES, World, document_json, parse_document},
	write_out,
};

const CONFIG: Component = Component::Config;

unsafe extern "C" fn init<const S: usize>(instance: *const c_char, settings: *const c_char, _verbose: i64) -> StatusFFI {
	let args = unsafe { (read_str(instance), read_str(settings)) };
	status::<S>(CONFIG, "init", |world| {
		args.0?;
		args.1?;
		world.start(CONFIG);
		Ok(())
	})
}

unsafe extern "C" fn destroy<const S: usize>() -> StatusFFI {
	status::<S>(CONFIG, "destroy", |world| {
		world.stop(CONFIG)?;
		world.documents.clear();
		Ok(())
	})
}

unsafe extern "C" fn create<const S: usize>(handle: *mut HandleFFI) -> StatusFFI {
	status::<S>(CONFIG, "create", |world| {
		world.require(CONFIG)?;
		let native = world.next_handle();
		unsafe { write_out(handle, native)? };
		world.documents.insert(native, TEMPLATE_DATA_SOURCES.map(str::to_string).to_vec());
		Ok(())
	})
}

unsafe extern "C" fn load<const S: usize>(definition: *const c_char, handle: *mut HandleFFI) -> StatusFFI {
	let definition = unsafe { read_str(definition) };
	status::<S>(CONFIG, "load", |world| {
		world.require(CONFIG)?;
		let data_sources = parse_document(&definition?)?;
		let native = world.next_handle();
		unsafe { write_out(handle, native)? };
		world.documents.insert(native, data_sources);
		Ok(())
	})
}

unsafe extern "C" fn save<const S: usize>(
	handle: HandleFFI,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(CONFIG, "save", response, response_len, resize, |world| {
			let document = document(world, handle)?;
			Ok(Some(document_json(document)))
		})
	}
}

unsafe extern "C" fn close<const S: usize>(handle: HandleFFI) -> StatusFFI {
	status::<S>(CONFIG, "close", |world| {
		world.require(CONFIG)?;
		world.documents.remove(&handle).map(|_| ()).ok_or_else(|| Failure::invalid_handle(handle))
	})
}

unsafe extern "C" fn list_data_sources<const S: usize>(
	handle: HandleFFI,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(CONFIG, "list_data_sources", response, response_len, resize, |world| {
			let sources: Vec<Value> = document(world, handle)?
				.iter()
				.enumerate()
				.map(|(idx, code)| json!({"DSRC_ID": idx + 1, "DSRC_CODE": code}))
				.collect();
			Ok(Some(json!({ "DATA_SOURCES": sources }).to_string()))
		})
	}
}

unsafe extern "C" fn add_data_source<const S: usize>(
	handle: HandleFFI,
	data_source_code: *const c_char,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	let code = unsafe { read_str(data_source_code) };
	unsafe {
		respond::<S>(CONFIG, "add_data_source", response, response_len, resize, |world| {
			let code = code?.trim().to_uppercase();
			if code.is_empty() {
				return Err(Failure::invalid_parameters());
			}
			let document = document_mut(world, handle)?;
			if document.contains(&code) {
				return Err(Failure::new(7232, format!("7232E|Data source code [{code}] already exists")));
			}
			document.push(code);
			Ok(Some(json!({ "DSRC_ID": document.len() }).to_string()))
		})
	}
}

unsafe extern "C" fn delete_data_source<const S: usize>(handle: HandleFFI, data_source_code: *const c_char) -> StatusFFI {
	let code = unsafe { read_str(data_source_code) };
	status::<S>(CONFIG, "delete_data_source", |world| {
		let code = code?.trim().to_uppercase();
		let document = document_mut(world, handle)?;
		let idx = document
			.iter()
			.position(|c| *c == code)
			.ok_or_else(|| Failure::new(27, format!("0027E|Unknown data source '{code}'")))?;
		document.remove(idx);
		Ok(())
	})
}

fn document(world: &World, handle: HandleFFI) -> SimResult<&Vec<String>> {
	world.require(CONFIG)?;
	world.documents.get(&handle).ok_or_else(|| Failure::invalid_handle(handle))
}

fn document_mut(world: &mut World, handle: HandleFFI) -> SimResult<&mut Vec<String>> {
	world.require(CONFIG)?;
	world.documents.get_mut(&handle).ok_or_else(|| Failure::invalid_handle(handle))
}

pub(crate) fn vtable<const S: usize>() -> ConfigVTableFFI {
	ConfigVTableFFI {
		exception: exception::vtable::<S, { exception::CONFIG }>(),
		init: init::<S>,
		destroy: destroy::<S>,
		create: create::<S>,
		load: load::<S>,
		save: save::<S>,
		close: close::<S>,
		list_data_sources: list_data_sources::<S>,
		add_data_source: add_data_source::<S>,
		delete_data_source: delete_data_source::<S>,
	}
}
