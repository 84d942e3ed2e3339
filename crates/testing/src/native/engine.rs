// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::VecDeque, ffi::c_char};

use erbridge_abi::{EngineVTableFFI, HandleFFI, ResizeBufferFn, StatusFFI, constants::WITH_INFO};
use erbridge_type::Component;
use serde_json::{Value, json};

use super::{
	FAILURE_STATUS, Failure, SimResult, exception, read_str, respond, run, status,
	world::{Record, World, entity_json, with_info},
	write_out, write_response,
};

const ENGINE: Component = Component::Engine;

const DEFAULT_CSV_COLUMNS: [&str; 3] = ["RESOLVED_ENTITY_ID", "DATA_SOURCE", "RECORD_ID"];

unsafe extern "C" fn init<const S: usize>(instance: *const c_char, settings: *const c_char, verbose: i64) -> StatusFFI {
	unsafe { init_with_config_id::<S>(instance, settings, 0, verbose) }
}

unsafe extern "C" fn init_with_config_id<const S: usize>(
	instance: *const c_char,
	settings: *const c_char,
	config_id: i64,
	_verbose: i64,
) -> StatusFFI {
	let instance = unsafe { read_str(instance) };
	let settings = unsafe { read_str(settings) };
	status::<S>(ENGINE, "init", |world| {
		instance?;
		serde_json::from_str::<Value>(&settings?).map_err(|_| Failure::new(2, "0002E|Invalid settings JSON"))?;
		world.active_config_id = world.resolve_config(config_id)?;
		world.start(ENGINE);
		Ok(())
	})
}

unsafe extern "C" fn reinit<const S: usize>(config_id: i64) -> StatusFFI {
	status::<S>(ENGINE, "reinit", |world| {
		world.require(ENGINE)?;
		if !world.configs.contains_key(&config_id) {
			return Err(Failure::unknown_config(config_id));
		}
		world.active_config_id = config_id;
		Ok(())
	})
}

unsafe extern "C" fn destroy<const S: usize>() -> StatusFFI {
	status::<S>(ENGINE, "destroy", |world| {
		world.stop(ENGINE)?;
		world.exports.clear();
		Ok(())
	})
}

unsafe extern "C" fn prime_engine<const S: usize>() -> StatusFFI {
	status::<S>(ENGINE, "prime_engine", |world| world.require(ENGINE))
}

unsafe extern "C" fn get_active_config_id<const S: usize>(config_id: *mut i64) -> StatusFFI {
	status::<S>(ENGINE, "get_active_config_id", |world| {
		world.require(ENGINE)?;
		unsafe { write_out(config_id, world.active_config_id) }
	})
}

unsafe extern "C" fn add_record<const S: usize>(
	data_source: *const c_char,
	record_id: *const c_char,
	definition: *const c_char,
	flags: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	let args = unsafe { (read_str(data_source), read_str(record_id), read_str(definition)) };
	unsafe {
		respond::<S>(ENGINE, "add_record", response, response_len, resize, |world| {
			world.require(ENGINE)?;
			let (data_source, record_id, definition) = (args.0?, args.1?, args.2?);
			let definition: Value = serde_json::from_str(&definition)
				.ok()
				.filter(Value::is_object)
				.ok_or_else(|| Failure::new(2, "0002E|Invalid JSON in record definition"))?;
			if let Some(declared) = definition.get("DATA_SOURCE").and_then(Value::as_str) {
				if declared != data_source {
					return Err(Failure::new(
						23,
						format!("0023E|Conflicting DATA_SOURCE values '{data_source}' and '{declared}'"),
					));
				}
			}

			let key = (data_source.clone(), record_id.clone());
			let entity_id = match world.records.get(&key) {
				Some(existing) => {
					world.redo.push_back(redo_json("record replaced", &data_source, &record_id));
					existing.entity_id
				}
				None => world.next_entity_id(),
			};
			world.records.insert(
				key,
				Record {
					entity_id,
					definition,
				},
			);
			world.stats.added += 1;
			Ok(info(flags, &data_source, &record_id, &[entity_id]))
		})
	}
}

unsafe extern "C" fn delete_record<const S: usize>(
	data_source: *const c_char,
	record_id: *const c_char,
	flags: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	let args = unsafe { (read_str(data_source), read_str(record_id)) };
	unsafe {
		respond::<S>(ENGINE, "delete_record", response, response_len, resize, |world| {
			world.require(ENGINE)?;
			let (data_source, record_id) = (args.0?, args.1?);
			// deleting an unknown record is not an error
			let affected: Vec<i64> = match world.records.remove(&(data_source.clone(), record_id.clone())) {
				Some(record) => {
					world.stats.deleted += 1;
					world.redo.push_back(redo_json("record deleted", &data_source, &record_id));
					vec![record.entity_id]
				}
				None => Vec::new(),
			};
			Ok(info(flags, &data_source, &record_id, &affected))
		})
	}
}

unsafe extern "C" fn get_record<const S: usize>(
	data_source: *const c_char,
	record_id: *const c_char,
	_flags: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	let args = unsafe { (read_str(data_source), read_str(record_id)) };
	unsafe {
		respond::<S>(ENGINE, "get_record", response, response_len, resize, |world| {
			world.require(ENGINE)?;
			let (data_source, record_id) = (args.0?, args.1?);
			let record = world.record(&data_source, &record_id)?;
			Ok(Some(json!({
				"DATA_SOURCE": data_source,
				"RECORD_ID": record_id,
				"JSON_DATA": record.definition,
			})
			.to_string()))
		})
	}
}

unsafe extern "C" fn get_entity_by_entity_id<const S: usize>(
	entity_id: i64,
	_flags: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(ENGINE, "get_entity_by_entity_id", response, response_len, resize, |world| {
			world.require(ENGINE)?;
			let ((data_source, record_id), _) = world.entity(entity_id)?;
			Ok(Some(entity_json(entity_id, data_source, record_id).to_string()))
		})
	}
}

unsafe extern "C" fn get_entity_by_record_id<const S: usize>(
	data_source: *const c_char,
	record_id: *const c_char,
	_flags: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	let args = unsafe { (read_str(data_source), read_str(record_id)) };
	unsafe {
		respond::<S>(ENGINE, "get_entity_by_record_id", response, response_len, resize, |world| {
			world.require(ENGINE)?;
			let (data_source, record_id) = (args.0?, args.1?);
			let record = world.record(&data_source, &record_id)?;
			Ok(Some(entity_json(record.entity_id, &data_source, &record_id).to_string()))
		})
	}
}

unsafe extern "C" fn search_by_attributes<const S: usize>(
	attributes: *const c_char,
	search_profile: *const c_char,
	_flags: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	let args = unsafe { (read_str(attributes), read_str(search_profile)) };
	unsafe {
		respond::<S>(ENGINE, "search_by_attributes", response, response_len, resize, |world| {
			world.require(ENGINE)?;
			let (attributes, _profile) = (args.0?, args.1?);
			let attributes: Value = serde_json::from_str(&attributes)
				.ok()
				.filter(Value::is_object)
				.ok_or_else(|| Failure::new(2, "0002E|Invalid JSON in search attributes"))?;
			let wanted = attributes.as_object().cloned().unwrap_or_default();

			let entities: Vec<Value> = world
				.records
				.values()
				.filter(|record| wanted.iter().all(|(key, value)| record.definition.get(key) == Some(value)))
				.map(|record| {
					json!({
						"MATCH_INFO": {"MATCH_LEVEL_CODE": "RESOLVED"},
						"ENTITY": {"RESOLVED_ENTITY": {"ENTITY_ID": record.entity_id}}
					})
				})
				.collect();
			Ok(Some(json!({ "RESOLVED_ENTITIES": entities }).to_string()))
		})
	}
}

unsafe extern "C" fn get_stats<const S: usize>(
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(ENGINE, "get_stats", response, response_len, resize, |world| {
			world.require(ENGINE)?;
			Ok(Some(json!({
				"workload": {
					"addedRecords": world.stats.added,
					"deletedRecords": world.stats.deleted,
					"redoTriggered": world.stats.redo_processed,
					"loadedRecords": world.records.len(),
				}
			})
			.to_string()))
		})
	}
}

unsafe extern "C" fn count_redo_records<const S: usize>() -> i64 {
	run::<S, _>(ENGINE, "count_redo_records", |world| {
		world.require(ENGINE)?;
		Ok(world.redo.len() as i64)
	})
	.unwrap_or(FAILURE_STATUS)
}

unsafe extern "C" fn get_redo_record<const S: usize>(
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	unsafe {
		respond::<S>(ENGINE, "get_redo_record", response, response_len, resize, |world| {
			world.require(ENGINE)?;
			Ok(Some(world.redo.pop_front().unwrap_or_default()))
		})
	}
}

unsafe extern "C" fn process_redo_record<const S: usize>(
	redo_record: *const c_char,
	flags: i64,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> StatusFFI {
	let redo = unsafe { read_str(redo_record) };
	unsafe {
		respond::<S>(ENGINE, "process_redo_record", response, response_len, resize, |world| {
			world.require(ENGINE)?;
			let redo: Value = serde_json::from_str(&redo?)
				.map_err(|_| Failure::new(2, "0002E|Invalid JSON in redo record"))?;
			let data_source = redo.get("DATA_SOURCE").and_then(Value::as_str).unwrap_or_default();
			let record_id = redo.get("RECORD_ID").and_then(Value::as_str).unwrap_or_default();
			world.stats.redo_processed += 1;
			Ok(info(flags, data_source, record_id, &[]))
		})
	}
}

unsafe extern "C" fn export_json_entity_report<const S: usize>(_flags: i64, handle: *mut HandleFFI) -> StatusFFI {
	status::<S>(ENGINE, "export_json_entity_report", |world| {
		world.require(ENGINE)?;
		let chunks = world
			.records
			.iter()
			.map(|((data_source, record_id), record)| {
				format!("{}\n", entity_json(record.entity_id, data_source, record_id))
			})
			.collect();
		open_export(world, chunks, handle)
	})
}

unsafe extern "C" fn export_csv_entity_report<const S: usize>(
	csv_column_list: *const c_char,
	_flags: i64,
	handle: *mut HandleFFI,
) -> StatusFFI {
	let columns = unsafe { read_str(csv_column_list) };
	status::<S>(ENGINE, "export_csv_entity_report", |world| {
		world.require(ENGINE)?;
		let columns = csv_columns(&columns?)?;

		let mut chunks = VecDeque::with_capacity(world.records.len() + 1);
		chunks.push_back(format!("{}\n", columns.join(",")));
		for ((data_source, record_id), record) in &world.records {
			let row: Vec<String> = columns
				.iter()
				.map(|column| match column.as_str() {
					"RESOLVED_ENTITY_ID" => record.entity_id.to_string(),
					"DATA_SOURCE" => data_source.clone(),
					_ => record_id.clone(),
				})
				.collect();
			chunks.push_back(format!("{}\n", row.join(",")));
		}
		open_export(world, chunks, handle)
	})
}

unsafe extern "C" fn fetch_next<const S: usize>(
	handle: HandleFFI,
	response: *mut *mut c_char,
	response_len: *mut usize,
	resize: ResizeBufferFn,
) -> i64 {
	let chunk = run::<S, _>(ENGINE, "fetch_next", |world| {
		let chunks = world.exports.get_mut(&handle).ok_or_else(|| Failure::invalid_handle(handle))?;
		Ok(chunks.pop_front().unwrap_or_default())
	});
	let Some(chunk) = chunk else {
		return FAILURE_STATUS;
	};
	if unsafe { write_response(&chunk, response, response_len, resize) } {
		chunk.len() as i64
	} else {
		exception::set::<S>(ENGINE, Failure::new(5, "0005E|Unable to allocate response buffer"));
		FAILURE_STATUS
	}
}

unsafe extern "C" fn close_export<const S: usize>(handle: HandleFFI) -> StatusFFI {
	status::<S>(ENGINE, "close_export", |world| {
		world.exports.remove(&handle).map(|_| ()).ok_or_else(|| Failure::invalid_handle(handle))
	})
}

fn open_export(world: &mut World, chunks: VecDeque<String>, handle: *mut HandleFFI) -> SimResult<()> {
	let native = world.next_handle();
	unsafe { write_out(handle, native)? };
	world.exports.insert(native, chunks);
	Ok(())
}

fn csv_columns(list: &str) -> SimResult<Vec<String>> {
	let list = list.trim();
	if list.is_empty() || list == "*" {
		return Ok(DEFAULT_CSV_COLUMNS.map(str::to_string).to_vec());
	}
	list.split(',')
		.map(|c| c.trim().to_uppercase())
		.map(|c| {
			if DEFAULT_CSV_COLUMNS.contains(&c.as_str()) {
				Ok(c)
			} else {
				Err(Failure::new(2, format!("0002E|Invalid CSV column '{c}'")))
			}
		})
		.collect()
}

fn info(flags: i64, data_source: &str, record_id: &str, entity_ids: &[i64]) -> Option<String> {
	(flags & WITH_INFO == WITH_INFO).then(|| with_info(data_source, record_id, entity_ids))
}

fn redo_json(reason: &str, data_source: &str, record_id: &str) -> String {
	json!({"REASON": reason, "DATA_SOURCE": data_source, "RECORD_ID": record_id}).to_string()
}

pub(crate) fn vtable<const S: usize>() -> EngineVTableFFI {
	EngineVTableFFI {
		exception: exception::vtable::<S, { exception::ENGINE }>(),
		init: init::<S>,
		init_with_config_id: init_with_config_id::<S>,
		reinit: reinit::<S>,
		destroy: destroy::<S>,
		prime_engine: prime_engine::<S>,
		get_active_config_id: get_active_config_id::<S>,
		add_record: add_record::<S>,
		delete_record: delete_record::<S>,
		get_record: get_record::<S>,
		get_entity_by_entity_id: get_entity_by_entity_id::<S>,
		get_entity_by_record_id: get_entity_by_record_id::<S>,
		search_by_attributes: search_by_attributes::<S>,
		get_stats: get_stats::<S>,
		count_redo_records: count_redo_records::<S>,
		get_redo_record: get_redo_record::<S>,
		process_redo_record: process_redo_record::<S>,
		export_json_entity_report: export_json_entity_report::<S>,
		export_csv_entity_report: export_csv_entity_report::<S>,
		fetch_next: fetch_next::<S>,
		close_export: close_export::<S>,
	}
}
