// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use erbridge_abi::constants::{ENTITY_DEFAULT_FLAGS, NO_FLAGS, WITH_INFO};
use erbridge_engine::{CallSettings, Engine, NativeLibrary};
use erbridge_testing::{Failure, Simulator};
use erbridge_type::{Component, Error, HandleKind};
use serde_json::Value;

const SETTINGS: &str = r#"{"PIPELINE":{"CONFIGPATH":"/etc/opt/senzing"}}"#;

fn engine<const S: usize>() -> Engine {
	Simulator::<S>::reset();
	let library = Arc::new(NativeLibrary::from_tables("simulated", Simulator::<S>::tables()));
	let engine = Engine::new(library, CallSettings::default());
	engine.initialize("erbridge-test", SETTINGS, 0, false).unwrap();
	engine
}

fn load(engine: &Engine, records: &[(&str, &str)]) {
	for (data_source, record_id) in records {
		let definition = format!(r#"{{"NAME_FULL":"Robert Smith","RECORD_ID":"{record_id}"}}"#);
		engine.add_record(data_source, record_id, &definition, NO_FLAGS).unwrap();
	}
}

#[test]
fn test_initialize_uses_default_config() {
	let engine = engine::<9500>();
	assert_eq!(engine.get_active_config_id().unwrap(), Simulator::<9500>::default_config_id());
	engine.prime_engine().unwrap();
	assert!(Simulator::<9500>::is_initialized(Component::Engine));
}

#[test]
fn test_record_lifecycle() {
	let engine = engine::<9501>();

	let response = engine.add_record("TEST", "1001", r#"{"NAME_FULL":"Robert Smith"}"#, NO_FLAGS).unwrap();
	assert_eq!(response, "");

	let response = engine.add_record("TEST", "1002", r#"{"NAME_FULL":"Bob Smith"}"#, WITH_INFO).unwrap();
	let info: Value = serde_json::from_str(&response).unwrap();
	assert_eq!(info["RECORD_ID"], "1002");
	assert_eq!(info["AFFECTED_ENTITIES"].as_array().unwrap().len(), 1);
	assert_eq!(Simulator::<9501>::record_count(), 2);

	let record: Value = serde_json::from_str(&engine.get_record("TEST", "1001", NO_FLAGS).unwrap()).unwrap();
	assert_eq!(record["RECORD_ID"], "1001");

	let entity: Value =
		serde_json::from_str(&engine.get_entity_by_record_id("TEST", "1001", ENTITY_DEFAULT_FLAGS).unwrap())
			.unwrap();
	let entity_id = entity["RESOLVED_ENTITY"]["ENTITY_ID"].as_i64().unwrap();
	let by_id: Value =
		serde_json::from_str(&engine.get_entity_by_entity_id(entity_id, ENTITY_DEFAULT_FLAGS).unwrap()).unwrap();
	assert_eq!(by_id["RESOLVED_ENTITY"]["ENTITY_ID"], entity_id);

	engine.delete_record("TEST", "1001", NO_FLAGS).unwrap();
	assert_eq!(Simulator::<9501>::record_count(), 1);

	let err = engine.get_record("TEST", "1001", NO_FLAGS).unwrap_err();
	let native = err.engine_error().unwrap();
	assert_eq!(native.code(), 33);
	assert_eq!(native.operation(), "get_record");
	assert_eq!(native.arguments().get("record_id"), Some("1001"));
}

#[test]
fn test_redo_queue() {
	let engine = engine::<9502>();
	assert_eq!(engine.count_redo_records().unwrap(), 0);
	assert_eq!(engine.get_redo_record().unwrap(), "");

	load(&engine, &[("TEST", "1001")]);
	load(&engine, &[("TEST", "1001")]);
	assert_eq!(engine.count_redo_records().unwrap(), 1);

	let redo = engine.get_redo_record().unwrap();
	assert!(!redo.is_empty());
	let info: Value = serde_json::from_str(&engine.process_redo_record(&redo, WITH_INFO).unwrap()).unwrap();
	assert_eq!(info["RECORD_ID"], "1001");
	assert_eq!(engine.count_redo_records().unwrap(), 0);
}

#[test]
fn test_count_redo_records_failure() {
	let engine = engine::<9503>();
	Simulator::<9503>::fail_next(Component::Engine, "count_redo_records", Failure::new(48, "0048E|not ready"));

	let err = engine.count_redo_records().unwrap_err();
	assert_eq!(err.engine_error().unwrap().code(), 48);
	assert!(!Simulator::<9503>::pending_exception(Component::Engine));
}

#[test]
fn test_export_scenario() {
	let engine = engine::<9504>();
	load(&engine, &[("TEST", "1001"), ("TEST", "1002")]);

	let handle = engine.export_json_entity_report(ENTITY_DEFAULT_FLAGS).unwrap();
	assert_eq!(engine.open_exports(), 1);

	let mut chunks = Vec::new();
	while let Some(chunk) = engine.fetch_next(handle).unwrap() {
		chunks.push(chunk);
	}
	assert_eq!(chunks.len(), 2);
	for chunk in &chunks {
		let line: Value = serde_json::from_str(chunk.trim()).unwrap();
		assert!(line["RESOLVED_ENTITY"]["ENTITY_ID"].is_i64());
	}

	assert_eq!(engine.fetch_next(handle).unwrap(), None);
	engine.close_export_report(handle).unwrap();
	assert_eq!(engine.open_exports(), 0);
	assert_eq!(Simulator::<9504>::open_exports(), 0);

	let err = engine.close_export_report(handle).unwrap_err();
	assert!(matches!(
		err,
		Error::InvalidHandleUsage {
			kind: HandleKind::Export,
			operation: "close_export_report",
			..
		}
	));

	let err = engine.fetch_next(handle).unwrap_err();
	assert!(err.is_invalid_handle());
	assert_eq!(Simulator::<9504>::call_count(Component::Engine, "close_export"), 1);
}

#[test]
fn test_fetch_after_exhaustion_stays_local() {
	let engine = engine::<9505>();
	load(&engine, &[("TEST", "1001")]);

	let handle = engine.export_csv_entity_report("*", NO_FLAGS).unwrap();
	assert_eq!(engine.fetch_next(handle).unwrap().unwrap(), "RESOLVED_ENTITY_ID,DATA_SOURCE,RECORD_ID\n");
	assert!(engine.fetch_next(handle).unwrap().unwrap().ends_with(",TEST,1001\n"));
	assert_eq!(engine.fetch_next(handle).unwrap(), None);

	let native_fetches = Simulator::<9505>::call_count(Component::Engine, "fetch_next");
	for _ in 0..3 {
		assert_eq!(engine.fetch_next(handle).unwrap(), None);
	}
	assert_eq!(Simulator::<9505>::call_count(Component::Engine, "fetch_next"), native_fetches);

	engine.close_export_report(handle).unwrap();
}

#[test]
fn test_failing_close_keeps_cursor_open() {
	let engine = engine::<9506>();
	let handle = engine.export_json_entity_report(NO_FLAGS).unwrap();

	Simulator::<9506>::fail_next(Component::Engine, "close_export", Failure::new(3, "0003E|close refused"));
	let err = engine.close_export_report(handle).unwrap_err();
	assert_eq!(err.engine_error().unwrap().code(), 3);
	assert_eq!(engine.open_exports(), 1);

	assert_eq!(engine.fetch_next(handle).unwrap(), None);
	engine.close_export_report(handle).unwrap();
	assert_eq!(engine.open_exports(), 0);
}

#[test]
fn test_never_opened_handle() {
	let engine = engine::<9507>();
	let handle = engine.export_json_entity_report(NO_FLAGS).unwrap();
	let bogus = erbridge_type::ExportHandle(handle.0 + 100);

	let err = engine.fetch_next(bogus).unwrap_err();
	match err {
		Error::InvalidHandleUsage {
			kind,
			handle,
			operation,
		} => {
			assert_eq!(kind, HandleKind::Export);
			assert_eq!(handle, bogus.0);
			assert_eq!(operation, "fetch_next");
		}
		other => panic!("unexpected error: {other}"),
	}
	engine.close_export_report(handle).unwrap();
}

#[test]
fn test_export_iterator_closes_on_exhaustion_and_drop() {
	let engine = engine::<9508>();
	load(&engine, &[("TEST", "1001"), ("TEST", "1002"), ("SEARCH", "2001")]);

	let rows: Vec<String> =
		engine.export_csv_entity_report_iter("DATA_SOURCE,RECORD_ID", NO_FLAGS).unwrap().map(Result::unwrap).collect();
	assert_eq!(rows.len(), 4);
	assert_eq!(rows[0], "DATA_SOURCE,RECORD_ID\n");
	assert_eq!(engine.open_exports(), 0);

	let mut partial = engine.export_json_entity_report_iter(NO_FLAGS).unwrap();
	assert!(partial.next().unwrap().is_ok());
	assert_eq!(engine.open_exports(), 1);
	drop(partial);
	assert_eq!(engine.open_exports(), 0);
	assert_eq!(Simulator::<9508>::open_exports(), 0);
}

#[test]
fn test_export_iterator_yields_fetch_error_once() {
	let engine = engine::<9509>();
	load(&engine, &[("TEST", "1001")]);

	let mut iter = engine.export_json_entity_report_iter(NO_FLAGS).unwrap();
	Simulator::<9509>::fail_next(Component::Engine, "fetch_next", Failure::new(5, "0005E|fetch failed"));

	let err = iter.next().unwrap().unwrap_err();
	assert_eq!(err.engine_error().unwrap().code(), 5);
	assert!(iter.next().is_none());
	assert_eq!(engine.open_exports(), 0);
}

#[test]
fn test_destroy_closes_exports_and_blocks_calls() {
	let engine = engine::<9510>();
	let _first = engine.export_json_entity_report(NO_FLAGS).unwrap();
	let _second = engine.export_csv_entity_report("*", NO_FLAGS).unwrap();
	assert_eq!(Simulator::<9510>::open_exports(), 2);

	engine.destroy().unwrap();
	assert!(engine.is_destroyed());
	assert_eq!(engine.open_exports(), 0);
	assert_eq!(Simulator::<9510>::call_count(Component::Engine, "close_export"), 2);

	let before = Simulator::<9510>::total_calls();
	let err = engine.get_stats().unwrap_err();
	assert!(matches!(
		err,
		Error::Destroyed {
			component: Component::Engine
		}
	));
	assert!(engine.destroy().is_err());
	assert_eq!(Simulator::<9510>::total_calls(), before);
}

#[test]
fn test_interior_nul_is_marshal_error() {
	let engine = engine::<9511>();
	let before = Simulator::<9511>::call_count(Component::Engine, "add_record");

	let err = engine.add_record("TEST", "10\001", "{}", NO_FLAGS).unwrap_err();
	assert!(matches!(
		err,
		Error::Marshal {
			operation: "add_record",
			argument: "record_id"
		}
	));
	assert_eq!(Simulator::<9511>::call_count(Component::Engine, "add_record"), before);
}

#[test]
fn test_reinitialize_switches_config() {
	let engine = engine::<9512>();
	let err = engine.reinitialize(4242).unwrap_err();
	assert_eq!(err.engine_error().unwrap().code(), 7221);

	let active = engine.get_active_config_id().unwrap();
	engine.reinitialize(active).unwrap();
	assert_eq!(engine.get_active_config_id().unwrap(), active);
}

#[test]
fn test_stats_and_search() {
	let engine = engine::<9513>();
	load(&engine, &[("TEST", "1001")]);

	let stats: Value = serde_json::from_str(&engine.get_stats().unwrap()).unwrap();
	assert_eq!(stats["workload"]["addedRecords"], 1);

	let found: Value = serde_json::from_str(
		&engine.search_by_attributes(r#"{"NAME_FULL":"Robert Smith"}"#, "", ENTITY_DEFAULT_FLAGS).unwrap(),
	)
	.unwrap();
	assert_eq!(found["RESOLVED_ENTITIES"].as_array().unwrap().len(), 1);
}
