// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cell::Cell, sync::Arc, thread, time::Duration};

use erbridge_abi::constants::NO_FLAGS;
use erbridge_engine::{CallSettings, Config, ConfigManager, Diagnostic, Engine, NativeLibrary, Product};
use erbridge_testing::{BlockingObserver, CountingObserver, RecordingObserver, Simulator, util::wait::wait_until};
use erbridge_type::{ConfigHandle, Error, ExportHandle, ObserverError, Result};

type Call<'a> = (&'static str, Box<dyn Fn() -> Result<()> + 'a>);

fn call<'a, T: 'a>(operation: &'static str, f: impl Fn() -> Result<T> + 'a) -> Call<'a> {
	(operation, Box::new(move || f().map(drop)))
}

/// Run every call once, then expect exactly one notification per operation,
/// carrying an error exactly when the call failed.
fn assert_notified_once(recorder: &RecordingObserver, calls: &[Call<'_>], expect_error: bool) {
	for (operation, run) in calls {
		let result = run();
		assert_eq!(result.is_err(), expect_error, "{operation}: {result:?}");
	}

	wait_until(|| calls.iter().all(|(operation, _)| !recorder.of(operation).is_empty()), "notifications missing");
	thread::sleep(Duration::from_millis(50));
	for (operation, _) in calls {
		let seen = recorder.of(operation);
		assert_eq!(seen.len(), 1, "{operation}");
		assert_eq!(seen[0].is_error(), expect_error, "{operation}");
	}
}

fn engine<const S: usize>() -> Engine {
	Simulator::<S>::reset();
	let library = Arc::new(NativeLibrary::from_tables("simulated", Simulator::<S>::tables()));
	let engine = Engine::new(library, CallSettings::default());
	engine.initialize("erbridge-test", "{}", 0, false).unwrap();
	engine
}

#[test]
fn test_one_notification_per_call() {
	let engine = engine::<9700>();
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	engine.register_observer(recorder.clone()).unwrap();
	engine.set_observer_origin("loader-1");

	engine.add_record("TEST", "1001", r#"{"NAME_FULL":"Robert Smith"}"#, NO_FLAGS).unwrap();
	engine.get_record("TEST", "missing", NO_FLAGS).unwrap_err();

	wait_until(|| recorder.of("add_record").len() == 1 && recorder.of("get_record").len() == 1, "not delivered");
	thread::sleep(Duration::from_millis(50));
	assert_eq!(recorder.of("add_record").len(), 1);
	assert_eq!(recorder.of("get_record").len(), 1);

	let added = &recorder.of("add_record")[0];
	assert_eq!(added.subject_id, 6004);
	assert_eq!(added.message_id, 8001);
	assert_eq!(added.origin, "loader-1");
	assert_eq!(added.detail("record_id"), Some("1001"));
	assert!(!added.is_error());

	let failed = &recorder.of("get_record")[0];
	assert_eq!(failed.message_id, 8020);
	assert!(failed.error.as_deref().unwrap().contains("E33"));
}

#[test]
fn test_destroyed_and_marshal_failures_still_notify() {
	let engine = engine::<9701>();
	let counter = Arc::new(CountingObserver::for_operation("counter", "add_record"));
	engine.register_observer(counter.clone()).unwrap();

	engine.add_record("TEST", "a\0b", "{}", NO_FLAGS).unwrap_err();
	engine.destroy().unwrap();
	engine.add_record("TEST", "1001", "{}", NO_FLAGS).unwrap_err();

	wait_until(|| counter.count() == 2, "failures not delivered");
	assert_eq!(counter.errors(), 2);
}

#[test]
fn test_registration_is_announced_to_the_new_observer() {
	let engine = engine::<9702>();
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	engine.register_observer(recorder.clone()).unwrap();

	wait_until(|| recorder.of("register_observer").len() == 1, "registration not delivered");
	let registered = &recorder.of("register_observer")[0];
	assert_eq!(registered.message_id, 8702);
	assert_eq!(registered.detail("observerID"), Some("recorder"));

	engine.unregister_observer("recorder").unwrap();
	wait_until(|| recorder.of("unregister_observer").len() == 1, "unregistration not delivered");
	assert!(!engine.has_observers());
}

#[test]
fn test_observer_protocol_errors() {
	let engine = engine::<9703>();
	engine.register_observer(Arc::new(CountingObserver::new("dup"))).unwrap();

	let err = engine.register_observer(Arc::new(CountingObserver::new("dup"))).unwrap_err();
	assert!(matches!(err, Error::Observer(ObserverError::Duplicate(ref id)) if id == "dup"));

	let err = engine.unregister_observer("ghost").unwrap_err();
	assert!(matches!(err, Error::Observer(ObserverError::Unknown(ref id)) if id == "ghost"));
}

#[test]
fn test_rejected_observer_calls_still_notify() {
	let engine = engine::<9710>();
	let registrations = Arc::new(CountingObserver::for_operation("registrations", "register_observer"));
	let removals = Arc::new(CountingObserver::for_operation("removals", "unregister_observer"));
	engine.register_observer(registrations.clone()).unwrap();
	engine.register_observer(removals.clone()).unwrap();
	wait_until(|| registrations.count() == 2, "registrations not delivered");

	engine.register_observer(Arc::new(CountingObserver::new("registrations"))).unwrap_err();
	engine.unregister_observer("ghost").unwrap_err();

	wait_until(|| registrations.count() == 3 && removals.count() == 1, "rejections not delivered");
	thread::sleep(Duration::from_millis(50));
	assert_eq!(registrations.count(), 3);
	assert_eq!(registrations.errors(), 1);
	assert_eq!(removals.count(), 1);
	assert_eq!(removals.errors(), 1);
}

#[test]
fn test_every_engine_operation_notifies_once() {
	Simulator::<9707>::reset();
	let library = Arc::new(NativeLibrary::from_tables("simulated", Simulator::<9707>::tables()));
	let engine = Engine::new(library, CallSettings::default());
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	engine.register_observer(recorder.clone()).unwrap();

	let export = Cell::new(ExportHandle(0));
	let calls = [
		call("initialize", || engine.initialize("erbridge-test", "{}", 0, false)),
		call("prime_engine", || engine.prime_engine()),
		call("get_active_config_id", || engine.get_active_config_id()),
		call("add_record", || engine.add_record("TEST", "1001", r#"{"NAME_FULL":"Robert Smith"}"#, NO_FLAGS)),
		call("get_record", || engine.get_record("TEST", "1001", NO_FLAGS)),
		call("get_entity_by_record_id", || engine.get_entity_by_record_id("TEST", "1001", NO_FLAGS)),
		call("get_entity_by_entity_id", || engine.get_entity_by_entity_id(1, NO_FLAGS)),
		call("search_by_attributes", || engine.search_by_attributes(r#"{"NAME_FULL":"Robert Smith"}"#, "", NO_FLAGS)),
		call("get_stats", || engine.get_stats()),
		call("count_redo_records", || engine.count_redo_records()),
		call("get_redo_record", || engine.get_redo_record()),
		call("process_redo_record", || {
			engine.process_redo_record(r#"{"DATA_SOURCE":"TEST","RECORD_ID":"1001"}"#, NO_FLAGS)
		}),
		call("export_json_entity_report", || engine.export_json_entity_report(NO_FLAGS).map(|h| export.set(h))),
		call("fetch_next", || engine.fetch_next(export.get())),
		call("close_export_report", || engine.close_export_report(export.get())),
		call("export_csv_entity_report", || engine.export_csv_entity_report("*", NO_FLAGS)),
		call("delete_record", || engine.delete_record("TEST", "1001", NO_FLAGS)),
		call("reinitialize", || engine.reinitialize(1000)),
		call("destroy", || engine.destroy()),
	];
	assert_notified_once(&recorder, &calls, false);
}

#[test]
fn test_every_component_operation_notifies_once() {
	Simulator::<9708>::reset();
	let library = Arc::new(NativeLibrary::from_tables("simulated", Simulator::<9708>::tables()));
	let settings = CallSettings::default();

	let manager = ConfigManager::new(library.clone(), settings);
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	manager.register_observer(recorder.clone()).unwrap();
	let config_id = Cell::new(0);
	let calls = [
		call("initialize", || manager.initialize("erbridge-test", "{}", false)),
		call("register_config", || manager.register_config(r#"{"DATA_SOURCES":["TEST"]}"#, "t").map(|id| config_id.set(id))),
		call("get_config", || manager.get_config(config_id.get())),
		call("get_configs", || manager.get_configs()),
		call("get_default_config_id", || manager.get_default_config_id()),
		call("set_default_config_id", || manager.set_default_config_id(config_id.get())),
		call("replace_default_config_id", || manager.replace_default_config_id(config_id.get(), 1000)),
		call("set_default_config", || manager.set_default_config(r#"{"DATA_SOURCES":["WATCHLIST"]}"#, "w")),
		call("destroy", || manager.destroy()),
	];
	assert_notified_once(&recorder, &calls, false);

	let config = Config::new(library.clone(), settings);
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	config.register_observer(recorder.clone()).unwrap();
	let document = Cell::new(ConfigHandle(0));
	let calls = [
		call("initialize", || config.initialize("erbridge-test", "{}", false)),
		call("create_config", || config.create_config().map(|h| document.set(h))),
		call("add_data_source", || config.add_data_source(document.get(), "CUSTOMERS")),
		call("delete_data_source", || config.delete_data_source(document.get(), "CUSTOMERS")),
		call("get_data_sources", || config.get_data_sources(document.get())),
		call("export_config", || config.export_config(document.get())),
		call("import_config", || config.import_config(r#"{"DATA_SOURCES":["TEST"]}"#)),
		call("close_config", || config.close_config(document.get())),
		call("destroy", || config.destroy()),
	];
	assert_notified_once(&recorder, &calls, false);

	let product = Product::new(library.clone(), settings);
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	product.register_observer(recorder.clone()).unwrap();
	let calls = [
		call("initialize", || product.initialize("erbridge-test", "{}", false)),
		call("get_license", || product.get_license()),
		call("get_version", || product.get_version()),
		call("destroy", || product.destroy()),
	];
	assert_notified_once(&recorder, &calls, false);

	let diagnostic = Diagnostic::new(library, settings);
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	diagnostic.register_observer(recorder.clone()).unwrap();
	let calls = [
		call("initialize", || diagnostic.initialize("erbridge-test", "{}", 0, false)),
		call("reinitialize", || diagnostic.reinitialize(1000)),
		call("check_datastore_performance", || diagnostic.check_datastore_performance(1)),
		call("get_datastore_info", || diagnostic.get_datastore_info()),
		call("get_feature", || diagnostic.get_feature(1)),
		call("purge_repository", || diagnostic.purge_repository()),
		call("destroy", || diagnostic.destroy()),
	];
	assert_notified_once(&recorder, &calls, false);
}

#[test]
fn test_failing_operations_notify_once() {
	Simulator::<9709>::reset();
	let library = Arc::new(NativeLibrary::from_tables("simulated", Simulator::<9709>::tables()));
	let settings = CallSettings::default();

	let engine = Engine::new(library.clone(), settings);
	engine.initialize("erbridge-test", "{}", 0, false).unwrap();
	let handle = engine.export_json_entity_report(NO_FLAGS).unwrap();
	engine.close_export_report(handle).unwrap();
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	engine.register_observer(recorder.clone()).unwrap();
	let calls = [
		call("get_record", || engine.get_record("TEST", "missing", NO_FLAGS)),
		call("get_entity_by_entity_id", || engine.get_entity_by_entity_id(424242, NO_FLAGS)),
		call("fetch_next", || engine.fetch_next(handle)),
		call("close_export_report", || engine.close_export_report(handle)),
		call("reinitialize", || engine.reinitialize(55555)),
	];
	assert_notified_once(&recorder, &calls, true);

	let manager = ConfigManager::new(library.clone(), settings);
	manager.initialize("erbridge-test", "{}", false).unwrap();
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	manager.register_observer(recorder.clone()).unwrap();
	let calls = [
		call("get_config", || manager.get_config(31337)),
		call("replace_default_config_id", || manager.replace_default_config_id(4242, 1000)),
	];
	assert_notified_once(&recorder, &calls, true);

	let config = Config::new(library.clone(), settings);
	config.initialize("erbridge-test", "{}", false).unwrap();
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	config.register_observer(recorder.clone()).unwrap();
	let calls = [
		call("get_data_sources", || config.get_data_sources(ConfigHandle(999))),
		call("close_config", || config.close_config(ConfigHandle(999))),
	];
	assert_notified_once(&recorder, &calls, true);

	let diagnostic = Diagnostic::new(library, settings);
	diagnostic.initialize("erbridge-test", "{}", 0, false).unwrap();
	let recorder = Arc::new(RecordingObserver::new("recorder"));
	diagnostic.register_observer(recorder.clone()).unwrap();
	let calls = [call("get_feature", || diagnostic.get_feature(0))];
	assert_notified_once(&recorder, &calls, true);
}

#[test]
fn test_blocked_observer_does_not_delay_calls() {
	let engine = engine::<9704>();
	let blocker = Arc::new(BlockingObserver::new("blocker", "prime_engine"));
	let counter = Arc::new(CountingObserver::for_operation("counter", "prime_engine"));
	engine.register_observer(blocker.clone()).unwrap();
	engine.register_observer(counter.clone()).unwrap();

	engine.prime_engine().unwrap();
	assert!(blocker.wait_entered(Duration::from_secs(5)));

	for _ in 0..4 {
		engine.prime_engine().unwrap();
	}
	wait_until(|| counter.count() == 5, "other observer starved");
	assert_eq!(blocker.completed(), 0);

	for _ in 0..5 {
		blocker.release();
	}
	wait_until(|| blocker.completed() == 5, "blocked deliveries never finished");
}

#[test]
fn test_unregister_during_in_flight_delivery() {
	let engine = engine::<9705>();
	let blocker = Arc::new(BlockingObserver::new("blocker", "get_stats"));
	engine.register_observer(blocker.clone()).unwrap();

	engine.get_stats().unwrap();
	assert!(blocker.wait_entered(Duration::from_secs(5)));

	engine.unregister_observer("blocker").unwrap();
	assert!(!engine.has_observers());

	blocker.release();
	wait_until(|| blocker.completed() == 1, "in-flight delivery lost");

	engine.get_stats().unwrap();
	thread::sleep(Duration::from_millis(50));
	assert_eq!(blocker.completed(), 1);
}

#[test]
fn test_each_facade_has_its_own_registry() {
	Simulator::<9706>::reset();
	let library = Arc::new(NativeLibrary::from_tables("simulated", Simulator::<9706>::tables()));
	let engine = Engine::new(library.clone(), CallSettings::default());
	let product = Product::new(library, CallSettings::default());

	let recorder = Arc::new(RecordingObserver::new("recorder"));
	product.register_observer(recorder.clone()).unwrap();
	product.initialize("erbridge-test", "{}", false).unwrap();
	engine.initialize("erbridge-test", "{}", 0, false).unwrap();
	product.get_version().unwrap();

	wait_until(|| recorder.of("get_version").len() == 1, "product call not delivered");
	thread::sleep(Duration::from_millis(50));
	assert!(recorder.notifications().iter().all(|n| n.subject_id == 6006));
	assert!(!engine.has_observers());
}
