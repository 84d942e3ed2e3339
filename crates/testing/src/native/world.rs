// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeMap, HashMap, VecDeque};

use erbridge_type::Component;
use serde_json::{Value, json};

use super::{Failure, SimResult};

pub(crate) const TEMPLATE_CONFIG_ID: i64 = 1000;
pub(crate) const TEMPLATE_DATA_SOURCES: [&str; 2] = ["SEARCH", "TEST"];

#[derive(Debug, Clone)]
pub(crate) struct Record {
	pub(crate) entity_id: i64,
	pub(crate) definition: Value,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredConfig {
	pub(crate) definition: String,
	pub(crate) comment: String,
}

#[derive(Debug, Default)]
pub(crate) struct Stats {
	pub(crate) added: u64,
	pub(crate) deleted: u64,
	pub(crate) redo_processed: u64,
}

/// Everything the simulated engine knows about.
pub(crate) struct World {
	ready: HashMap<Component, bool>,
	pub(crate) active_config_id: i64,
	pub(crate) records: BTreeMap<(String, String), Record>,
	next_entity_id: i64,
	pub(crate) redo: VecDeque<String>,
	pub(crate) stats: Stats,
	pub(crate) configs: BTreeMap<i64, StoredConfig>,
	next_config_id: i64,
	pub(crate) default_config_id: i64,
	pub(crate) documents: HashMap<usize, Vec<String>>,
	pub(crate) exports: HashMap<usize, VecDeque<String>>,
	next_handle: usize,
}

impl World {
	pub(crate) fn new() -> Self {
		let mut configs = BTreeMap::new();
		configs.insert(
			TEMPLATE_CONFIG_ID,
			StoredConfig {
				definition: document_json(&TEMPLATE_DATA_SOURCES.map(str::to_string)),
				comment: "template".to_string(),
			},
		);

		Self {
			ready: HashMap::new(),
			active_config_id: 0,
			records: BTreeMap::new(),
			next_entity_id: 1,
			redo: VecDeque::new(),
			stats: Stats::default(),
			configs,
			next_config_id: TEMPLATE_CONFIG_ID + 1,
			default_config_id: TEMPLATE_CONFIG_ID,
			documents: HashMap::new(),
			exports: HashMap::new(),
			next_handle: 0x1000,
		}
	}

	pub(crate) fn is_ready(&self, component: Component) -> bool {
		self.ready.get(&component).copied().unwrap_or(false)
	}

	pub(crate) fn require(&self, component: Component) -> SimResult<()> {
		if self.is_ready(component) {
			Ok(())
		} else {
			Err(Failure::not_initialized())
		}
	}

	pub(crate) fn start(&mut self, component: Component) {
		self.ready.insert(component, true);
	}

	pub(crate) fn stop(&mut self, component: Component) -> SimResult<()> {
		self.require(component)?;
		self.ready.insert(component, false);
		Ok(())
	}

	/// Resolve the configuration an engine starts with: the given id, or the
	/// registered default when `config_id` is zero.
	pub(crate) fn resolve_config(&self, config_id: i64) -> SimResult<i64> {
		let config_id = if config_id == 0 {
			self.default_config_id
		} else {
			config_id
		};
		if config_id == 0 {
			return Err(Failure::new(7220, "7220E|No engine configuration registered"));
		}
		if !self.configs.contains_key(&config_id) {
			return Err(Failure::unknown_config(config_id));
		}
		Ok(config_id)
	}

	pub(crate) fn next_handle(&mut self) -> usize {
		let handle = self.next_handle;
		self.next_handle += 1;
		handle
	}

	pub(crate) fn next_entity_id(&mut self) -> i64 {
		let id = self.next_entity_id;
		self.next_entity_id += 1;
		id
	}

	pub(crate) fn add_config(&mut self, definition: String, comment: String) -> i64 {
		let id = self.next_config_id;
		self.next_config_id += 1;
		self.configs.insert(
			id,
			StoredConfig {
				definition,
				comment,
			},
		);
		id
	}

	pub(crate) fn record(&self, data_source: &str, record_id: &str) -> SimResult<&Record> {
		self.records
			.get(&(data_source.to_string(), record_id.to_string()))
			.ok_or_else(|| unknown_record(data_source, record_id))
	}

	pub(crate) fn entity(&self, entity_id: i64) -> SimResult<(&(String, String), &Record)> {
		self.records
			.iter()
			.find(|(_, r)| r.entity_id == entity_id)
			.ok_or_else(|| Failure::new(37, format!("0037E|Unknown resolved entity value '{entity_id}'")))
	}
}

pub(crate) fn unknown_record(data_source: &str, record_id: &str) -> Failure {
	Failure::new(33, format!("0033E|Unknown record: dsrc[{data_source}], record[{record_id}]"))
}

pub(crate) fn entity_json(entity_id: i64, data_source: &str, record_id: &str) -> Value {
	json!({
		"RESOLVED_ENTITY": {
			"ENTITY_ID": entity_id,
			"RECORDS": [{"DATA_SOURCE": data_source, "RECORD_ID": record_id}]
		}
	})
}

pub(crate) fn with_info(data_source: &str, record_id: &str, entity_ids: &[i64]) -> String {
	let affected: Vec<Value> = entity_ids.iter().map(|id| json!({"ENTITY_ID": id})).collect();
	json!({
		"DATA_SOURCE": data_source,
		"RECORD_ID": record_id,
		"AFFECTED_ENTITIES": affected
	})
	.to_string()
}

pub(crate) fn document_json(data_sources: &[String]) -> String {
	json!({ "DATA_SOURCES": data_sources }).to_string()
}

pub(crate) fn parse_document(definition: &str) -> SimResult<Vec<String>> {
	let invalid = || Failure::new(2, "0002E|Invalid configuration definition");
	let value: Value = serde_json::from_str(definition).map_err(|_| invalid())?;
	let sources = value.get("DATA_SOURCES").and_then(Value::as_array).ok_or_else(invalid)?;
	sources.iter().map(|s| s.as_str().map(str::to_string).ok_or_else(invalid)).collect()
}
