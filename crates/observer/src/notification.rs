// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeMap, time::SystemTime};

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
	/// Free-form correlation tag set by the embedding application.
	pub origin: String,
	pub subject_id: u32,
	pub message_id: u32,
	pub operation: &'static str,
	pub details: BTreeMap<String, String>,
	/// Rendered error of the operation, `None` on success.
	pub error: Option<String>,
	#[serde(skip)]
	pub emitted_at: SystemTime,
}

impl Notification {
	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}

	pub fn detail(&self, key: &str) -> Option<&str> {
		self.details.get(key).map(String::as_str)
	}

	pub fn to_json(&self) -> String {
		serde_json::to_string(self).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_to_json() {
		let mut details = BTreeMap::new();
		details.insert("recordID".to_string(), "1001".to_string());
		let notification = Notification {
			origin: "loader".to_string(),
			subject_id: 6004,
			message_id: 8001,
			operation: "add_record",
			details,
			error: None,
			emitted_at: SystemTime::now(),
		};

		let json: serde_json::Value = serde_json::from_str(&notification.to_json()).unwrap();
		assert_eq!(json["origin"], "loader");
		assert_eq!(json["subject_id"], 6004);
		assert_eq!(json["message_id"], 8001);
		assert_eq!(json["details"]["recordID"], "1001");
		assert!(json["error"].is_null());
		assert!(!notification.is_error());
		assert_eq!(notification.detail("recordID"), Some("1001"));
	}
}
