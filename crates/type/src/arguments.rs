// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Size-capped view of the arguments of a native call, used in errors and
//! call records. Record definitions can be megabytes of JSON, so every value
//! is cut to a fixed number of bytes.

use std::fmt::{Display, Formatter};

use serde::Serialize;

pub const DEFAULT_MAX_ARGUMENT_LEN: usize = 256;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Arguments {
	entries: Vec<(&'static str, String)>,
	#[serde(skip)]
	max_len: usize,
}

impl Arguments {
	pub fn new(max_len: usize) -> Self {
		Self {
			entries: Vec::new(),
			max_len,
		}
	}

	pub fn with(mut self, name: &'static str, value: impl Display) -> Self {
		self.push(name, value);
		self
	}

	pub fn push(&mut self, name: &'static str, value: impl Display) {
		let value = truncate(value.to_string(), self.max_len);
		self.entries.push((name, value));
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str())
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
		self.entries.iter().map(|(n, v)| (*n, v.as_str()))
	}
}

impl Display for Arguments {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		for (idx, (name, value)) in self.entries.iter().enumerate() {
			if idx > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{name}={value}")?;
		}
		Ok(())
	}
}

fn truncate(mut value: String, max_len: usize) -> String {
	if value.len() <= max_len {
		return value;
	}
	let mut cut = max_len;
	while !value.is_char_boundary(cut) {
		cut -= 1;
	}
	value.truncate(cut);
	value.push_str(ELLIPSIS);
	value
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_short_values_kept() {
		let args = Arguments::new(16).with("data_source", "CUSTOMERS").with("flags", 0);
		assert_eq!(args.get("data_source"), Some("CUSTOMERS"));
		assert_eq!(args.get("flags"), Some("0"));
		assert_eq!(args.to_string(), "data_source=CUSTOMERS, flags=0");
	}

	#[test]
	fn test_long_values_capped() {
		let args = Arguments::new(4).with("definition", "abcdefgh");
		assert_eq!(args.get("definition"), Some("abcd..."));
	}

	#[test]
	fn test_cut_respects_char_boundary() {
		// 'é' is two bytes, a cut at 2 would split it
		let args = Arguments::new(2).with("name", "aé");
		assert_eq!(args.get("name"), Some("a..."));
	}

	#[test]
	fn test_missing_argument() {
		let args = Arguments::new(8);
		assert!(args.is_empty());
		assert_eq!(args.get("nope"), None);
	}
}
