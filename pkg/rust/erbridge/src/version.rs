// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use erbridge_type::{Error, Result};
use serde::Deserialize;

#[derive(Deserialize)]
struct VersionDocument {
	#[serde(rename = "VERSION")]
	version: String,
}

/// Encode the `VERSION` of a product version document as `MMmmPP`, so
/// 4.1.3 becomes 40103. Each part must be below 100.
pub fn version_number(version_json: &str) -> Result<u32> {
	let document: VersionDocument =
		serde_json::from_str(version_json).map_err(|e| Error::Config(format!("invalid version document: {e}")))?;

	let invalid = || Error::Config(format!("invalid engine version '{}'", document.version));
	let mut parts = document.version.split('.').map(|part| part.trim().parse::<u32>());
	let mut next = || match parts.next() {
		Some(Ok(part)) if part < 100 => Ok(part),
		_ => Err(invalid()),
	};
	let (major, minor, patch) = (next()?, next()?, next()?);
	Ok(major * 10_000 + minor * 100 + patch)
}
