// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

/// No flags
pub const NO_FLAGS: i64 = 0;

/// Ask record mutations to return the affected entities
pub const WITH_INFO: i64 = 1 << 62;

/// Include the resolved entity's features in entity responses
pub const ENTITY_INCLUDE_ALL_FEATURES: i64 = 1 << 0;

/// Include record summaries in entity responses
pub const ENTITY_INCLUDE_RECORD_SUMMARY: i64 = 1 << 12;

/// Include the full record data in entity responses
pub const ENTITY_INCLUDE_RECORD_DATA: i64 = 1 << 14;

/// Default flags for entity retrieval
pub const ENTITY_DEFAULT_FLAGS: i64 = ENTITY_INCLUDE_RECORD_SUMMARY | ENTITY_INCLUDE_RECORD_DATA;

/// Default flags for exports
pub const EXPORT_DEFAULT_FLAGS: i64 = ENTITY_DEFAULT_FLAGS;

/// Default flags for attribute searches
pub const SEARCH_BY_ATTRIBUTES_DEFAULT_FLAGS: i64 = ENTITY_INCLUDE_RECORD_SUMMARY;

/// Helper to check if a flag is set
pub const fn has_flag(flags: i64, flag: i64) -> bool {
	flags & flag == flag
}
