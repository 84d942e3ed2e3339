// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Logging bootstrap for erbridge.
//!
//! [`TracingBuilder`] installs a `tracing-subscriber` stack: an env filter
//! behind a reload layer, then plain or JSON formatting. The returned
//! [`LogLevelHandle`] changes the filter while the process runs.

mod builder;
mod handle;

pub use builder::{LogFormat, TracingBuilder};
pub use handle::LogLevelHandle;
