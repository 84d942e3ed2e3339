// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wait utilities for testing
//!
//! Notifications are delivered on detached threads, so tests poll for the
//! expected state instead of sleeping for a fixed time.

use std::{
	thread,
	time::{Duration, Instant},
};

use tokio::time::sleep;

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default poll interval (1 millisecond)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Block until `condition` holds, polling at `poll_interval`.
///
/// # Panics
/// Panics if the condition doesn't become true within `timeout`
pub fn wait_until_timeout<F>(condition: F, timeout: Duration, poll_interval: Duration, timeout_message: &str)
where
	F: Fn() -> bool,
{
	let start = Instant::now();
	while !condition() {
		if start.elapsed() > timeout {
			panic!("Timeout after {:?}: {}", timeout, timeout_message);
		}
		thread::sleep(poll_interval);
	}
}

/// Block until `condition` holds, with the default timeout
pub fn wait_until<F>(condition: F, message: &str)
where
	F: Fn() -> bool,
{
	wait_until_timeout(condition, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL, message);
}

/// Wait for a condition to become true without blocking the executor
///
/// # Panics
/// Panics if the condition doesn't become true within the timeout period
pub async fn wait_for_condition<F>(condition: F, timeout: Duration, poll_interval: Duration, timeout_message: &str)
where
	F: Fn() -> bool,
{
	let start = Instant::now();
	while !condition() {
		if start.elapsed() > timeout {
			panic!("Timeout after {:?}: {}", timeout, timeout_message);
		}
		sleep(poll_interval).await;
	}
}

/// Wait for a condition with default timeout and poll interval
pub async fn wait_for<F>(condition: F, message: &str)
where
	F: Fn() -> bool,
{
	wait_for_condition(condition, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL, message).await;
}
