// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Test support for erbridge.
//!
//! [`native::Simulator`] is an in-process stand-in for the native engine. It
//! exports the same C ABI function tables, keeps last-exception state in real
//! thread-locals and can be told to fail. Each const-generic slot owns
//! independent state, so tests running in parallel never share an engine.

pub mod native;
pub mod observer;
pub mod util;

pub use native::{Failure, Simulator};
pub use observer::{BlockingObserver, CountingObserver, RecordingObserver};
