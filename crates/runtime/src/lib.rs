// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Thread placement primitives for calls into the native engine.
//!
//! The engine records failures in thread-local state, so a call and the read
//! of its error must happen on the same OS thread. [`affinity::pinned`] makes
//! that pairing explicit, [`pool::PinnedPool`] lets async callers hand whole
//! calls to dedicated threads, and [`spawn::spawn_detached`] runs fire-and-forget
//! work isolated from the caller.

pub mod affinity;
pub mod pool;
pub mod spawn;

pub use affinity::{Affinity, pinned};
pub use pool::{PinnedPool, PoolError};
pub use spawn::spawn_detached;
