// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Thread affinity guard.
//!
//! An [`Affinity`] token proves that the code holding it runs on the OS thread
//! the token was created on. The token is neither `Send` nor `Sync`, so it
//! cannot be moved to another thread, and a future holding it across an
//! `.await` is not `Send` and is rejected by multi-threaded executors.

use std::{
	marker::PhantomData,
	thread::{self, ThreadId},
};

/// Proof of being pinned to one OS thread for the duration of a scope.
#[derive(Debug)]
pub struct Affinity {
	thread: ThreadId,
	_pinned: PhantomData<*const ()>,
}

impl Affinity {
	/// The thread this token is bound to.
	pub fn thread_id(&self) -> ThreadId {
		self.thread
	}

	/// Whether the caller runs on the bound thread.
	pub fn is_current(&self) -> bool {
		thread::current().id() == self.thread
	}

	/// Panics in debug builds if the caller is not on the bound thread.
	#[inline]
	pub fn debug_assert_current(&self) {
		debug_assert!(self.is_current(), "affinity token used off its thread");
	}
}

/// Run `f` pinned to the calling OS thread.
///
/// Everything `f` does with the token, in particular a native call and the
/// read of its thread-local error state, happens on one thread.
pub fn pinned<R, F>(f: F) -> R
where
	F: FnOnce(&Affinity) -> R,
{
	let affinity = Affinity {
		thread: thread::current().id(),
		_pinned: PhantomData,
	};
	f(&affinity)
}
