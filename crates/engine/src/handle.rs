// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Handle-based registry of native objects.
//!
//! Native handles are raw integers. Callers only ever see gateway ids minted
//! here; an id is looked up, used under its entry lock, and removed on close.
//! Ids are never reused, so a stale id fails the lookup instead of reaching a
//! different native object.

use std::{collections::HashMap, sync::Arc};

use erbridge_abi::HandleFFI;
use parking_lot::Mutex;

/// Gateway id of a registered native object
pub(crate) type HandleId = u64;

/// A registered native object.
#[derive(Debug)]
pub(crate) struct Entry<S> {
	pub(crate) native: HandleFFI,
	pub(crate) closed: bool,
	pub(crate) state: S,
}

pub(crate) type SharedEntry<S> = Arc<Mutex<Entry<S>>>;

pub(crate) struct HandleRegistry<S> {
	inner: Mutex<Inner<S>>,
}

struct Inner<S> {
	next_handle: HandleId,
	entries: HashMap<HandleId, SharedEntry<S>>,
}

impl<S> HandleRegistry<S> {
	pub(crate) fn new() -> Self {
		Self {
			inner: Mutex::new(Inner {
				next_handle: 1,
				entries: HashMap::new(),
			}),
		}
	}

	pub(crate) fn insert(&self, native: HandleFFI, state: S) -> HandleId {
		let mut inner = self.inner.lock();
		let handle = inner.next_handle;
		inner.next_handle += 1;
		inner.entries.insert(
			handle,
			Arc::new(Mutex::new(Entry {
				native,
				closed: false,
				state,
			})),
		);
		handle
	}

	pub(crate) fn get(&self, handle: HandleId) -> Option<SharedEntry<S>> {
		self.inner.lock().entries.get(&handle).cloned()
	}

	pub(crate) fn remove(&self, handle: HandleId) -> Option<SharedEntry<S>> {
		self.inner.lock().entries.remove(&handle)
	}

	pub(crate) fn len(&self) -> usize {
		self.inner.lock().entries.len()
	}

	/// Remove every entry, returning the native handles that were still open.
	pub(crate) fn drain(&self) -> Vec<HandleFFI> {
		let entries: Vec<_> = self.inner.lock().entries.drain().map(|(_, e)| e).collect();
		entries
			.into_iter()
			.filter_map(|entry| {
				let mut entry = entry.lock();
				if entry.closed {
					None
				} else {
					entry.closed = true;
					Some(entry.native)
				}
			})
			.collect()
	}
}
