// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! A small pool of dedicated OS threads.
//!
//! Each submitted job runs start to finish on one worker thread, so a job that
//! makes a native call and then reads thread-local error state sees its own
//! state. Async callers await the result through a oneshot channel without
//! blocking the executor.

use std::{
	panic::{AssertUnwindSafe, catch_unwind},
	thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::spawn::panic_message;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PoolError {
	#[error("pinned pool '{0}' is shut down")]
	Closed(String),

	#[error("failed to spawn pinned worker: {0}")]
	Spawn(String),

	#[error("job panicked on pinned worker: {0}")]
	Panicked(String),
}

pub struct PinnedPool {
	name: String,
	sender: Option<Sender<Job>>,
	workers: Vec<JoinHandle<()>>,
}

impl PinnedPool {
	pub fn new(name: impl Into<String>, threads: usize) -> Result<Self, PoolError> {
		let name = name.into();
		let threads = threads.max(1);
		let (sender, receiver) = unbounded::<Job>();

		let mut workers = Vec::with_capacity(threads);
		for idx in 0..threads {
			let rx = receiver.clone();
			let handle = thread::Builder::new()
				.name(format!("{name}-{idx}"))
				.spawn(move || worker_loop(rx))
				.map_err(|e| PoolError::Spawn(e.to_string()))?;
			workers.push(handle);
		}

		debug!(pool = %name, threads, "pinned pool started");

		Ok(Self {
			name,
			sender: Some(sender),
			workers,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn threads(&self) -> usize {
		self.workers.len()
	}

	/// Run `f` on a worker and block until it completes.
	pub fn execute<R, F>(&self, f: F) -> Result<R, PoolError>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		let (tx, rx) = crossbeam_channel::bounded(1);
		self.submit(Box::new(move || {
			let _ = tx.send(catch_unwind(AssertUnwindSafe(f)));
		}))?;
		match rx.recv() {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(panic)) => Err(PoolError::Panicked(panic_message(panic.as_ref()))),
			Err(_) => Err(PoolError::Closed(self.name.clone())),
		}
	}

	/// Run `f` on a worker and await its result.
	pub async fn run<R, F>(&self, f: F) -> Result<R, PoolError>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		let (tx, rx) = oneshot::channel();
		self.submit(Box::new(move || {
			let _ = tx.send(catch_unwind(AssertUnwindSafe(f)));
		}))?;
		match rx.await {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(panic)) => Err(PoolError::Panicked(panic_message(panic.as_ref()))),
			Err(_) => Err(PoolError::Closed(self.name.clone())),
		}
	}

	fn submit(&self, job: Job) -> Result<(), PoolError> {
		let sender = self.sender.as_ref().ok_or_else(|| PoolError::Closed(self.name.clone()))?;
		sender.send(job).map_err(|_| PoolError::Closed(self.name.clone()))
	}
}

impl Drop for PinnedPool {
	fn drop(&mut self) {
		// closing the channel ends every worker loop
		self.sender.take();
		for worker in self.workers.drain(..) {
			if worker.join().is_err() {
				warn!(pool = %self.name, "pinned worker exited with panic");
			}
		}
		debug!(pool = %self.name, "pinned pool stopped");
	}
}

fn worker_loop(receiver: Receiver<Job>) {
	while let Ok(job) = receiver.recv() {
		job();
	}
}
