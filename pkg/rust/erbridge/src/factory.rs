// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use erbridge_engine::{Config, ConfigManager, Diagnostic, Engine, NativeLibrary, Product};
use erbridge_runtime::PinnedPool;
use erbridge_type::{Component, Error, Result};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{GatewayConfig, version::version_number};

type Slot<T> = Mutex<Option<Arc<T>>>;

/// Creates the facades of one loaded engine library.
///
/// Each facade is created and initialized on first request and shared
/// afterwards. [`destroy`](Self::destroy) tears down every facade created so
/// far; the factory hands out nothing after that.
pub struct Factory {
	library: Arc<NativeLibrary>,
	config: GatewayConfig,
	pool: PinnedPool,
	destroyed: AtomicBool,
	engine: Slot<Engine>,
	configmgr: Slot<ConfigManager>,
	config_documents: Slot<Config>,
	product: Slot<Product>,
	diagnostic: Slot<Diagnostic>,
}

impl Factory {
	/// Load the library named by `config.library_path`.
	pub fn new(config: GatewayConfig) -> Result<Self> {
		let path = config.library_path.clone().ok_or_else(|| Error::Config("library_path is not set".to_string()))?;
		let library = NativeLibrary::load(&path)?;
		Self::with_library(Arc::new(library), config)
	}

	/// Use an already loaded library.
	pub fn with_library(library: Arc<NativeLibrary>, config: GatewayConfig) -> Result<Self> {
		let pool = PinnedPool::new("erbridge-pinned", config.pinned_workers)?;
		info!(library = library.name(), instance = %config.instance_name, "factory ready");
		Ok(Self {
			library,
			config,
			pool,
			destroyed: AtomicBool::new(false),
			engine: Mutex::new(None),
			configmgr: Mutex::new(None),
			config_documents: Mutex::new(None),
			product: Mutex::new(None),
			diagnostic: Mutex::new(None),
		})
	}

	pub fn config(&self) -> &GatewayConfig {
		&self.config
	}

	pub fn library(&self) -> &Arc<NativeLibrary> {
		&self.library
	}

	pub fn is_destroyed(&self) -> bool {
		self.destroyed.load(Ordering::Acquire)
	}

	pub fn engine(&self) -> Result<Arc<Engine>> {
		self.get_or_init(Component::Engine, &self.engine, |library, config| {
			let engine = Engine::new(library, config.call_settings());
			engine.initialize(
				&config.instance_name,
				&config.settings,
				config.initial_config_id(),
				config.verbose_logging,
			)?;
			Ok(engine)
		})
	}

	pub fn config_manager(&self) -> Result<Arc<ConfigManager>> {
		self.get_or_init(Component::ConfigMgr, &self.configmgr, |library, config| {
			let manager = ConfigManager::new(library, config.call_settings());
			manager.initialize(&config.instance_name, &config.settings, config.verbose_logging)?;
			Ok(manager)
		})
	}

	/// In-memory configuration documents.
	pub fn configs(&self) -> Result<Arc<Config>> {
		self.get_or_init(Component::Config, &self.config_documents, |library, config| {
			let documents = Config::new(library, config.call_settings());
			documents.initialize(&config.instance_name, &config.settings, config.verbose_logging)?;
			Ok(documents)
		})
	}

	pub fn product(&self) -> Result<Arc<Product>> {
		self.get_or_init(Component::Product, &self.product, |library, config| {
			let product = Product::new(library, config.call_settings());
			product.initialize(&config.instance_name, &config.settings, config.verbose_logging)?;
			Ok(product)
		})
	}

	pub fn diagnostic(&self) -> Result<Arc<Diagnostic>> {
		self.get_or_init(Component::Diagnostic, &self.diagnostic, |library, config| {
			let diagnostic = Diagnostic::new(library, config.call_settings());
			diagnostic.initialize(
				&config.instance_name,
				&config.settings,
				config.initial_config_id(),
				config.verbose_logging,
			)?;
			Ok(diagnostic)
		})
	}

	/// The engine version as `MMmmPP`, e.g. 40103 for 4.1.3.
	pub fn engine_version(&self) -> Result<u32> {
		version_number(&self.product()?.get_version()?)
	}

	/// Switch the engine and diagnostic facades created so far to
	/// `config_id`.
	pub fn reinitialize(&self, config_id: i64) -> Result<()> {
		self.ensure_open(Component::Engine)?;
		if let Some(engine) = self.engine.lock().clone() {
			engine.reinitialize(config_id)?;
		}
		if let Some(diagnostic) = self.diagnostic.lock().clone() {
			diagnostic.reinitialize(config_id)?;
		}
		Ok(())
	}

	/// Run `f` to completion on a dedicated pinned thread.
	pub async fn run_pinned<R, F>(&self, f: F) -> Result<R>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		Ok(self.pool.run(f).await?)
	}

	/// Destroy every facade created by this factory. All facades are
	/// attempted; the first failure is returned.
	pub fn destroy(&self) -> Result<()> {
		if self.destroyed.swap(true, Ordering::AcqRel) {
			return Ok(());
		}

		let mut first = None;
		let mut record = |component: Component, result: Result<()>| {
			if let Err(err) = result {
				warn!(%component, error = %err, "facade destroy failed");
				first.get_or_insert(err);
			}
		};

		if let Some(engine) = self.engine.lock().take() {
			record(Component::Engine, engine.destroy());
		}
		if let Some(diagnostic) = self.diagnostic.lock().take() {
			record(Component::Diagnostic, diagnostic.destroy());
		}
		if let Some(documents) = self.config_documents.lock().take() {
			record(Component::Config, documents.destroy());
		}
		if let Some(manager) = self.configmgr.lock().take() {
			record(Component::ConfigMgr, manager.destroy());
		}
		if let Some(product) = self.product.lock().take() {
			record(Component::Product, product.destroy());
		}

		info!(library = self.library.name(), "factory destroyed");
		first.map_or(Ok(()), Err)
	}

	fn ensure_open(&self, component: Component) -> Result<()> {
		if self.is_destroyed() {
			return Err(Error::Destroyed {
				component,
			});
		}
		Ok(())
	}

	/// A failed initialization leaves the slot empty, so the next request
	/// tries again.
	fn get_or_init<T, F>(&self, component: Component, slot: &Slot<T>, create: F) -> Result<Arc<T>>
	where
		F: FnOnce(Arc<NativeLibrary>, &GatewayConfig) -> Result<T>,
	{
		self.ensure_open(component)?;
		let mut slot = slot.lock();
		if let Some(existing) = slot.as_ref() {
			return Ok(existing.clone());
		}
		let created = Arc::new(create(self.library.clone(), &self.config)?);
		debug!(%component, "facade initialized");
		*slot = Some(created.clone());
		Ok(created)
	}
}

impl Drop for Factory {
	fn drop(&mut self) {
		if !self.is_destroyed() {
			if let Err(err) = self.destroy() {
				warn!(error = %err, "factory teardown failed");
			}
		}
	}
}
