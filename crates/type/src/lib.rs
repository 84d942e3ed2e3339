// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

pub mod arguments;
pub mod component;
pub mod error;
pub mod handle;

pub use arguments::Arguments;
pub use component::Component;
pub use error::{Diagnostic, EngineError, Error, ObserverError};
pub use handle::{ConfigHandle, ExportHandle, HandleKind};

pub type Result<T> = std::result::Result<T, Error>;
