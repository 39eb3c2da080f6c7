//! Client-side state and validation for the CRM service.
//!
//! - [`domain`]: entities, validation, stores and ports.
//! - [`outbound`]: HTTP, storage and timer adapters for those ports.
//! - [`config`]: `CRM_*` settings.
//! - [`context`]: the per-process owner of every store.

pub mod config;
pub mod context;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ClientSettings, ConfigError};
pub use context::{ActionError, AppContext, AppPorts, ContextError};
