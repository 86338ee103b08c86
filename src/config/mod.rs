//! Harness configuration.
//!
//! # Data Flow
//! ```text
//! harness.toml
//!     → loader.rs (read, parse, env overrides)
//!     → validation.rs (semantic checks)
//!     → HarnessConfig
//!     → retry policies, scenario settings, HTTP client
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration pointing at a local emulator.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError, ENDPOINT_ENV};
pub use schema::{EndpointConfig, HarnessConfig, RetryConfig, StreamConfig};
pub use validation::{validate_config, ValidationError};
