//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! launcher.toml (optional)
//!     → loader.rs (read & deserialize, defaults for missing sections)
//!     → CLI overrides (cli.rs)
//!     → validation.rs (semantic checks, all errors at once)
//!     → LauncherConfig (immutable from here on)
//! ```
//!
//! # Design Decisions
//! - Every field has a default; an absent file reproduces the stock launcher
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{LauncherConfig, ObservabilityConfig, ReloadConfig, RuntimeConfig, ServerConfig};
pub use validation::ValidationError;
