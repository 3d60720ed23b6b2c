//! Observability subsystem.
//!
//! Structured `tracing` events from every subsystem, rendered by a
//! `tracing-subscriber` fmt layer. The server child's own output is
//! inherited untouched.

pub mod logging;

pub use logging::init_logging;
