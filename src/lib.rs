//! RA Automator launcher.
//!
//! Bootstraps the process for the RA Automator backend and hands it to a
//! server runtime with restart-on-change.
//!
//! # Architecture Overview
//!
//! ```text
//!   cli ──▶ config ──▶ bootstrap ──▶ LaunchPlan ──▶ server::start_server
//!                      (root, search path,            │
//!                       env, working dir)             ▼
//!                                             ProcessRuntime ──▶ supervisor ──▶ server child
//!                                                                    ▲
//!                                          reload (notify + globs) ──┘
//!
//!   lifecycle: signals ──▶ Shutdown ──▶ supervisor stops the child
//!   observability: tracing subscriber
//! ```

// Core subsystems
pub mod bootstrap;
pub mod config;
pub mod server;

// Reload
pub mod reload;

// Cross-cutting concerns
pub mod cli;
pub mod lifecycle;
pub mod observability;

pub use bootstrap::LaunchPlan;
pub use config::LauncherConfig;
pub use lifecycle::Shutdown;
pub use server::{ProcessRuntime, ServerRuntime};
