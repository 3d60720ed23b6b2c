//! Source watching for automatic restarts.
//!
//! # Data Flow
//! ```text
//! notify event (own thread)
//!     → watcher.rs (content changes only, path relative to watched dir)
//!     → filter.rs (include/exclude globs)
//!     → unbounded mpsc
//!     → Debouncer (quiet period, de-duplicated batch)
//!     → supervisor restarts the server child
//! ```

pub mod filter;
pub mod watcher;

pub use filter::WatchFilter;
pub use watcher::{Debouncer, SourceWatcher};
