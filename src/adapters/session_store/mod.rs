//! Session store adapters.
//!
//! - `InMemorySessionStore` - single-process store with per-entry TTL
//! - `SessionSweeper` - background task purging expired entries

mod in_memory;
mod sweeper;

pub use in_memory::{InMemorySessionStore, DEFAULT_SESSION_TTL};
pub use sweeper::{SessionSweeper, DEFAULT_SWEEP_INTERVAL};
