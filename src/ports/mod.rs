//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `Notifier` - delivers rendered payloads to participants
//! - `SessionStore` - expiring registry of live sessions

mod notifier;
mod session_store;

pub use notifier::{Notifier, NotifierError};
pub use session_store::{SessionCell, SessionStore, SharedSession};
