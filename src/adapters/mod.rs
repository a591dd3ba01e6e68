//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `session_store` - In-memory session registry with expiry
//! - `notifier` - Outbound message delivery (console, recording)
//! - `console` - Inbound events read as JSON lines

pub mod console;
pub mod notifier;
pub mod session_store;

pub use console::{ConsoleEvent, ConsoleEventSource};
pub use notifier::{ConsoleNotifier, DismissedMessage, RecordingNotifier, SentMessage};
pub use session_store::{
    InMemorySessionStore, SessionSweeper, DEFAULT_SESSION_TTL, DEFAULT_SWEEP_INTERVAL,
};
