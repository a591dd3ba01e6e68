//! Notifier adapters.
//!
//! - `ConsoleNotifier` - JSON lines on a writer, used by the local binary
//! - `RecordingNotifier` - captures deliveries for tests

mod console;
mod recording;

pub use console::ConsoleNotifier;
pub use recording::{DismissedMessage, RecordingNotifier, SentMessage};
