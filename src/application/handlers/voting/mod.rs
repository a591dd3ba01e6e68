//! Voting command handlers.

mod create_session;
mod dispatcher;
mod handle_action;

pub use create_session::{CreateSessionCommand, CreateSessionHandler, CreateSessionResult};
pub use dispatcher::{DeliveryReport, NotificationDispatcher};
pub use handle_action::{ActionOutcome, HandleActionHandler, InboundAction};
