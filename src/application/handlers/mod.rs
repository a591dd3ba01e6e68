//! Application handlers.
//!
//! Command handlers that orchestrate the voting domain and its ports.

pub mod voting;

pub use voting::{
    ActionOutcome, CreateSessionCommand, CreateSessionHandler, CreateSessionResult,
    DeliveryReport, HandleActionHandler, InboundAction, NotificationDispatcher,
};
