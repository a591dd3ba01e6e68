//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    ActionOutcome, CreateSessionCommand, CreateSessionHandler, CreateSessionResult,
    DeliveryReport, HandleActionHandler, InboundAction, NotificationDispatcher,
};
