//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, timestamps, state machines)
//! - `voting` - Voting session aggregate, tally and rendered views

pub mod foundation;
pub mod voting;
