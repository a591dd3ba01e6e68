//! Voteish - Planning-poker estimation sessions for chat workspaces
//!
//! A chat command invites the mentioned users to estimate a piece of work.
//! Participants opt in or skip, the session is started, everyone votes, and
//! the average and distribution are revealed once every counted voter has
//! answered.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
