//! Voting domain module.
//!
//! Estimation voting sessions: invited voters opt in or skip, the owner
//! starts the vote, and the tally is revealed once every counted voter has
//! voted.
//!
//! # Components
//!
//! - `Voter` - participant state and vote
//! - `Tally` - closed detection, average and histogram
//! - `VotingSession` - the per-session state machine
//! - `Invitation` - parsing of the invitation command text
//! - `SessionAction` - routing of participant button presses

mod action;
mod errors;
mod invitation;
mod notifications;
mod session;
mod tally;
mod view;
mod vote;
mod voter;

pub use action::{encode_value, split_value, SessionAction, PARTICIPATE, SKIP, START, VOTE_PREFIX};
pub use errors::VotingError;
pub use invitation::Invitation;
pub use notifications::{Delivery, DeliveryLedger, Dismissal, Notifications};
pub use session::{SessionDetails, SessionPhase, VotingSession};
pub use tally::{Tally, TallySummary};
pub use view::{ActionButton, InvitationView, Payload, SessionView, VoterLine, VoterStatus};
pub use vote::{Vote, VoteDeck};
pub use voter::{ParticipationState, Voter};
