//! VotingSession aggregate.
//!
//! A session owns its voters and enforces the participation protocol:
//! voters are invited, opt in or skip, the session is started, and
//! participants vote until everyone counted has voted.
//!
//! Every command returns [`Notifications`] describing what must be sent.
//! Nothing here performs I/O, so a command can run under the session lock
//! and the caller delivers the plan after releasing it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    ChannelId, ResponseHandle, SessionId, StateMachine, Timestamp, UserId,
};

use super::action::SessionAction;
use super::errors::VotingError;
use super::notifications::{Delivery, Dismissal, Notifications};
use super::tally::Tally;
use super::view::{ActionButton, InvitationView, Payload, SessionView, VoterLine, VoterStatus};
use super::vote::VoteDeck;
use super::voter::{ParticipationState, Voter};

/// Session-level phase. `Active` once the owner started the vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Created,
    Active,
}

impl StateMachine for SessionPhase {
    fn successors(&self) -> &'static [Self] {
        match self {
            SessionPhase::Created => &[SessionPhase::Active],
            SessionPhase::Active => &[],
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPhase::Created => "Created",
            SessionPhase::Active => "Active",
        };
        write!(f, "{}", s)
    }
}

/// Immutable metadata supplied when a session is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetails {
    pub channel: ChannelId,
    pub message: String,
    /// Display name of the invoker.
    pub owner: String,
    pub owner_id: UserId,
}

/// One round of estimation voting.
///
/// # Invariants
///
/// - `id` and the session details never change
/// - `voters` is non-empty and keyed uniquely by user id, in invitation order
/// - the phase never returns to `Created`
/// - invitations are produced at most once
/// - every plan carries a revision greater than the previous plan's
#[derive(Debug, Clone, Serialize)]
pub struct VotingSession {
    id: SessionId,
    channel: ChannelId,
    message: String,
    owner: String,
    owner_id: UserId,
    phase: SessionPhase,
    voters: Vec<Voter>,
    deck: VoteDeck,
    invited: bool,
    revision: u64,
    created_at: Timestamp,
}

impl VotingSession {
    /// Creates a session for the given participants.
    ///
    /// Repeated participants are kept once, at their first position.
    ///
    /// # Errors
    ///
    /// - `NoParticipants` if `participants` is empty
    pub fn new(
        id: SessionId,
        details: SessionDetails,
        participants: impl IntoIterator<Item = (UserId, String)>,
        deck: VoteDeck,
    ) -> Result<Self, VotingError> {
        let mut voters: Vec<Voter> = Vec::new();
        for (user_id, mention) in participants {
            if voters.iter().all(|v| v.user_id() != &user_id) {
                voters.push(Voter::invited(user_id, mention));
            }
        }
        if voters.is_empty() {
            return Err(VotingError::NoParticipants);
        }

        Ok(Self {
            id,
            channel: details.channel,
            message: details.message,
            owner: details.owner,
            owner_id: details.owner_id,
            phase: SessionPhase::Created,
            voters,
            deck,
            invited: false,
            revision: 0,
            created_at: Timestamp::now(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn deck(&self) -> &VoteDeck {
        &self.deck
    }

    /// Revision of the most recent plan; zero before any command ran.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// All invited voters in invitation order.
    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    pub fn voter(&self, user_id: &UserId) -> Option<&Voter> {
        self.voters.iter().find(|v| v.user_id() == user_id)
    }

    fn voter_mut(&mut self, user_id: &UserId) -> Option<&mut Voter> {
        self.voters.iter_mut().find(|v| v.user_id() == user_id)
    }

    /// Voters that have not skipped. They receive renders and are tallied.
    pub fn counted_voters(&self) -> impl Iterator<Item = &Voter> {
        self.voters.iter().filter(|v| v.state().is_counted())
    }

    pub fn tally(&self) -> Tally {
        Tally::compute(self.counted_voters())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Sends the participate/skip choice to every invited voter.
    ///
    /// Only the first call produces deliveries.
    pub fn invite(&mut self) -> Notifications {
        let mut notifications = self.notifications();
        if std::mem::replace(&mut self.invited, true) {
            return notifications;
        }

        let view = InvitationView {
            session_id: self.id,
            owner: self.owner.clone(),
            message: self.message.clone(),
            actions: vec![
                ActionButton::new(self.id, &SessionAction::Participate, "Participate"),
                ActionButton::new(self.id, &SessionAction::Skip, "Skip"),
            ],
        };
        notifications.deliveries = self
            .voters
            .iter()
            .map(|voter| Delivery {
                recipient: voter.user_id().clone(),
                replace: None,
                payload: Payload::Invitation(view.clone()),
                track_handle: false,
            })
            .collect();
        notifications
    }

    /// Starts voting. Voters who never answered are skipped.
    ///
    /// Safe to call again: later calls only re-render.
    pub fn start(&mut self) -> Notifications {
        if let Ok(next) = self.phase.transition_to(SessionPhase::Active) {
            self.phase = next;
        }
        for voter in &mut self.voters {
            voter.skip_if_unanswered();
        }
        self.render_all()
    }

    /// Dismisses the voter's invitation and takes them out of the vote.
    ///
    /// Unknown voters only get the dismissal. No re-render is produced.
    pub fn skip(&mut self, user_id: &UserId, handle: ResponseHandle) -> Notifications {
        let mut notifications = self.notifications();
        notifications.dismissals.push(Dismissal {
            recipient: user_id.clone(),
            handle,
        });
        if let Some(voter) = self.voter_mut(user_id) {
            voter.skip();
        }
        notifications
    }

    /// Marks the voter as participating and re-renders for everyone.
    ///
    /// The re-render happens even when the voter is unknown or has already
    /// skipped; in those cases the voter's state is left alone.
    pub fn opt_in(&mut self, user_id: &UserId, handle: ResponseHandle) -> Notifications {
        if let Some(voter) = self.voter_mut(user_id) {
            voter.opt_in(handle);
        }
        self.render_all()
    }

    /// Stores the vote verbatim and re-renders for everyone.
    ///
    /// No numeric validation happens here; non-numeric votes are excluded
    /// from the average by the tally.
    pub fn cast_vote(&mut self, user_id: &UserId, value: &str) -> Notifications {
        if let Some(voter) = self.voter_mut(user_id) {
            voter.cast(value);
        }
        self.render_all()
    }

    /// Applies a routed participant action.
    pub fn apply(
        &mut self,
        action: &SessionAction,
        user_id: &UserId,
        handle: ResponseHandle,
    ) -> Notifications {
        match action {
            SessionAction::Participate => self.opt_in(user_id, handle),
            SessionAction::Skip => self.skip(user_id, handle),
            SessionAction::Start => self.start(),
            SessionAction::Vote(value) => self.cast_vote(user_id, value),
        }
    }

    /// Records the surface returned for a delivery.
    ///
    /// The handle is only replaced if the voter still holds `used`, so a
    /// newer handle stored concurrently (e.g. by an opt-in) wins.
    pub fn record_response_handle(
        &mut self,
        user_id: &UserId,
        used: Option<&ResponseHandle>,
        handle: ResponseHandle,
    ) -> bool {
        self.voter_mut(user_id)
            .map(|voter| voter.refresh_handle(used, handle))
            .unwrap_or(false)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Builds the status view for every counted voter.
    ///
    /// The owner additionally gets the start control while the session has
    /// not started; otherwise all recipients see the same view.
    pub fn render_all(&mut self) -> Notifications {
        let view = self.status_view();
        let mut notifications = self.notifications();

        notifications.deliveries = self
            .counted_voters()
            .map(|voter| {
                let mut view = view.clone();
                if voter.user_id() == &self.owner_id && !self.is_started() {
                    view.control = Some(ActionButton::new(self.id, &SessionAction::Start, "Start"));
                }
                Delivery {
                    recipient: voter.user_id().clone(),
                    replace: voter.response_handle().cloned(),
                    payload: Payload::Status(view),
                    track_handle: true,
                }
            })
            .collect();
        notifications
    }

    fn status_view(&self) -> SessionView {
        let tally = self.tally();
        let revealed = self.is_started() && tally.is_closed();

        let voters = self
            .counted_voters()
            .map(|voter| {
                let status = if revealed {
                    VoterStatus::Revealed {
                        vote: voter.vote().map(|v| v.to_string()).unwrap_or_default(),
                    }
                } else if voter.state() == ParticipationState::Unknown {
                    VoterStatus::Pending
                } else if voter.has_voted() {
                    VoterStatus::Voted
                } else {
                    VoterStatus::Ready
                };
                VoterLine {
                    user_id: voter.user_id().clone(),
                    mention: voter.mention().to_string(),
                    status,
                }
            })
            .collect();

        let vote_actions = if self.is_started() && !revealed {
            self.deck
                .options()
                .iter()
                .map(|option| {
                    let label = option.to_string();
                    ActionButton::new(self.id, &SessionAction::Vote(label.clone()), label)
                })
                .collect()
        } else {
            Vec::new()
        };

        SessionView {
            session_id: self.id,
            owner: self.owner.clone(),
            message: self.message.clone(),
            started: self.is_started(),
            voters,
            summary: if revealed { tally.summary() } else { None },
            vote_actions,
            control: None,
        }
    }

    fn notifications(&mut self) -> Notifications {
        self.revision += 1;
        Notifications::new(self.id, self.channel.clone(), self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voting::Vote;
    use std::collections::BTreeMap;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn handle(s: &str) -> ResponseHandle {
        ResponseHandle::new(s).unwrap()
    }

    fn session_with(owner: &str, participants: &[&str]) -> VotingSession {
        VotingSession::new(
            SessionId::new(),
            SessionDetails {
                channel: ChannelId::new("C1").unwrap(),
                message: "Estimate PROJ-42".into(),
                owner: owner.to_lowercase(),
                owner_id: uid(owner),
            },
            participants
                .iter()
                .map(|p| (uid(p), format!("<@{}>", p))),
            VoteDeck::default(),
        )
        .unwrap()
    }

    fn state_of(session: &VotingSession, user: &str) -> ParticipationState {
        session.voter(&uid(user)).unwrap().state()
    }

    fn status_view(notifications: &Notifications, user: &str) -> SessionView {
        let delivery = notifications
            .deliveries
            .iter()
            .find(|d| d.recipient == uid(user))
            .expect("no delivery for user");
        match &delivery.payload {
            Payload::Status(view) => view.clone(),
            other => panic!("expected status payload, got {:?}", other),
        }
    }

    // ─── Creation ─────────────────────────────────────────────────────

    #[test]
    fn new_requires_participants() {
        let result = VotingSession::new(
            SessionId::new(),
            SessionDetails {
                channel: ChannelId::new("C1").unwrap(),
                message: String::new(),
                owner: "o".into(),
                owner_id: uid("O"),
            },
            Vec::new(),
            VoteDeck::default(),
        );
        assert!(matches!(result, Err(VotingError::NoParticipants)));
    }

    #[test]
    fn new_collapses_repeated_participants() {
        let session = session_with("O", &["A", "B", "A"]);
        let ids: Vec<_> = session.voters().iter().map(|v| v.user_id().as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn new_session_is_created_with_unknown_voters() {
        let session = session_with("O", &["A", "B"]);
        assert_eq!(session.phase(), SessionPhase::Created);
        assert!(session
            .voters()
            .iter()
            .all(|v| v.state() == ParticipationState::Unknown));
    }

    // ─── Invite ───────────────────────────────────────────────────────

    #[test]
    fn invite_reaches_every_voter_once() {
        let mut session = session_with("O", &["A", "B"]);
        let first = session.invite();

        assert_eq!(first.recipients(), vec![&uid("A"), &uid("B")]);
        assert!(first.deliveries.iter().all(|d| !d.track_handle && d.replace.is_none()));
        match &first.deliveries[0].payload {
            Payload::Invitation(view) => {
                let ids: Vec<_> = view.actions.iter().map(|a| a.action_id.as_str()).collect();
                assert_eq!(ids, vec!["participate", "skip"]);
            }
            other => panic!("expected invitation, got {:?}", other),
        }

        assert!(session.invite().is_empty());
    }

    // ─── Opt in ───────────────────────────────────────────────────────

    #[test]
    fn opt_in_marks_participating_and_renders() {
        let mut session = session_with("O", &["A", "B"]);
        let notifications = session.opt_in(&uid("A"), handle("hA"));

        assert_eq!(state_of(&session, "A"), ParticipationState::Participating);
        // B is still unknown, so still counted and still rendered to.
        assert_eq!(notifications.recipients(), vec![&uid("A"), &uid("B")]);
        let to_a = &notifications.deliveries[0];
        assert_eq!(to_a.replace, Some(handle("hA")));
        assert!(to_a.track_handle);
    }

    #[test]
    fn opt_in_unknown_voter_still_renders() {
        let mut session = session_with("O", &["A"]);
        let notifications = session.opt_in(&uid("Z"), handle("hZ"));

        assert!(session.voter(&uid("Z")).is_none());
        assert_eq!(notifications.recipients(), vec![&uid("A")]);
    }

    #[test]
    fn opt_in_after_skip_does_not_revive_voter() {
        let mut session = session_with("O", &["A", "B"]);
        session.skip(&uid("A"), handle("hA"));
        let notifications = session.opt_in(&uid("A"), handle("hA2"));

        assert_eq!(state_of(&session, "A"), ParticipationState::Skipped);
        assert_eq!(notifications.recipients(), vec![&uid("B")]);
    }

    // ─── Skip ─────────────────────────────────────────────────────────

    #[test]
    fn skip_dismisses_and_does_not_render() {
        let mut session = session_with("O", &["A", "B"]);
        let notifications = session.skip(&uid("A"), handle("hA"));

        assert_eq!(state_of(&session, "A"), ParticipationState::Skipped);
        assert!(notifications.deliveries.is_empty());
        assert_eq!(
            notifications.dismissals,
            vec![Dismissal {
                recipient: uid("A"),
                handle: handle("hA")
            }]
        );
    }

    #[test]
    fn skip_unknown_voter_only_dismisses() {
        let mut session = session_with("O", &["A"]);
        let notifications = session.skip(&uid("Z"), handle("hZ"));

        assert_eq!(notifications.dismissals.len(), 1);
        assert_eq!(state_of(&session, "A"), ParticipationState::Unknown);
    }

    // ─── Start ────────────────────────────────────────────────────────

    #[test]
    fn start_skips_unanswered_voters() {
        let mut session = session_with("A", &["A", "B"]);
        session.opt_in(&uid("A"), handle("hA"));
        let notifications = session.start();

        assert!(session.is_started());
        assert_eq!(state_of(&session, "B"), ParticipationState::Skipped);
        assert_eq!(notifications.recipients(), vec![&uid("A")]);
        assert_eq!(session.tally().eligible(), 1);
        assert!(session
            .voters()
            .iter()
            .all(|v| v.state() != ParticipationState::Unknown));
    }

    #[test]
    fn start_is_idempotent() {
        let mut once = session_with("A", &["A", "B", "C"]);
        once.opt_in(&uid("A"), handle("hA"));
        once.opt_in(&uid("C"), handle("hC"));
        let mut twice = once.clone();

        once.start();
        twice.start();
        twice.start();

        let states = |s: &VotingSession| -> Vec<ParticipationState> {
            s.voters().iter().map(|v| v.state()).collect()
        };
        assert_eq!(states(&once), states(&twice));
        assert_eq!(twice.phase(), SessionPhase::Active);
    }

    #[test]
    fn skipped_voter_stays_skipped_after_start() {
        let mut session = session_with("A", &["A", "B"]);
        session.skip(&uid("B"), handle("hB"));
        session.start();
        assert_eq!(state_of(&session, "B"), ParticipationState::Skipped);
    }

    // ─── Rendering ────────────────────────────────────────────────────

    #[test]
    fn owner_gets_start_control_before_start_only() {
        let mut session = session_with("A", &["A", "B"]);
        let before = session.opt_in(&uid("A"), handle("hA"));

        let owner_view = status_view(&before, "A");
        let other_view = status_view(&before, "B");
        assert_eq!(owner_view.control.as_ref().unwrap().action_id, "start");
        assert!(other_view.control.is_none());
        assert!(owner_view.vote_actions.is_empty());

        let after = session.start();
        assert!(status_view(&after, "A").control.is_none());
    }

    #[test]
    fn vote_buttons_follow_the_deck_while_open() {
        let mut session = session_with("A", &["A"]);
        session.opt_in(&uid("A"), handle("hA"));
        let view = status_view(&session.start(), "A");

        let labels: Vec<_> = view.vote_actions.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "3", "5", "8", "13", "21", "100"]);
        assert_eq!(view.vote_actions[0].value, format!("{}|1", session.id()));
        assert!(view.summary.is_none());
    }

    #[test]
    fn voter_statuses_track_progress() {
        let mut session = session_with("O", &["A", "B", "C"]);
        session.opt_in(&uid("A"), handle("hA"));
        session.opt_in(&uid("B"), handle("hB"));
        let notifications = session.cast_vote(&uid("B"), "5");

        let statuses: Vec<_> = status_view(&notifications, "A")
            .voters
            .into_iter()
            .map(|line| line.status)
            .collect();
        assert_eq!(
            statuses,
            vec![VoterStatus::Ready, VoterStatus::Voted, VoterStatus::Pending]
        );
    }

    #[test]
    fn full_round_reveals_votes_and_summary() {
        let mut session = session_with("A", &["A", "B"]);
        session.opt_in(&uid("A"), handle("hA"));
        session.opt_in(&uid("B"), handle("hB"));
        session.start();
        session.cast_vote(&uid("A"), "3");
        let notifications = session.cast_vote(&uid("B"), "5");

        let tally = session.tally();
        assert!(tally.is_closed());
        assert_eq!(tally.average(), Some(4.0));
        assert_eq!(tally.histogram(), BTreeMap::from([(3, 1), (5, 1)]));

        let view = status_view(&notifications, "B");
        let summary = view.summary.unwrap();
        assert_eq!(summary.average, Some(4.0));
        assert!(view.vote_actions.is_empty());
        assert_eq!(
            view.voters[1].status,
            VoterStatus::Revealed { vote: "5".into() }
        );
    }

    #[test]
    fn cast_vote_is_stored_verbatim() {
        let mut session = session_with("A", &["A"]);
        session.opt_in(&uid("A"), handle("hA"));
        session.cast_vote(&uid("A"), "xl");
        assert_eq!(
            session.voter(&uid("A")).unwrap().vote(),
            Some(&Vote::Raw("xl".into()))
        );
    }

    #[test]
    fn cast_vote_by_unknown_voter_is_ignored_but_renders() {
        let mut session = session_with("A", &["A"]);
        let notifications = session.cast_vote(&uid("Z"), "3");
        assert!(session.voter(&uid("Z")).is_none());
        assert_eq!(notifications.recipients(), vec![&uid("A")]);
    }

    // ─── Handles ──────────────────────────────────────────────────────

    #[test]
    fn record_response_handle_respects_newer_handles() {
        let mut session = session_with("A", &["A"]);
        session.opt_in(&uid("A"), handle("h1"));

        assert!(session.record_response_handle(&uid("A"), Some(&handle("h1")), handle("h2")));
        assert!(!session.record_response_handle(&uid("A"), Some(&handle("h1")), handle("h3")));
        assert_eq!(
            session.voter(&uid("A")).unwrap().response_handle(),
            Some(&handle("h2"))
        );
        assert!(!session.record_response_handle(&uid("Z"), None, handle("h4")));
    }

    #[test]
    fn apply_routes_to_commands() {
        let mut session = session_with("A", &["A", "B"]);
        session.apply(&SessionAction::Participate, &uid("A"), handle("hA"));
        session.apply(&SessionAction::Skip, &uid("B"), handle("hB"));
        session.apply(&SessionAction::Start, &uid("A"), handle("hA"));
        session.apply(&SessionAction::Vote("8".into()), &uid("A"), handle("hA"));

        assert!(session.is_started());
        assert_eq!(state_of(&session, "B"), ParticipationState::Skipped);
        assert_eq!(session.tally().votes(), &[8]);
    }

    #[test]
    fn every_plan_gets_a_newer_revision() {
        let mut session = session_with("A", &["A", "B"]);
        assert_eq!(session.revision(), 0);

        let invite = session.invite();
        let opt_in = session.opt_in(&uid("A"), handle("h1"));
        let skip = session.skip(&uid("B"), handle("h2"));
        let start = session.start();

        assert!(invite.revision < opt_in.revision);
        assert!(opt_in.revision < skip.revision);
        assert!(skip.revision < start.revision);
        assert_eq!(session.revision(), start.revision);
    }
}
