//! Parsing of the invitation command text.
//!
//! The command text is a free-form message followed by participant
//! mentions, e.g. `Estimate PROJ-42 <@U024BE7LH|alice> <@U0G9QF9C6>`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::foundation::UserId;

/// Matches `<@ID>` and `<@ID|display.name>` mentions.
static MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<@([A-Z0-9-]+)\|*([a-zA-Z0-9\-_.]*)>").expect("mention pattern is valid")
});

/// Message and participants extracted from the command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    /// Text before the first mention, trimmed.
    pub message: String,
    /// `(user id, mention as written)`, in order of appearance, without repeats.
    pub participants: Vec<(UserId, String)>,
}

impl Invitation {
    /// Extracts the invitation, or `None` when nobody is mentioned.
    pub fn parse(text: &str) -> Option<Self> {
        let mut participants: Vec<(UserId, String)> = Vec::new();
        let mut message_end = None;

        for captures in MENTION.captures_iter(text) {
            let whole = captures.get(0)?;
            message_end.get_or_insert(whole.start());

            let Ok(user_id) = UserId::new(&captures[1]) else {
                continue;
            };
            if participants.iter().all(|(id, _)| id != &user_id) {
                participants.push((user_id, whole.as_str().to_string()));
            }
        }

        let message_end = message_end?;
        Some(Self {
            message: text[..message_end].trim().to_string(),
            participants,
        })
    }
}
