//! Content objects and polls.

use serde::Serialize;

use super::{Object, Property, StatusKind};

/// One poll option after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollOption {
    pub name: String,
    pub votes: u64,
}

/// Poll options in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollOptions {
    /// Voters may pick more than one option.
    pub multiple: bool,
    /// Options in document order.
    pub options: Vec<PollOption>,
}

/// Poll choices, either as decoded or normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PollChoices {
    /// Exclusive (`oneOf`) and multiple (`anyOf`) choices as decoded.
    Decoded {
        #[serde(rename = "oneOf")]
        one_of: Property<Object>,
        #[serde(rename = "anyOf")]
        any_of: Property<Object>,
    },
    Normalized(PollOptions),
}

impl Default for PollChoices {
    fn default() -> Self {
        PollChoices::Decoded {
            one_of: Property::Absent,
            any_of: Property::Absent,
        }
    }
}

impl PollChoices {
    pub fn normalized(&self) -> Option<&PollOptions> {
        match self {
            PollChoices::Normalized(options) => Some(options),
            PollChoices::Decoded { .. } => None,
        }
    }
}

/// Poll data carried by a `Question`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub choices: PollChoices,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voters_count: Option<u64>,
}

/// User-facing content: notes, articles, questions, ...
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statusable {
    #[serde(rename = "type")]
    pub kind: StatusKind,
    #[serde(flatten)]
    pub props: Object,
    #[serde(skip_serializing_if = "Option::is_none")]
    poll: Option<Poll>,
}

impl Statusable {
    /// A `Question` always starts with an empty poll; other kinds never have one.
    pub fn new(kind: StatusKind, props: Object) -> Self {
        let poll = (kind == StatusKind::Question).then(Poll::default);
        Self { kind, props, poll }
    }

    pub fn is_pollable(&self) -> bool {
        self.poll.is_some()
    }

    /// View as Pollable. Only a `Question` succeeds.
    pub fn as_pollable(&self) -> Option<&Poll> {
        self.poll.as_ref()
    }

    pub fn as_pollable_mut(&mut self) -> Option<&mut Poll> {
        self.poll.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_questions_are_pollable() {
        for kind in StatusKind::ALL {
            let status = Statusable::new(*kind, Object::default());
            assert_eq!(status.is_pollable(), *kind == StatusKind::Question, "{kind}");
        }
    }

    #[test]
    fn fresh_poll_is_undecoded() {
        let status = Statusable::new(StatusKind::Question, Object::default());
        let poll = status.as_pollable().unwrap();
        assert!(poll.choices.normalized().is_none());
    }
}
