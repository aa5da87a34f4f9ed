//! Field normalization.
//!
//! Decoding loses information the raw document still has: language tags,
//! whether a property was a one-element array, vote counts on options we
//! could not fully decode. [`Normalizer`] rewrites a resolved value into the
//! canonical shape using the raw document as a second source. Running it
//! twice changes nothing.

mod attachment;
mod language;
mod poll;

pub use attachment::normalize_attachments;
pub use language::{TextField, is_language_tag, normalize_text};
pub use poll::normalize_poll_options;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::pool::RawMap;
use crate::vocab::{Accountable, Activity, Object, ObjectRef, Statusable, VocabType};

/// Language tag for text that arrives without one.
pub const DEFAULT_LANGUAGE: &str = "und";

#[derive(Debug, Clone)]
pub struct Normalizer {
    default_language: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl Normalizer {
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            default_language: default_language.into(),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Poll options first, then content, attachments, summary, name.
    pub fn statusable(&self, status: &mut Statusable, raw: &RawMap) {
        if let Some(poll) = status.as_pollable_mut() {
            normalize_poll_options(poll, raw, &self.default_language);
        }
        self.content(&mut status.props, raw);
        self.attachments(&mut status.props, raw);
        self.summary(&mut status.props, raw);
        self.name(&mut status.props, raw);
    }

    pub fn accountable(&self, account: &mut Accountable, raw: &RawMap) {
        self.summary(&mut account.props, raw);
    }

    /// Normalize the objects an activity embeds.
    ///
    /// Each embedded object is paired with its raw counterpart in the
    /// activity's `object` property: by position when nothing was dropped
    /// while decoding, by `id` otherwise.
    pub fn activity(&self, activity: &mut Activity, raw: &RawMap) {
        let raw_objects: Vec<&Value> = match raw.get("object") {
            Some(Value::Array(values)) => values.iter().collect(),
            Some(value) => vec![value],
            None => Vec::new(),
        };
        let aligned = raw_objects.len() == activity.object.len();

        for (index, object) in activity.object.iter_mut().enumerate() {
            let ObjectRef::Embedded(vocab) = object else {
                continue;
            };
            let raw_object = if aligned {
                raw_objects.get(index).and_then(|value| value.as_object())
            } else {
                find_by_id(&raw_objects, vocab.id())
            };
            match raw_object {
                Some(raw_object) => self.vocab(vocab, raw_object),
                None => debug!(
                    index,
                    type_name = vocab.type_name(),
                    "no raw counterpart for embedded object"
                ),
            }
        }
    }

    /// Dispatch on the value's family.
    pub fn vocab(&self, vocab: &mut VocabType, raw: &RawMap) {
        match vocab {
            VocabType::Activity(activity) => self.activity(activity, raw),
            VocabType::Statusable(status) => self.statusable(status, raw),
            VocabType::Accountable(account) => self.accountable(account, raw),
            VocabType::Other(_) => {}
        }
    }

    pub fn content(&self, object: &mut Object, raw: &RawMap) {
        normalize_text(&mut object.content, raw, TextField::Content, &self.default_language);
    }

    pub fn summary(&self, object: &mut Object, raw: &RawMap) {
        normalize_text(&mut object.summary, raw, TextField::Summary, &self.default_language);
    }

    pub fn name(&self, object: &mut Object, raw: &RawMap) {
        normalize_text(&mut object.name, raw, TextField::Name, &self.default_language);
    }

    pub fn attachments(&self, object: &mut Object, raw: &RawMap) {
        normalize_attachments(&mut object.attachment, raw);
    }
}

fn find_by_id<'r>(raw_objects: &[&'r Value], id: Option<&Url>) -> Option<&'r RawMap> {
    let id = id?;
    raw_objects
        .iter()
        .filter_map(|value| value.as_object())
        .find(|object| object.get("id").and_then(Value::as_str) == Some(id.as_str()))
}
