//! Poll options.
//!
//! `oneOf` options come first, then `anyOf`. A poll with only `anyOf`
//! options allows multiple choices. Vote counts come from each option's
//! `replies.totalItems`, defaulting to zero.

use serde_json::Value;
use tracing::debug;

use crate::pool::RawMap;
use crate::vocab::{NaturalLanguage, Object, Poll, PollChoices, PollOption, PollOptions, Property};

pub fn normalize_poll_options(poll: &mut Poll, raw: &RawMap, default_language: &str) {
    let PollChoices::Decoded { one_of, any_of } = &poll.choices else {
        return;
    };

    let multiple = one_of.is_empty() && !any_of.is_empty();
    let mut options = Vec::with_capacity(one_of.len() + any_of.len());
    collect(&mut options, one_of, &raw_options(raw, "oneOf"), default_language);
    collect(&mut options, any_of, &raw_options(raw, "anyOf"), default_language);

    poll.choices = PollChoices::Normalized(PollOptions { multiple, options });
}

/// Option objects in the raw document, filtered the same way the resolver
/// filters them so indexes line up.
fn raw_options<'r>(raw: &'r RawMap, key: &str) -> Vec<&'r RawMap> {
    match raw.get(key) {
        Some(Value::Array(options)) => options.iter().filter_map(Value::as_object).collect(),
        Some(Value::Object(option)) => vec![option],
        _ => Vec::new(),
    }
}

fn collect(
    out: &mut Vec<PollOption>,
    decoded: &Property<Object>,
    raw: &[&RawMap],
    default_language: &str,
) {
    let aligned = decoded.len() == raw.len();
    for (index, option) in decoded.iter().enumerate() {
        let raw_option = if aligned { raw.get(index).copied() } else { None };

        let name = label(option.name.as_ref(), default_language).or_else(|| {
            raw_option
                .and_then(|raw| raw.get("name"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        });
        let Some(name) = name else {
            debug!(index, "dropping poll option without a name");
            continue;
        };

        let votes = option
            .replies_total_items
            .or_else(|| raw_option.and_then(raw_votes))
            .unwrap_or(0);
        out.push(PollOption { name, votes });
    }
}

fn label(name: Option<&NaturalLanguage>, default_language: &str) -> Option<String> {
    match name? {
        NaturalLanguage::Plain(text) => Some(text.clone()),
        NaturalLanguage::Sequence(texts) => texts.first().cloned(),
        NaturalLanguage::Map(map) => map
            .get(default_language)
            .or_else(|| map.first().map(|(_, text)| text))
            .map(str::to_owned),
    }
}

fn raw_votes(option: &RawMap) -> Option<u64> {
    option
        .get("replies")?
        .as_object()?
        .get("totalItems")?
        .as_u64()
}
