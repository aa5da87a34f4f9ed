//! Natural-language fields: `content`, `summary`, `name`.
//!
//! The canonical shape is always a [`LanguageMap`]. When the raw document
//! carries a language map, its tags decide which entries exist; the decoded
//! value decides the text of each entry where it still has it.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::pool::RawMap;
use crate::vocab::{LanguageMap, NaturalLanguage};

static LANGUAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*$").expect("language tag pattern compiles")
});

/// A natural-language property and its map-form key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Content,
    Summary,
    Name,
}

impl TextField {
    pub fn key(self) -> &'static str {
        match self {
            TextField::Content => "content",
            TextField::Summary => "summary",
            TextField::Name => "name",
        }
    }

    pub fn map_key(self) -> &'static str {
        match self {
            TextField::Content => "contentMap",
            TextField::Summary => "summaryMap",
            TextField::Name => "nameMap",
        }
    }
}

/// Whether `tag` is shaped like a BCP 47 language tag.
pub fn is_language_tag(tag: &str) -> bool {
    LANGUAGE_TAG.is_match(tag)
}

/// Rewrite `value` into a language map.
///
/// Left untouched when neither the decoded value nor the raw document gives
/// anything to build one from.
pub fn normalize_text(
    value: &mut Option<NaturalLanguage>,
    raw: &RawMap,
    field: TextField,
    default_language: &str,
) {
    *value = canonical(value.take(), raw, field, default_language);
}

fn canonical(
    decoded: Option<NaturalLanguage>,
    raw: &RawMap,
    field: TextField,
    default_language: &str,
) -> Option<NaturalLanguage> {
    if let Some(tagged) = raw_language_map(raw, field) {
        let flattened = !has_untagged_text(raw, field);
        return Some(NaturalLanguage::Map(reconcile(
            decoded,
            tagged,
            flattened,
            field,
            default_language,
        )));
    }

    match decoded {
        Some(NaturalLanguage::Plain(text)) => Some(default_entry(default_language, text)),
        Some(NaturalLanguage::Sequence(mut texts)) if !texts.is_empty() => {
            texts.dedup();
            if texts.len() == 1 {
                return texts.pop().map(|text| default_entry(default_language, text));
            }
            debug!(
                field = field.key(),
                values = texts.len(),
                "several untagged values left unnormalized"
            );
            Some(NaturalLanguage::Sequence(texts))
        }
        Some(NaturalLanguage::Sequence(texts)) => {
            debug!(field = field.key(), "empty value sequence left unnormalized");
            Some(NaturalLanguage::Sequence(texts))
        }
        other => other,
    }
}

/// Whether the plain property itself carries untagged text.
fn has_untagged_text(raw: &RawMap, field: TextField) -> bool {
    match raw.get(field.key()) {
        Some(Value::String(_)) => true,
        Some(Value::Array(values)) => values.iter().any(Value::is_string),
        _ => false,
    }
}

fn default_entry(default_language: &str, text: String) -> NaturalLanguage {
    let mut map = LanguageMap::new();
    map.insert(default_language, text);
    NaturalLanguage::Map(map)
}

/// Entries of the raw document's language map for `field`, if it has one.
fn raw_language_map(raw: &RawMap, field: TextField) -> Option<LanguageMap> {
    let source = raw
        .get(field.map_key())
        .and_then(Value::as_object)
        .or_else(|| raw.get(field.key()).and_then(Value::as_object))?;

    let mut map = LanguageMap::new();
    for (tag, text) in source {
        match text.as_str() {
            Some(text) if is_language_tag(tag) => {
                map.insert(tag.as_str(), text);
            }
            _ => debug!(field = field.map_key(), tag = %tag, "skipping language map entry"),
        }
    }
    (!map.is_empty()).then_some(map)
}

/// Merge the decoded value into the raw document's language map.
///
/// `flattened` means the decoded untagged values were read out of the map
/// itself, so they line up with its tags. Otherwise they came from the plain
/// property and belong under the default language.
fn reconcile(
    decoded: Option<NaturalLanguage>,
    tagged: LanguageMap,
    flattened: bool,
    field: TextField,
    default_language: &str,
) -> LanguageMap {
    let untagged = match decoded {
        Some(NaturalLanguage::Map(decoded)) => {
            let mut map: LanguageMap = tagged
                .iter()
                .map(|(tag, text)| (tag, decoded.get(tag).unwrap_or(text)))
                .collect();
            for (tag, text) in decoded.iter() {
                if !map.contains(tag) {
                    map.insert(tag, text);
                }
            }
            return map;
        }
        Some(NaturalLanguage::Plain(text)) => vec![text],
        Some(NaturalLanguage::Sequence(texts)) => texts,
        None => Vec::new(),
    };

    if flattened {
        if untagged.len() == tagged.len() {
            return tagged
                .iter()
                .map(|(tag, _)| tag.to_owned())
                .zip(untagged)
                .collect();
        }
        return tagged;
    }

    let mut map = tagged;
    for text in untagged {
        if map.iter().any(|(_, existing)| existing == text) {
            continue;
        }
        if map.contains(default_language) {
            debug!(field = field.key(), "untagged value has no free language slot");
            continue;
        }
        map.insert(default_language, text);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(doc: Value) -> RawMap {
        match doc {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn map(entries: &[(&str, &str)]) -> NaturalLanguage {
        NaturalLanguage::Map(entries.iter().copied().collect())
    }

    fn run(decoded: Option<NaturalLanguage>, doc: &RawMap) -> Option<NaturalLanguage> {
        let mut value = decoded;
        normalize_text(&mut value, doc, TextField::Content, "und");
        value
    }

    #[test]
    fn bare_string_gets_default_language() {
        let doc = raw(json!({"content": "hello"}));
        let once = run(Some(NaturalLanguage::Plain("hello".into())), &doc);
        assert_eq!(once, Some(map(&[("und", "hello")])));

        let twice = run(once.clone(), &doc);
        assert_eq!(twice, once);
    }

    #[test]
    fn repeated_untagged_value_collapses() {
        let doc = raw(json!({"content": ["one", "one"]}));
        let value = run(Some(NaturalLanguage::Sequence(vec!["one".into(), "one".into()])), &doc);
        assert_eq!(value, Some(map(&[("und", "one")])));
    }

    #[test]
    fn distinct_untagged_values_are_kept() {
        let texts = vec!["one".to_string(), "two".to_string()];
        let doc = raw(json!({"content": ["one", "two"]}));
        let value = run(Some(NaturalLanguage::Sequence(texts.clone())), &doc);
        assert_eq!(value, Some(NaturalLanguage::Sequence(texts)));

        let again = run(value.clone(), &doc);
        assert_eq!(again, value);
    }

    #[test]
    fn raw_tags_restore_flattened_values() {
        let doc = raw(json!({"contentMap": {"en": "hello", "de": "hallo"}}));
        let decoded = NaturalLanguage::Sequence(vec!["hello".into(), "hallo".into()]);
        assert_eq!(run(Some(decoded), &doc), Some(map(&[("en", "hello"), ("de", "hallo")])));
    }

    #[test]
    fn matching_plain_and_single_tag_collapse() {
        let doc = raw(json!({"content": "<p>hi</p>", "contentMap": {"en": "<p>hi</p>"}}));
        let once = run(Some(NaturalLanguage::Plain("<p>hi</p>".into())), &doc);
        assert_eq!(once, Some(map(&[("en", "<p>hi</p>")])));
        assert_eq!(run(once.clone(), &doc), once);
    }

    #[test]
    fn plain_text_never_takes_another_tag() {
        let doc = raw(json!({"content": "<p>hello</p>", "contentMap": {"fr": "<p>bonjour</p>"}}));
        let once = run(Some(NaturalLanguage::Plain("<p>hello</p>".into())), &doc);
        assert_eq!(
            once,
            Some(map(&[("fr", "<p>bonjour</p>"), ("und", "<p>hello</p>")]))
        );
        assert_eq!(run(once.clone(), &doc), once);
    }

    #[test]
    fn occupied_default_slot_keeps_tagged_text() {
        let doc = raw(json!({"content": "other", "contentMap": {"und": "tagged"}}));
        let value = run(Some(NaturalLanguage::Plain("other".into())), &doc);
        assert_eq!(value, Some(map(&[("und", "tagged")])));
    }

    #[test]
    fn mismatched_counts_fall_back_to_raw_text() {
        let doc = raw(json!({"content": "hi", "contentMap": {"en": "hi", "fr": "salut"}}));
        let decoded = NaturalLanguage::Plain("hi".into());
        assert_eq!(run(Some(decoded), &doc), Some(map(&[("en", "hi"), ("fr", "salut")])));
    }

    #[test]
    fn canonical_map_is_stable() {
        let doc = raw(json!({"contentMap": {"en": "hello", "de": "hallo"}}));
        let canonical = map(&[("en", "hello"), ("de", "hallo")]);
        assert_eq!(run(Some(canonical.clone()), &doc), Some(canonical.clone()));

        let no_raw = raw(json!({}));
        assert_eq!(run(Some(canonical.clone()), &no_raw), Some(canonical));
    }

    #[test]
    fn decoded_map_values_win_and_extra_tags_survive() {
        let doc = raw(json!({"contentMap": {"en": "raw"}}));
        let decoded = map(&[("en", "parsed"), ("ja", "こんにちは")]);
        assert_eq!(
            run(Some(decoded), &doc),
            Some(map(&[("en", "parsed"), ("ja", "こんにちは")]))
        );
    }

    #[test]
    fn inline_object_counts_as_language_map() {
        let doc = raw(json!({"content": {"en": "hi"}}));
        assert_eq!(run(None, &doc), Some(map(&[("en", "hi")])));
    }

    #[test]
    fn invalid_tags_and_values_are_ignored() {
        let doc = raw(json!({"contentMap": {"not a tag": "x", "en": 5}}));
        assert_eq!(run(Some(NaturalLanguage::Plain("x".into())), &doc), Some(map(&[("und", "x")])));
    }

    #[test]
    fn absent_and_empty_are_left_alone() {
        let doc = raw(json!({"content": 42}));
        assert_eq!(run(None, &doc), None);
        assert_eq!(
            run(Some(NaturalLanguage::Sequence(vec![])), &doc),
            Some(NaturalLanguage::Sequence(vec![]))
        );
    }

    #[test]
    fn language_tags() {
        assert!(is_language_tag("en"));
        assert!(is_language_tag("zh-Hant-TW"));
        assert!(is_language_tag("und"));
        assert!(!is_language_tag(""));
        assert!(!is_language_tag("en_US"));
        assert!(!is_language_tag("@none"));
    }
}
