//! Mapping raw JSON-LD documents onto vocabulary types.
//!
//! [`TypeResolver`] is the seam: entry points only ever call through it.
//! [`VocabResolver`] is the default implementation. Its decoding is lossy in
//! the ways remote documents force on any vocabulary decoder:
//! - a `contentMap`/`summaryMap`/`nameMap` without the plain property is
//!   flattened to its untagged values;
//! - one-element arrays (attachments, activity objects, poll options)
//!   collapse into a bare value.
//!
//! The field normalizer puts both back using the raw document.

use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::context::Context;
use crate::pool::RawMap;

use super::{
    Accountable, Activity, ActivityKind, ActorKind, Attachment, LanguageMap, NaturalLanguage,
    Object, ObjectRef, Other, OtherKind, Poll, PollChoices, Property, PublicKey, StatusKind,
    Statusable, VocabType,
};

/// Expanded ActivityStreams namespace, accepted as a term prefix.
pub const AS_NAMESPACE: &str = "https://www.w3.org/ns/activitystreams#";

/// Embedded objects nested deeper than this are kept as references.
pub const MAX_EMBED_DEPTH: usize = 16;

/// Failure to resolve a document into a vocabulary type.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no known vocabulary type among {0:?}")]
    Unmatched(Vec<String>),

    #[error("invalid {property} property: {reason}")]
    InvalidProperty {
        property: &'static str,
        reason: String,
    },
}

impl ResolveError {
    /// The document named no type we know. Not a decoding failure.
    pub fn is_unmatched(&self) -> bool {
        matches!(self, ResolveError::Unmatched(_))
    }
}

/// Resolves a raw attribute mapping to a vocabulary type.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, ctx: &Context, raw: &RawMap) -> Result<VocabType, ResolveError>;
}

/// Default resolver over the ActivityStreams core and extended vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct VocabResolver;

impl TypeResolver for VocabResolver {
    fn resolve(&self, _ctx: &Context, raw: &RawMap) -> Result<VocabType, ResolveError> {
        decode_vocab(raw, 0)
    }
}

enum Term {
    Activity(ActivityKind),
    Status(StatusKind),
    Actor(ActorKind),
    Other(OtherKind),
}

fn lookup(term: &str) -> Option<Term> {
    let term = term
        .strip_prefix(AS_NAMESPACE)
        .or_else(|| term.strip_prefix("as:"))
        .unwrap_or(term);

    ActivityKind::from_term(term)
        .map(Term::Activity)
        .or_else(|| StatusKind::from_term(term).map(Term::Status))
        .or_else(|| ActorKind::from_term(term).map(Term::Actor))
        .or_else(|| OtherKind::from_term(term).map(Term::Other))
}

fn type_terms(raw: &RawMap) -> Vec<&str> {
    match raw.get("type") {
        Some(Value::String(term)) => vec![term.as_str()],
        Some(Value::Array(terms)) => terms.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn decode_vocab(raw: &RawMap, depth: usize) -> Result<VocabType, ResolveError> {
    let terms = type_terms(raw);
    let Some(term) = terms.iter().find_map(|term| lookup(term)) else {
        return Err(ResolveError::Unmatched(
            terms.into_iter().map(str::to_owned).collect(),
        ));
    };

    Ok(match term {
        Term::Activity(kind) => VocabType::Activity(Box::new(decode_activity(kind, raw, depth)?)),
        Term::Status(kind) => {
            let mut status = Statusable::new(kind, decode_object(raw)?);
            if let Some(poll) = status.as_pollable_mut() {
                decode_poll(poll, raw)?;
            }
            VocabType::Statusable(Box::new(status))
        }
        Term::Actor(kind) => VocabType::Accountable(Box::new(decode_actor(kind, raw)?)),
        Term::Other(kind) => VocabType::Other(Box::new(Other {
            kind,
            props: decode_object(raw)?,
        })),
    })
}

fn decode_object(raw: &RawMap) -> Result<Object, ResolveError> {
    Ok(Object {
        id: id(raw)?,
        attributed_to: iris(raw, "attributedTo"),
        to: iris(raw, "to"),
        cc: iris(raw, "cc"),
        in_reply_to: first_iri(raw, "inReplyTo"),
        published: string(raw, "published"),
        url: iris(raw, "url"),
        sensitive: raw.get("sensitive").and_then(Value::as_bool),
        content: natural_language(raw, "content", "contentMap"),
        summary: natural_language(raw, "summary", "summaryMap"),
        name: natural_language(raw, "name", "nameMap"),
        attachment: attachments(raw),
        replies_total_items: raw
            .get("replies")
            .and_then(Value::as_object)
            .and_then(|replies| replies.get("totalItems"))
            .and_then(Value::as_u64),
    })
}

fn decode_activity(kind: ActivityKind, raw: &RawMap, depth: usize) -> Result<Activity, ResolveError> {
    let mut activity = Activity::new(kind);
    activity.id = id(raw)?;
    activity.actor = iris(raw, "actor");
    activity.object = object_refs(raw, "object", depth)?;
    activity.target = first_iri(raw, "target");
    activity.to = iris(raw, "to");
    activity.cc = iris(raw, "cc");
    activity.published = string(raw, "published");
    Ok(activity)
}

fn decode_actor(kind: ActorKind, raw: &RawMap) -> Result<Accountable, ResolveError> {
    let mut actor = Accountable::new(kind, decode_object(raw)?);
    actor.preferred_username = string(raw, "preferredUsername");
    actor.inbox = first_iri(raw, "inbox");
    actor.outbox = first_iri(raw, "outbox");
    actor.followers = first_iri(raw, "followers");
    actor.following = first_iri(raw, "following");
    actor.featured = first_iri(raw, "featured");
    actor.shared_inbox = raw
        .get("endpoints")
        .and_then(Value::as_object)
        .and_then(|endpoints| first_iri(endpoints, "sharedInbox"));
    actor.public_key = match raw.get("publicKey") {
        Some(Value::Array(keys)) => keys.iter().find_map(public_key),
        Some(key) => public_key(key),
        None => None,
    };
    actor.manually_approves_followers = raw.get("manuallyApprovesFollowers").and_then(Value::as_bool);
    actor.discoverable = raw.get("discoverable").and_then(Value::as_bool);
    Ok(actor)
}

fn decode_poll(poll: &mut Poll, raw: &RawMap) -> Result<(), ResolveError> {
    poll.choices = PollChoices::Decoded {
        one_of: poll_options(raw, "oneOf")?,
        any_of: poll_options(raw, "anyOf")?,
    };
    poll.end_time = string(raw, "endTime");
    poll.closed = string(raw, "closed");
    poll.voters_count = raw.get("votersCount").and_then(Value::as_u64);
    Ok(())
}

fn poll_options(raw: &RawMap, key: &str) -> Result<Property<Object>, ResolveError> {
    match raw.get(key) {
        Some(Value::Array(options)) => Ok(Property::collapse(
            options
                .iter()
                .filter_map(Value::as_object)
                .map(decode_object)
                .collect::<Result<_, _>>()?,
        )),
        Some(Value::Object(option)) => Ok(Property::One(decode_object(option)?)),
        _ => Ok(Property::Absent),
    }
}

fn object_refs(raw: &RawMap, key: &str, depth: usize) -> Result<Property<ObjectRef>, ResolveError> {
    match raw.get(key) {
        Some(Value::Array(values)) => {
            let mut refs = Vec::with_capacity(values.len());
            for value in values {
                if let Some(object) = object_ref(value, depth)? {
                    refs.push(object);
                }
            }
            Ok(Property::collapse(refs))
        }
        Some(value) => Ok(object_ref(value, depth)?.map_or(Property::Absent, Property::One)),
        None => Ok(Property::Absent),
    }
}

fn object_ref(value: &Value, depth: usize) -> Result<Option<ObjectRef>, ResolveError> {
    let map = match value {
        Value::String(iri) => return Ok(Url::parse(iri).ok().map(ObjectRef::Link)),
        Value::Object(map) => map,
        _ => return Ok(None),
    };

    if depth >= MAX_EMBED_DEPTH {
        let types = type_terms(map).into_iter().map(str::to_owned).collect();
        return Ok(Some(match id(map)? {
            Some(id) => ObjectRef::Link(id),
            None => ObjectRef::Unknown { id: None, types },
        }));
    }

    match decode_vocab(map, depth + 1) {
        Ok(vocab) => Ok(Some(ObjectRef::Embedded(vocab))),
        Err(ResolveError::Unmatched(types)) => Ok(Some(ObjectRef::Unknown {
            id: id(map)?,
            types,
        })),
        Err(err) => Err(err),
    }
}

/// `id` must be an absolute IRI when present. An empty string counts as absent.
fn id(raw: &RawMap) -> Result<Option<Url>, ResolveError> {
    match raw.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(iri)) if iri.is_empty() => Ok(None),
        Some(Value::String(iri)) => Url::parse(iri).map(Some).map_err(|e| {
            ResolveError::InvalidProperty {
                property: "id",
                reason: format!("{iri:?}: {e}"),
            }
        }),
        Some(other) => Err(ResolveError::InvalidProperty {
            property: "id",
            reason: format!("expected IRI string, found {}", json_kind(other)),
        }),
    }
}

/// An IRI given directly or as an object/link with `id` or `href`.
fn iri(value: &Value) -> Option<Url> {
    let iri = match value {
        Value::String(iri) => iri.as_str(),
        Value::Object(map) => map.get("id").or_else(|| map.get("href"))?.as_str()?,
        _ => return None,
    };
    Url::parse(iri).ok()
}

fn iris(raw: &RawMap, key: &str) -> Vec<Url> {
    match raw.get(key) {
        Some(Value::Array(values)) => values.iter().filter_map(iri).collect(),
        Some(value) => iri(value).into_iter().collect(),
        None => Vec::new(),
    }
}

fn first_iri(raw: &RawMap, key: &str) -> Option<Url> {
    match raw.get(key)? {
        Value::Array(values) => values.iter().find_map(iri),
        value => iri(value),
    }
}

fn string(raw: &RawMap, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn natural_language(raw: &RawMap, key: &str, map_key: &str) -> Option<NaturalLanguage> {
    match raw.get(key) {
        Some(Value::String(text)) => return Some(NaturalLanguage::Plain(text.clone())),
        Some(Value::Array(values)) => {
            let texts: Vec<String> = values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect();
            if !texts.is_empty() {
                return Some(NaturalLanguage::Sequence(texts));
            }
        }
        Some(Value::Object(map)) => {
            let map: LanguageMap = map
                .iter()
                .filter_map(|(tag, text)| Some((tag.as_str(), text.as_str()?)))
                .collect();
            if !map.is_empty() {
                return Some(NaturalLanguage::Map(map));
            }
        }
        _ => {}
    }

    // Tags are dropped here.
    let mut texts: Vec<String> = raw
        .get(map_key)?
        .as_object()?
        .values()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();
    match texts.len() {
        0 => None,
        1 => texts.pop().map(NaturalLanguage::Plain),
        _ => Some(NaturalLanguage::Sequence(texts)),
    }
}

fn attachments(raw: &RawMap) -> Property<Attachment> {
    match raw.get("attachment") {
        Some(Value::Array(values)) => Property::collapse(values.iter().filter_map(attachment).collect()),
        Some(value) => attachment(value).map_or(Property::Absent, Property::One),
        None => Property::Absent,
    }
}

fn attachment(value: &Value) -> Option<Attachment> {
    match value {
        Value::String(iri) => Some(Attachment {
            url: Some(Url::parse(iri).ok()?),
            ..Attachment::default()
        }),
        Value::Object(map) => Some(Attachment {
            kind: string(map, "type"),
            url: first_iri(map, "url").or_else(|| first_iri(map, "href")),
            media_type: string(map, "mediaType"),
            name: string(map, "name"),
            blurhash: string(map, "blurhash"),
            width: map.get("width").and_then(Value::as_u64),
            height: map.get("height").and_then(Value::as_u64),
        }),
        _ => None,
    }
}

fn public_key(value: &Value) -> Option<PublicKey> {
    let key = value.as_object()?;
    Some(PublicKey {
        id: first_iri(key, "id"),
        owner: first_iri(key, "owner"),
        public_key_pem: string(key, "publicKeyPem")?,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(doc: Value) -> Result<VocabType, ResolveError> {
        let Value::Object(raw) = doc else {
            panic!("test documents must be objects");
        };
        VocabResolver.resolve(&Context::background(), &raw)
    }

    #[test]
    fn resolves_each_family() {
        let note = resolve(json!({"type": "Note", "id": "https://a.example/n/1"})).unwrap();
        assert!(matches!(note, VocabType::Statusable(_)));
        assert_eq!(note.type_name(), "Note");

        let person = resolve(json!({"type": "Person"})).unwrap();
        assert!(matches!(person, VocabType::Accountable(_)));

        let create = resolve(json!({"type": "Create"})).unwrap();
        assert!(matches!(create, VocabType::Activity(_)));

        let tombstone = resolve(json!({"type": "Tombstone"})).unwrap();
        assert!(matches!(tombstone, VocabType::Other(_)));
    }

    #[test]
    fn accepts_prefixed_and_multiple_terms() {
        let expanded = resolve(json!({"type": format!("{AS_NAMESPACE}Article")})).unwrap();
        assert_eq!(expanded.type_name(), "Article");

        let compact = resolve(json!({"type": "as:Video"})).unwrap();
        assert_eq!(compact.type_name(), "Video");

        let multi = resolve(json!({"type": ["toot:Emoji", "Image"]})).unwrap();
        assert_eq!(multi.type_name(), "Image");
    }

    #[test]
    fn unknown_or_missing_type_is_unmatched() {
        let err = resolve(json!({"type": "Bogus"})).unwrap_err();
        assert!(err.is_unmatched());
        assert!(matches!(err, ResolveError::Unmatched(ref t) if t == &["Bogus".to_string()]));

        assert!(resolve(json!({"id": "https://a.example/x"})).unwrap_err().is_unmatched());
    }

    #[test]
    fn invalid_id_is_a_decode_failure() {
        let err = resolve(json!({"type": "Note", "id": "not a url"})).unwrap_err();
        assert!(!err.is_unmatched());
        let err = resolve(json!({"type": "Note", "id": 7})).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidProperty { property: "id", .. }));
    }

    #[test]
    fn empty_id_counts_as_missing() {
        let create = resolve(json!({"type": "Create", "id": ""})).unwrap();
        assert!(create.id().is_none());
    }

    #[test]
    fn content_map_is_flattened() {
        let note = resolve(json!({
            "type": "Note",
            "contentMap": {"en": "hello", "de": "hallo"},
            "summaryMap": {"en": "cw"},
        }))
        .unwrap();
        let VocabType::Statusable(note) = note else { panic!("expected statusable") };
        assert_eq!(
            note.props.content,
            Some(NaturalLanguage::Sequence(vec!["hello".into(), "hallo".into()]))
        );
        assert_eq!(note.props.summary, Some(NaturalLanguage::Plain("cw".into())));
    }

    #[test]
    fn singleton_arrays_collapse() {
        let note = resolve(json!({
            "type": "Note",
            "attachment": [{"type": "Image", "url": "https://a.example/i.png"}],
        }))
        .unwrap();
        let VocabType::Statusable(note) = note else { panic!("expected statusable") };
        assert!(matches!(note.props.attachment, Property::One(_)));
    }

    #[test]
    fn activity_embeds_objects() {
        let create = resolve(json!({
            "type": "Create",
            "id": "https://a.example/c/1",
            "actor": "https://a.example/u/alice",
            "object": [
                {"type": "Note", "id": "https://a.example/n/1", "content": "hi"},
                "https://a.example/n/2",
                {"type": "Mystery", "id": "https://a.example/m/1"},
            ],
        }))
        .unwrap();
        let VocabType::Activity(create) = create else { panic!("expected activity") };
        assert_eq!(create.actor.len(), 1);
        let refs = create.object.as_slice();
        assert_eq!(refs.len(), 3);
        assert!(matches!(refs[0], ObjectRef::Embedded(VocabType::Statusable(_))));
        assert!(matches!(refs[1], ObjectRef::Link(_)));
        assert!(matches!(refs[2], ObjectRef::Unknown { ref types, .. } if types == &["Mystery".to_string()]));
    }

    #[test]
    fn deep_embedding_stops_at_limit() {
        let mut doc = json!({"type": "Note", "id": "https://a.example/n/deep"});
        for i in 0..(MAX_EMBED_DEPTH + 4) {
            doc = json!({"type": "Announce", "id": format!("https://a.example/a/{i}"), "object": doc});
        }
        assert!(resolve(doc).is_ok());
    }

    #[test]
    fn question_carries_decoded_options() {
        let question = resolve(json!({
            "type": "Question",
            "oneOf": [
                {"type": "Note", "name": "A", "replies": {"type": "Collection", "totalItems": 3}},
                {"type": "Note", "name": "B"},
            ],
            "endTime": "2026-01-01T00:00:00Z",
            "votersCount": 3,
        }))
        .unwrap();
        let VocabType::Statusable(question) = question else { panic!("expected statusable") };
        let poll = question.as_pollable().unwrap();
        let PollChoices::Decoded { one_of, any_of } = &poll.choices else {
            panic!("expected decoded choices");
        };
        assert_eq!(one_of.len(), 2);
        assert_eq!(one_of.as_slice()[0].replies_total_items, Some(3));
        assert!(any_of.is_absent());
        assert_eq!(poll.voters_count, Some(3));
    }

    #[test]
    fn actor_fields() {
        let person = resolve(json!({
            "type": "Person",
            "id": "https://a.example/u/alice",
            "preferredUsername": "alice",
            "inbox": "https://a.example/u/alice/inbox",
            "endpoints": {"sharedInbox": "https://a.example/inbox"},
            "publicKey": {
                "id": "https://a.example/u/alice#main-key",
                "owner": "https://a.example/u/alice",
                "publicKeyPem": "-----BEGIN PUBLIC KEY-----",
            },
        }))
        .unwrap();
        let VocabType::Accountable(person) = person else { panic!("expected accountable") };
        assert_eq!(person.preferred_username.as_deref(), Some("alice"));
        assert_eq!(person.shared_inbox.as_ref().unwrap().as_str(), "https://a.example/inbox");
        assert!(person.public_key.is_some());
    }
}
