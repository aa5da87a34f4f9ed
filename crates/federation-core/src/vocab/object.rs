//! Properties shared by every vocabulary object.

use indexmap::IndexMap;
use serde::Serialize;
use url::Url;

use super::VocabType;

/// A functional-or-not property: absent, a bare value, or a sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Property<T> {
    Absent,
    One(T),
    Many(Vec<T>),
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Property::Absent
    }
}

impl<T> Property<T> {
    /// Build from decoded values, collapsing a single value into `One`.
    pub fn collapse(mut values: Vec<T>) -> Self {
        if values.len() == 1 {
            if let Some(value) = values.pop() {
                return Property::One(value);
            }
        }
        Property::Many(values)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Property::Absent)
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Property::Absent => &[],
            Property::One(value) => std::slice::from_ref(value),
            Property::Many(values) => values,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Property::Absent => &mut [],
            Property::One(value) => std::slice::from_mut(value),
            Property::Many(values) => values,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Property::Absent => Vec::new(),
            Property::One(value) => vec![value],
            Property::Many(values) => values,
        }
    }
}

/// Language tag to localized text, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguageMap(IndexMap<String, String>);

impl LanguageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the text for `tag`, keeping its original position.
    pub fn insert(&mut self, tag: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.0.insert(tag.into(), text.into())
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first entry in document order.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.0.first().map(|(tag, text)| (tag.as_str(), text.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(tag, text)| (tag.as_str(), text.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LanguageMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A natural-language text property in whichever shape it was decoded.
///
/// After normalization content, summary and name are always `Map`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NaturalLanguage {
    Plain(String),
    Sequence(Vec<String>),
    Map(LanguageMap),
}

impl NaturalLanguage {
    pub fn as_map(&self) -> Option<&LanguageMap> {
        match self {
            NaturalLanguage::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// A media attachment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blurhash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

/// An entry of an activity's `object` property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ObjectRef {
    /// Reference by IRI only.
    Link(Url),
    /// A fully resolved embedded object.
    Embedded(VocabType),
    /// An embedded object of a type we do not know.
    Unknown {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Url>,
        #[serde(rename = "type")]
        types: Vec<String>,
    },
}

impl ObjectRef {
    pub fn id(&self) -> Option<&Url> {
        match self {
            ObjectRef::Link(url) => Some(url),
            ObjectRef::Embedded(vocab) => vocab.id(),
            ObjectRef::Unknown { id, .. } => id.as_ref(),
        }
    }
}

/// Base object properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Url>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributed_to: Vec<Url>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<Url>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub url: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<NaturalLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<NaturalLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NaturalLanguage>,
    #[serde(skip_serializing_if = "Property::is_absent")]
    pub attachment: Property<Attachment>,
    /// `replies.totalItems`, when replies were embedded as a collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies_total_items: Option<u64>,
}
