//! Activities.

use serde::Serialize;
use url::Url;

use super::{ActivityKind, ObjectRef, Property};

/// An action taken on another object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Url>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actor: Vec<Url>,
    #[serde(skip_serializing_if = "Property::is_absent")]
    pub object: Property<ObjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Url>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<Url>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

impl Activity {
    /// An activity of `kind` with every property empty.
    pub fn new(kind: ActivityKind) -> Self {
        Self {
            kind,
            id: None,
            actor: Vec::new(),
            object: Property::Absent,
            target: None,
            to: Vec::new(),
            cc: Vec::new(),
            published: None,
        }
    }
}
