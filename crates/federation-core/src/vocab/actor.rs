//! Actor profiles.

use serde::Serialize;
use url::Url;

use super::{ActorKind, Object};

/// An actor's public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Url>,
    pub public_key_pem: String,
}

/// An actor profile (Person, Service, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accountable {
    #[serde(rename = "type")]
    pub kind: ActorKind,
    #[serde(flatten)]
    pub props: Object,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbox: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbox: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<Url>,
    /// `endpoints.sharedInbox`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_inbox: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manually_approves_followers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discoverable: Option<bool>,
}

impl Accountable {
    pub fn new(kind: ActorKind, props: Object) -> Self {
        Self {
            kind,
            props,
            preferred_username: None,
            inbox: None,
            outbox: None,
            followers: None,
            following: None,
            featured: None,
            shared_inbox: None,
            public_key: None,
            manually_approves_followers: None,
            discoverable: None,
        }
    }
}
