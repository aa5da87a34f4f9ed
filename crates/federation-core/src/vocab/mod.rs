//! ActivityStreams vocabulary as seen by the federation core.
//!
//! The resolver maps a raw document onto one of a closed set of terms. Terms
//! are grouped into families that carry the accessors each category needs:
//! - Activities wrap an action on another object.
//! - Statusables carry user-facing content. `Question` additionally carries
//!   a [`Poll`] and so is also Pollable.
//! - Accountables are actor profiles.
//! - Everything else we recognize but never treat as one of the above.
//!
//! Adding a term means adding it to its family's list below; the classifier
//! works on families and does not change.

mod activity;
mod actor;
mod object;
mod resolver;
mod status;

pub use activity::Activity;
pub use actor::{Accountable, PublicKey};
pub use object::{Attachment, LanguageMap, NaturalLanguage, Object, ObjectRef, Property};
pub use resolver::{AS_NAMESPACE, MAX_EMBED_DEPTH, ResolveError, TypeResolver, VocabResolver};
pub use status::{Poll, PollChoices, PollOption, PollOptions, Statusable};

use std::fmt;

use serde::Serialize;
use url::Url;

macro_rules! terms {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The compact ActivityStreams term.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            /// Look up a compact term (no namespace prefix).
            pub fn from_term(term: &str) -> Option<Self> {
                match term {
                    $(stringify!($variant) => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

terms! {
    /// Transitive activity types.
    ActivityKind {
        Accept, Add, Announce, Block, Create, Delete, Dislike, Flag, Follow,
        Ignore, Invite, Join, Leave, Like, Listen, Move, Offer, Read, Reject,
        Remove, TentativeAccept, TentativeReject, Undo, Update, View,
    }
}

terms! {
    /// Content-bearing object types.
    StatusKind {
        Article, Document, Image, Video, Note, Page, Event, Place, Profile, Question,
    }
}

terms! {
    /// Actor types.
    ActorKind {
        Application, Group, Organization, Person, Service,
    }
}

terms! {
    /// Recognized types outside every category.
    ///
    /// `Arrive` and `Travel` are intransitive and carry no object.
    OtherKind {
        Object, Arrive, Travel, Collection, OrderedCollection, CollectionPage,
        OrderedCollectionPage, Tombstone, Relationship, Link, Mention, Hashtag,
    }
}

/// The semantic categories resolution entry points ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Activity,
    Statusable,
    Accountable,
    /// Refinement of `Statusable`.
    Pollable,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Activity => "Activity",
            Category::Statusable => "Statusable",
            Category::Accountable => "Accountable",
            Category::Pollable => "Pollable",
        })
    }
}

/// A recognized type outside every category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Other {
    #[serde(rename = "type")]
    pub kind: OtherKind,
    #[serde(flatten)]
    pub props: Object,
}

/// A resolved vocabulary value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VocabType {
    Activity(Box<Activity>),
    Statusable(Box<Statusable>),
    Accountable(Box<Accountable>),
    Other(Box<Other>),
}

impl VocabType {
    /// Concrete term, e.g. `"Note"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            VocabType::Activity(a) => a.kind.as_str(),
            VocabType::Statusable(s) => s.kind.as_str(),
            VocabType::Accountable(a) => a.kind.as_str(),
            VocabType::Other(o) => o.kind.as_str(),
        }
    }

    pub fn id(&self) -> Option<&Url> {
        match self {
            VocabType::Activity(a) => a.id.as_ref(),
            VocabType::Statusable(s) => s.props.id.as_ref(),
            VocabType::Accountable(a) => a.props.id.as_ref(),
            VocabType::Other(o) => o.props.id.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_round_trip_through_lookup() {
        for kind in StatusKind::ALL {
            assert_eq!(StatusKind::from_term(kind.as_str()), Some(*kind));
        }
        assert_eq!(ActivityKind::from_term("Create"), Some(ActivityKind::Create));
        assert_eq!(ActorKind::from_term("person"), None, "terms are case-sensitive");
    }

    #[test]
    fn families_do_not_overlap() {
        for kind in StatusKind::ALL {
            assert!(ActivityKind::from_term(kind.as_str()).is_none());
            assert!(ActorKind::from_term(kind.as_str()).is_none());
            assert!(OtherKind::from_term(kind.as_str()).is_none());
        }
        for kind in ActorKind::ALL {
            assert!(ActivityKind::from_term(kind.as_str()).is_none());
            assert!(OtherKind::from_term(kind.as_str()).is_none());
        }
    }
}
