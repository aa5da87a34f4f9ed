//! # federation-core
//!
//! Turns inbound ActivityStreams JSON-LD documents into typed, normalized
//! values. This crate has no network listener and no storage; hosts feed it
//! request bodies or byte slices and get back an [`Activity`], a
//! [`Statusable`] or an [`Accountable`], or a classified [`Error`].
//!
//! ```text
//! bytes ─▶ MapPool ─▶ TypeResolver ─▶ classify ─▶ Normalizer ─▶ value
//! ```

pub mod classify;
pub mod context;
pub mod error;
pub mod normalize;
pub mod pool;
pub mod resolve;
pub mod vocab;

pub use context::{CancelHandle, Context, DoneReason};
pub use error::{BoxError, Cause, Error, ErrorKind, Result};
pub use normalize::Normalizer;
pub use pool::{MapPool, PoolStats, PooledMap, RawMap};
pub use resolve::{Resolver, ResolverConfig};
pub use vocab::{
    Accountable, Activity, Category, ResolveError, Statusable, TypeResolver, VocabResolver,
    VocabType,
};
