//! Resolution entry points.
//!
//! All three run the same pipeline: decode into a pooled map, resolve the
//! vocabulary type, check the category, normalize, release the map. The map
//! is held by a [`PooledMap`](crate::pool::PooledMap) guard, so every exit
//! path releases it exactly once, after the last read.

use std::pin::pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::debug;

use crate::classify;
use crate::context::Context;
use crate::error::{BoxError, Cause, Error, Result};
use crate::normalize::{DEFAULT_LANGUAGE, Normalizer};
use crate::pool::{DEFAULT_MAX_IDLE, MapPool};
use crate::vocab::{
    Accountable, Activity, Category, ResolveError, Statusable, TypeResolver, VocabResolver,
    VocabType,
};

/// Resolver settings. Every field is optional when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Language tag given to text that arrives untagged.
    pub default_language: String,
    /// Idle maps the buffer pool keeps around.
    pub max_idle_maps: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            max_idle_maps: DEFAULT_MAX_IDLE,
        }
    }
}

/// Entry point for inbound federation documents.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct Resolver {
    pool: MapPool,
    types: Arc<dyn TypeResolver>,
    normalizer: Normalizer,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("pool", &self.pool)
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            pool: MapPool::with_max_idle(config.max_idle_maps),
            types: Arc::new(VocabResolver),
            normalizer: Normalizer::new(config.default_language.clone()),
        }
    }

    /// Swap the type resolver.
    pub fn with_type_resolver(mut self, types: impl TypeResolver + 'static) -> Self {
        self.types = Arc::new(types);
        self
    }

    pub fn pool(&self) -> &MapPool {
        &self.pool
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Resolve an inbound activity from an HTTP request body.
    ///
    /// The body is consumed and dropped before this returns, whatever the
    /// outcome. Cancelling `ctx` or passing its deadline abandons the read.
    pub async fn resolve_incoming_activity<S, B, E>(&self, ctx: &Context, body: S) -> Result<Activity>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<BoxError>,
    {
        const OP: &str = "resolve_incoming_activity";

        let mut raw = self.pool.acquire();
        let bytes = read_body(ctx, body)
            .await
            .map_err(|cause| Error::internal(OP, cause))?;
        raw.decode_from_slice(&bytes)
            .map_err(|e| Error::internal(OP, Cause::Json(e)))?;

        let vocab = self
            .types
            .resolve(ctx, &raw)
            .map_err(|e| unresolved(OP, e, Error::internal))?;
        let mut activity = classify::to_activity(vocab)
            .map_err(|other| wrong_category(OP, &other, Category::Activity, Error::bad_request))?;

        if activity.id.is_none() {
            return Err(Error::bad_request(OP, Cause::MissingId));
        }

        self.normalizer.activity(&mut activity, &raw);
        drop(raw);

        debug!(op = OP, type_name = activity.kind.as_str(), "resolved");
        Ok(activity)
    }

    /// Resolve a content object from an in-memory document.
    pub fn resolve_statusable(&self, ctx: &Context, bytes: &[u8]) -> Result<Statusable> {
        const OP: &str = "resolve_statusable";

        let mut raw = self.pool.acquire();
        raw.decode_from_slice(bytes)
            .map_err(|e| Error::other(OP, Cause::Json(e)))?;

        let vocab = self
            .types
            .resolve(ctx, &raw)
            .map_err(|e| unresolved(OP, e, Error::other))?;
        let mut status = classify::to_statusable(vocab)
            .map_err(|other| wrong_category(OP, &other, Category::Statusable, Error::wrong_type))?;

        self.normalizer.statusable(&mut status, &raw);
        drop(raw);

        debug!(op = OP, type_name = status.kind.as_str(), "resolved");
        Ok(status)
    }

    /// Resolve an actor profile from an in-memory document.
    pub fn resolve_accountable(&self, ctx: &Context, bytes: &[u8]) -> Result<Accountable> {
        const OP: &str = "resolve_accountable";

        let mut raw = self.pool.acquire();
        raw.decode_from_slice(bytes)
            .map_err(|e| Error::other(OP, Cause::Json(e)))?;

        let vocab = self
            .types
            .resolve(ctx, &raw)
            .map_err(|e| unresolved(OP, e, Error::other))?;
        let mut account = classify::to_accountable(vocab)
            .map_err(|other| wrong_category(OP, &other, Category::Accountable, Error::wrong_type))?;

        self.normalizer.accountable(&mut account, &raw);
        drop(raw);

        debug!(op = OP, type_name = account.kind.as_str(), "resolved");
        Ok(account)
    }
}

/// Unmatched types are the sender's fault; anything else goes to `otherwise`.
fn unresolved(op: &'static str, err: ResolveError, otherwise: fn(&'static str, Cause) -> Error) -> Error {
    if err.is_unmatched() {
        debug!(op, error = %err, "unmatched vocabulary type");
        Error::bad_request(op, Cause::Unmatched)
    } else {
        otherwise(op, Cause::Resolve(err))
    }
}

fn wrong_category(
    op: &'static str,
    got: &VocabType,
    category: Category,
    kind: fn(&'static str, Cause) -> Error,
) -> Error {
    kind(
        op,
        Cause::WrongCategory {
            type_name: got.type_name(),
            category,
        },
    )
}

/// Read `body` to the end, or until `ctx` is done.
async fn read_body<S, B, E>(ctx: &Context, body: S) -> std::result::Result<Vec<u8>, Cause>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<BoxError>,
{
    let mut body = pin!(body);
    let mut bytes = Vec::new();
    loop {
        let chunk = tokio::select! {
            biased;
            reason = ctx.done() => return Err(Cause::Done(reason)),
            chunk = body.next() => chunk,
        };
        match chunk {
            Some(Ok(chunk)) => bytes.extend_from_slice(chunk.as_ref()),
            Some(Err(e)) => return Err(Cause::Body(e.into())),
            None => return Ok(bytes),
        }
    }
}
