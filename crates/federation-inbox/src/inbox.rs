//! Shared inbox state: the resolver and the recently accepted activities.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use federation_core::{Activity, Resolver};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::InboxConfig;

/// Maximum accepted activities kept in memory.
pub const MAX_RECENT: usize = 200;

/// Summary of an accepted activity.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedActivity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Local user whose inbox received it; `None` for the shared inbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub received_at: u64,
}

impl AcceptedActivity {
    pub fn new(activity: &Activity, recipient: Option<String>) -> Self {
        Self {
            id: activity.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            kind: activity.kind.to_string(),
            actor: activity.actor.first().map(|actor| actor.to_string()),
            recipient,
            received_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        }
    }
}

pub struct InboxState {
    pub resolver: Resolver,
    /// Deadline for reading one inbox body.
    pub read_timeout: Duration,
    /// Accepted activities, oldest first.
    pub recent: RwLock<Vec<AcceptedActivity>>,
}

impl InboxState {
    pub fn new(config: &InboxConfig) -> Self {
        info!(
            default_language = %config.resolver.default_language,
            max_idle_maps = config.resolver.max_idle_maps,
            "resolver configured"
        );
        Self {
            resolver: Resolver::new(&config.resolver),
            read_timeout: config.read_timeout,
            recent: RwLock::new(Vec::new()),
        }
    }

    /// Remember an accepted activity, dropping the oldest past [`MAX_RECENT`].
    pub async fn record(&self, accepted: AcceptedActivity) {
        let mut recent = self.recent.write().await;
        recent.push(accepted);
        if recent.len() > MAX_RECENT {
            let excess = recent.len() - MAX_RECENT;
            recent.drain(..excess);
        }
    }
}
