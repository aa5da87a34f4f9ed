//! HTTP handlers.
//!
//! Endpoints:
//! - POST /inbox, POST /users/{name}/inbox: accept an activity
//! - GET  /api/activities: page through recently accepted activities
//! - POST /api/resolve/statusable, /api/resolve/accountable: resolve a document and echo it normalized

use std::error::Error as _;
use std::sync::Arc;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use federation_core::{Accountable, Context, Error, ErrorKind, Statusable};
use http_body_util::LengthLimitError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::inbox::{AcceptedActivity, InboxState};

/// A resolution failure rendered as `{ "error": ... }`.
///
/// Only the safe message reaches the sender; the full diagnostic is logged.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    /// Whether the body stream was cut off by the request body limit.
    fn body_too_large(&self) -> bool {
        std::iter::successors(self.0.source(), |err| (*err).source())
            .any(|err| err.is::<LengthLimitError>())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.body_too_large() {
            info!(op = self.0.op(), "rejected oversized body");
            let body = ErrorBody { error: "Payload Too Large" };
            return (StatusCode::PAYLOAD_TOO_LARGE, Json(body)).into_response();
        }

        let err = self.0;
        match err.kind() {
            ErrorKind::Internal | ErrorKind::Other => error!(op = err.op(), "{err}"),
            ErrorKind::BadRequest | ErrorKind::WrongType => {
                info!(op = err.op(), kind = %err.kind(), "rejected document: {err}")
            }
        }

        let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody { error: err.safe_message() })).into_response()
    }
}

/// Response for an accepted activity.
#[derive(Debug, Serialize)]
pub struct Accepted {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// POST /inbox: the shared inbox.
pub async fn shared_inbox(
    State(state): State<Arc<InboxState>>,
    body: Body,
) -> Result<(StatusCode, Json<Accepted>), ApiError> {
    receive(&state, body, None).await
}

/// POST /users/{name}/inbox: a user's inbox.
pub async fn user_inbox(
    State(state): State<Arc<InboxState>>,
    Path(name): Path<String>,
    body: Body,
) -> Result<(StatusCode, Json<Accepted>), ApiError> {
    receive(&state, body, Some(name)).await
}

async fn receive(
    state: &InboxState,
    body: Body,
    recipient: Option<String>,
) -> Result<(StatusCode, Json<Accepted>), ApiError> {
    let ctx = Context::background().with_timeout(state.read_timeout);
    let activity = state
        .resolver
        .resolve_incoming_activity(&ctx, body.into_data_stream())
        .await?;

    let accepted = AcceptedActivity::new(&activity, recipient);
    debug!(id = %accepted.id, kind = %accepted.kind, recipient = ?accepted.recipient, "accepted activity");
    let response = Accepted {
        id: accepted.id.clone(),
        kind: accepted.kind.clone(),
    };
    state.record(accepted).await;

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Query params for GET /api/activities.
#[derive(Debug, Default, Deserialize)]
pub struct ActivitiesQuery {
    /// Only return activities after this index.
    pub after: Option<usize>,
    /// Max activities to return (default 50, at most 200).
    pub limit: Option<usize>,
}

/// Response for GET /api/activities.
#[derive(Debug, Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<AcceptedActivity>,
    /// Index after the last returned activity; pass as `after` to continue.
    pub cursor: usize,
}

/// GET /api/activities: recently accepted activities, oldest first.
pub async fn list_activities(
    State(state): State<Arc<InboxState>>,
    Query(params): Query<ActivitiesQuery>,
) -> Json<ActivitiesResponse> {
    let recent = state.recent.read().await;
    let after = params.after.unwrap_or(0);
    let limit = params.limit.unwrap_or(50).min(200);

    let activities: Vec<AcceptedActivity> = recent.iter().skip(after).take(limit).cloned().collect();
    let cursor = after + activities.len();

    Json(ActivitiesResponse { activities, cursor })
}

/// POST /api/resolve/statusable
pub async fn resolve_statusable(
    State(state): State<Arc<InboxState>>,
    body: Bytes,
) -> Result<Json<Statusable>, ApiError> {
    let status = state.resolver.resolve_statusable(&Context::background(), &body)?;
    Ok(Json(status))
}

/// POST /api/resolve/accountable
pub async fn resolve_accountable(
    State(state): State<Arc<InboxState>>,
    body: Bytes,
) -> Result<Json<Accountable>, ApiError> {
    let account = state.resolver.resolve_accountable(&Context::background(), &body)?;
    Ok(Json(account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InboxConfig;
    use serde_json::{Value, json};

    fn state() -> Arc<InboxState> {
        Arc::new(InboxState::new(&InboxConfig::default()))
    }

    fn body(doc: Value) -> Body {
        Body::from(serde_json::to_vec(&doc).unwrap())
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn inbox_accepts_activity() {
        let state = state();
        let doc = json!({
            "type": "Create",
            "id": "https://a.example/activities/1",
            "actor": "https://a.example/users/alice",
            "object": {"type": "Note", "id": "https://a.example/notes/1", "content": "hi"},
        });

        let (status, Json(accepted)) = shared_inbox(State(state.clone()), body(doc)).await.unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(accepted.id, "https://a.example/activities/1");
        assert_eq!(accepted.kind, "Create");

        let recent = state.recent.read().await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].actor.as_deref(), Some("https://a.example/users/alice"));
        assert!(recent[0].recipient.is_none());
    }

    #[tokio::test]
    async fn user_inbox_records_recipient() {
        let state = state();
        let doc = json!({"type": "Follow", "id": "https://a.example/f/1", "object": "https://b.example/users/bob"});

        user_inbox(State(state.clone()), Path("bob".to_string()), body(doc))
            .await
            .unwrap();
        assert_eq!(state.recent.read().await[0].recipient.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn missing_id_is_400_with_safe_message() {
        let doc = json!({"type": "Like", "object": "https://b.example/notes/1"});
        let err = shared_inbox(State(state()), body(doc)).await.unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "missing ActivityStreams id property"})
        );
    }

    #[tokio::test]
    async fn malformed_json_does_not_leak_details() {
        let err = shared_inbox(State(state()), Body::from("{\"type\": [")).await.unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"error": "Internal Server Error"}));
    }

    #[tokio::test]
    async fn streamed_body_over_limit_is_413() {
        let doc = json!({
            "type": "Create",
            "id": "https://a.example/activities/1",
            "object": {"type": "Note", "id": "https://a.example/notes/1", "content": "x".repeat(256)},
        });
        let limited = Body::new(http_body_util::Limited::new(body(doc), 64));
        let err = shared_inbox(State(state()), limited).await.unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await, json!({"error": "Payload Too Large"}));
    }

    #[tokio::test]
    async fn activities_page_with_cursor() {
        let state = state();
        for n in 0..3 {
            let doc = json!({"type": "Like", "id": format!("https://a.example/likes/{n}")});
            shared_inbox(State(state.clone()), body(doc)).await.unwrap();
        }

        let query = ActivitiesQuery { after: Some(1), limit: Some(1) };
        let Json(page) = list_activities(State(state), Query(query)).await;
        assert_eq!(page.cursor, 2);
        assert_eq!(page.activities.len(), 1);
        assert_eq!(page.activities[0].id, "https://a.example/likes/1");
    }

    #[tokio::test]
    async fn resolve_statusable_returns_normalized_json() {
        let doc = json!({"type": "Note", "id": "https://a.example/notes/1", "content": "hello"});
        let Json(status) = resolve_statusable(State(state()), Bytes::from(serde_json::to_vec(&doc).unwrap()))
            .await
            .unwrap();

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["type"], "Note");
        assert_eq!(value["content"], json!({"und": "hello"}));
        assert_eq!(value["attachment"], json!([]));
    }

    #[tokio::test]
    async fn person_is_not_a_statusable() {
        let doc = json!({"type": "Person", "id": "https://a.example/users/alice"});
        let err = resolve_statusable(State(state()), Bytes::from(serde_json::to_vec(&doc).unwrap()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn resolve_accountable_returns_profile() {
        let doc = json!({"type": "Person", "id": "https://a.example/users/alice", "summary": "hi"});
        let Json(account) = resolve_accountable(State(state()), Bytes::from(serde_json::to_vec(&doc).unwrap()))
            .await
            .unwrap();
        assert_eq!(serde_json::to_value(&account).unwrap()["summary"], json!({"und": "hi"}));
    }
}
