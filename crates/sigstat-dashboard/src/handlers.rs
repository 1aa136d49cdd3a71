// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the dashboard.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sigstat_analysis::{Metric, for_conversation};
use sigstat_core::{Conversation, ConversationType};
use tracing::{debug, error};

use crate::figures::{Figure, FigureKind, build_figure};
use crate::server::DashboardState;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Age of the cached message table, absent before the first fetch.
    pub cache_age_secs: Option<u64>,
}

/// One entry of GET /api/conversations.
#[derive(Debug, Serialize)]
pub struct ConversationEntry {
    /// Value to pass back as `?conversation=`.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConversationType,
    pub members: Option<usize>,
}

impl From<&Conversation> for ConversationEntry {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.to_text(),
            name: conversation.name.clone(),
            kind: conversation.kind,
            members: conversation.members.as_ref().map(Vec::len),
        }
    }
}

/// Query parameters of GET /api/figures/{name}.
#[derive(Debug, Default, Deserialize)]
pub struct FigureQuery {
    /// Conversation id as listed by /api/conversations; all when absent.
    #[serde(default)]
    pub conversation: Option<String>,
    /// Timeline metric: `messages`, `words` or `characters`.
    #[serde(default)]
    pub value: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A failed API request.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
pub async fn health(State(state): State<DashboardState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cache_age_secs: state.cache.age().await.map(|age| age.as_secs()),
    })
}

/// GET /api/conversations
///
/// Sorted by display name, like the selector that shows them.
pub async fn conversations(State(state): State<DashboardState>) -> Json<Vec<ConversationEntry>> {
    let mut entries: Vec<ConversationEntry> =
        state.conversations.iter().map(ConversationEntry::from).collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Json(entries)
}

/// GET /api/figures/{name}
pub async fn figure(
    State(state): State<DashboardState>,
    Path(name): Path<String>,
    Query(query): Query<FigureQuery>,
) -> Result<Json<Figure>, ApiError> {
    let kind = FigureKind::from_str(&name)
        .map_err(|_| ApiError::new(StatusCode::NOT_FOUND, format!("unknown figure `{name}`")))?;

    let metric = match query.value.as_deref() {
        None | Some("") => Metric::default(),
        Some(value) => Metric::from_str(value).map_err(|_| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("unknown value `{value}`, expected messages, words or characters"),
            )
        })?,
    };

    let conversation = match query.conversation.as_deref() {
        None | Some("") => None,
        Some(id) => Some(
            state
                .conversations
                .iter()
                .find(|c| c.id.matches_text(id))
                .ok_or_else(|| {
                    ApiError::new(StatusCode::BAD_REQUEST, format!("unknown conversation `{id}`"))
                })?,
        ),
    };

    let messages = state.cache.get_messages().await.map_err(|e| {
        error!(error = %e, figure = %kind, "failed to load messages");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let selected = for_conversation(&messages, conversation.map(|c| &c.id));
    debug!(figure = %kind, messages = selected.len(), "building figure");
    Ok(Json(build_figure(kind, &selected, metric, state.gap)))
}
