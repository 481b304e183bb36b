use std::convert::Infallible;

use axum::{
    Router,
    extract::{Query, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::AppError,
    services::sse_service::{self, StreamKind},
    state::SharedState,
};

/// Query parameters accepted by the public stream.
#[derive(Debug, Deserialize)]
pub struct PublicStreamQuery {
    /// Registered participant to bind to this stream; when the stream ends
    /// the participant is removed as if they logged out.
    pub participant_id: Option<Uuid>,
}

/// Query parameters required by the host stream. EventSource clients cannot
/// set headers, so the token travels as a query parameter here.
#[derive(Debug, Deserialize)]
pub struct HostStreamQuery {
    pub token: String,
}

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    params(("participant_id" = Option<Uuid>, Query, description = "Bind the stream to a registered participant")),
    responses((status = 200, description = "Public SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime competition events to every connected client.
pub async fn public_stream(
    State(state): State<SharedState>,
    Query(query): Query<PublicStreamQuery>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_public(&state);
    let kind = match query.participant_id {
        Some(participant_id) => {
            info!(%participant_id, "New participant SSE connection");
            StreamKind::Participant(state.clone(), participant_id)
        }
        None => {
            info!("New public SSE connection");
            StreamKind::Public
        }
    };
    sse_service::broadcast_stream_info(state.public_sse(), "public stream connected");
    sse_service::to_sse_stream(receiver, kind)
}

#[utoipa::path(
    get,
    path = "/sse/host",
    tag = "sse",
    params(("token" = String, Query, description = "Host token issued by /host/login")),
    responses(
        (status = 200, description = "Host SSE stream", content_type = "text/event-stream", body = String),
        (status = 401, description = "Unknown host token")
    )
)]
/// Stream host-only events (the activity log feed) to an authenticated host.
pub async fn host_stream(
    State(state): State<SharedState>,
    Query(query): Query<HostStreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let receiver = sse_service::subscribe_host(&state, &query.token)?;
    info!("New host SSE connection");
    sse_service::broadcast_stream_info(state.host_sse(), "host stream connected");
    Ok(sse_service::to_sse_stream(receiver, StreamKind::Host))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/public", get(public_stream))
        .route("/sse/host", get(host_stream))
}
