use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::ServerEvent,
    error::ServiceError,
    services::participant_service,
    state::{SharedState, SseHub},
};

/// Subscribe to the shared public SSE stream.
pub fn subscribe_public(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.public_sse().subscribe()
}

/// Subscribe to the host-only SSE stream after checking the presented token.
pub fn subscribe_host(
    state: &SharedState,
    token: &str,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    if !state.host_tokens().contains_key(token) {
        return Err(ServiceError::Unauthorized(
            "Host authentication required".into(),
        ));
    }
    Ok(state.host_sse().subscribe())
}

/// Identifies the target SSE stream so we can perform stream-specific
/// bookkeeping when the connection is torn down.
#[derive(Clone)]
pub enum StreamKind {
    /// Anonymous public subscriber (viewer or not-yet-registered client).
    Public,
    /// Public subscriber bound to a registered participant. Carries a clone
    /// of the shared application state so teardown logic can remove the
    /// participant after the spawned task completes. Cloning `SharedState`
    /// is cheap because it is just bumping the inner `Arc`.
    Participant(SharedState, Uuid),
    /// Host subscriber. Host tokens outlive the stream, so teardown only
    /// logs the disconnect.
    Host,
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    kind: StreamKind,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        match kind {
            StreamKind::Public => tracing::info!("Public SSE stream disconnected"),
            StreamKind::Participant(state, participant_id) => {
                // Own the necessary state inside the spawned task so we can
                // clean up even if the request context has already dropped.
                participant_service::handle_disconnect(&state, participant_id).await;
                tracing::info!(%participant_id, "Participant SSE stream disconnected");
            }
            StreamKind::Host => tracing::info!("Host SSE stream disconnected"),
        }
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Send a human-readable info message onto the given stream.
pub fn broadcast_stream_info(hub: &SseHub, message: &str) {
    hub.broadcast(ServerEvent::new(
        Some("info".to_string()),
        message.to_string(),
    ));
}
