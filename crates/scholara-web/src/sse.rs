//! Server-Sent Events (SSE) streaming of research events.

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::extract::State;
use futures_core::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::SharedState;

/// SSE endpoint. Each event's `type` tag doubles as the SSE event name;
/// lagged receivers skip what they missed.
pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    let stream = BroadcastStream::new(rx)
        .filter_map(|result| {
            result.ok().and_then(|event| {
                let data = serde_json::to_value(&event).ok()?;
                let name = data.get("type").and_then(|t| t.as_str()).unwrap_or("message").to_string();
                Some(Ok(Event::default().event(name).data(data.to_string())))
            })
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
