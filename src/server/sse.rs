//! The push channel: one SSE stream per (room, pid).
//!
//! The first frame on every (re)connection is a fresh full snapshot;
//! every mutation pushes another. Keep-alive comments flow every 25
//! seconds. Dropping the stream unregisters the connection, but only if
//! it still owns the slot, so a reconnect that replaced it is untouched.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;

use crate::subscribe::SubscriberHub;

use super::routes::AppState;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

pub async fn events(
    State(state): State<AppState>,
    Path((code, pid)): Path<(String, String)>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let code = code.trim().to_lowercase();
    let subscription = state.service.subscribers().register(&code, &pid);

    let initial = match state.service.room_snapshot(&code, Some(&pid)).await {
        Ok(snapshot) => serde_json::to_string(&snapshot)
            .unwrap_or_else(|err| json!({ "error": err.to_string() }).to_string()),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    };

    let updates = SubscriberStream {
        hub: Arc::clone(state.service.subscribers()),
        code,
        pid,
        id: subscription.id,
        rx: subscription.rx,
    };

    let stream = stream::once(async move { Ok::<Event, Infallible>(Event::default().data(initial)) })
        .chain(updates.map(|payload| Ok::<Event, Infallible>(Event::default().data(payload))));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}

/// Receiver half of a subscription that unregisters itself (identity
/// checked) when the client goes away.
struct SubscriberStream {
    hub: Arc<SubscriberHub>,
    code: String,
    pid: String,
    id: u64,
    rx: mpsc::Receiver<String>,
}

impl Stream for SubscriberStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for SubscriberStream {
    fn drop(&mut self) {
        self.hub.unregister(&self.code, &self.pid, self.id);
    }
}
