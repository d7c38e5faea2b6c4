//! Live viewer count over server-sent events

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use tracing::{debug, error};

use crate::core::SharedState;
use crate::presence::{Viewer, CHANGE_EVENT};

/// `GET /users/connected`
///
/// The stream owns a [`Viewer`]; when the client goes away axum drops the
/// stream and the viewer unsubscribes and disconnects.
pub async fn connected(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let viewer = Viewer::open(&state.presence);
    debug!(listener = viewer.listener_id(), "live viewer connected");

    let events = stream::unfold((viewer, state), |(mut viewer, state)| async move {
        let count = viewer.next_count().await?;
        let data = state.views.connected(count).unwrap_or_else(|e| {
            error!(error = %e, "failed to render viewer count");
            count.to_string()
        });
        let event = Event::default().event(CHANGE_EVENT).data(data);
        Some((Ok(event), (viewer, state)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
