use crate::core::{ApiError, AppState, StreamMode};
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    Json,
};
use engine::models::email::Email;
use engine::models::inbox::Inbox;
use engine::services::{lifecycle, stream as live};
use futures::stream::{Stream, StreamExt};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

/// Root endpoint: a small service index so the API is self-describing.
pub async fn service_index_handler() -> Json<Value> {
    Json(json!({
        "message": "Temporary Mail API - Use /api endpoints for service functionality",
        "status": "online",
        "endpoints": {
            "createInbox": "POST /api/inbox",
            "getInbox": "GET /api/inbox/:uuid",
            "changeInbox": "POST /api/inbox/:uuid/change",
            "refreshInbox": "POST /api/inbox/:uuid/refresh",
            "getEmails": "GET /api/inbox/:uuid/emails",
            "getEmail": "GET /api/email/:id",
            "deleteEmail": "DELETE /api/email/:id",
            "streamUpdates": "GET /api/inbox/:uuid/stream",
            "otpStatus": "GET /api/email/:id/otp-status"
        }
    }))
}

/// Allocates a fresh inbox and seeds its demo emails.
pub async fn create_inbox_handler(State(state): State<AppState>) -> Json<Inbox> {
    let inbox = lifecycle::create_inbox(
        &state.store,
        &state.config.domain,
        state.config.inbox_ttl_minutes,
    );
    Json(inbox)
}

pub async fn get_inbox_handler(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<Inbox>, ApiError> {
    let inbox = lifecycle::get_inbox(&state.store, uuid)?;
    Ok(Json(inbox))
}

/// Rotates the inbox address: fresh address and expiry, email list reset
/// to a new demo seed.
pub async fn change_address_handler(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<Inbox>, ApiError> {
    let inbox = lifecycle::change_address(
        &state.store,
        uuid,
        &state.config.domain,
        state.config.inbox_ttl_minutes,
    )?;
    Ok(Json(inbox))
}

/// Refresh: occasionally injects a new OTP email.
pub async fn refresh_inbox_handler(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    lifecycle::refresh_inbox(&state.store, uuid)?;
    Ok(Json(json!({ "success": true })))
}

/// Every stored email for the inbox, soft-deleted included; clients
/// filter `deleted` out of list views.
pub async fn list_emails_handler(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> Json<Vec<Email>> {
    Json(lifecycle::list_emails(&state.store, uuid))
}

/// Live updates. Push-capable transports get SSE: an immediate
/// `{"connected":true}` handshake, then one email per random tick.
/// Snapshot transports (hosts that cannot hold a connection open) get a
/// single JSON body carrying the handshake and one synthesized email.
pub async fn stream_inbox_handler(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> Response {
    match state.config.stream.mode {
        StreamMode::Snapshot => {
            match live::synthesize_live_email(&state.store, uuid, &state.config.domain) {
                Some(email) => {
                    Json(json!({ "connected": true, "initialEmail": email })).into_response()
                }
                None => Json(json!({ "connected": true })).into_response(),
            }
        }
        StreamMode::Push => {
            info!(inbox = %uuid, "stream subscription opened");
            Sse::new(live_events(state, uuid))
                .keep_alive(KeepAlive::default())
                .into_response()
        }
    }
}

/// The per-subscription event stream. The tick timer lives inside the
/// stream future, so dropping the response body (client disconnect)
/// cancels it synchronously; no detached task can leak.
fn live_events(state: AppState, inbox_id: Uuid) -> impl Stream<Item = Result<Event, axum::Error>> {
    let handshake = futures::stream::once(async {
        Ok::<_, axum::Error>(Event::default().data(r#"{"connected":true}"#))
    });

    let ticks = futures::stream::unfold(state, move |state| async move {
        loop {
            let delay = live::next_tick(state.config.stream.min_tick, state.config.stream.max_tick);
            tokio::time::sleep(delay).await;
            if let Some(email) =
                live::synthesize_live_email(&state.store, inbox_id, &state.config.domain)
            {
                return Some((Event::default().json_data(&email), state));
            }
            // Inbox gone: keep the subscription open, deliver nothing.
        }
    });

    handshake.chain(ticks)
}
