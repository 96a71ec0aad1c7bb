//! HTTP/SSE facade over the engine: stateless translation from requests
//! to store/lifecycle operations, plus the live-stream transport.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::core::AppState;

pub mod api;
pub mod core;

/// Builds the application router. Kept out of `main` so integration
/// tests can drive the exact production routing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::inbox::service_index_handler))
        .route("/api/inbox", post(api::inbox::create_inbox_handler))
        .route("/api/inbox/:uuid", get(api::inbox::get_inbox_handler))
        .route("/api/inbox/:uuid/change", post(api::inbox::change_address_handler))
        .route("/api/inbox/:uuid/refresh", post(api::inbox::refresh_inbox_handler))
        .route("/api/inbox/:uuid/emails", get(api::inbox::list_emails_handler))
        .route("/api/inbox/:uuid/stream", get(api::inbox::stream_inbox_handler))
        .route(
            "/api/email/:id",
            get(api::email::get_email_detail_handler).delete(api::email::delete_email_handler),
        )
        .route("/api/email/:id/otp-status", get(api::email::otp_status_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
