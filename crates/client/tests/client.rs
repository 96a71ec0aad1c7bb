//! End-to-end tests for the consumer SDK, run against the real facade
//! router served on an ephemeral port (plus hand-rolled routes for the
//! failure-injection cases).

use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use client::{ClientError, InboxClient, Subscription};
use engine::models::email::Email;
use http_server::app;
use http_server::core::{AppConfig, AppState, StreamConfig, StreamMode};
use serde_json::json;
use std::convert::Infallible;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const FAST: Duration = Duration::from_millis(5);

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn demo_app(mode: StreamMode) -> Router {
    app(AppState::new(AppConfig {
        domain: "tempmail.org".to_string(),
        inbox_ttl_minutes: 10,
        stream: StreamConfig {
            mode,
            min_tick: FAST,
            max_tick: Duration::from_millis(15),
        },
    }))
}

fn fast_client(base: &str) -> InboxClient {
    InboxClient::new(base).with_timings(FAST, FAST)
}

async fn next(sub: &mut Subscription) -> Email {
    tokio::time::timeout(Duration::from_secs(5), sub.next_email())
        .await
        .expect("timed out waiting for an email")
        .expect("subscription closed")
}

fn sample_email(inbox_id: Uuid, id: i64) -> Email {
    Email {
        id,
        inbox_id,
        from_address: format!("notifications-{id}@tempmail.org"),
        subject: "New Notification".to_string(),
        content: "<p>hello</p>".to_string(),
        received_at: Utc::now(),
        deleted: false,
        otp: None,
        otp_expires_at: None,
    }
}

#[tokio::test]
async fn create_inbox_round_trips() {
    let base = serve(demo_app(StreamMode::Push)).await;
    let inbox = fast_client(&base).create_inbox().await.unwrap();
    assert!(inbox.email_address.ends_with("@tempmail.org"));
    assert!(inbox.expires_at > inbox.created_at);
}

#[tokio::test]
async fn create_inbox_retries_transient_failures() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();
    let inbox_json = {
        let store = engine::services::store::MemoryStore::new();
        serde_json::to_value(engine::services::lifecycle::create_inbox(
            &store,
            "tempmail.org",
            10,
        ))
        .unwrap()
    };

    let router = Router::new().route(
        "/api/inbox",
        post(move || {
            let calls = handler_calls.clone();
            let inbox = inbox_json.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "message": "boom" })),
                    )
                        .into_response()
                } else {
                    Json(inbox).into_response()
                }
            }
        }),
    );

    let base = serve(router).await;
    let inbox = fast_client(&base).create_inbox().await.unwrap();
    assert!(inbox.email_address.ends_with("@tempmail.org"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn create_inbox_gives_up_after_three_retries() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();
    let router = Router::new().route(
        "/api/inbox",
        post(move || {
            let calls = handler_calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }),
    );

    let base = serve(router).await;
    let err = fast_client(&base).create_inbox().await.unwrap_err();
    assert!(matches!(err, ClientError::Status(s) if s.as_u16() == 500));
    // Initial attempt plus three retries.
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn subscription_delivers_unique_live_emails() {
    let base = serve(demo_app(StreamMode::Push)).await;
    let client = fast_client(&base);
    let inbox = client.create_inbox().await.unwrap();

    let mut sub = client.subscribe(inbox.id);
    let mut ids = Vec::new();
    for _ in 0..3 {
        let email = next(&mut sub).await;
        assert_eq!(email.inbox_id, inbox.id);
        assert!(!ids.contains(&email.id));
        ids.push(email.id);
    }
}

#[tokio::test]
async fn subscription_reconnects_and_deduplicates() {
    let connections = Arc::new(AtomicI64::new(0));
    let handler_connections = connections.clone();
    let inbox_id = Uuid::new_v4();

    // Each connection handshakes, replays email 1, adds one fresh email,
    // then ends, forcing the client to reconnect for more.
    let router = Router::new().route(
        "/api/inbox/:uuid/stream",
        get(move || {
            let connections = handler_connections.clone();
            async move {
                let n = connections.fetch_add(1, Ordering::SeqCst);
                let replayed = sample_email(inbox_id, 1);
                let fresh = sample_email(inbox_id, 100 + n);
                let events = futures::stream::iter(vec![
                    Ok::<_, Infallible>(Event::default().data(r#"{"connected":true}"#)),
                    Ok(Event::default().json_data(&replayed).unwrap()),
                    Ok(Event::default().json_data(&fresh).unwrap()),
                ]);
                Sse::new(events)
            }
        }),
    );

    let base = serve(router).await;
    let client = fast_client(&base);
    let mut sub = client.subscribe(inbox_id);

    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(next(&mut sub).await.id);
    }

    // The replayed email surfaced exactly once; the rest prove that the
    // client kept reconnecting after each server-side end.
    assert_eq!(ids, vec![1, 100, 101, 102]);
    assert!(connections.load(Ordering::SeqCst) >= 3);
}

#[tokio::test]
async fn snapshot_transport_surfaces_initial_emails() {
    let base = serve(demo_app(StreamMode::Snapshot)).await;
    let client = fast_client(&base);
    let inbox = client.create_inbox().await.unwrap();

    // Snapshot bodies close immediately; repeated reconnects keep the
    // emails flowing.
    let mut sub = client.subscribe(inbox.id);
    let first = next(&mut sub).await;
    let second = next(&mut sub).await;
    assert_eq!(first.inbox_id, inbox.id);
    assert_ne!(first.id, second.id);
}
