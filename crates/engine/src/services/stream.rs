//! Live-delivery simulation: the per-tick email synthesis behind each
//! stream subscription. The transport (SSE, or a one-shot snapshot for
//! hosts that cannot hold a connection open) lives in the facade; this
//! module only decides what a tick produces and how long to wait.

use crate::models::email::Email;
use crate::services::lifecycle::{random_injected_ttl, synthesize_otp_email};
use crate::services::store::MemoryStore;
use crate::services::templates::notification_body;
use chrono::Utc;
use rand::Rng;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Default bounds for the random delay between synthesized arrivals.
pub const MIN_TICK: Duration = Duration::from_millis(15_000);
pub const MAX_TICK: Duration = Duration::from_millis(25_000);

/// Chance that a tick produces an OTP email instead of a notification.
const OTP_TICK_PROBABILITY: f64 = 0.3;

/// Uniform random delay before the next synthesized arrival, re-drawn
/// for every tick.
pub fn next_tick(min: Duration, max: Duration) -> Duration {
    let (lo, hi) = (min.as_millis() as u64, max.as_millis() as u64);
    Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
}

/// One stream tick: synthesizes an email, appends it to the inbox's
/// stored list, and hands it back for delivery. Returns `None` when the
/// inbox no longer exists (the subscription stays open but produces
/// nothing, matching a timer firing against a vanished inbox).
pub fn synthesize_live_email(store: &MemoryStore, inbox_id: Uuid, domain: &str) -> Option<Email> {
    if !store.contains_inbox(inbox_id) {
        return None;
    }

    let email = if rand::thread_rng().gen_bool(OTP_TICK_PROBABILITY) {
        synthesize_otp_email(store, inbox_id, random_injected_ttl())
    } else {
        let id = store.next_email_id();
        let now = Utc::now();
        Email {
            id,
            inbox_id,
            // The email's own id doubles as the unique sender suffix.
            from_address: format!("notifications-{}@{}", id, domain),
            subject: format!("New Notification {}", now.format("%I:%M:%S %p")),
            content: notification_body(now),
            received_at: now,
            deleted: false,
            otp: None,
            otp_expires_at: None,
        }
    };

    store.append_email(email.clone());
    debug!(inbox = %inbox_id, email = email.id, otp = email.otp.is_some(), "synthesized live email");
    Some(email)
}
