//! Inbox/email lifecycle: inbox creation and address rotation, demo-email
//! seeding, refresh injection, lookups, soft deletion, and OTP status
//! derivation. All operations go through an injected [`MemoryStore`].

use crate::models::email::{Email, EmailDetail, OtpStatus};
use crate::models::inbox::Inbox;
use crate::services::error::EngineError;
use crate::services::generator::{expiry_time, generate_address, generate_otp};
use crate::services::store::MemoryStore;
use crate::services::templates::{pick_template, welcome_body, WELCOME_FROM, WELCOME_SUBJECT};
use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

pub const OTP_LENGTH: u32 = 6;
/// OTP expiry used for the seeded demo email.
pub const SEED_OTP_TTL_MINUTES: i64 = 10;
/// Injected OTP emails get an expiry uniform in this range (minutes).
pub const INJECTED_OTP_TTL_MINUTES: std::ops::Range<i64> = 5..20;
/// Chance that a refresh call injects a new email.
const REFRESH_INJECTION_PROBABILITY: f64 = 0.5;

/// Creates an inbox with a fresh address and the configured TTL, then
/// seeds it with the demo emails.
pub fn create_inbox(store: &MemoryStore, domain: &str, ttl_minutes: i64) -> Inbox {
    let now = Utc::now();
    let inbox = Inbox {
        id: Uuid::new_v4(),
        email_address: generate_address(domain),
        created_at: now,
        expires_at: now + Duration::minutes(ttl_minutes),
    };
    store.insert_inbox(inbox.clone());
    seed_demo_emails(store, inbox.id);
    info!(inbox = %inbox.id, address = %inbox.email_address, "created inbox");
    inbox
}

pub fn get_inbox(store: &MemoryStore, id: Uuid) -> Result<Inbox, EngineError> {
    store.get_inbox(id).ok_or(EngineError::InboxNotFound)
}

/// Rotates the address in place: new address, fresh expiry, email list
/// cleared and reseeded. The previous address stops being valid the
/// moment this returns; there is no dual-validity window.
pub fn change_address(
    store: &MemoryStore,
    id: Uuid,
    domain: &str,
    ttl_minutes: i64,
) -> Result<Inbox, EngineError> {
    let updated = store
        .update_inbox(id, |inbox| {
            inbox.email_address = generate_address(domain);
            inbox.expires_at = expiry_time(ttl_minutes);
        })
        .ok_or(EngineError::InboxNotFound)?;

    store.clear_emails(id);
    seed_demo_emails(store, id);
    info!(inbox = %id, address = %updated.email_address, "rotated inbox address");
    Ok(updated)
}

/// Appends exactly two emails: the welcome message and one OTP email
/// from a random template, both received now.
pub fn seed_demo_emails(store: &MemoryStore, inbox_id: Uuid) {
    let welcome = Email {
        id: store.next_email_id(),
        inbox_id,
        from_address: WELCOME_FROM.to_string(),
        subject: WELCOME_SUBJECT.to_string(),
        content: welcome_body(),
        received_at: Utc::now(),
        deleted: false,
        otp: None,
        otp_expires_at: None,
    };
    store.append_email(welcome);
    store.append_email(synthesize_otp_email(store, inbox_id, SEED_OTP_TTL_MINUTES));
}

/// Builds (but does not store) an OTP email from a random template.
pub(crate) fn synthesize_otp_email(
    store: &MemoryStore,
    inbox_id: Uuid,
    otp_ttl_minutes: i64,
) -> Email {
    let template = pick_template();
    let otp = generate_otp(OTP_LENGTH);
    let expires_at = expiry_time(otp_ttl_minutes);
    Email {
        id: store.next_email_id(),
        inbox_id,
        from_address: template.from.to_string(),
        subject: template.subject_for(&otp),
        content: template.body(&otp, expires_at),
        received_at: Utc::now(),
        deleted: false,
        otp: Some(otp),
        otp_expires_at: Some(expires_at),
    }
}

pub(crate) fn random_injected_ttl() -> i64 {
    rand::thread_rng().gen_range(INJECTED_OTP_TTL_MINUTES)
}

/// Refresh: with probability 0.5, injects one new OTP email whose OTP
/// expiry is randomized between 5 and 20 minutes out. Returns the
/// injected email, if any.
pub fn refresh_inbox(store: &MemoryStore, id: Uuid) -> Result<Option<Email>, EngineError> {
    if !store.contains_inbox(id) {
        return Err(EngineError::InboxNotFound);
    }
    if !rand::thread_rng().gen_bool(REFRESH_INJECTION_PROBABILITY) {
        return Ok(None);
    }

    let email = synthesize_otp_email(store, id, random_injected_ttl());
    store.append_email(email.clone());
    debug!(inbox = %id, email = email.id, "injected OTP email on refresh");
    Ok(Some(email))
}

/// All emails for the inbox in insertion order, soft-deleted included.
/// Consumers filter `deleted` out of list views.
pub fn list_emails(store: &MemoryStore, inbox_id: Uuid) -> Vec<Email> {
    store.emails_for(inbox_id)
}

/// Cross-inbox lookup by email id, attaching the owning inbox's current
/// address as `to`.
pub fn email_detail(store: &MemoryStore, id: i64) -> Result<EmailDetail, EngineError> {
    let email = store.get_email(id).ok_or(EngineError::EmailNotFound)?;
    let inbox = store
        .get_inbox(email.inbox_id)
        .ok_or(EngineError::EmailNotFound)?;
    Ok(EmailDetail {
        to: inbox.email_address,
        email,
    })
}

/// Soft delete. A second delete of the same email still succeeds (the
/// record is found; the flag is simply set again).
pub fn delete_email(store: &MemoryStore, id: i64) -> Result<(), EngineError> {
    if store.mark_deleted(id) {
        Ok(())
    } else {
        Err(EngineError::EmailNotFound)
    }
}

/// OTP status as of this call. `expired` is recomputed from the wall
/// clock every time, never cached.
pub fn otp_status(store: &MemoryStore, id: i64) -> Result<OtpStatus, EngineError> {
    let email = store.get_email(id).ok_or(EngineError::EmailNotFound)?;
    Ok(email.otp_status_at(Utc::now()))
}
