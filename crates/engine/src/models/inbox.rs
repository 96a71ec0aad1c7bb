use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A disposable inbox identity. The address and its expiry are rotated
/// together; rotating invalidates the previous address immediately (no
/// dual-validity window).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbox {
    pub id: Uuid,
    pub email_address: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
