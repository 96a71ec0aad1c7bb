use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A synthesized inbound email. Ids are numeric, strictly increasing and
/// unique across the whole process (not just per inbox). Deletion is
/// soft: `deleted` is flipped but the record stays in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: i64,
    pub inbox_id: Uuid,
    #[serde(rename = "from")]
    pub from_address: String,
    pub subject: String,
    /// HTML body. Sanitization is the consumer's responsibility.
    pub content: String,
    pub received_at: DateTime<Utc>,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    /// Expiry of the embedded OTP. Independent of the owning inbox's
    /// expiry; neither clock constrains the other.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_expires_at: Option<DateTime<Utc>>,
}

// DTO for the detail view: the stored email plus the owning inbox's
// current address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDetail {
    #[serde(flatten)]
    pub email: Email,
    pub to: String,
}

/// OTP state of an email, derived at read time. Matches the wire shape:
/// `{"hasOtp":false}` or `{"hasOtp":true,"otp":..,"expired":..,"expiresAt":..}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpStatus {
    pub has_otp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl OtpStatus {
    pub fn absent() -> Self {
        OtpStatus {
            has_otp: false,
            otp: None,
            expired: None,
            expires_at: None,
        }
    }
}

impl Email {
    /// Derives the OTP status as of `now`. Never cached: two calls that
    /// straddle `otp_expires_at` give different answers, and once the
    /// clock has passed the expiry the transition is one-way.
    pub fn otp_status_at(&self, now: DateTime<Utc>) -> OtpStatus {
        let Some(otp) = &self.otp else {
            return OtpStatus::absent();
        };
        OtpStatus {
            has_otp: true,
            otp: Some(otp.clone()),
            expired: Some(self.otp_expires_at.map(|t| now > t).unwrap_or(false)),
            expires_at: self.otp_expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_email(otp: Option<&str>, otp_expires_at: Option<DateTime<Utc>>) -> Email {
        Email {
            id: 1,
            inbox_id: Uuid::new_v4(),
            from_address: "verify@stripe.com".to_string(),
            subject: "Stripe verification code".to_string(),
            content: "<p>code</p>".to_string(),
            received_at: Utc::now(),
            deleted: false,
            otp: otp.map(|s| s.to_string()),
            otp_expires_at,
        }
    }

    #[test]
    fn status_without_otp_is_absent() {
        let email = sample_email(None, None);
        let status = email.otp_status_at(Utc::now());
        assert!(!status.has_otp);
        assert!(status.otp.is_none());
        assert!(status.expired.is_none());
    }

    #[test]
    fn status_flips_exactly_at_expiry() {
        let expires_at = Utc::now();
        let email = sample_email(Some("042613"), Some(expires_at));

        let before = email.otp_status_at(expires_at - Duration::seconds(1));
        assert_eq!(before.expired, Some(false));

        // The boundary instant itself still counts as valid.
        let at = email.otp_status_at(expires_at);
        assert_eq!(at.expired, Some(false));

        let after = email.otp_status_at(expires_at + Duration::seconds(1));
        assert_eq!(after.expired, Some(true));
    }

    #[test]
    fn wire_shape_omits_absent_otp_fields() {
        let email = sample_email(None, None);
        let json = serde_json::to_value(&email).unwrap();
        assert!(json.get("otp").is_none());
        assert!(json.get("otpExpiresAt").is_none());
        assert!(json.get("from").is_some());
        assert!(json.get("receivedAt").is_some());

        let status = serde_json::to_value(email.otp_status_at(Utc::now())).unwrap();
        assert_eq!(status, serde_json::json!({ "hasOtp": false }));
    }
}
