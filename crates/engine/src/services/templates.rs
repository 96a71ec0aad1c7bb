//! Fixed catalog of synthetic email content: four OTP sender templates
//! mimicking known providers, the welcome message sent on every inbox
//! creation/rotation, and the generic notification used by the live
//! stream. Builders are pure functions of `(otp, expires_at)` so tests
//! can assert exact substrings of the rendered bodies.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Placeholder some subjects embed; replaced with the real code at
/// synthesis time.
const OTP_PLACEHOLDER: &str = "123456";

pub const WELCOME_FROM: &str = "welcome@temp-mail.org";
pub const WELCOME_SUBJECT: &str = "Welcome to Temporary Mail!";

pub struct OtpTemplate {
    pub name: &'static str,
    pub from: &'static str,
    subject: &'static str,
    builder: fn(&str, DateTime<Utc>) -> String,
}

impl OtpTemplate {
    pub fn subject_for(&self, otp: &str) -> String {
        self.subject.replace(OTP_PLACEHOLDER, otp)
    }

    /// Renders the HTML body embedding the code and a human-readable
    /// expiry time. Deterministic given its inputs.
    pub fn body(&self, otp: &str, expires_at: DateTime<Utc>) -> String {
        (self.builder)(otp, expires_at)
    }
}

/// Uniform-random selection over the catalog.
pub fn pick_template() -> &'static OtpTemplate {
    let idx = rand::thread_rng().gen_range(0..OTP_TEMPLATES.len());
    &OTP_TEMPLATES[idx]
}

fn clock_time(at: DateTime<Utc>) -> String {
    at.format("%I:%M %p").to_string()
}

pub const OTP_TEMPLATES: &[OtpTemplate] = &[
    OtpTemplate {
        name: "WorkOS",
        from: "access@workos-mail.com",
        subject: "Sign in to Million",
        builder: workos_body,
    },
    OtpTemplate {
        name: "Stripe",
        from: "verify@stripe.com",
        subject: "Stripe verification code",
        builder: stripe_body,
    },
    OtpTemplate {
        name: "Google",
        from: "no-reply@accounts.google.com",
        subject: "Your Google verification code",
        builder: google_body,
    },
    OtpTemplate {
        name: "GitHub",
        from: "noreply@github.com",
        subject: "Sign in code: 123456",
        builder: github_body,
    },
];

fn workos_body(otp: &str, expires_at: DateTime<Utc>) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333; margin-bottom: 24px;">Sign in to Million</h2>
  <p>You requested to sign in to Million. Your one-time code is:</p>
  <div style="background-color: #f5f5f5; padding: 16px; border-radius: 8px; font-size: 24px; font-weight: bold; letter-spacing: 2px; text-align: center; margin: 24px 0;">
    {otp}
  </div>
  <p style="margin-bottom: 24px;">This code expires at {expiry}.</p>
  <p style="color: #666; font-size: 14px;">Email sent by WorkOS on behalf of Million.</p>
  <p style="color: #666; font-size: 14px;">If you didn't request to sign in to Million, you can safely ignore this email.</p>
</div>"#,
        otp = otp,
        expiry = clock_time(expires_at),
    )
}

fn stripe_body(otp: &str, _expires_at: DateTime<Utc>) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="padding: 24px 0;">
    <h2 style="color: #32325d; margin-bottom: 18px;">Your Stripe verification code</h2>
    <p style="margin-bottom: 24px; color: #525f7f;">This code will expire in 10 minutes.</p>
    <div style="background-color: #f6f9fc; border: 1px solid #e3e8ee; border-radius: 4px; padding: 16px; font-size: 24px; font-weight: bold; letter-spacing: 2px; margin: 24px 0; text-align: center;">
      {otp}
    </div>
    <p style="color: #525f7f; margin-bottom: 24px;">If you didn't request this code, you can safely ignore this email.</p>
  </div>
  <div style="border-top: 1px solid #e3e8ee; padding-top: 16px; font-size: 12px; color: #8898aa;">
    <p>Stripe, 510 Townsend Street, San Francisco, CA 94103</p>
  </div>
</div>"#,
        otp = otp,
    )
}

fn google_body(otp: &str, _expires_at: DateTime<Utc>) -> String {
    format!(
        r#"<div style="font-family: 'Google Sans', Roboto, Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="padding: 24px 0;">
    <h2 style="color: #202124; margin-bottom: 18px; font-weight: 400;">Verification code</h2>
    <p style="margin-bottom: 24px; color: #5f6368;">Your verification code is:</p>
    <div style="font-size: 24px; color: #202124; margin: 24px 0;">
      <strong>{otp}</strong>
    </div>
    <p style="color: #5f6368;">This code will expire in 10 minutes.</p>
    <p style="color: #5f6368; margin-top: 24px;">If you didn't request this code, someone might be trying to access your account.</p>
    <p style="color: #5f6368;">The Google Accounts team</p>
  </div>
</div>"#,
        otp = otp,
    )
}

fn github_body(otp: &str, expires_at: DateTime<Utc>) -> String {
    format!(
        r#"<div style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="padding: 24px 0;">
    <h2 style="color: #24292e; margin-bottom: 18px;">Your one-time code: {otp}</h2>
    <p style="margin-bottom: 24px; color: #586069;">
      We received a request to sign in to GitHub.com using this email address. Enter this code to complete your sign in.
    </p>
    <p style="color: #586069; margin-top: 24px;">
      If you don't recognize this activity, change your GitHub.com password and enable two-factor authentication.
    </p>
    <p style="color: #586069; margin-top: 24px;">
      Expires at {expiry}.
    </p>
    <div style="margin-top: 48px; color: #6a737d; font-size: 12px;">
      <p>You're receiving this email because a sign-in attempt requires additional confirmation.</p>
    </div>
  </div>
</div>"#,
        otp = otp,
        expiry = clock_time(expires_at),
    )
}

pub fn welcome_body() -> String {
    r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 24px;">
  <h2 style="color: #3b82f6; margin-bottom: 16px;">Welcome to Temporary Mail!</h2>
  <p>This is your private temporary inbox. You can use this email address to sign up for services without using your personal email.</p>

  <h3 style="margin-top: 24px; margin-bottom: 12px;">How it works:</h3>
  <ul>
    <li>Any emails sent to this address will appear in your inbox automatically.</li>
    <li>Your temporary email address will expire in 10 minutes.</li>
    <li>Click "Change Address" to generate a new temporary email address.</li>
    <li>Click "Refresh Inbox" to check for new emails.</li>
  </ul>

  <p style="margin-top: 24px;">Enjoy your temporary email service!</p>
</div>"#
        .to_string()
}

pub fn notification_body(at: DateTime<Utc>) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 24px;">
  <h2 style="color: #3b82f6; margin-bottom: 16px;">New Notification</h2>
  <p>This is an auto-generated notification email at {time}</p>
  <p>Your temporary email account is working properly!</p>
</div>"#,
        time = clock_time(at),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_embeds_the_code() {
        let expires_at = Utc::now();
        for template in OTP_TEMPLATES {
            let body = template.body("847201", expires_at);
            assert!(
                body.contains("847201"),
                "template {} lost the code",
                template.name
            );
        }
    }

    #[test]
    fn builders_are_deterministic() {
        let expires_at = Utc::now();
        for template in OTP_TEMPLATES {
            assert_eq!(
                template.body("000042", expires_at),
                template.body("000042", expires_at)
            );
        }
    }

    #[test]
    fn subject_placeholder_is_replaced() {
        let github = OTP_TEMPLATES
            .iter()
            .find(|t| t.name == "GitHub")
            .unwrap();
        assert_eq!(github.subject_for("990011"), "Sign in code: 990011");

        // Subjects without the placeholder pass through untouched.
        let stripe = OTP_TEMPLATES
            .iter()
            .find(|t| t.name == "Stripe")
            .unwrap();
        assert_eq!(stripe.subject_for("990011"), "Stripe verification code");
    }
}
