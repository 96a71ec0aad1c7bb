//! Consumer SDK for the temporary-mail facade: inbox creation with
//! exponential backoff, and an auto-reconnecting live subscription that
//! de-duplicates pushed emails by id. These are the client-side
//! obligations of the HTTP/SSE contract; any UI sits on top of this.

use chrono::{DateTime, Utc};
use engine::models::email::Email;
use engine::models::inbox::Inbox;
use futures::StreamExt;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Retries after the initial creation attempt, with delays of base,
/// 2x base, 4x base.
const CREATE_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Clone)]
pub struct InboxClient {
    http: reqwest::Client,
    base_url: String,
    create_backoff: Duration,
    reconnect_delay: Duration,
}

impl InboxClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        InboxClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            create_backoff: Duration::from_secs(1),
            reconnect_delay: Duration::from_secs(2),
        }
    }

    /// Overrides the reference timings (1s initial creation backoff, 2s
    /// stream reconnect). Test suites shrink these to milliseconds.
    pub fn with_timings(mut self, create_backoff: Duration, reconnect_delay: Duration) -> Self {
        self.create_backoff = create_backoff;
        self.reconnect_delay = reconnect_delay;
        self
    }

    /// `POST /api/inbox`. Failures are retried up to three times with
    /// exponential backoff before the error is surfaced.
    pub async fn create_inbox(&self) -> Result<Inbox, ClientError> {
        let mut delay = self.create_backoff;
        let mut retries = 0;
        loop {
            match self.try_create_inbox().await {
                Ok(inbox) => return Ok(inbox),
                Err(err) if retries < CREATE_RETRIES => {
                    retries += 1;
                    warn!(retry = retries, "inbox creation failed, retrying: {err}");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_create_inbox(&self) -> Result<Inbox, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/inbox", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Opens the live stream for `inbox_id`. On any stream error or
    /// server-side end the previous connection is dropped, and after a
    /// fixed delay a new one is opened, indefinitely, until the handle
    /// is dropped. Emails are de-duplicated by id across reconnects, so
    /// overlapping subscription windows never surface a message twice.
    pub fn subscribe(&self, inbox_id: Uuid) -> Subscription {
        let (tx, rx) = mpsc::channel(32);
        let client = self.clone();
        let task = tokio::spawn(async move { client.run_subscription(inbox_id, tx).await });
        Subscription { rx, task }
    }

    async fn run_subscription(self, inbox_id: Uuid, tx: mpsc::Sender<Email>) {
        let url = format!("{}/api/inbox/{}/stream", self.base_url, inbox_id);
        let mut seen: HashSet<i64> = HashSet::new();
        loop {
            // The previous connection has been dropped by the time we
            // get here, so two channels never run at once.
            match self.read_stream(&url, &mut seen, &tx).await {
                Ok(()) => debug!(inbox = %inbox_id, "stream ended, reconnecting"),
                Err(err) => warn!(inbox = %inbox_id, "stream failed, reconnecting: {err}"),
            }
            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn read_stream(
        &self,
        url: &str,
        seen: &mut HashSet<i64>,
        tx: &mpsc::Sender<Email>,
    ) -> Result<(), ClientError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let mut chunks = response.bytes_stream();
        let mut buf = String::new();
        while let Some(chunk) = chunks.next().await {
            buf.push_str(&String::from_utf8_lossy(&chunk?));
            while let Some(pos) = buf.find("\n\n") {
                let frame: String = buf[..pos].to_string();
                buf.drain(..pos + 2);
                if let Some(email) = parse_frame(&frame) {
                    if seen.insert(email.id) && tx.send(email).await.is_err() {
                        return Ok(()); // receiver gone, stop quietly
                    }
                }
            }
        }

        // Snapshot transports deliver everything in one unframed body;
        // treat the leftover bytes as a final frame.
        if let Some(email) = parse_frame(&buf) {
            if seen.insert(email.id) {
                let _ = tx.send(email).await;
            }
        }
        Ok(())
    }
}

/// Live subscription handle. Dropping it closes the connection and
/// stops the reconnect loop.
pub struct Subscription {
    rx: mpsc::Receiver<Email>,
    task: tokio::task::JoinHandle<()>,
}

impl Subscription {
    /// Next de-duplicated email, across reconnects. `None` only after
    /// the background task has been torn down.
    pub async fn next_email(&mut self) -> Option<Email> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Handshake {
    connected: bool,
    initial_email: Option<Email>,
}

/// Extracts an email from one SSE frame, or from a bare JSON body when
/// the transport is a one-shot snapshot. Handshakes yield their initial
/// email when they carry one; comments and anything unparseable yield
/// nothing.
fn parse_frame(frame: &str) -> Option<Email> {
    let mut data = String::new();
    for line in frame.lines() {
        if let Some(rest) = line.strip_prefix("data: ") {
            data.push_str(rest);
        }
    }
    if data.is_empty() {
        data = frame.trim().to_string();
    }
    if data.is_empty() || data.starts_with(':') {
        return None;
    }
    if let Ok(handshake) = serde_json::from_str::<Handshake>(&data) {
        if !handshake.connected {
            return None;
        }
        return handshake.initial_email;
    }
    serde_json::from_str::<Email>(&data).ok()
}

/// Wall-clock time left before `expires_at`, clamped at zero. Countdown
/// displays recompute this every second; no server round-trip involved.
pub fn time_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (expires_at - now).to_std().unwrap_or(Duration::ZERO)
}
