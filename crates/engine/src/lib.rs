//! Core engine for the disposable-email demo: inbox identities with
//! expiry, synthetic email generation (including OTP templates), the
//! in-memory store, and live-stream email synthesis.
//!
//! This crate is transport-agnostic; the HTTP/SSE facade lives in the
//! `http-server` crate.

pub mod models;
pub mod services;
