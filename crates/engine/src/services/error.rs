use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Inbox not found")]
    InboxNotFound,

    #[error("Email not found")]
    EmailNotFound,
}
