//! Thin client for the Gmail REST API (v1) plus helpers for the message
//! resources it returns.

pub mod client;
pub mod compose;
pub mod error;
pub mod mime;
pub mod types;

pub use client::{GmailClient, MessageFormat, GMAIL_API_BASE};
pub use compose::OutgoingMessage;
pub use error::GmailError;
pub use types::*;
