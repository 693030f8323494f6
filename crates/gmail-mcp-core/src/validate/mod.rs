//! Argument validation and sanitization for tool calls.
//!
//! `sanitize_input` only strips angle brackets and surrounding whitespace.
//! It reduces header/HTML injection in outgoing mail but is not an encoder
//! and must not be treated as a security boundary on its own.

use crate::errors::ToolError;
use lazy_static::lazy_static;
use regex::Regex;

pub const MAX_SUBJECT_CHARS: usize = 255;
pub const MAX_BODY_CHARS: usize = 10_000;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    /// Gmail message and attachment ids are URL-safe tokens.
    static ref RESOURCE_ID: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

pub fn validate_email(address: &str) -> bool {
    EMAIL.is_match(address)
}

/// Removes `<` and `>` and trims surrounding whitespace.
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Rejects (never truncates) values longer than `max` characters.
pub fn check_max_len(field: &str, value: &str, max: usize) -> Result<(), ToolError> {
    let len = value.chars().count();
    if len > max {
        return Err(ToolError::validation(format!(
            "{} exceeds maximum length of {} characters (got {})",
            field, max, len
        )));
    }
    Ok(())
}

pub fn validate_resource_id(field: &str, value: &str) -> Result<(), ToolError> {
    if RESOURCE_ID.is_match(value) {
        Ok(())
    } else {
        Err(ToolError::validation(format!(
            "{} must be a non-empty Gmail id ([A-Za-z0-9_-])",
            field
        )))
    }
}

/// A download filename must name a single file inside the downloads
/// directory: no separators, no dot segments.
pub fn validate_filename(name: &str) -> Result<(), ToolError> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        return Err(ToolError::validation(format!(
            "filename '{}' must be a plain file name without path separators",
            name
        )));
    }
    Ok(())
}
