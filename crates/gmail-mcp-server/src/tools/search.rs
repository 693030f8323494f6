use super::{parse_args, ToolContext};
use gmail_mcp_core::errors::{ToolError, ToolResult};
use gmail_mcp_core::gmail::MessageFormat;
use gmail_mcp_core::validate::sanitize_input;
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const MAX_RESULTS_CAP: u32 = 50;

const SUMMARY_HEADERS: &[&str] = &["From", "To", "Subject", "Date"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    query: String,
    max_results: Option<u32>,
}

/// Requested count clamped to the cap. Zero is rejected rather than
/// silently turned into the default.
pub fn effective_max_results(requested: Option<u32>) -> ToolResult<u32> {
    match requested {
        Some(0) => Err(ToolError::validation("maxResults must be at least 1")),
        Some(n) => Ok(n.min(MAX_RESULTS_CAP)),
        None => Ok(DEFAULT_MAX_RESULTS),
    }
}

/// One list call, then one metadata fetch per hit.
pub async fn search_emails(ctx: &ToolContext<'_>, args: &Value) -> ToolResult<Value> {
    let args: Args = parse_args(args)?;
    let query = sanitize_input(&args.query);
    let max = effective_max_results(args.max_results)?;

    let refs = ctx.client.list_messages(Some(&query), &[], max).await?;

    let mut messages = Vec::with_capacity(refs.len());
    for r in &refs {
        let msg = ctx
            .client
            .get_message(&r.id, MessageFormat::Metadata, SUMMARY_HEADERS)
            .await?;
        messages.push(json!({
            "id": msg.id,
            "threadId": msg.thread_id,
            "snippet": msg.snippet,
            "from": msg.header("From"),
            "to": msg.header("To"),
            "subject": msg.header("Subject"),
            "date": msg.header("Date"),
        }));
    }

    tracing::debug!(event = "search_done", hits = messages.len(), max);
    Ok(json!({
        "count": messages.len(),
        "messages": messages,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_max_results() {
        assert_eq!(effective_max_results(None).unwrap(), 10);
        assert_eq!(effective_max_results(Some(5)).unwrap(), 5);
        assert_eq!(effective_max_results(Some(50)).unwrap(), 50);
        assert_eq!(effective_max_results(Some(500)).unwrap(), 50);
        assert!(effective_max_results(Some(0)).is_err());
    }
}
