use super::{parse_args, ToolContext};
use gmail_mcp_core::errors::ToolResult;
use gmail_mcp_core::gmail::mime::{extract_html_content, extract_plain_body, truncate_chars};
use gmail_mcp_core::gmail::{Message, MessageFormat};
use gmail_mcp_core::validate::validate_resource_id;
use serde::Deserialize;
use serde_json::{json, Value};

pub const PLAIN_BODY_LIMIT: usize = 5_000;
pub const HTML_TEXT_LIMIT: usize = 10_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageIdArgs {
    pub message_id: String,
}

impl MessageIdArgs {
    pub(crate) fn parse(args: &Value) -> ToolResult<Self> {
        let parsed: Self = parse_args(args)?;
        validate_resource_id("messageId", &parsed.message_id)?;
        Ok(parsed)
    }
}

fn headers_json(msg: &Message) -> Value {
    json!({
        "from": msg.header("From"),
        "to": msg.header("To"),
        "cc": msg.header("Cc"),
        "subject": msg.header("Subject"),
        "date": msg.header("Date"),
    })
}

async fn fetch_full(ctx: &ToolContext<'_>, id: &str) -> ToolResult<Message> {
    Ok(ctx.client.get_message(id, MessageFormat::Full, &[]).await?)
}

pub async fn read_email(ctx: &ToolContext<'_>, args: &Value) -> ToolResult<Value> {
    let args = MessageIdArgs::parse(args)?;
    let msg = fetch_full(ctx, &args.message_id).await?;

    let body = msg
        .payload
        .as_ref()
        .and_then(extract_plain_body)
        .unwrap_or_default();

    Ok(json!({
        "id": msg.id,
        "threadId": msg.thread_id,
        "labels": msg.label_ids,
        "headers": headers_json(&msg),
        "body": truncate_chars(&body, PLAIN_BODY_LIMIT),
    }))
}

pub async fn read_email_html(ctx: &ToolContext<'_>, args: &Value) -> ToolResult<Value> {
    let args = MessageIdArgs::parse(args)?;
    let msg = fetch_full(ctx, &args.message_id).await?;

    let content = msg
        .payload
        .as_ref()
        .map(extract_html_content)
        .unwrap_or_default();

    Ok(json!({
        "id": msg.id,
        "threadId": msg.thread_id,
        "labels": msg.label_ids,
        "headers": headers_json(&msg),
        "hasHtml": content.html.is_some(),
        "attachmentCount": content.attachment_count,
        "textContent": truncate_chars(&content.readable_text(), HTML_TEXT_LIMIT),
    }))
}
