use super::{parse_args, ToolContext};
use gmail_mcp_core::errors::{ToolError, ToolResult};
use gmail_mcp_core::gmail::OutgoingMessage;
use gmail_mcp_core::validate::{
    check_max_len, sanitize_input, validate_email, MAX_BODY_CHARS, MAX_SUBJECT_CHARS,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct Args {
    to: Vec<String>,
    subject: String,
    body: String,
    #[serde(default)]
    cc: Vec<String>,
    #[serde(default)]
    bcc: Vec<String>,
}

fn check_addresses(field: &str, addresses: &[String]) -> ToolResult<Vec<String>> {
    addresses
        .iter()
        .map(|a| {
            let a = a.trim();
            if validate_email(a) {
                Ok(a.to_string())
            } else {
                Err(ToolError::validation(format!(
                    "invalid email address in {}: '{}'",
                    field, a
                )))
            }
        })
        .collect()
}

/// Validates everything and builds the message. No I/O happens here, so a
/// rejected call never reaches the API.
fn compose(args: Args) -> ToolResult<OutgoingMessage> {
    if args.to.is_empty() {
        return Err(ToolError::validation("at least one recipient is required in 'to'"));
    }
    let to = check_addresses("to", &args.to)?;
    let cc = check_addresses("cc", &args.cc)?;
    let bcc = check_addresses("bcc", &args.bcc)?;

    // Lengths are checked on the raw input, before sanitization.
    check_max_len("subject", &args.subject, MAX_SUBJECT_CHARS)?;
    check_max_len("body", &args.body, MAX_BODY_CHARS)?;

    Ok(OutgoingMessage {
        to,
        cc,
        bcc,
        subject: sanitize_input(&args.subject),
        body: sanitize_input(&args.body),
    })
}

pub async fn send_email(ctx: &ToolContext<'_>, args: &Value) -> ToolResult<Value> {
    let message = compose(parse_args(args)?)?;
    let sent = ctx.client.send_raw(&message.to_raw()).await?;

    ctx.audit.info(format!(
        "Email sent: id={} to={}",
        sent.id,
        message.to.join(", ")
    ));
    Ok(json!({
        "success": true,
        "messageId": sent.id,
        "threadId": sent.thread_id,
    }))
}
