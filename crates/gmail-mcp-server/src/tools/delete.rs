use super::read::MessageIdArgs;
use super::ToolContext;
use gmail_mcp_core::errors::ToolResult;
use gmail_mcp_core::gmail::MessageFormat;
use serde_json::{json, Value};

/// Permanent delete. The message's subject and sender are looked up first so
/// the audit trail says what was removed.
pub async fn delete_email(ctx: &ToolContext<'_>, args: &Value) -> ToolResult<Value> {
    let args = MessageIdArgs::parse(args)?;
    let meta = ctx
        .client
        .get_message(&args.message_id, MessageFormat::Metadata, &["Subject", "From"])
        .await?;
    let subject = meta.header("Subject");
    let from = meta.header("From");

    ctx.audit.warn(format!(
        "Deleting email {} (subject: {:?}, from: {:?})",
        args.message_id, subject, from
    ));
    ctx.client.delete_message(&args.message_id).await?;

    Ok(json!({
        "success": true,
        "messageId": args.message_id,
        "subject": subject,
        "from": from,
    }))
}
