use super::read::MessageIdArgs;
use super::{parse_args, ToolContext};
use gmail_mcp_core::errors::ToolResult;
use gmail_mcp_core::gmail::mime::{collect_attachments, decode_body_data};
use gmail_mcp_core::gmail::MessageFormat;
use gmail_mcp_core::validate::{validate_filename, validate_resource_id};
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn list_attachments(ctx: &ToolContext<'_>, args: &Value) -> ToolResult<Value> {
    let args = MessageIdArgs::parse(args)?;
    let msg = ctx
        .client
        .get_message(&args.message_id, MessageFormat::Full, &[])
        .await?;

    let attachments = msg
        .payload
        .as_ref()
        .map(collect_attachments)
        .unwrap_or_default();

    Ok(json!({
        "messageId": msg.id,
        "count": attachments.len(),
        "attachments": attachments,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadArgs {
    message_id: String,
    attachment_id: String,
    filename: Option<String>,
}

/// Name used when the caller does not supply one.
pub fn default_filename() -> String {
    format!("attachment_{}", chrono::Utc::now().timestamp_millis())
}

/// Caller names are taken verbatim once they pass `validate_filename`;
/// they are never joined as paths.
pub async fn download_attachment(ctx: &ToolContext<'_>, args: &Value) -> ToolResult<Value> {
    let args: DownloadArgs = parse_args(args)?;
    validate_resource_id("messageId", &args.message_id)?;
    validate_resource_id("attachmentId", &args.attachment_id)?;
    let filename = match args.filename.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            validate_filename(name)?;
            name.to_string()
        }
        _ => default_filename(),
    };

    let attachment = ctx
        .client
        .get_attachment(&args.message_id, &args.attachment_id)
        .await?;
    let bytes = decode_body_data(&attachment.data)?;

    let dir = ctx.config.downloads_dir();
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(&filename);
    tokio::fs::write(&path, &bytes).await?;

    if attachment.size != 0 && attachment.size != bytes.len() as u64 {
        tracing::warn!(
            event = "attachment_size_mismatch",
            reported = attachment.size,
            decoded = bytes.len()
        );
    }
    tracing::info!(event = "attachment_saved", path = %path.display(), size = bytes.len());

    Ok(json!({
        "success": true,
        "filename": filename,
        "path": path.display().to_string(),
        "size": bytes.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filename_shape() {
        let name = default_filename();
        let stamp = name.strip_prefix("attachment_").unwrap();
        assert!(stamp.parse::<i64>().unwrap() > 0);
        assert!(validate_filename(&name).is_ok());
    }
}
