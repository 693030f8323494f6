use super::ToolContext;
use gmail_mcp_core::errors::ToolResult;
use serde_json::{json, Value};

/// Takes no arguments; anything passed is ignored.
pub async fn list_labels(ctx: &ToolContext<'_>, _args: &Value) -> ToolResult<Value> {
    let labels = ctx.client.list_labels().await?;
    let labels: Vec<Value> = labels
        .into_iter()
        .map(|l| json!({ "id": l.id, "name": l.name, "type": l.label_type }))
        .collect();
    Ok(json!({ "count": labels.len(), "labels": labels }))
}
