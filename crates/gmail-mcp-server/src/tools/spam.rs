use super::{parse_args, ToolContext};
use gmail_mcp_core::errors::ToolResult;
use serde::Deserialize;
use serde_json::{json, Value};

pub const SPAM_LABEL: &str = "SPAM";

#[derive(Debug, Deserialize)]
struct Args {
    #[serde(default)]
    confirm: bool,
}

/// Outcome of one emptying run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpamReport {
    pub total_found: usize,
    pub deleted: usize,
    pub failed: usize,
    pub batches: usize,
}

impl SpamReport {
    fn to_json(self) -> Value {
        json!({
            "success": true,
            "deletedCount": self.deleted,
            "totalFound": self.total_found,
            "failedCount": self.failed,
            "batches": self.batches,
        })
    }
}

/// Deletes every message in Spam (up to `spam.max_messages`), one request at
/// a time, pausing between batches. A failed delete is recorded and skipped.
pub async fn empty_spam(ctx: &ToolContext<'_>, args: &Value) -> ToolResult<Value> {
    let args: Args = parse_args(args)?;
    if !args.confirm {
        return Ok(json!({
            "success": false,
            "deletedCount": 0,
            "message": "Refusing to empty Spam: pass confirm: true to permanently delete its messages.",
        }));
    }

    let spam = &ctx.config.spam;
    let refs = ctx
        .client
        .list_messages(None, &[SPAM_LABEL], spam.max_messages)
        .await?;

    let mut report = SpamReport {
        total_found: refs.len(),
        ..Default::default()
    };
    if refs.is_empty() {
        return Ok(report.to_json());
    }

    let pause = spam.batch_pause();
    for (i, batch) in refs.chunks(spam.batch_size.max(1)).enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        report.batches += 1;

        for r in batch {
            match ctx.client.delete_message(&r.id).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(event = "spam_delete_failed", id = %r.id, error = %e);
                    ctx.audit
                        .warn(format!("Failed to delete spam message {}: {}", r.id, e));
                }
            }
        }
        tracing::debug!(
            event = "spam_batch_done",
            batch = report.batches,
            deleted = report.deleted,
            failed = report.failed
        );
    }

    ctx.audit.info(format!(
        "Emptied spam: deleted {} of {} ({} failed) in {} batches",
        report.deleted, report.total_found, report.failed, report.batches
    ));
    Ok(report.to_json())
}
