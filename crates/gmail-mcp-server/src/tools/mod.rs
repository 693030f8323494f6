pub mod attachments;
pub mod delete;
pub mod labels;
pub mod read;
pub mod search;
pub mod send;
pub mod spam;

use crate::config::ServerConfig;
use gmail_mcp_core::errors::{ToolError, ToolResult};
use gmail_mcp_core::mcp::ToolDescriptor;
use gmail_mcp_core::{AuditLog, GmailClient};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// What a handler gets to work with for one call.
pub struct ToolContext<'a> {
    pub client: &'a GmailClient,
    pub config: &'a ServerConfig,
    pub audit: &'a AuditLog,
}

/// Deserializes tool arguments; a missing argument object counts as `{}`.
pub fn parse_args<T: DeserializeOwned>(args: &Value) -> ToolResult<T> {
    let args = if args.is_null() { json!({}) } else { args.clone() };
    serde_json::from_value(args).map_err(|e| ToolError::validation(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    SearchEmails,
    ReadEmail,
    ReadEmailHtml,
    ListLabels,
    ListAttachments,
    DownloadAttachment,
    SendEmail,
    DeleteEmail,
    EmptySpam,
}

impl ToolName {
    pub const ALL: [ToolName; 9] = [
        ToolName::SearchEmails,
        ToolName::ReadEmail,
        ToolName::ReadEmailHtml,
        ToolName::ListLabels,
        ToolName::ListAttachments,
        ToolName::DownloadAttachment,
        ToolName::SendEmail,
        ToolName::DeleteEmail,
        ToolName::EmptySpam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SearchEmails => "search_emails",
            ToolName::ReadEmail => "read_email",
            ToolName::ReadEmailHtml => "read_email_html",
            ToolName::ListLabels => "list_labels",
            ToolName::ListAttachments => "list_attachments",
            ToolName::DownloadAttachment => "download_attachment",
            ToolName::SendEmail => "send_email",
            ToolName::DeleteEmail => "delete_email",
            ToolName::EmptySpam => "empty_spam",
        }
    }

    /// `list_labels` is callable but has never been part of the discovery
    /// list; existing clients rely on exactly the advertised set.
    pub fn is_advertised(&self) -> bool {
        !matches!(self, ToolName::ListLabels)
    }

    pub async fn invoke(&self, ctx: &ToolContext<'_>, args: &Value) -> ToolResult<Value> {
        match self {
            ToolName::SearchEmails => search::search_emails(ctx, args).await,
            ToolName::ReadEmail => read::read_email(ctx, args).await,
            ToolName::ReadEmailHtml => read::read_email_html(ctx, args).await,
            ToolName::ListLabels => labels::list_labels(ctx, args).await,
            ToolName::ListAttachments => attachments::list_attachments(ctx, args).await,
            ToolName::DownloadAttachment => attachments::download_attachment(ctx, args).await,
            ToolName::SendEmail => send::send_email(ctx, args).await,
            ToolName::DeleteEmail => delete::delete_email(ctx, args).await,
            ToolName::EmptySpam => spam::empty_spam(ctx, args).await,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ToolError::UnsupportedTool(s.to_string()))
    }
}

fn message_id_schema(what: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "messageId": { "type": "string", "description": what }
        },
        "required": ["messageId"]
    })
}

fn descriptor(name: ToolName) -> ToolDescriptor {
    let (description, input_schema) = match name {
        ToolName::SearchEmails => (
            "Search emails using Gmail query syntax (e.g. 'from:alice is:unread').",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Gmail search query" },
                    "maxResults": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": search::MAX_RESULTS_CAP,
                        "default": search::DEFAULT_MAX_RESULTS
                    }
                },
                "required": ["query"]
            }),
        ),
        ToolName::ReadEmail => (
            "Read the plain-text content of an email.",
            message_id_schema("ID of the email to read"),
        ),
        ToolName::ReadEmailHtml => (
            "Read an email, extracting readable text from its HTML body when there is no plain-text part.",
            message_id_schema("ID of the email to read"),
        ),
        ToolName::ListLabels => ("List all Gmail labels.", json!({ "type": "object", "properties": {} })),
        ToolName::ListAttachments => (
            "List the attachments of an email.",
            message_id_schema("ID of the email"),
        ),
        ToolName::DownloadAttachment => (
            "Download an attachment into the local downloads directory.",
            json!({
                "type": "object",
                "properties": {
                    "messageId": { "type": "string" },
                    "attachmentId": { "type": "string" },
                    "filename": {
                        "type": "string",
                        "description": "Plain file name, no directories. Defaults to attachment_<timestamp>."
                    }
                },
                "required": ["messageId", "attachmentId"]
            }),
        ),
        ToolName::SendEmail => (
            "Send a plain-text email.",
            json!({
                "type": "object",
                "properties": {
                    "to": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
                    "subject": { "type": "string", "maxLength": gmail_mcp_core::validate::MAX_SUBJECT_CHARS },
                    "body": { "type": "string", "maxLength": gmail_mcp_core::validate::MAX_BODY_CHARS },
                    "cc": { "type": "array", "items": { "type": "string" } },
                    "bcc": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["to", "subject", "body"]
            }),
        ),
        ToolName::DeleteEmail => (
            "Permanently delete an email (bypasses Trash).",
            message_id_schema("ID of the email to delete"),
        ),
        ToolName::EmptySpam => (
            "Permanently delete the messages in the Spam folder. Requires confirm: true.",
            json!({
                "type": "object",
                "properties": {
                    "confirm": { "type": "boolean", "description": "Must be true to proceed" }
                },
                "required": ["confirm"]
            }),
        ),
    };
    ToolDescriptor {
        name: name.as_str(),
        description,
        input_schema,
    }
}

/// Descriptors for `tools/list`.
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    ToolName::ALL
        .into_iter()
        .filter(ToolName::is_advertised)
        .map(descriptor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_tool_name_roundtrip() {
        for t in ToolName::ALL {
            assert_eq!(t.as_str().parse::<ToolName>().unwrap(), t);
        }
        let err = "drop_database".parse::<ToolName>().unwrap_err();
        assert_eq!(err.code(), "E_UNSUPPORTED_TOOL");
        assert_eq!(err.to_string(), "Unknown tool: drop_database");
    }

    #[test]
    fn test_descriptors_hide_list_labels() {
        let names: Vec<_> = tool_descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names.len(), 8);
        assert!(!names.contains(&"list_labels"));
        assert!(names.contains(&"empty_spam"));

        let v = serde_json::to_value(tool_descriptors()).unwrap();
        assert_eq!(v[0]["inputSchema"]["type"], "object");
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default)]
        flag: bool,
    }

    #[test]
    fn test_parse_args() {
        let p: Probe = parse_args(&Value::Null).unwrap();
        assert!(!p.flag);

        let err = parse_args::<Probe>(&json!({ "flag": "yes" })).unwrap_err();
        assert_eq!(err.code(), "E_VALIDATION");
    }
}
