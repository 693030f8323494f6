use super::error::GmailError;
use super::types::{
    AttachmentBody, Label, ListLabelsResponse, ListMessagesResponse, Message, MessageRef,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Full,
    Metadata,
    Minimal,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Full => "full",
            MessageFormat::Metadata => "metadata",
            MessageFormat::Minimal => "minimal",
        }
    }
}

/// Authenticated handle on one mailbox (`users/me`). Every method is a single
/// request; nothing is retried or cached.
#[derive(Clone)]
pub struct GmailClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl fmt::Debug for GmailClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GmailClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"***")
            .finish()
    }
}

impl GmailClient {
    pub fn new(access_token: impl Into<String>) -> Result<Self, GmailError> {
        Self::with_base_url(GMAIL_API_BASE, access_token)
    }

    pub fn with_base_url(
        base_url: &str,
        access_token: impl Into<String>,
    ) -> Result<Self, GmailError> {
        let parsed = Url::parse(base_url)?;
        Ok(Self {
            http: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(concat!("gmail-mcp/", env!("CARGO_PKG_VERSION")))
                .redirect(reqwest::redirect::Policy::none())
                .build()?,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path)).bearer_auth(&self.access_token)
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, GmailError> {
        let resp = check_status(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// One page of message ids matching `query` and all of `label_ids`.
    pub async fn list_messages(
        &self,
        query: Option<&str>,
        label_ids: &[&str],
        max_results: u32,
    ) -> Result<Vec<MessageRef>, GmailError> {
        let mut params: Vec<(&str, String)> = vec![("maxResults", max_results.to_string())];
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }
        for label in label_ids {
            params.push(("labelIds", (*label).to_string()));
        }
        tracing::debug!(event = "gmail_list_messages", max_results, labels = ?label_ids);
        let page: ListMessagesResponse = self.fetch(self.get("messages").query(&params)).await?;
        Ok(page.messages)
    }

    pub async fn get_message(
        &self,
        id: &str,
        format: MessageFormat,
        metadata_headers: &[&str],
    ) -> Result<Message, GmailError> {
        let mut params: Vec<(&str, &str)> = vec![("format", format.as_str())];
        if format == MessageFormat::Metadata {
            for h in metadata_headers {
                params.push(("metadataHeaders", *h));
            }
        }
        self.fetch(self.get(&format!("messages/{}", id)).query(&params))
            .await
    }

    pub async fn get_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<AttachmentBody, GmailError> {
        self.fetch(self.get(&format!(
            "messages/{}/attachments/{}",
            message_id, attachment_id
        )))
        .await
    }

    /// Sends an already composed message (`raw` is URL-safe base64).
    pub async fn send_raw(&self, raw: &str) -> Result<MessageRef, GmailError> {
        let req = self
            .http
            .post(self.url("messages/send"))
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "raw": raw }));
        self.fetch(req).await
    }

    /// Permanent delete, bypassing Trash.
    pub async fn delete_message(&self, id: &str) -> Result<(), GmailError> {
        let req = self
            .http
            .delete(self.url(&format!("messages/{}", id)))
            .bearer_auth(&self.access_token);
        check_status(req.send().await?).await?;
        Ok(())
    }

    pub async fn list_labels(&self) -> Result<Vec<Label>, GmailError> {
        let resp: ListLabelsResponse = self.fetch(self.get("labels")).await?;
        Ok(resp.labels)
    }
}

async fn check_status(resp: Response) -> Result<Response, GmailError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    let message = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });
    tracing::warn!(event = "gmail_api_error", status = status.as_u16(), %message);
    Err(GmailError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_token() {
        let client = GmailClient::new("ya29.secret-token").unwrap();
        let dbg = format!("{:?}", client);
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains(GMAIL_API_BASE));
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = GmailClient::with_base_url("http://127.0.0.1:9/gmail/v1/users/me/", "t").unwrap();
        assert_eq!(client.url("labels"), "http://127.0.0.1:9/gmail/v1/users/me/labels");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            GmailClient::with_base_url("not a url", "t"),
            Err(GmailError::Url(_))
        ));
    }
}
