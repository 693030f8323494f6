//! Building the RFC 5322 text that `messages.send` expects in `raw`.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl OutgoingMessage {
    pub fn to_rfc5322(&self) -> String {
        let mut lines = vec![format!("To: {}", header_value(&self.to.join(", ")))];
        if !self.cc.is_empty() {
            lines.push(format!("Cc: {}", header_value(&self.cc.join(", "))));
        }
        if !self.bcc.is_empty() {
            lines.push(format!("Bcc: {}", header_value(&self.bcc.join(", "))));
        }
        lines.push(format!("Subject: {}", encode_subject(&header_value(&self.subject))));
        lines.push("MIME-Version: 1.0".to_string());
        lines.push("Content-Type: text/plain; charset=\"UTF-8\"".to_string());
        lines.push("Content-Transfer-Encoding: 8bit".to_string());
        lines.push(String::new());
        lines.push(self.body.replace("\r\n", "\n").replace('\n', "\r\n"));
        lines.join("\r\n")
    }

    /// Value for the `raw` field of `messages.send`.
    pub fn to_raw(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_rfc5322().as_bytes())
    }
}

/// Header values never carry line breaks.
fn header_value(value: &str) -> String {
    value.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

fn encode_subject(subject: &str) -> String {
    if subject.is_ascii() {
        subject.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(subject.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> OutgoingMessage {
        OutgoingMessage {
            to: vec!["a@b.co".into(), "c@d.org".into()],
            cc: vec!["e@f.net".into()],
            bcc: vec![],
            subject: "Quarterly report".into(),
            body: "Hi,\nsee attached.".into(),
        }
    }

    #[test]
    fn test_headers_and_body() {
        let text = message().to_rfc5322();
        assert!(text.starts_with("To: a@b.co, c@d.org\r\nCc: e@f.net\r\nSubject: Quarterly report\r\n"));
        assert!(!text.contains("Bcc:"));
        assert!(text.contains("Content-Type: text/plain; charset=\"UTF-8\"\r\n"));
        assert!(text.ends_with("\r\n\r\nHi,\r\nsee attached."));
    }

    #[test]
    fn test_header_injection_is_flattened() {
        let mut msg = message();
        msg.subject = "hello\r\nBcc: victim@x.com".into();
        let text = msg.to_rfc5322();
        assert!(text.contains("Subject: helloBcc: victim@x.com\r\n"));
        assert!(!text.contains("\r\nBcc: victim"));
    }

    #[test]
    fn test_non_ascii_subject_is_encoded() {
        let mut msg = message();
        msg.subject = "Grüße".into();
        let text = msg.to_rfc5322();
        assert!(text.contains(&format!(
            "Subject: =?UTF-8?B?{}?=",
            STANDARD.encode("Grüße".as_bytes())
        )));
    }

    #[test]
    fn test_raw_is_url_safe_unpadded() {
        let raw = message().to_raw();
        assert!(!raw.contains('+') && !raw.contains('/') && !raw.contains('='));
        let decoded = URL_SAFE_NO_PAD.decode(raw).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), message().to_rfc5322());
    }
}
