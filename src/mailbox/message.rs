// The `message` module defines the local view of a mail message and the
// plain-text body extraction policy.

use base64::{Engine as _, engine::general_purpose};
use google_gmail1::api::{Message, MessagePart};

/// The fallback subject when the header is absent.
pub const NO_SUBJECT: &str = "(no subject)";
/// The fallback sender when the header is absent.
pub const UNKNOWN_SENDER: &str = "(unknown sender)";

/// A local, read-only view of one provider message. The provider owns the
/// message; only the label set is ever written back.
#[derive(Clone, Debug, PartialEq)]
pub struct MailMessage {
    /// The provider-assigned opaque identifier.
    pub id: String,
    /// The `Subject` header, or [`NO_SUBJECT`].
    pub subject: String,
    /// The `From` header, or [`UNKNOWN_SENDER`].
    pub sender: String,
    /// The plain-text body; empty when no plain-text part exists.
    pub body: String,
    /// The label ids currently attached to the message.
    pub label_ids: Vec<String>,
}

impl MailMessage {
    /// Builds a `MailMessage` from a full-format provider message.
    pub fn from_gmail(message: Message) -> Self {
        let id = message.id.unwrap_or_default();
        let label_ids = message.label_ids.unwrap_or_default();

        let (subject, sender, body) = match &message.payload {
            Some(payload) => (
                header_value(payload, "Subject"),
                header_value(payload, "From"),
                extract_plain_text_body(payload),
            ),
            None => (None, None, String::new()),
        };

        Self {
            id,
            subject: subject.unwrap_or_else(|| NO_SUBJECT.to_string()),
            sender: sender.unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
            body,
            label_ids,
        }
    }
}

/// Looks up a header value by name, case-insensitively.
fn header_value(payload: &MessagePart, name: &str) -> Option<String> {
    payload.headers.as_ref()?.iter().find_map(|header| {
        match (&header.name, &header.value) {
            (Some(n), Some(v)) if n.eq_ignore_ascii_case(name) => Some(v.clone()),
            _ => None,
        }
    })
}

/// Extracts the plain-text body of a message payload.
///
/// Single-part messages decode their own body payload. Multi-part messages
/// take the body of the first part whose declared content type is
/// `text/plain`, ignoring every other part (HTML alternatives, attachments).
/// When no plain-text part exists the body is the empty string.
pub fn extract_plain_text_body(payload: &MessagePart) -> String {
    let data = match &payload.parts {
        Some(parts) => parts
            .iter()
            .find(|part| part.mime_type.as_deref() == Some("text/plain"))
            .and_then(|part| part.body.as_ref())
            .and_then(|body| body.data.as_ref()),
        None => payload.body.as_ref().and_then(|body| body.data.as_ref()),
    };

    match data {
        Some(bytes) => decode_body_data(bytes),
        None => String::new(),
    }
}

/// Decodes a body payload into text.
///
/// The provider encodes body data with the URL-safe base64 alphabet, but the
/// API wrapper may hand the field over either still encoded or already
/// decoded, so decoding falls back to treating the bytes as raw content.
/// Undecodable byte sequences are replaced rather than rejected.
fn decode_body_data(data: &[u8]) -> String {
    let as_text = String::from_utf8_lossy(data);
    let candidate = as_text.trim();

    let decoded = general_purpose::URL_SAFE_NO_PAD
        .decode(candidate)
        .or_else(|_| general_purpose::URL_SAFE.decode(candidate));

    match decoded {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::from_utf8_lossy(data).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use google_gmail1::api::{MessagePartBody, MessagePartHeader};

    fn encoded(text: &str) -> Vec<u8> {
        general_purpose::URL_SAFE_NO_PAD
            .encode(text.as_bytes())
            .into_bytes()
    }

    fn part(mime_type: &str, data: Option<Vec<u8>>) -> MessagePart {
        MessagePart {
            mime_type: Some(mime_type.to_string()),
            body: Some(MessagePartBody {
                data,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn header(name: &str, value: &str) -> MessagePartHeader {
        MessagePartHeader {
            name: Some(name.to_string()),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn single_part_body_decodes_to_exact_text() {
        let payload = part("text/plain", Some(encoded("Please pay by Friday")));
        assert_eq!(extract_plain_text_body(&payload), "Please pay by Friday");
    }

    #[test]
    fn already_decoded_body_passes_through() {
        // Raw text with spaces is not valid base64, so the fallback applies.
        let payload = part("text/plain", Some(b"Please pay by Friday".to_vec()));
        assert_eq!(extract_plain_text_body(&payload), "Please pay by Friday");
    }

    #[test]
    fn multipart_takes_first_plain_text_part() {
        let payload = MessagePart {
            parts: Some(vec![
                part("text/html", Some(encoded("<p>ignored</p>"))),
                part("text/plain", Some(encoded("first plain part"))),
                part("text/plain", Some(encoded("second plain part"))),
            ]),
            ..Default::default()
        };
        assert_eq!(extract_plain_text_body(&payload), "first plain part");
    }

    #[test]
    fn multipart_without_plain_text_yields_empty_body() {
        let payload = MessagePart {
            parts: Some(vec![
                part("text/html", Some(encoded("<p>html only</p>"))),
                part("application/pdf", None),
            ]),
            ..Default::default()
        };
        assert_eq!(extract_plain_text_body(&payload), "");
    }

    #[test]
    fn undecodable_bytes_are_replaced_not_rejected() {
        let data = general_purpose::URL_SAFE_NO_PAD
            .encode([0x68, 0x69, 0xff, 0xfe])
            .into_bytes();
        let payload = part("text/plain", Some(data));
        let body = extract_plain_text_body(&payload);
        assert!(body.starts_with("hi"));
        assert!(body.contains('\u{FFFD}'));
    }

    #[test]
    fn from_gmail_fills_header_defaults() {
        let message = Message {
            id: Some("m1".to_string()),
            payload: Some(part("text/plain", Some(encoded("hello")))),
            ..Default::default()
        };
        let mail = MailMessage::from_gmail(message);
        assert_eq!(mail.id, "m1");
        assert_eq!(mail.subject, NO_SUBJECT);
        assert_eq!(mail.sender, UNKNOWN_SENDER);
        assert_eq!(mail.body, "hello");
    }

    #[test]
    fn from_gmail_reads_headers_case_insensitively() {
        let mut payload = part("text/plain", Some(encoded("body text")));
        payload.headers = Some(vec![
            header("subject", "Invoice due"),
            header("FROM", "a@b.com"),
        ]);
        let message = Message {
            id: Some("m2".to_string()),
            label_ids: Some(vec!["INBOX".to_string()]),
            payload: Some(payload),
            ..Default::default()
        };
        let mail = MailMessage::from_gmail(message);
        assert_eq!(mail.subject, "Invoice due");
        assert_eq!(mail.sender, "a@b.com");
        assert_eq!(mail.label_ids, vec!["INBOX".to_string()]);
    }
}
