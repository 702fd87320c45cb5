use std::fmt;

use crate::AnswerPayload;

pub const WELCOME_MESSAGE: &str = "¡Hola! Soy tu asistente virtual para trámites municipales con <strong>memoria conversacional</strong>. Puedo recordar nuestra conversación, así que puedes hacerme preguntas de seguimiento. ¿En qué puedo ayudarte hoy?";
pub const ERROR_NOTICE: &str = "<p class=\"text-red-600\">Lo siento, ha ocurrido un error.</p>";
pub const MISSING_ANSWER_NOTICE: &str = "<p>No se pudo obtener una respuesta.</p>";

/// Position-independent identifier of a transcript entry.
///
/// `MessageId::WELCOME` is reserved for the seeded greeting; every other id is
/// allocated by the conversation from a monotonically increasing counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl MessageId {
    pub const WELCOME: MessageId = MessageId(0);

    pub(crate) fn from_seq(seq: u64) -> Self {
        debug_assert!(seq > 0, "sequence 0 is reserved for the welcome message");
        Self(seq)
    }

    pub fn is_welcome(self) -> bool {
        self == Self::WELCOME
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_welcome() {
            f.write_str("init")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Opaque citation record as returned by the question-answering backend.
///
/// Carried unchanged into feedback submissions.
#[derive(Debug, Clone, PartialEq)]
pub struct Citation(serde_json::Value);

impl Citation {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Best-effort human readable label for display.
    pub fn label(&self) -> Option<String> {
        const KEYS: [&str; 5] = ["title", "document_name", "source", "name", "filename"];
        match &self.0 {
            serde_json::Value::String(text) if !text.trim().is_empty() => {
                Some(text.trim().to_string())
            }
            serde_json::Value::Object(map) => KEYS
                .iter()
                .filter_map(|key| map.get(*key).and_then(serde_json::Value::as_str))
                .map(str::trim)
                .find(|text| !text.is_empty())
                .map(ToOwned::to_owned),
            _ => None,
        }
    }
}

/// Downloadable document referenced by an answer.
///
/// `url` is the reference exactly as the backend sent it. It may be relative
/// and is not vetted; resolve it against the service address before display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub name: String,
}

impl Attachment {
    /// Builds an attachment from the optional reply fields.
    ///
    /// Returns `None` when the url is missing or blank. Without a name, the
    /// last path segment of the url is used.
    pub fn from_parts(url: Option<&str>, name: Option<&str>) -> Option<Self> {
        let url = url.map(str::trim).filter(|u| !u.is_empty())?;
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or_else(|| last_path_segment(url))
            .unwrap_or(url);
        Some(Self {
            url: url.to_string(),
            name: name.to_string(),
        })
    }
}

fn last_path_segment(reference: &str) -> Option<&str> {
    let without_query = reference
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or(reference);
    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |idx| &rest[idx..]),
        None => without_query,
    };
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}

/// One immutable transcript entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    sources: Vec<Citation>,
    user_query: Option<String>,
    attachment: Option<Attachment>,
}

impl Message {
    pub(crate) fn welcome() -> Self {
        Self::plain(MessageId::WELCOME, Role::Assistant, WELCOME_MESSAGE)
    }

    pub(crate) fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self::plain(id, Role::User, text)
    }

    pub(crate) fn answer(id: MessageId, payload: AnswerPayload, query: String) -> Self {
        let attachment = Attachment::from_parts(
            payload.download_url.as_deref(),
            payload.document_name.as_deref(),
        );
        let content = payload
            .answer
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| MISSING_ANSWER_NOTICE.to_string());
        Self {
            id,
            role: Role::Assistant,
            content,
            sources: payload.sources,
            user_query: Some(query),
            attachment,
        }
    }

    pub(crate) fn error_notice(id: MessageId) -> Self {
        Self::plain(id, Role::Assistant, ERROR_NOTICE)
    }

    fn plain(id: MessageId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            sources: Vec::new(),
            user_query: None,
            attachment: None,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Raw markup as received. Untrusted; sanitize before display.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sources(&self) -> &[Citation] {
        &self.sources
    }

    pub fn user_query(&self) -> Option<&str> {
        self.user_query.as_deref()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Assistant answers produced by a dispatched query can be rated.
    pub fn is_feedback_eligible(&self) -> bool {
        self.role == Role::Assistant && self.user_query.is_some() && !self.id.is_welcome()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn welcome_is_not_feedback_eligible() {
        let welcome = Message::welcome();
        assert_eq!(welcome.id(), MessageId::WELCOME);
        assert_eq!(welcome.id().to_string(), "init");
        assert!(!welcome.is_feedback_eligible());
    }

    #[test]
    fn answer_without_text_uses_placeholder() {
        let msg = Message::answer(
            MessageId::from_seq(2),
            AnswerPayload::default(),
            "hola".to_string(),
        );
        assert_eq!(msg.content(), MISSING_ANSWER_NOTICE);
        assert_eq!(msg.user_query(), Some("hola"));
        assert!(msg.is_feedback_eligible());
    }

    #[test]
    fn error_notice_has_no_query() {
        let msg = Message::error_notice(MessageId::from_seq(3));
        assert_eq!(msg.role(), Role::Assistant);
        assert_eq!(msg.user_query(), None);
        assert!(!msg.is_feedback_eligible());
    }

    #[test]
    fn attachment_requires_a_reference() {
        assert_eq!(Attachment::from_parts(Some("  "), Some("doc.pdf")), None);
        assert_eq!(Attachment::from_parts(None, Some("doc.pdf")), None);

        let named = Attachment::from_parts(Some("https://example.com/f/form.pdf"), Some(" Form "))
            .expect("attachment");
        assert_eq!(named.name, "Form");

        let unnamed = Attachment::from_parts(Some("https://example.com/f/form.pdf?v=2"), None)
            .expect("attachment");
        assert_eq!(unnamed.name, "form.pdf");

        let host_only =
            Attachment::from_parts(Some("https://example.com"), None).expect("attachment");
        assert_eq!(host_only.name, "https://example.com");
    }

    #[test]
    fn relative_attachment_reference_is_kept_verbatim() {
        let msg = Message::answer(
            MessageId::from_seq(2),
            AnswerPayload {
                answer: Some("<p>ok</p>".to_string()),
                download_url: Some(" /api/documents/formulario.pdf ".to_string()),
                ..AnswerPayload::default()
            },
            "hola".to_string(),
        );
        assert_eq!(
            msg.attachment(),
            Some(&Attachment {
                url: "/api/documents/formulario.pdf".to_string(),
                name: "formulario.pdf".to_string(),
            })
        );
    }

    #[test]
    fn citation_label_prefers_title() {
        let citation = Citation::new(json!({"source": "a.pdf", "title": "Licencias"}));
        assert_eq!(citation.label().as_deref(), Some("Licencias"));
        assert_eq!(
            Citation::new(json!("ordenanza.pdf")).label().as_deref(),
            Some("ordenanza.pdf")
        );
        assert_eq!(Citation::new(json!(42)).label(), None);
    }
}
