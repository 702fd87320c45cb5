use chat_logging::chat_debug;

use crate::{Citation, SessionId};

/// Predefined query offered as a one-click alternative to typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub label: &'static str,
    pub query: &'static str,
}

pub const QUICK_ACTIONS: [QuickAction; 2] = [
    QuickAction {
        label: "Preguntas Frecuentes",
        query: "Preguntas Frecuentes",
    },
    QuickAction {
        label: "Guía Técnica: Optimiza tus consultas con el sistema RAG",
        query: "ayuda con el rag",
    },
];

/// Fields of a successful reply from the question-answering service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnswerPayload {
    pub answer: Option<String>,
    pub sources: Vec<Citation>,
    pub download_url: Option<String>,
    pub document_name: Option<String>,
}

/// Transport or protocol failure of a dispatched query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub reason: String,
}

impl DispatchFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum DispatchState {
    #[default]
    Idle,
    Pending {
        query: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Resolved,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRefusal {
    Blank,
    AlreadyPending,
}

/// Owns the conversation-wide "awaiting reply" flag.
///
/// Only one query may be pending at a time; `Resolved`/`Failed` re-arm to
/// `Idle` immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDispatcher {
    session_id: SessionId,
    state: DispatchState,
}

impl QueryDispatcher {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            state: DispatchState::Idle,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn is_awaiting_reply(&self) -> bool {
        matches!(self.state, DispatchState::Pending { .. })
    }

    /// Idle -> Pending. Returns the query text to send.
    pub(crate) fn begin(&mut self, raw: &str) -> Result<String, DispatchRefusal> {
        if raw.trim().is_empty() {
            return Err(DispatchRefusal::Blank);
        }
        if self.is_awaiting_reply() {
            return Err(DispatchRefusal::AlreadyPending);
        }
        let query = raw.to_string();
        chat_debug!("dispatch pending query_len={}", query.len());
        self.state = DispatchState::Pending {
            query: query.clone(),
        };
        Ok(query)
    }

    /// Pending -> Resolved/Failed -> Idle. Returns the query that was pending.
    pub(crate) fn finish(&mut self, outcome: DispatchOutcome) -> Option<String> {
        match std::mem::take(&mut self.state) {
            DispatchState::Pending { query } => {
                chat_debug!("dispatch finished outcome={:?}", outcome);
                Some(query)
            }
            DispatchState::Idle => None,
        }
    }
}
