use std::collections::BTreeMap;
use std::sync::Arc;

use chat_logging::{chat_debug, chat_info, chat_warn};

use crate::view_model::{ChatViewModel, FeedbackView, MessageView};
use crate::{
    AnswerPayload, DispatchFailure, DispatchOutcome, DispatchRefusal, Effect, FeedbackFailure,
    FeedbackStage, FeedbackWorkflow, IdGenerator, Message, MessageId, QueryDispatcher, SessionId,
    SubmitOutcome, TimeRandomIds, Transcript,
};

pub const DEFAULT_METRICS_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MetricsState {
    #[default]
    Idle,
    Loading {
        days: u32,
    },
    Loaded {
        days: u32,
        report: serde_json::Value,
    },
    Failed {
        days: u32,
        reason: String,
    },
}

/// All state of one conversation.
#[derive(Debug, Clone)]
pub struct ConversationState {
    ids: Arc<dyn IdGenerator>,
    transcript: Transcript,
    dispatcher: QueryDispatcher,
    feedback: BTreeMap<MessageId, FeedbackWorkflow>,
    input: String,
    next_message_seq: u64,
    has_interacted: bool,
    metrics: MetricsState,
    dirty: bool,
}

impl ConversationState {
    /// Starts a conversation with production identifiers.
    pub fn start() -> Self {
        let ids: Arc<dyn IdGenerator> = Arc::new(TimeRandomIds);
        let session_id = SessionId::create(ids.as_ref());
        Self::new(session_id, ids)
    }

    pub fn new(session_id: SessionId, ids: Arc<dyn IdGenerator>) -> Self {
        chat_info!("conversation started session_id={}", session_id);
        Self {
            ids,
            transcript: Transcript::new(),
            dispatcher: QueryDispatcher::new(session_id),
            feedback: BTreeMap::new(),
            input: String::new(),
            next_message_seq: 1,
            has_interacted: false,
            metrics: MetricsState::Idle,
            dirty: true,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        self.dispatcher.session_id()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.dispatcher.is_awaiting_reply()
    }

    /// A query, feedback submission or metrics request is still outstanding.
    pub fn has_work_in_flight(&self) -> bool {
        self.is_awaiting_reply()
            || matches!(self.metrics, MetricsState::Loading { .. })
            || self
                .feedback
                .values()
                .any(|workflow| workflow.stage() == FeedbackStage::Submitting)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn has_interacted(&self) -> bool {
        self.has_interacted
    }

    pub fn metrics(&self) -> &MetricsState {
        &self.metrics
    }

    pub fn feedback_for(&self, message_id: MessageId) -> Option<&FeedbackWorkflow> {
        self.feedback.get(&message_id)
    }

    /// Returns whether a re-render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> ChatViewModel {
        let messages = self
            .transcript
            .snapshot()
            .iter()
            .enumerate()
            .map(|(idx, message)| MessageView {
                position: idx + 1,
                id: message.id(),
                role: message.role(),
                content: message.content().to_string(),
                sources: message.sources().to_vec(),
                attachment: message.attachment().cloned(),
                feedback: self.feedback.get(&message.id()).map(FeedbackView::from),
            })
            .collect();

        ChatViewModel {
            session_id: self.session_id().to_string(),
            messages,
            awaiting_reply: self.is_awaiting_reply(),
            input: self.input.clone(),
            has_interacted: self.has_interacted,
            metrics: self.metrics.clone(),
        }
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.dirty = true;
        }
    }

    /// Idle -> Pending: echoes the query into the transcript.
    pub(crate) fn begin_dispatch(&mut self, raw: &str) -> Option<Effect> {
        let query = match self.dispatcher.begin(raw) {
            Ok(query) => query,
            Err(DispatchRefusal::Blank) => return None,
            Err(DispatchRefusal::AlreadyPending) => {
                chat_debug!("dispatch refused: a query is already pending");
                return None;
            }
        };
        let id = self.allocate_message_id();
        self.append(Message::user(id, query.clone()));
        self.has_interacted = true;
        Some(Effect::DispatchQuery {
            query,
            session_id: self.session_id().clone(),
        })
    }

    pub(crate) fn clear_input(&mut self) {
        self.set_input(String::new());
    }

    /// Pending -> Resolved/Failed: appends the assistant reply.
    pub(crate) fn complete_dispatch(&mut self, result: Result<AnswerPayload, DispatchFailure>) {
        let outcome = match &result {
            Ok(_) => DispatchOutcome::Resolved,
            Err(_) => DispatchOutcome::Failed,
        };
        let Some(query) = self.dispatcher.finish(outcome) else {
            chat_warn!("query reply received with no pending dispatch; ignored");
            return;
        };

        let id = self.allocate_message_id();
        match result {
            Ok(payload) => {
                let message = Message::answer(id, payload, query);
                if message.is_feedback_eligible() {
                    let workflow = FeedbackWorkflow::new(id, self.session_id().clone());
                    self.feedback.insert(id, workflow);
                }
                self.append(message);
            }
            Err(failure) => {
                chat_warn!("query dispatch failed: {}", failure.reason);
                self.append(Message::error_notice(id));
            }
        }
    }

    /// Applies `change` to the workflow of `message_id`, if one exists.
    pub(crate) fn with_feedback(
        &mut self,
        message_id: MessageId,
        change: impl FnOnce(&mut FeedbackWorkflow) -> bool,
    ) {
        match self.feedback.get_mut(&message_id) {
            Some(workflow) => {
                if change(workflow) {
                    self.dirty = true;
                }
            }
            None => chat_debug!("no feedback workflow for message_id={}", message_id),
        }
    }

    pub(crate) fn submit_feedback(&mut self, message_id: MessageId) -> Option<Effect> {
        let Some(message) = self.transcript.get(message_id) else {
            chat_debug!("feedback submit for unknown message_id={}", message_id);
            return None;
        };
        let workflow = self.feedback.get_mut(&message_id)?;
        match workflow.submit(message, self.ids.as_ref()) {
            SubmitOutcome::Started(record) => {
                self.dirty = true;
                Some(Effect::SubmitFeedback { message_id, record })
            }
            SubmitOutcome::MissingCorrectness => {
                self.dirty = true;
                None
            }
            SubmitOutcome::Inert => None,
        }
    }

    pub(crate) fn complete_feedback(
        &mut self,
        message_id: MessageId,
        result: Result<(), FeedbackFailure>,
    ) {
        self.with_feedback(message_id, |workflow| {
            let before = workflow.stage();
            workflow.complete(result);
            workflow.stage() != before
        });
    }

    pub(crate) fn request_metrics(&mut self, days: u32) -> Option<Effect> {
        if matches!(self.metrics, MetricsState::Loading { .. }) {
            return None;
        }
        self.metrics = MetricsState::Loading { days };
        self.dirty = true;
        Some(Effect::FetchMetrics { days })
    }

    pub(crate) fn apply_metrics(&mut self, result: Result<serde_json::Value, String>) {
        let days = match self.metrics {
            MetricsState::Loading { days } => days,
            _ => {
                chat_warn!("metrics received without a pending request; ignored");
                return;
            }
        };
        self.metrics = match result {
            Ok(report) => MetricsState::Loaded { days, report },
            Err(reason) => {
                chat_warn!("metrics request failed: {}", reason);
                MetricsState::Failed { days, reason }
            }
        };
        self.dirty = true;
    }

    fn allocate_message_id(&mut self) -> MessageId {
        let id = MessageId::from_seq(self.next_message_seq);
        self.next_message_seq += 1;
        id
    }

    fn append(&mut self, message: Message) {
        self.transcript.append(message);
        self.dirty = true;
    }
}
