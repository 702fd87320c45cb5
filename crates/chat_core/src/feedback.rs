use chat_logging::{chat_debug, chat_info, chat_warn};

use crate::{Citation, IdGenerator, Message, MessageId, SessionId};

const FEEDBACK_ID_PREFIX: &str = "msg";

/// Star rating, 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&stars).then_some(Self(stars))
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStage {
    Collecting,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackNotice {
    /// Submit was attempted before correctness was chosen.
    SelectCorrectness,
    /// The last submission failed; selections are kept for a retry.
    RetrySubmission,
}

impl FeedbackNotice {
    pub fn text(self) -> &'static str {
        match self {
            FeedbackNotice::SelectCorrectness => {
                "Por favor selecciona si la respuesta fue correcta o incorrecta"
            }
            FeedbackNotice::RetrySubmission => {
                "Error al enviar feedback. Por favor intenta de nuevo."
            }
        }
    }
}

/// Rating/annotation tied to one assistant answer, as sent to the feedback service.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    /// Freshly generated feedback-record identifier.
    pub message_id: String,
    pub session_id: SessionId,
    pub query: String,
    pub answer: String,
    pub is_correct: bool,
    pub rating: Option<Rating>,
    pub comment: Option<String>,
    pub sources: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackFailure {
    pub reason: String,
}

impl FeedbackFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Collecting -> Submitting; the record must be sent to the feedback service.
    Started(FeedbackRecord),
    /// No correctness selection yet; nothing is sent.
    MissingCorrectness,
    /// Already submitting or submitted.
    Inert,
}

/// Per-answer feedback sub-state-machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackWorkflow {
    message_id: MessageId,
    session_id: SessionId,
    stage: FeedbackStage,
    is_correct: Option<bool>,
    rating: Option<Rating>,
    comment: String,
    notice: Option<FeedbackNotice>,
}

impl FeedbackWorkflow {
    pub fn new(message_id: MessageId, session_id: SessionId) -> Self {
        Self {
            message_id,
            session_id,
            stage: FeedbackStage::Collecting,
            is_correct: None,
            rating: None,
            comment: String::new(),
            notice: None,
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn stage(&self) -> FeedbackStage {
        self.stage
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn notice(&self) -> Option<FeedbackNotice> {
        self.notice
    }

    pub fn can_submit(&self) -> bool {
        self.stage == FeedbackStage::Collecting && self.is_correct.is_some()
    }

    fn accepts_input(&self) -> bool {
        self.stage == FeedbackStage::Collecting
    }

    /// Returns whether the selection was applied.
    pub fn select_correctness(&mut self, is_correct: bool) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.is_correct = Some(is_correct);
        self.notice = None;
        true
    }

    pub fn select_rating(&mut self, rating: Rating) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.rating = Some(rating);
        self.notice = None;
        true
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.comment = comment.into();
        self.notice = None;
        true
    }

    /// Collecting -> Submitting, assembling the record from `message`.
    pub fn submit(&mut self, message: &Message, ids: &dyn IdGenerator) -> SubmitOutcome {
        if !self.accepts_input() {
            chat_debug!(
                "feedback submit ignored message_id={} stage={:?}",
                self.message_id,
                self.stage
            );
            return SubmitOutcome::Inert;
        }
        let Some(is_correct) = self.is_correct else {
            self.notice = Some(FeedbackNotice::SelectCorrectness);
            return SubmitOutcome::MissingCorrectness;
        };
        debug_assert_eq!(message.id(), self.message_id);

        let record = FeedbackRecord {
            message_id: ids.next_id(FEEDBACK_ID_PREFIX),
            session_id: self.session_id.clone(),
            query: message.user_query().unwrap_or_default().to_string(),
            answer: message.content().to_string(),
            is_correct,
            rating: self.rating,
            comment: (!self.comment.is_empty()).then(|| self.comment.clone()),
            sources: message.sources().to_vec(),
        };
        self.stage = FeedbackStage::Submitting;
        self.notice = None;
        SubmitOutcome::Started(record)
    }

    /// Submitting -> Submitted on success, back to Collecting on failure.
    pub fn complete(&mut self, result: Result<(), FeedbackFailure>) {
        if self.stage != FeedbackStage::Submitting {
            chat_warn!(
                "feedback completion without submission message_id={}",
                self.message_id
            );
            return;
        }
        match result {
            Ok(()) => {
                chat_info!("feedback submitted message_id={}", self.message_id);
                self.stage = FeedbackStage::Submitted;
            }
            Err(failure) => {
                chat_warn!(
                    "feedback submission failed message_id={} reason={}",
                    self.message_id,
                    failure.reason
                );
                self.stage = FeedbackStage::Collecting;
                self.notice = Some(FeedbackNotice::RetrySubmission);
            }
        }
    }
}
