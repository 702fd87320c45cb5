use crate::{AnswerPayload, DispatchFailure, FeedbackFailure, MessageId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the question input box.
    InputChanged(String),
    /// User submitted the current input as a query.
    QuerySubmitted,
    /// User clicked a quick action (index into `QUICK_ACTIONS`).
    QuickActionClicked(usize),
    /// Query service reply (or failure) for the pending dispatch.
    QueryCompleted(Result<AnswerPayload, DispatchFailure>),
    /// User marked an answer as correct or incorrect.
    CorrectnessSelected { message_id: MessageId, is_correct: bool },
    /// User picked a star rating for an answer.
    RatingSelected { message_id: MessageId, stars: u8 },
    /// User edited the feedback comment for an answer.
    CommentChanged { message_id: MessageId, text: String },
    /// User clicked submit on an answer's feedback form.
    FeedbackSubmitClicked { message_id: MessageId },
    /// Feedback service outcome for a submission.
    FeedbackCompleted {
        message_id: MessageId,
        result: Result<(), FeedbackFailure>,
    },
    /// User asked for the accuracy metrics of the last `days` days.
    MetricsRequested { days: u32 },
    /// Metrics service outcome.
    MetricsLoaded(Result<serde_json::Value, String>),
}
