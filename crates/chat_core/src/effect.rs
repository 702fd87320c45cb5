use crate::{FeedbackRecord, MessageId, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    DispatchQuery { query: String, session_id: SessionId },
    SubmitFeedback { message_id: MessageId, record: FeedbackRecord },
    FetchMetrics { days: u32 },
}
