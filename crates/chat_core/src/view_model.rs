use crate::{
    Attachment, Citation, FeedbackStage, FeedbackWorkflow, MessageId, MetricsState, Role,
};

pub const THANK_YOU_TEXT: &str = "Gracias por tu feedback";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatViewModel {
    pub session_id: String,
    pub messages: Vec<MessageView>,
    pub awaiting_reply: bool,
    pub input: String,
    pub has_interacted: bool,
    pub metrics: MetricsState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    /// 1-based position in the transcript.
    pub position: usize,
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub sources: Vec<Citation>,
    pub attachment: Option<Attachment>,
    pub feedback: Option<FeedbackView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackView {
    pub stage: FeedbackStage,
    pub is_correct: Option<bool>,
    pub rating: Option<u8>,
    pub comment: String,
    pub notice: Option<&'static str>,
    pub can_submit: bool,
}

impl From<&FeedbackWorkflow> for FeedbackView {
    fn from(workflow: &FeedbackWorkflow) -> Self {
        Self {
            stage: workflow.stage(),
            is_correct: workflow.is_correct(),
            rating: workflow.rating().map(|r| r.stars()),
            comment: workflow.comment().to_string(),
            notice: workflow.notice().map(|n| n.text()),
            can_submit: workflow.can_submit(),
        }
    }
}
