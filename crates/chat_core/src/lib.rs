//! Chat core: pure conversation state machine and view-model helpers.
mod dispatch;
mod effect;
mod feedback;
mod ids;
mod message;
mod msg;
mod state;
mod transcript;
mod update;
mod view_model;

pub use dispatch::{
    AnswerPayload, DispatchFailure, DispatchOutcome, DispatchRefusal, QueryDispatcher,
    QuickAction, QUICK_ACTIONS,
};
pub use effect::Effect;
pub use feedback::{
    FeedbackFailure, FeedbackNotice, FeedbackRecord, FeedbackStage, FeedbackWorkflow, Rating,
    SubmitOutcome,
};
pub use ids::{IdGenerator, SequentialIds, SessionId, TimeRandomIds};
pub use message::{
    Attachment, Citation, Message, MessageId, Role, ERROR_NOTICE, MISSING_ANSWER_NOTICE,
    WELCOME_MESSAGE,
};
pub use msg::Msg;
pub use state::{ConversationState, MetricsState, DEFAULT_METRICS_DAYS};
pub use transcript::Transcript;
pub use update::update;
pub use view_model::{ChatViewModel, FeedbackView, MessageView, THANK_YOU_TEXT};
