//! Chat engine: boundary adapters to the remote services and effect execution.
mod engine;
mod feedback;
mod http;
mod query;
mod render;
mod sanitize;
mod types;

pub use engine::{ChannelEventSink, EngineHandle, EventSink};
pub use feedback::{FeedbackService, ReqwestFeedbackService};
pub use http::ServiceSettings;
pub use query::{QueryService, ReqwestQueryService};
pub use render::{render_for_terminal, Converter, Html2MdConverter};
pub use sanitize::MarkupSanitizer;
pub use types::{
    EngineEvent, FailureKind, FeedbackSubmission, QueryRequest, QueryResponse, ServiceError,
    Ticket,
};
