use std::sync::{mpsc, Arc};
use std::thread;

use chat_logging::{chat_error, chat_warn};

use crate::{
    EngineEvent, FeedbackService, FeedbackSubmission, QueryRequest, QueryService,
    ReqwestFeedbackService, ReqwestQueryService, ServiceError, ServiceSettings, Ticket,
};

/// Receives completion events from the engine worker thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Query {
        ticket: Ticket,
        request: QueryRequest,
    },
    Feedback {
        ticket: Ticket,
        submission: FeedbackSubmission,
    },
    Metrics {
        ticket: Ticket,
        days: u32,
    },
}

#[derive(Clone)]
struct Services {
    query: Arc<dyn QueryService>,
    feedback: Arc<dyn FeedbackService>,
}

/// Runs backend calls on a background tokio runtime.
///
/// Commands are accepted from any thread; each completes independently and is
/// reported through the sink. Nothing is cancelled or timed out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: ServiceSettings, sink: Arc<dyn EventSink>) -> Result<Self, ServiceError> {
        let query = Arc::new(ReqwestQueryService::new(settings.clone())?);
        let feedback = Arc::new(ReqwestFeedbackService::new(settings)?);
        Ok(Self::with_services(query, feedback, sink))
    }

    pub fn with_services(
        query: Arc<dyn QueryService>,
        feedback: Arc<dyn FeedbackService>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let services = Services { query, feedback };

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    chat_error!("engine runtime could not start: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let services = services.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_command(&services, command, sink.as_ref()).await;
                });
            }
        });

        Self { cmd_tx }
    }

    pub fn dispatch_query(&self, ticket: Ticket, request: QueryRequest) {
        self.send(EngineCommand::Query { ticket, request });
    }

    pub fn submit_feedback(&self, ticket: Ticket, submission: FeedbackSubmission) {
        self.send(EngineCommand::Feedback { ticket, submission });
    }

    pub fn fetch_metrics(&self, ticket: Ticket, days: u32) {
        self.send(EngineCommand::Metrics { ticket, days });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            chat_warn!("engine worker is gone; command dropped");
        }
    }
}

async fn handle_command(services: &Services, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Query { ticket, request } => {
            let result = services.query.ask(&request).await;
            if let Err(err) = &result {
                chat_warn!("query ticket={} failed: {}", ticket, err);
            }
            sink.emit(EngineEvent::QueryCompleted { ticket, result });
        }
        EngineCommand::Feedback { ticket, submission } => {
            let result = services.feedback.submit(&submission).await;
            if let Err(err) = &result {
                chat_warn!("feedback ticket={} failed: {}", ticket, err);
            }
            sink.emit(EngineEvent::FeedbackCompleted { ticket, result });
        }
        EngineCommand::Metrics { ticket, days } => {
            let result = services.feedback.metrics(days).await;
            if let Err(err) = &result {
                chat_warn!("metrics ticket={} failed: {}", ticket, err);
            }
            sink.emit(EngineEvent::MetricsLoaded { ticket, result });
        }
    }
}
