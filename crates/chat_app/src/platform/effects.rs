use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use chat_core::{
    AnswerPayload, Citation, DispatchFailure, Effect, FeedbackFailure, FeedbackRecord, MessageId,
    Msg,
};
use chat_engine::{
    EngineEvent, EngineHandle, EventSink, FeedbackSubmission, QueryRequest, QueryResponse,
    ServiceError, ServiceSettings, Ticket,
};
use chat_logging::{chat_info, chat_warn};

use super::app::AppEvent;

type FeedbackTickets = Arc<Mutex<HashMap<Ticket, MessageId>>>;

/// Executes core effects on the engine and folds engine events back into `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
    next_ticket: AtomicU64,
    feedback_tickets: FeedbackTickets,
}

impl EffectRunner {
    pub fn new(
        settings: ServiceSettings,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, ServiceError> {
        let feedback_tickets = FeedbackTickets::default();
        let sink = Arc::new(MsgSink {
            event_tx,
            feedback_tickets: feedback_tickets.clone(),
        });
        let engine = EngineHandle::new(settings, sink)?;
        Ok(Self {
            engine,
            next_ticket: AtomicU64::new(1),
            feedback_tickets,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
            match effect {
                Effect::DispatchQuery { query, session_id } => {
                    chat_info!(
                        "DispatchQuery ticket={} query_len={} session_id={}",
                        ticket,
                        query.len(),
                        session_id
                    );
                    self.engine
                        .dispatch_query(ticket, QueryRequest::new(query, session_id.as_str()));
                }
                Effect::SubmitFeedback { message_id, record } => {
                    chat_info!(
                        "SubmitFeedback ticket={} message_id={} record_id={}",
                        ticket,
                        message_id,
                        record.message_id
                    );
                    if let Ok(mut tickets) = self.feedback_tickets.lock() {
                        tickets.insert(ticket, message_id);
                    }
                    self.engine.submit_feedback(ticket, to_submission(record));
                }
                Effect::FetchMetrics { days } => {
                    chat_info!("FetchMetrics ticket={} days={}", ticket, days);
                    self.engine.fetch_metrics(ticket, days);
                }
            }
        }
    }
}

struct MsgSink {
    event_tx: mpsc::Sender<AppEvent>,
    feedback_tickets: FeedbackTickets,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        if let Some(msg) = self.to_msg(event) {
            let _ = self.event_tx.send(AppEvent::Engine(msg));
        }
    }
}

impl MsgSink {
    fn to_msg(&self, event: EngineEvent) -> Option<Msg> {
        match event {
            EngineEvent::QueryCompleted { result, .. } => Some(Msg::QueryCompleted(
                result
                    .map(to_payload)
                    .map_err(|err| DispatchFailure::new(err.to_string())),
            )),
            EngineEvent::FeedbackCompleted { ticket, result } => {
                let message_id = self
                    .feedback_tickets
                    .lock()
                    .ok()
                    .and_then(|mut tickets| tickets.remove(&ticket));
                let Some(message_id) = message_id else {
                    chat_warn!("feedback completion for unknown ticket={}", ticket);
                    return None;
                };
                Some(Msg::FeedbackCompleted {
                    message_id,
                    result: result.map_err(|err| FeedbackFailure::new(err.to_string())),
                })
            }
            EngineEvent::MetricsLoaded { result, .. } => {
                Some(Msg::MetricsLoaded(result.map_err(|err| err.to_string())))
            }
        }
    }
}

fn to_payload(response: QueryResponse) -> AnswerPayload {
    AnswerPayload {
        answer: response.answer,
        sources: response
            .sources
            .unwrap_or_default()
            .into_iter()
            .map(Citation::new)
            .collect(),
        download_url: response.download_url,
        document_name: response.document_name,
    }
}

fn to_submission(record: FeedbackRecord) -> FeedbackSubmission {
    FeedbackSubmission {
        message_id: record.message_id,
        session_id: record.session_id.to_string(),
        query: record.query,
        answer: record.answer,
        is_correct: record.is_correct,
        rating: record.rating.map(|r| r.stars()),
        comment: record.comment,
        sources: record
            .sources
            .iter()
            .map(|source| source.as_value().clone())
            .collect(),
    }
}
