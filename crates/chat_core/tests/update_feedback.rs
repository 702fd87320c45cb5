use std::sync::{Arc, Once};

use chat_core::{
    update, AnswerPayload, Citation, ConversationState, Effect, FeedbackFailure, FeedbackNotice,
    FeedbackStage, Message, Msg, MessageId, Rating, SequentialIds, SessionId, THANK_YOU_TEXT,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chat_logging::initialize_for_tests);
}

fn last_message(state: &ConversationState) -> &Message {
    state
        .transcript()
        .snapshot()
        .last()
        .expect("transcript is never empty")
}

/// A conversation with one answered query; returns the answer's id.
fn answered_conversation() -> (ConversationState, MessageId) {
    let ids = Arc::new(SequentialIds::new());
    let session_id = SessionId::create(ids.as_ref());
    let state = ConversationState::new(session_id, ids);
    let (state, _) = update(state, Msg::InputChanged("¿Horario del registro?".to_string()));
    let (state, _) = update(state, Msg::QuerySubmitted);
    let reply = AnswerPayload {
        answer: Some("<p>De 8 a 14 h.</p>".to_string()),
        sources: vec![Citation::new(json!({"title": "Horarios", "page": 2}))],
        ..AnswerPayload::default()
    };
    let (state, _) = update(state, Msg::QueryCompleted(Ok(reply)));
    let answer_id = last_message(&state).id();
    (state, answer_id)
}

fn select(
    state: ConversationState,
    message_id: MessageId,
    is_correct: bool,
    stars: Option<u8>,
) -> ConversationState {
    let (mut state, _) = update(
        state,
        Msg::CorrectnessSelected {
            message_id,
            is_correct,
        },
    );
    if let Some(stars) = stars {
        (state, _) = update(state, Msg::RatingSelected { message_id, stars });
    }
    state
}

#[test]
fn submit_without_correctness_surfaces_notice_and_sends_nothing() {
    init_logging();
    let (state, id) = answered_conversation();
    let (state, _) = update(
        state,
        Msg::RatingSelected {
            message_id: id,
            stars: 3,
        },
    );

    let (state, effects) = update(state, Msg::FeedbackSubmitClicked { message_id: id });

    assert!(effects.is_empty());
    let workflow = state.feedback_for(id).expect("workflow");
    assert_eq!(workflow.stage(), FeedbackStage::Collecting);
    assert_eq!(workflow.notice(), Some(FeedbackNotice::SelectCorrectness));
    assert_eq!(workflow.rating(), Rating::new(3));
}

#[test]
fn successful_submit_freezes_workflow() {
    init_logging();
    let (state, id) = answered_conversation();
    let state = select(state, id, true, Some(4));

    let (state, effects) = update(state, Msg::FeedbackSubmitClicked { message_id: id });
    let record = match &effects[..] {
        [Effect::SubmitFeedback { message_id, record }] => {
            assert_eq!(*message_id, id);
            record.clone()
        }
        other => panic!("unexpected effects {other:?}"),
    };
    assert_eq!(record.session_id, *state.session_id());
    assert_eq!(record.query, "¿Horario del registro?");
    assert_eq!(record.answer, "<p>De 8 a 14 h.</p>");
    assert!(record.is_correct);
    assert_eq!(record.rating, Rating::new(4));
    assert_eq!(record.comment, None);
    assert_eq!(
        record.sources,
        vec![Citation::new(json!({"title": "Horarios", "page": 2}))]
    );
    assert!(record.message_id.starts_with("msg_"));
    assert_eq!(
        state.feedback_for(id).unwrap().stage(),
        FeedbackStage::Submitting
    );

    let (state, _) = update(
        state,
        Msg::FeedbackCompleted {
            message_id: id,
            result: Ok(()),
        },
    );
    assert_eq!(
        state.feedback_for(id).unwrap().stage(),
        FeedbackStage::Submitted
    );

    let (state, effects) = update(state, Msg::FeedbackSubmitClicked { message_id: id });
    assert!(effects.is_empty());

    let state = select(state, id, false, Some(1));
    let workflow = state.feedback_for(id).unwrap();
    assert_eq!(workflow.is_correct(), Some(true));
    assert_eq!(workflow.rating(), Rating::new(4));

    let view = state.view();
    let feedback = view.messages.last().unwrap().feedback.clone().unwrap();
    assert_eq!(feedback.stage, FeedbackStage::Submitted);
    assert!(!feedback.can_submit);
    assert_eq!(THANK_YOU_TEXT, "Gracias por tu feedback");
}

#[test]
fn failed_submit_returns_to_collecting_with_selections_intact() {
    init_logging();
    let (state, id) = answered_conversation();
    let state = select(state, id, false, Some(2));
    let (state, _) = update(
        state,
        Msg::CommentChanged {
            message_id: id,
            text: "Falta el horario de tarde".to_string(),
        },
    );

    let (state, effects) = update(state, Msg::FeedbackSubmitClicked { message_id: id });
    assert_eq!(effects.len(), 1);

    let (state, _) = update(
        state,
        Msg::FeedbackCompleted {
            message_id: id,
            result: Err(FeedbackFailure::new("http status 500")),
        },
    );
    let workflow = state.feedback_for(id).unwrap();
    assert_eq!(workflow.stage(), FeedbackStage::Collecting);
    assert_eq!(workflow.is_correct(), Some(false));
    assert_eq!(workflow.rating(), Rating::new(2));
    assert_eq!(workflow.comment(), "Falta el horario de tarde");
    assert_eq!(workflow.notice(), Some(FeedbackNotice::RetrySubmission));

    // Retry carries the same selections and a fresh record id.
    let (state, effects) = update(state, Msg::FeedbackSubmitClicked { message_id: id });
    match &effects[..] {
        [Effect::SubmitFeedback { record, .. }] => {
            assert_eq!(record.comment.as_deref(), Some("Falta el horario de tarde"));
            assert!(!record.is_correct);
        }
        other => panic!("unexpected effects {other:?}"),
    }
    assert_eq!(state.feedback_for(id).unwrap().notice(), None);
}

#[test]
fn selections_overwrite_previous_choice() {
    init_logging();
    let (state, id) = answered_conversation();
    let state = select(state, id, true, Some(5));
    let state = select(state, id, false, Some(2));

    let workflow = state.feedback_for(id).unwrap();
    assert_eq!(workflow.is_correct(), Some(false));
    assert_eq!(workflow.rating(), Rating::new(2));
}

#[test]
fn out_of_range_rating_is_ignored() {
    init_logging();
    let (state, id) = answered_conversation();
    let (state, _) = update(
        state,
        Msg::RatingSelected {
            message_id: id,
            stars: 9,
        },
    );
    assert_eq!(state.feedback_for(id).unwrap().rating(), None);
}

#[test]
fn inputs_are_inert_while_submitting() {
    init_logging();
    let (state, id) = answered_conversation();
    let state = select(state, id, true, None);
    let (state, _) = update(state, Msg::FeedbackSubmitClicked { message_id: id });

    let (state, effects) = update(state, Msg::FeedbackSubmitClicked { message_id: id });
    assert!(effects.is_empty());
    let state = select(state, id, false, Some(1));
    let workflow = state.feedback_for(id).unwrap();
    assert_eq!(workflow.is_correct(), Some(true));
    assert_eq!(workflow.rating(), None);
}

#[test]
fn gestures_for_welcome_message_are_ignored() {
    init_logging();
    let (state, _) = answered_conversation();
    let state = select(state, MessageId::WELCOME, true, Some(5));
    let (state, effects) = update(
        state,
        Msg::FeedbackSubmitClicked {
            message_id: MessageId::WELCOME,
        },
    );
    assert!(effects.is_empty());
    assert!(state.feedback_for(MessageId::WELCOME).is_none());
}

#[test]
fn two_answers_submit_independently() {
    init_logging();
    let (state, first) = answered_conversation();
    let (state, _) = update(state, Msg::QuickActionClicked(1));
    let (state, _) = update(
        state,
        Msg::QueryCompleted(Ok(AnswerPayload {
            answer: Some("<p>Guía</p>".to_string()),
            ..AnswerPayload::default()
        })),
    );
    let second = last_message(&state).id();
    assert_ne!(first, second);

    let state = select(state, first, true, None);
    let state = select(state, second, false, None);
    let (state, first_effects) = update(state, Msg::FeedbackSubmitClicked { message_id: first });
    let (state, second_effects) =
        update(state, Msg::FeedbackSubmitClicked { message_id: second });
    assert_eq!(first_effects.len(), 1);
    assert_eq!(second_effects.len(), 1);

    let (state, _) = update(
        state,
        Msg::FeedbackCompleted {
            message_id: second,
            result: Ok(()),
        },
    );
    assert_eq!(
        state.feedback_for(first).unwrap().stage(),
        FeedbackStage::Submitting
    );
    assert_eq!(
        state.feedback_for(second).unwrap().stage(),
        FeedbackStage::Submitted
    );
}

#[test]
fn pending_submission_counts_as_work_in_flight() {
    init_logging();
    let (state, id) = answered_conversation();
    assert!(!state.has_work_in_flight());

    let state = select(state, id, true, None);
    let (state, _) = update(state, Msg::FeedbackSubmitClicked { message_id: id });
    assert!(!state.is_awaiting_reply());
    assert!(state.has_work_in_flight());

    let (state, _) = update(
        state,
        Msg::FeedbackCompleted {
            message_id: id,
            result: Err(FeedbackFailure::new("http status 500")),
        },
    );
    assert!(!state.has_work_in_flight());

    let (state, _) = update(state, Msg::MetricsRequested { days: 7 });
    assert!(state.has_work_in_flight());
    let (state, _) = update(state, Msg::MetricsLoaded(Ok(json!({}))));
    assert!(!state.has_work_in_flight());
}
