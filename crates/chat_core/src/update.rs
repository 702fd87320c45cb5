use chat_logging::chat_debug;

use crate::{ConversationState, Effect, Msg, Rating, QUICK_ACTIONS};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ConversationState, msg: Msg) -> (ConversationState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::QuerySubmitted => {
            let raw = state.input().to_string();
            match state.begin_dispatch(&raw) {
                Some(effect) => {
                    state.clear_input();
                    vec![effect]
                }
                None => Vec::new(),
            }
        }
        Msg::QuickActionClicked(index) => match QUICK_ACTIONS.get(index) {
            Some(action) => state.begin_dispatch(action.query).into_iter().collect(),
            None => {
                chat_debug!("unknown quick action index={}", index);
                Vec::new()
            }
        },
        Msg::QueryCompleted(result) => {
            state.complete_dispatch(result);
            Vec::new()
        }
        Msg::CorrectnessSelected {
            message_id,
            is_correct,
        } => {
            state.with_feedback(message_id, |workflow| {
                workflow.select_correctness(is_correct)
            });
            Vec::new()
        }
        Msg::RatingSelected { message_id, stars } => {
            match Rating::new(stars) {
                Some(rating) => {
                    state.with_feedback(message_id, |workflow| workflow.select_rating(rating))
                }
                None => chat_debug!("rating out of range stars={}", stars),
            }
            Vec::new()
        }
        Msg::CommentChanged { message_id, text } => {
            state.with_feedback(message_id, |workflow| workflow.set_comment(text));
            Vec::new()
        }
        Msg::FeedbackSubmitClicked { message_id } => {
            state.submit_feedback(message_id).into_iter().collect()
        }
        Msg::FeedbackCompleted { message_id, result } => {
            state.complete_feedback(message_id, result);
            Vec::new()
        }
        Msg::MetricsRequested { days } => state.request_metrics(days).into_iter().collect(),
        Msg::MetricsLoaded(result) => {
            state.apply_metrics(result);
            Vec::new()
        }
    };

    (state, effects)
}
