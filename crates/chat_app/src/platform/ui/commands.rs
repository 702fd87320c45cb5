//! Line-oriented gestures.

use chat_core::{ChatViewModel, Msg, DEFAULT_METRICS_DAYS, QUICK_ACTIONS};

pub const HELP_TEXT: &str = "\
Escribe tu pregunta y pulsa Enter.
  /1, /2                 accesos rápidos
  /ok <n>, /bad <n>      marcar la respuesta <n> como correcta o incorrecta
  /rate <n> <1-5>        calificar la respuesta <n>
  /comment <n> <texto>   comentar la respuesta <n>
  /send <n>              enviar el feedback de la respuesta <n>
  /metrics [días]        métricas de exactitud (30 días por defecto)
  /help                  esta ayuda
  /quit                  salir";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(Vec<Msg>),
    Help,
    Quit,
    /// A query is pending; new dispatches are refused.
    Busy,
    Invalid(String),
}

pub fn parse(line: &str, view: &ChatViewModel) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        if view.awaiting_reply {
            return Command::Busy;
        }
        return Command::Send(vec![Msg::InputChanged(line.to_string()), Msg::QuerySubmitted]);
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "quit" | "exit" => Command::Quit,
        "help" => Command::Help,
        "metrics" => parse_days(args),
        "ok" | "bad" => with_answer(args, view, |message_id, _| {
            Ok(Msg::CorrectnessSelected {
                message_id,
                is_correct: name == "ok",
            })
        }),
        "rate" => with_answer(args, view, |message_id, rest| {
            let stars = rest
                .parse::<u8>()
                .ok()
                .filter(|stars| (1..=5).contains(stars))
                .ok_or_else(|| "la calificación debe ser un número de 1 a 5".to_string())?;
            Ok(Msg::RatingSelected { message_id, stars })
        }),
        "comment" => with_answer(args, view, |message_id, rest| {
            Ok(Msg::CommentChanged {
                message_id,
                text: rest.to_string(),
            })
        }),
        "send" => with_answer(args, view, |message_id, _| {
            Ok(Msg::FeedbackSubmitClicked { message_id })
        }),
        other => match other.parse::<usize>() {
            Ok(n) if (1..=QUICK_ACTIONS.len()).contains(&n) => {
                if view.awaiting_reply {
                    Command::Busy
                } else {
                    Command::Send(vec![Msg::QuickActionClicked(n - 1)])
                }
            }
            _ => Command::Invalid(format!("comando desconocido: /{other}")),
        },
    }
}

fn parse_days(args: &str) -> Command {
    if args.is_empty() {
        return Command::Send(vec![Msg::MetricsRequested {
            days: DEFAULT_METRICS_DAYS,
        }]);
    }
    match args.parse::<u32>() {
        Ok(days) if days > 0 => Command::Send(vec![Msg::MetricsRequested { days }]),
        _ => Command::Invalid(format!("número de días no válido: {args}")),
    }
}

/// Resolves `<n> [rest]` to a rateable transcript entry and builds the message.
fn with_answer(
    args: &str,
    view: &ChatViewModel,
    build: impl FnOnce(chat_core::MessageId, &str) -> Result<Msg, String>,
) -> Command {
    let (position, rest) = match args.split_once(char::is_whitespace) {
        Some((position, rest)) => (position, rest.trim()),
        None => (args, ""),
    };
    let Ok(position) = position.parse::<usize>() else {
        return Command::Invalid("indica el número de la respuesta, por ejemplo /ok 3".to_string());
    };
    let Some(message) = view
        .messages
        .iter()
        .find(|m| m.position == position && m.feedback.is_some())
    else {
        return Command::Invalid(format!("la entrada {position} no admite feedback"));
    };
    match build(message.id, rest) {
        Ok(msg) => Command::Send(vec![msg]),
        Err(reason) => Command::Invalid(reason),
    }
}
