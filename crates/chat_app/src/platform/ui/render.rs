use std::collections::HashMap;

use chat_core::{
    ChatViewModel, FeedbackStage, FeedbackView, MessageId, MessageView, MetricsState, Role,
    QUICK_ACTIONS, THANK_YOU_TEXT,
};
use chat_engine::{render_for_terminal, Html2MdConverter, MarkupSanitizer};
use chat_logging::chat_debug;

const TITLE: &str = "Asistente de Trámites Municipales";

/// Incremental terminal renderer: each call returns only what changed.
pub struct TranscriptRenderer {
    sanitizer: MarkupSanitizer,
    converter: Html2MdConverter,
    printed: usize,
    feedback_seen: HashMap<MessageId, FeedbackView>,
    awaiting_reply: bool,
    metrics: MetricsState,
}

impl TranscriptRenderer {
    pub fn new(api_url: &str) -> Self {
        Self {
            sanitizer: MarkupSanitizer::with_base_url(api_url),
            converter: Html2MdConverter,
            printed: 0,
            feedback_seen: HashMap::new(),
            awaiting_reply: false,
            metrics: MetricsState::Idle,
        }
    }

    pub fn banner(&self) -> Vec<String> {
        let mut lines = vec![TITLE.to_string(), "Accesos rápidos:".to_string()];
        lines.extend(
            QUICK_ACTIONS
                .iter()
                .enumerate()
                .map(|(idx, action)| format!("  /{} {}", idx + 1, action.label)),
        );
        lines.push("Escribe /help para ver todos los comandos.".to_string());
        lines.push(String::new());
        lines
    }

    pub fn render(&mut self, view: &ChatViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        for message in &view.messages[..self.printed.min(view.messages.len())] {
            if let Some(feedback) = &message.feedback {
                let changed = self.feedback_seen.get(&message.id) != Some(feedback);
                if changed {
                    lines.extend(feedback_update(message.position, feedback));
                    self.feedback_seen.insert(message.id, feedback.clone());
                }
            }
        }

        for message in view.messages.iter().skip(self.printed) {
            lines.extend(self.render_message(message));
            if let Some(feedback) = &message.feedback {
                self.feedback_seen.insert(message.id, feedback.clone());
            }
        }
        self.printed = view.messages.len();

        if view.awaiting_reply && !self.awaiting_reply {
            lines.push("… esperando respuesta".to_string());
        }
        self.awaiting_reply = view.awaiting_reply;

        if view.metrics != self.metrics {
            lines.extend(metrics_lines(&view.metrics));
            self.metrics = view.metrics.clone();
        }

        lines
    }

    fn render_message(&self, message: &MessageView) -> Vec<String> {
        let mut lines = Vec::new();
        match message.role {
            Role::User => {
                lines.push(format!("[{}] Tú:", message.position));
                lines.extend(message.content.lines().map(|l| format!("  {l}")));
            }
            Role::Assistant => {
                lines.push(format!("[{}] Asistente:", message.position));
                let body = render_for_terminal(&self.sanitizer, &self.converter, &message.content);
                lines.extend(body.lines().map(|l| format!("  {l}")));
            }
        }

        let labels: Vec<String> = message.sources.iter().filter_map(|s| s.label()).collect();
        if !labels.is_empty() {
            lines.push(format!("  Fuentes: {}", labels.join(", ")));
        }
        if let Some(attachment) = &message.attachment {
            match self.sanitizer.resolve_link(&attachment.url) {
                Some(url) => lines.push(format!("  Documento: {} <{}>", attachment.name, url)),
                None => chat_debug!("attachment link rejected url={}", attachment.url),
            }
        }
        if message.feedback.is_some() {
            let n = message.position;
            lines.push(format!(
                "  ¿Esta respuesta fue útil? /ok {n} | /bad {n} | /rate {n} 1-5 | /comment {n} texto | /send {n}"
            ));
        }
        lines.push(String::new());
        lines
    }
}

fn feedback_update(position: usize, feedback: &FeedbackView) -> Vec<String> {
    if let Some(notice) = feedback.notice {
        return vec![format!("[{position}] {notice}")];
    }
    match feedback.stage {
        FeedbackStage::Submitted => vec![format!("[{position}] {THANK_YOU_TEXT}")],
        FeedbackStage::Submitting => vec![format!("[{position}] Enviando feedback…")],
        FeedbackStage::Collecting => {
            let correctness = match feedback.is_correct {
                Some(true) => "correcta",
                Some(false) => "incorrecta",
                None => "sin marcar",
            };
            let mut summary = format!("[{position}] Feedback: {correctness}");
            if let Some(stars) = feedback.rating {
                summary.push_str(&format!(", {}", stars_text(stars)));
            }
            if !feedback.comment.is_empty() {
                summary.push_str(&format!(", comentario: \"{}\"", feedback.comment));
            }
            vec![summary]
        }
    }
}

fn stars_text(stars: u8) -> String {
    (1..=5u8)
        .map(|star| if star <= stars { '★' } else { '☆' })
        .collect()
}

fn metrics_lines(metrics: &MetricsState) -> Vec<String> {
    match metrics {
        MetricsState::Idle => Vec::new(),
        MetricsState::Loading { days } => vec![format!("Cargando métricas de {days} días…")],
        MetricsState::Failed { days, reason } => {
            vec![format!("No se pudieron cargar las métricas de {days} días: {reason}")]
        }
        MetricsState::Loaded { days, report } => {
            let mut lines = vec![format!("Métricas de exactitud ({days} días):")];
            match report.as_object() {
                Some(map) => lines.extend(map.iter().map(|(key, value)| format!("  {key}: {value}"))),
                None => lines.push(format!("  {report}")),
            }
            lines
        }
    }
}
