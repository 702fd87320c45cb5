use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use chat_core::{update, ConversationState, Msg};
use chat_logging::{chat_info, chat_warn};
use log::LevelFilter;

use super::config::{self, ClientConfig, API_URL_ENV, CONFIG_FILENAME};
use super::effects::EffectRunner;
use super::ui::commands::{self, Command, HELP_TEXT};
use super::ui::render::TranscriptRenderer;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Line(String),
    InputClosed,
    Engine(Msg),
}

pub fn run_app() -> anyhow::Result<()> {
    let loaded = config::load_from(Path::new(CONFIG_FILENAME));
    let config = loaded
        .as_ref()
        .cloned()
        .unwrap_or_default()
        .with_api_url_override(std::env::var(API_URL_ENV).ok());

    chat_logging::initialize(
        config.log_target.into(),
        LevelFilter::Info,
        &config.log_file,
    );
    if let Err(err) = &loaded {
        chat_warn!("{}; using defaults", err);
    }
    chat_info!("backend base url {}", config.api_url);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(config.service_settings(), event_tx.clone())
        .context("could not start the backend engine")?;

    spawn_input_reader(event_tx);
    let state = run_conversation(&config, ConversationState::start(), runner, event_rx)?;
    chat_info!("conversation ended session_id={}", state.session_id());
    Ok(())
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if event_tx.send(AppEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}

/// Drives `state` until the user quits, or until input is closed and nothing
/// is left in flight.
fn run_conversation(
    config: &ClientConfig,
    mut state: ConversationState,
    runner: EffectRunner,
    event_rx: mpsc::Receiver<AppEvent>,
) -> anyhow::Result<ConversationState> {
    let mut renderer = TranscriptRenderer::new(&config.api_url);
    let mut input_closed = false;

    print_lines(&renderer.banner())?;
    render(&mut state, &mut renderer)?;

    while let Ok(event) = event_rx.recv() {
        let msgs = match event {
            AppEvent::Line(line) => match commands::parse(&line, &state.view()) {
                Command::Send(msgs) => msgs,
                Command::Help => {
                    print_lines(&[HELP_TEXT.to_string()])?;
                    continue;
                }
                Command::Quit => break,
                Command::Busy => {
                    print_lines(&["Espera a que llegue la respuesta anterior.".to_string()])?;
                    continue;
                }
                Command::Invalid(reason) => {
                    print_lines(&[reason])?;
                    continue;
                }
            },
            AppEvent::InputClosed => {
                input_closed = true;
                Vec::new()
            }
            AppEvent::Engine(msg) => vec![msg],
        };

        for msg in msgs {
            let (next, effects) = update(state, msg);
            state = next;
            runner.enqueue(effects);
        }
        render(&mut state, &mut renderer)?;

        // Piped input: let outstanding replies arrive before leaving.
        if input_closed && !state.has_work_in_flight() {
            break;
        }
    }

    Ok(state)
}

fn render(state: &mut ConversationState, renderer: &mut TranscriptRenderer) -> anyhow::Result<()> {
    if !state.consume_dirty() {
        return Ok(());
    }
    print_lines(&renderer.render(&state.view()))
}

fn print_lines(lines: &[String]) -> anyhow::Result<()> {
    if lines.is_empty() {
        return Ok(());
    }
    let mut out = io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}
