mod render;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    view::{CharactersPanel, ScreenView},
    Action, AppState, ClientSettings, EffectRunner, HttpTherapyApi,
};
use shared::domain::CharacterId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::render::Transcript;

/// Console front end for the AI therapy desk.
#[derive(Parser, Debug)]
struct Args {
    /// Backend base url; overrides settings file and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Start a session with this character id right away.
    #[arg(long)]
    character: Option<i64>,
    #[arg(long)]
    report_timeout_secs: Option<u64>,
}

enum Command {
    Quit,
    Reload,
    End,
    New,
    Pick(usize),
    Say(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    match line {
        "" => None,
        "/quit" | "/exit" => Some(Command::Quit),
        "/reload" => Some(Command::Reload),
        "/end" => Some(Command::End),
        "/new" => Some(Command::New),
        _ => match line.parse::<usize>() {
            Ok(index) => Some(Command::Pick(index)),
            Err(_) => Some(Command::Say(line.to_string())),
        },
    }
}

struct Console {
    state: AppState,
    runner: EffectRunner,
    transcript: Transcript,
}

impl Console {
    async fn dispatch(&mut self, action: Action) {
        let mut next = self.state.apply(action);
        while let Some(effect) = next {
            self.render();
            debug!(effect = effect.name(), "awaiting backend");
            let completion = self.runner.run(effect).await;
            next = self.state.apply(completion);
        }
        self.render();
    }

    fn render(&mut self) {
        let view = self.state.view();
        self.transcript.render(&view);
        for notice in view.notices {
            self.state.apply(Action::DismissNotice(notice.id));
        }
    }

    fn character_at(&self, index: usize) -> Option<CharacterId> {
        match self.state.view().screen {
            ScreenView::Selection(selection) => match selection.characters {
                CharactersPanel::Ready(cards) => {
                    index.checked_sub(1).and_then(|i| cards.get(i)).map(|card| card.id)
                }
                _ => None,
            },
            ScreenView::Session(_) => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = ClientSettings::load().context("failed to load settings")?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(secs) = args.report_timeout_secs {
        settings.report_timeout_secs = secs;
    }
    let base_url = settings.base_url()?;
    info!(server_url = %base_url, "starting therapy console");

    let api = HttpTherapyApi::with_request_timeout(base_url, settings.request_timeout())?;
    let mut console = Console {
        state: AppState::new(),
        runner: EffectRunner::from_settings(Arc::new(api), &settings),
        transcript: Transcript::default(),
    };

    console.dispatch(Action::Init).await;
    if let Some(id) = args.character {
        console
            .dispatch(Action::SelectCharacter(CharacterId(id)))
            .await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit_armed = false;
    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_command(&line) else {
            continue;
        };
        if !matches!(command, Command::Quit) {
            quit_armed = false;
        }
        match command {
            Command::Quit => match console.state.exit_guard() {
                Some(warning) if !quit_armed => {
                    println!("{warning} Type /quit again to leave.");
                    quit_armed = true;
                }
                _ => break,
            },
            Command::Reload => console.dispatch(Action::ReloadCharacters).await,
            Command::End => console.dispatch(Action::EndSession).await,
            Command::New => console.dispatch(Action::ReturnToSelection).await,
            Command::Pick(index) => match console.character_at(index) {
                Some(id) => console.dispatch(Action::SelectCharacter(id)).await,
                None if console.state.has_active_session() => {
                    console.state.apply(Action::EditDraft(index.to_string()));
                    console.dispatch(Action::SendDraft).await;
                }
                None => println!("No character #{index}."),
            },
            Command::Say(text) => {
                if console.state.has_active_session() {
                    console.state.apply(Action::EditDraft(text));
                    console.dispatch(Action::SendDraft).await;
                } else {
                    println!("Pick a character by number first (or /reload).");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_parsed_from_console_lines() {
        assert!(parse_command("   ").is_none());
        assert!(matches!(parse_command("/quit"), Some(Command::Quit)));
        assert!(matches!(parse_command(" /end "), Some(Command::End)));
        assert!(matches!(parse_command("2"), Some(Command::Pick(2))));
        match parse_command("  how are you feeling? ") {
            Some(Command::Say(text)) => assert_eq!(text, "how are you feeling?"),
            _ => panic!("expected chat line"),
        }
    }
}
