mod app;
mod components;
mod draw;
mod keys;
mod state;
#[cfg(test)]
mod test_support;
mod ui;

use crate::app::{App, ExitReason};
use crate::draw::{MatrixDisplay, TerminalDisplay};
use crate::keys::KeyAction;
use crate::state::app_settings::Settings;
use crate::state::messages::UiEvent;
use crate::state::network::{AnyLink, HttpLink, NetworkLink, ReplayLink};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use mlb_api::clock::{Clock, SystemClock};
use std::path::PathBuf;
use std::{io, panic};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tui::{Terminal, backend::CrosstermBackend};

/// Exit status asking the supervisor for a fresh start.
const RESTART_EXIT_CODE: i32 = 3;

#[derive(Debug, PartialEq, Eq)]
enum CliCommand {
    Run { config: Option<PathBuf> },
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match parse_args(std::env::args().skip(1)) {
        Ok(CliCommand::Run { config }) => config,
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            return Ok(());
        }
        Ok(CliCommand::Version) => {
            println!("mlbboard {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    let settings = Settings::load(config)?;

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(settings.log_level())?;
    tui_logger::set_default_level(settings.log_level());

    let link = match &settings.replay_dir {
        Some(dir) => {
            info!("replaying recorded responses from {}", dir.display());
            AnyLink::Replay(ReplayLink::new(dir))
        }
        None => AnyLink::Http(HttpLink::new(settings.base_url.clone(), settings.request_timeout())),
    };

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx));

    let mut display = TerminalDisplay::new(terminal, settings.matrix.clone());
    let mut app = App::new(settings, link, SystemClock);

    let exit = main_ui_loop(&mut app, &mut display, ui_event_rx).await;

    input_handler.abort();
    cleanup_terminal()?;

    if exit == ExitReason::Restart {
        std::process::exit(RESTART_EXIT_CODE);
    }
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliCommand, String> {
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "-c" | "--config" => match args.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => return Err(format!("{arg} needs a path")),
            },
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }
    Ok(CliCommand::Run { config })
}

fn usage_text() -> &'static str {
    "mlbboard - MLB matrix scoreboard

Usage:
  mlbboard [--config <path>]
  mlbboard --help
  mlbboard --version

Keys:
  q, ctrl-c   quit
  R           restart (exit code 3)
  \"           toggle log pane

Environment:
  MLBBOARD_CONFIG       Path to a JSON settings file
  MLBBOARD_TEAM         Favorite team code (default ATL)
  MLBBOARD_DATE         Show this YYYY-MM-DD instead of today
  MLBBOARD_REPLAY_DIR   Serve recorded JSON responses from this directory
  MLBBOARD_DEBUG        1 for debug logging"
}

/// Steps the app on its own schedule. Input between steps never postpones the next one.
async fn main_ui_loop<L: NetworkLink, C: Clock, D: MatrixDisplay>(
    app: &mut App<L, C>,
    display: &mut D,
    mut ui_events: mpsc::Receiver<UiEvent>,
) -> ExitReason {
    let mut next_step = Instant::now();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                match ui_event {
                    UiEvent::KeyPressed(key_event) => match keys::action_for(key_event) {
                        KeyAction::Quit => app.request_exit(ExitReason::Quit),
                        KeyAction::Restart => app.request_exit(ExitReason::Restart),
                        KeyAction::ToggleLogs => {
                            display.toggle_logs();
                            redraw(display);
                        }
                        KeyAction::Ignore => {}
                    },
                    UiEvent::Resize => redraw(display),
                }
            }

            _ = tokio::time::sleep_until(next_step) => {
                let pause = app.step(display).await;
                next_step = Instant::now() + pause;
            }
        }

        if let Some(exit) = app.exit_reason() {
            return exit;
        }
    }
}

fn redraw<D: MatrixDisplay>(display: &mut D) {
    if let Err(e) = display.redraw() {
        error!("redraw failed: {e}");
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0))?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    execute!(stdout, terminal::LeaveAlternateScreen)?;
    execute!(stdout, cursor::Show)?;
    terminal::disable_raw_mode()
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let _ = cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
