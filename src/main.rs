//! Terminal sock-matching game (default binary).
//!
//! crossterm input, a framebuffer renderer, and a fixed 16ms tick driving the
//! session timers. Configuration comes from `SOCK_MATCH_*` variables; logs go
//! to `SOCK_MATCH_LOG_PATH` when set (never to the terminal).

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use sock_match::app::{AppConfig, JsonFileProgressStore, PowerupKind, Session};
use sock_match::core::GameSnapshot;
use sock_match::input::{handle_key_event, should_quit, InputCommand};
use sock_match::term::{BoardView, FrameBuffer, PowerupSlot, ShellView, TerminalRenderer, Viewport};
use sock_match::types::{Position, TICK_MS};

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    let _guard = init_logging(&config)?;

    let seed = config.seed.unwrap_or_else(clock_seed);
    let store = JsonFileProgressStore::open(&config.progress_path)?;
    let mut session = Session::start(&config, store, seed)?;
    info!(seed, level = session.level(), "session started");

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// File logging when a path is configured; otherwise no subscriber.
fn init_logging(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let Some(path) = &config.log_path else {
        return Ok(None);
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn run(term: &mut TerminalRenderer, session: &mut Session<JsonFileProgressStore>) -> Result<()> {
    let view = BoardView::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = GameSnapshot::default();
    let mut cursor = Position::new(0, 0);

    let tick = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        session.snapshot_into(&mut snap);
        cursor = clamp(cursor, &snap);

        let powerups = session.powerups();
        let slots = PowerupKind::ALL.map(|kind| PowerupSlot {
            label: kind.label(),
            count: powerups.count(kind),
            selected: powerups.selected() == Some(kind),
        });
        let shell = ShellView {
            cursor: Some(cursor),
            hint: session.hint(),
            powerups: &slots,
        };
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&snap, &shell, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        info!(level = session.level(), "quit");
                        return Ok(());
                    }
                    if let Some(command) = handle_key_event(key) {
                        cursor = apply(session, command, cursor)?;
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick {
            last_tick = Instant::now();
            session.tick(elapsed.as_millis().min(u32::MAX as u128) as u32);
        }

        for event in session.take_events() {
            debug!(?event, "core event");
        }
    }
}

/// Apply a command, returning the new cursor position.
fn apply(
    session: &mut Session<JsonFileProgressStore>,
    command: InputCommand,
    cursor: Position,
) -> Result<Position> {
    match command {
        InputCommand::MoveCursor(dir) => return Ok(cursor.step(dir).unwrap_or(cursor)),
        InputCommand::Swap(dir) => {
            session.swap(cursor, dir)?;
        }
        InputCommand::SelectPowerup(slot) => {
            if let Some(&kind) = PowerupKind::ALL.get(slot) {
                session.toggle_powerup(kind);
            }
        }
        InputCommand::Apply => {
            let outcome = session.use_powerup(cursor)?;
            debug!(?outcome, "power-up");
        }
        InputCommand::NextLevel => {
            if session.next_level()? {
                info!(level = session.level(), "next level");
            }
        }
        InputCommand::Retry => {
            session.retry()?;
            info!(level = session.level(), "retry");
        }
    }
    Ok(cursor)
}

fn clamp(pos: Position, snap: &GameSnapshot) -> Position {
    let max_x = (snap.width as i16 - 1).max(0);
    let max_y = (snap.height as i16 - 1).max(0);
    Position::new(pos.x.clamp(0, max_x), pos.y.clamp(0, max_y))
}
