//! A play session: level resolution, engine, watchdog, power-ups and progress.

use anyhow::{Context, Result};
use tracing::info;

use sock_match_core::types::{CoreEvent, Direction, Phase, Position};
use sock_match_core::{
    GameSnapshot, LevelConfig, LevelConfigResolver, MatchEngine, StallWatchdog, WatchdogSettings,
};

use crate::config::AppConfig;
use crate::powerups::{PowerupInventory, PowerupKind, PowerupOutcome};
use crate::progress::{self, ProgressStore};

pub struct Session<S: ProgressStore> {
    resolver: LevelConfigResolver,
    engine: MatchEngine,
    watchdog: StallWatchdog,
    powerups: PowerupInventory,
    store: S,
    hint_delay_ms: u32,
    hint: Option<(Position, Position)>,
    win_recorded: bool,
}

impl<S: ProgressStore> Session<S> {
    /// Start on the configured level, or the stored next level.
    pub fn start(config: &AppConfig, store: S, seed: u32) -> Result<Self> {
        let resolver = LevelConfigResolver::default();
        let level = config.level.unwrap_or_else(|| progress::next_level(&store));
        let level_config = resolver.resolve(level);
        let engine = MatchEngine::with_seed(level_config, level_config.objective(), seed)
            .with_context(|| format!("failed to start level {level}"))?;
        Ok(Self {
            resolver,
            watchdog: StallWatchdog::new(watchdog_settings(&level_config, config.hint_delay_ms)),
            engine,
            powerups: PowerupInventory::default(),
            store,
            hint_delay_ms: config.hint_delay_ms,
            hint: None,
            win_recorded: false,
        })
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn level(&self) -> u32 {
        self.engine.config().level
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn powerups(&self) -> &PowerupInventory {
        &self.powerups
    }

    /// Hint currently on display.
    pub fn hint(&self) -> Option<(Position, Position)> {
        self.hint
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.engine.snapshot_into(out);
    }

    pub fn take_events(&mut self) -> Vec<CoreEvent> {
        self.engine.take_events()
    }

    /// Advance timers by one frame.
    pub fn tick(&mut self, elapsed_ms: u32) {
        let tick = self.watchdog.tick(elapsed_ms, &mut self.engine);
        if tick.shuffled {
            self.hint = None;
        }
        if let Some(pair) = tick.hint {
            self.hint = Some(pair);
        }
    }

    pub fn swap(&mut self, at: Position, direction: Direction) -> Result<bool> {
        let accepted = self.engine.try_swap(at, direction)?;
        if accepted {
            self.hint = None;
        }
        self.settle()?;
        Ok(accepted)
    }

    pub fn toggle_powerup(&mut self, kind: PowerupKind) {
        self.powerups.toggle(kind);
    }

    pub fn use_powerup(&mut self, at: Position) -> Result<PowerupOutcome> {
        let outcome = self.powerups.use_on(&mut self.engine, at)?;
        if matches!(outcome, PowerupOutcome::Used { .. }) {
            self.hint = None;
            info!(level = self.level(), ?outcome, "powerup used");
        }
        self.settle()?;
        Ok(outcome)
    }

    /// Persist progression once the level is won.
    fn settle(&mut self) -> Result<()> {
        if self.engine.phase() == Phase::Won && !self.win_recorded {
            let level = self.level();
            progress::record_win(&mut self.store, level)?;
            self.win_recorded = true;
        }
        Ok(())
    }

    /// Move on to the following level after a win.
    pub fn next_level(&mut self) -> Result<bool> {
        if self.engine.phase() != Phase::Won {
            return Ok(false);
        }
        let level = self.level() + 1;
        self.load(self.resolver.resolve(level))?;
        Ok(true)
    }

    /// Replay the current level on a fresh board.
    pub fn retry(&mut self) -> Result<()> {
        let level = self.level();
        progress::record_retry(&mut self.store, level)?;
        self.engine.restart()?;
        self.reset_shell();
        Ok(())
    }

    fn load(&mut self, config: LevelConfig) -> Result<()> {
        self.engine.initialize(config, config.objective())?;
        self.watchdog = StallWatchdog::new(watchdog_settings(&config, self.hint_delay_ms));
        self.reset_shell();
        Ok(())
    }

    fn reset_shell(&mut self) {
        self.watchdog.reset();
        self.powerups = PowerupInventory::default();
        self.hint = None;
        self.win_recorded = false;
    }
}

fn watchdog_settings(config: &LevelConfig, hint_delay_ms: u32) -> WatchdogSettings {
    WatchdogSettings {
        hint_delay_ms,
        ..WatchdogSettings::for_level(config)
    }
}
