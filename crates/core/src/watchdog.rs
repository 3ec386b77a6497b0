//! Stall watchdog - hints and forced shuffles driven by elapsed time
//!
//! The watchdog is ticked by the frame loop with the elapsed milliseconds. It
//! owns the session clock advance, so a paused loop pauses both timers.
//!
//! - **Hint**: once the player has been idle for `hint_delay_ms` and no hint is
//!   showing, the first adjacent pair in raster order is announced. The hint
//!   re-arms after the next accepted action or a shuffle.
//! - **Forced shuffle**: while pairs and moves remain, every
//!   `shuffle_interval_ms` of idle-phase time the active tiles are permuted.

use tracing::debug;

use crate::engine::MatchEngine;
use crate::level::LevelConfig;
use crate::rng::RandomSource;
use crate::types::{Phase, Position, HINT_DELAY_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogSettings {
    pub hint_delay_ms: u32,
    /// 0 disables forced shuffles.
    pub shuffle_interval_ms: u32,
}

impl WatchdogSettings {
    pub fn for_level(config: &LevelConfig) -> Self {
        Self {
            hint_delay_ms: HINT_DELAY_MS,
            shuffle_interval_ms: config.stall_shuffle_interval_ms,
        }
    }
}

/// What a tick triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchdogTick {
    pub hint: Option<(Position, Position)>,
    pub shuffled: bool,
}

#[derive(Debug, Clone)]
pub struct StallWatchdog {
    settings: WatchdogSettings,
    hint_shown: bool,
    seen_actions: u64,
    shuffle_timer_ms: u32,
}

impl StallWatchdog {
    pub fn new(settings: WatchdogSettings) -> Self {
        Self {
            settings,
            hint_shown: false,
            seen_actions: 0,
            shuffle_timer_ms: 0,
        }
    }

    pub fn settings(&self) -> &WatchdogSettings {
        &self.settings
    }

    pub fn hint_shown(&self) -> bool {
        self.hint_shown
    }

    pub fn shuffle_timer_ms(&self) -> u32 {
        self.shuffle_timer_ms
    }

    /// Forget all timers (new session or restart).
    pub fn reset(&mut self) {
        self.hint_shown = false;
        self.seen_actions = 0;
        self.shuffle_timer_ms = 0;
    }

    /// Advance the engine clock by `elapsed_ms` and fire any due signal.
    pub fn tick<R: RandomSource>(
        &mut self,
        elapsed_ms: u32,
        engine: &mut MatchEngine<R>,
    ) -> WatchdogTick {
        engine.advance_clock(elapsed_ms);
        let mut out = WatchdogTick::default();

        if engine.phase().is_terminal() {
            return out;
        }

        if engine.actions_taken() != self.seen_actions {
            self.seen_actions = engine.actions_taken();
            self.hint_shown = false;
        }

        if !self.hint_shown && engine.idle_ms() >= u64::from(self.settings.hint_delay_ms) {
            if let Some(pair) = engine.offer_hint() {
                self.hint_shown = true;
                out.hint = Some(pair);
            }
        }

        let stalled = engine.pairs_remaining() > 0
            && engine.moves_remaining() > 0
            && engine.phase() == Phase::Idle;
        if self.settings.shuffle_interval_ms > 0 && stalled {
            self.shuffle_timer_ms = self.shuffle_timer_ms.saturating_add(elapsed_ms);
            if self.shuffle_timer_ms >= self.settings.shuffle_interval_ms {
                self.shuffle_timer_ms -= self.settings.shuffle_interval_ms;
                if engine.shuffle() {
                    debug!(clock_ms = engine.clock_ms(), "forced shuffle");
                    self.hint_shown = false;
                    out.shuffled = true;
                }
            }
        }

        out
    }
}
