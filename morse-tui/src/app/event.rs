//! Terminal event polling
//!
//! Keyboard and resize events from crossterm, plus a Tick every
//! `tick_rate`. Service events arrive separately over a crossbeam channel
//! (see `services.rs`).

use crate::app::Action;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};

/// TUI events that can be dispatched
#[derive(Debug, Clone)]
pub enum TuiEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// One full tick period has elapsed
    Tick,
}

impl From<TuiEvent> for Action {
    fn from(event: TuiEvent) -> Self {
        match event {
            TuiEvent::Key(key) => Action::Key(key),
            TuiEvent::Resize(w, h) => Action::Resize(w, h),
            TuiEvent::Tick => Action::Tick,
        }
    }
}

/// Event handler that polls for terminal events
pub struct EventHandler {
    tick_rate: Duration,
    last_tick: Instant,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms.max(1)),
            last_tick: Instant::now(),
        }
    }

    /// Block until the next key, resize or tick
    ///
    /// Ticks are emitted on schedule even while keys are arriving, so each
    /// Tick stands for exactly one `tick_rate` of wall time.
    pub fn next(&mut self) -> std::io::Result<TuiEvent> {
        loop {
            let timeout = self.tick_rate.saturating_sub(self.last_tick.elapsed());

            if event::poll(timeout)? {
                match event::read()? {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        return Ok(TuiEvent::Key(key));
                    }
                    CrosstermEvent::Resize(w, h) => return Ok(TuiEvent::Resize(w, h)),
                    _ => {}
                }
            }

            if self.last_tick.elapsed() >= self.tick_rate {
                self.last_tick += self.tick_rate;
                return Ok(TuiEvent::Tick);
            }
        }
    }
}
