//! Transmission sequencer
//!
//! A pure finite-state machine that turns a [`MorseSequence`] into timed
//! pulses. It owns no clock and performs no I/O: every call returns a
//! [`Step`] describing the events of that scheduling tick and what happens
//! next, either a delay or completion. The transmitter task
//! ([`crate::transmitter`]) turns those delays into timers.
//!
//! ```text
//!            start                 advance (per tick)
//!   Idle ─────────────▶ Flashing ──▶ PulseGap ──▶ Flashing ...
//!     ▲                                   │
//!     │                                   ▼ (last pulse)
//!     └──── Complete ◀── CharGap ◀────────┘
//! ```
//!
//! Invariant: whenever the machine is idle, both indices are zero.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::service::events::Event;
use crate::symbols;
use crate::transform::{self, TransformParams};
use crate::types::{HistoryEntry, MorseSequence, PulseSymbol, TransformMode};

/// Fixed delays of a transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub dit: Duration,
    pub dah: Duration,
    pub pulse_gap: Duration,
    pub char_gap: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            dit: Duration::from_millis(200),
            dah: Duration::from_millis(600),
            pulse_gap: Duration::from_millis(200),
            char_gap: Duration::from_millis(500),
        }
    }
}

impl Timing {
    pub fn pulse_duration(&self, pulse: PulseSymbol) -> Duration {
        match pulse {
            PulseSymbol::Short => self.dit,
            PulseSymbol::Long => self.dah,
            PulseSymbol::WordSeparator => Duration::ZERO,
        }
    }

    /// Wall time from start to completion for a sequence
    pub fn total_duration(&self, sequence: &MorseSequence) -> Duration {
        sequence
            .iter()
            .map(|c| {
                let pulses = c.pulses();
                let keyed: Duration = pulses
                    .iter()
                    .map(|&p| self.pulse_duration(p) + self.pulse_gap)
                    .sum();
                keyed + self.char_gap
            })
            .sum()
    }
}

/// Everything needed to run one transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionPlan {
    pub id: String,
    pub plaintext: String,
    pub display_text: String,
    pub mode: TransformMode,
    pub sequence: MorseSequence,
    pub frequency_hz: u32,
}

impl TransmissionPlan {
    /// Run the transform for `mode` and translate the result into pulses
    pub fn prepare(
        plaintext: &str,
        mode: TransformMode,
        params: &TransformParams,
        frequency_hz: u32,
    ) -> Self {
        let prepared = transform::prepare(plaintext, mode, params);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            plaintext: plaintext.to_string(),
            sequence: symbols::encode_message(&prepared.morse_text),
            display_text: prepared.display_text,
            mode,
            frequency_hz,
        }
    }
}

/// Why [`Sequencer::start`] refused a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// The plaintext was empty or whitespace-only
    EmptyMessage,
    /// Another transmission is running
    Busy,
}

/// Mutable transmission record owned by the sequencer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransmissionState {
    pub sequence: MorseSequence,
    pub char_index: usize,
    pub pulse_index: usize,
    pub active: bool,
}

/// Observable sequencer state for UIs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub active: bool,
    pub char_index: usize,
    pub char_total: usize,
    pub pulse_index: usize,
    pub pulse_total: usize,
    pub character: Option<char>,
    pub pattern: String,
    pub flashing: bool,
    pub pulse: Option<PulseSymbol>,
}

/// What the driver should do after a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Call [`Sequencer::advance`] again after this delay
    Wait(Duration),
    /// The transmission finished; log the entry
    Complete(HistoryEntry),
}

/// Output of one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub events: Vec<Event>,
    pub next: Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Flashing,
    PulseGap,
    CharGap,
}

#[derive(Debug, Clone)]
struct Meta {
    id: String,
    plaintext: String,
    display_text: String,
    mode: TransformMode,
    frequency_hz: u32,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    timing: Timing,
    state: TransmissionState,
    stage: Stage,
    meta: Option<Meta>,
}

impl Sequencer {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            state: TransmissionState::default(),
            stage: Stage::Idle,
            meta: None,
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn state(&self) -> &TransmissionState {
        &self.state
    }

    /// Begin a transmission
    ///
    /// Rejects empty messages and any plan offered while another runs; a
    /// rejection leaves the machine untouched.
    pub fn start(&mut self, plan: TransmissionPlan) -> Result<Step, Rejected> {
        if self.state.active {
            return Err(Rejected::Busy);
        }
        if plan.plaintext.trim().is_empty() {
            return Err(Rejected::EmptyMessage);
        }

        let char_total = plan.sequence.len();
        let pulse_total = plan.sequence.flattened().len();

        self.state = TransmissionState {
            sequence: plan.sequence,
            char_index: 0,
            pulse_index: 0,
            active: true,
        };
        self.meta = Some(Meta {
            id: plan.id.clone(),
            plaintext: plan.plaintext,
            display_text: plan.display_text.clone(),
            mode: plan.mode,
            frequency_hz: plan.frequency_hz,
        });

        let events = vec![Event::TransmissionStarted {
            transmission_id: plan.id,
            display_text: plan.display_text,
            mode: plan.mode,
            char_total,
            pulse_total,
        }];

        Ok(self.enter_character(events))
    }

    /// Apply the transition that was due when the last delay elapsed
    ///
    /// Returns `None` when idle.
    pub fn advance(&mut self) -> Option<Step> {
        if !self.state.active {
            return None;
        }

        let step = match self.stage {
            Stage::Idle => return None,
            Stage::Flashing => {
                self.stage = Stage::PulseGap;
                let events = vec![Event::FlashEnd {
                    transmission_id: self.id(),
                    snapshot: self.snapshot(),
                }];
                Step {
                    events,
                    next: Next::Wait(self.timing.pulse_gap),
                }
            }
            Stage::PulseGap => {
                self.state.pulse_index += 1;
                if self.state.pulse_index < self.current_pulses().len() {
                    self.begin_pulse(Vec::new())
                } else {
                    self.stage = Stage::CharGap;
                    Step {
                        events: Vec::new(),
                        next: Next::Wait(self.timing.char_gap),
                    }
                }
            }
            Stage::CharGap => {
                self.state.char_index += 1;
                self.state.pulse_index = 0;
                let events = vec![Event::CharacterAdvanced {
                    transmission_id: self.id(),
                    snapshot: self.snapshot(),
                }];
                self.enter_character(events)
            }
        };

        Some(step)
    }

    /// Observable state right now
    pub fn snapshot(&self) -> Snapshot {
        if !self.state.active {
            return Snapshot::default();
        }

        let current = self.state.sequence.get(self.state.char_index);
        let pulses = current.map(|c| c.pulses()).unwrap_or_default();
        let flashing = self.stage == Stage::Flashing;

        Snapshot {
            active: true,
            char_index: self.state.char_index,
            char_total: self.state.sequence.len(),
            pulse_index: self.state.pulse_index,
            pulse_total: pulses.len(),
            character: current.map(|c| c.character),
            pattern: current.map(|c| c.pattern.clone()).unwrap_or_default(),
            flashing,
            pulse: if flashing {
                pulses.get(self.state.pulse_index).copied()
            } else {
                None
            },
        }
    }

    fn id(&self) -> String {
        self.meta.as_ref().map(|m| m.id.clone()).unwrap_or_default()
    }

    fn current_pulses(&self) -> Vec<PulseSymbol> {
        self.state
            .sequence
            .get(self.state.char_index)
            .map(|c| c.pulses())
            .unwrap_or_default()
    }

    fn enter_character(&mut self, mut events: Vec<Event>) -> Step {
        if self.state.char_index >= self.state.sequence.len() {
            return self.complete(events);
        }

        if self.current_pulses().is_empty() {
            // Word separator: silence for one inter-character gap
            self.stage = Stage::CharGap;
            events.push(Event::WordGap {
                transmission_id: self.id(),
                snapshot: self.snapshot(),
            });
            return Step {
                events,
                next: Next::Wait(self.timing.char_gap),
            };
        }

        self.begin_pulse(events)
    }

    fn begin_pulse(&mut self, mut events: Vec<Event>) -> Step {
        let pulses = self.current_pulses();
        let Some(&pulse) = pulses.get(self.state.pulse_index) else {
            self.stage = Stage::CharGap;
            return Step {
                events,
                next: Next::Wait(self.timing.char_gap),
            };
        };

        self.stage = Stage::Flashing;
        let duration = self.timing.pulse_duration(pulse);
        let frequency_hz = self.meta.as_ref().map(|m| m.frequency_hz).unwrap_or_default();

        events.push(Event::FlashBegin {
            transmission_id: self.id(),
            pulse,
            frequency_hz,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            snapshot: self.snapshot(),
        });

        Step {
            events,
            next: Next::Wait(duration),
        }
    }

    fn complete(&mut self, mut events: Vec<Event>) -> Step {
        let meta = self.meta.take();
        let id = meta.as_ref().map(|m| m.id.clone()).unwrap_or_default();
        let entry = match meta {
            Some(meta) => HistoryEntry::new(meta.plaintext, meta.display_text, meta.mode),
            None => HistoryEntry::new(String::new(), String::new(), TransformMode::None),
        };

        self.state = TransmissionState::default();
        self.stage = Stage::Idle;

        events.push(Event::TransmissionCompleted {
            transmission_id: id,
            entry: entry.clone(),
        });

        Step {
            events,
            next: Next::Complete(entry),
        }
    }
}
