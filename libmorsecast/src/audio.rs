//! Audio drivers for pulse tones
//!
//! The sequencer calls [`ToneDriver::tone`] at the start of every pulse and
//! never waits on it. Drivers must return immediately and must swallow their
//! own failures.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tone frequency in normal mode
pub const NORMAL_FREQUENCY_HZ: u32 = 700;

/// Tone frequency in broadcast-priority mode
pub const PRIORITY_FREQUENCY_HZ: u32 = 880;

/// Fire-and-forget tone output
pub trait ToneDriver: Send + Sync {
    fn tone(&self, frequency_hz: u32, duration: Duration);
}

/// One emitted tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration: Duration,
}

/// Driver that produces nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentDriver;

impl ToneDriver for SilentDriver {
    fn tone(&self, _frequency_hz: u32, _duration: Duration) {}
}

/// Rings the terminal bell on stderr once per pulse
///
/// Terminals ignore frequency and duration; the bell only marks pulse starts.
#[derive(Debug, Default, Clone, Copy)]
pub struct BellDriver;

impl ToneDriver for BellDriver {
    fn tone(&self, _frequency_hz: u32, _duration: Duration) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

/// Records every tone it is asked to play
///
/// Available outside tests so integration suites in other crates can assert
/// on audio output.
#[derive(Debug, Default, Clone)]
pub struct RecordingDriver {
    tones: Arc<Mutex<Vec<Tone>>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tones(&self) -> Vec<Tone> {
        match self.tones.lock() {
            Ok(tones) => tones.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ToneDriver for RecordingDriver {
    fn tone(&self, frequency_hz: u32, duration: Duration) {
        let mut tones = match self.tones.lock() {
            Ok(tones) => tones,
            Err(poisoned) => poisoned.into_inner(),
        };
        tones.push(Tone {
            frequency_hz,
            duration,
        });
    }
}

/// Wraps a driver with a shared on/off switch
#[derive(Clone)]
pub struct ToneGate {
    inner: Arc<dyn ToneDriver>,
    enabled: Arc<AtomicBool>,
}

impl ToneGate {
    pub fn new(inner: Arc<dyn ToneDriver>, enabled: bool) -> Self {
        Self {
            inner,
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl ToneDriver for ToneGate {
    fn tone(&self, frequency_hz: u32, duration: Duration) {
        if self.is_enabled() {
            self.inner.tone(frequency_hz, duration);
        }
    }
}

/// Build a driver by name (`bell` or `silent`); unknown names fall back to silent
pub fn driver_from_name(name: &str) -> Arc<dyn ToneDriver> {
    match name.trim().to_lowercase().as_str() {
        "bell" => Arc::new(BellDriver),
        "silent" | "none" => Arc::new(SilentDriver),
        other => {
            tracing::warn!("Unknown audio driver '{}', audio disabled", other);
            Arc::new(SilentDriver)
        }
    }
}
