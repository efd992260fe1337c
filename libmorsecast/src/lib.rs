//! Morsecast - a novelty Morse code terminal
//!
//! This library provides the symbol table, text transforms, glyph generator,
//! transmission sequencer and transmission log shared by the Morsecast
//! binaries (CLI tools and the terminal UI).

pub mod audio;
pub mod config;
pub mod error;
pub mod glyph;
pub mod history;
pub mod logging;
pub mod sequencer;
pub mod service;
pub mod store;
pub mod symbols;
pub mod transform;
pub mod transmitter;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{MorsecastError, Result};
pub use history::{HistoryStore, KvHistoryStore, MemoryHistoryStore};
pub use store::KvStore;
pub use types::{HistoryEntry, MorseChar, MorseSequence, PulseSymbol, TransformMode, TransmissionRecord};
