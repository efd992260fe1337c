//! Core types for Morsecast

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One element of a pulse string
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PulseSymbol {
    /// Dit (`.`)
    Short,
    /// Dah (`-`)
    Long,
    /// Word break (`/`)
    WordSeparator,
}

impl PulseSymbol {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Self::Short),
            '-' => Some(Self::Long),
            '/' => Some(Self::WordSeparator),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Short => '.',
            Self::Long => '-',
            Self::WordSeparator => '/',
        }
    }

    /// Whether this symbol keys the transmitter (dits and dahs do, word breaks don't)
    pub fn is_keyed(&self) -> bool {
        !matches!(self, Self::WordSeparator)
    }
}

/// A source character paired with its pulse string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MorseChar {
    pub character: char,
    pub pattern: String,
}

impl MorseChar {
    /// Keyed pulses of this character, in order
    pub fn pulses(&self) -> Vec<PulseSymbol> {
        self.pattern
            .chars()
            .filter_map(PulseSymbol::from_char)
            .filter(PulseSymbol::is_keyed)
            .collect()
    }
}

/// Per-character pulse strings for one transmission
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MorseSequence {
    chars: Vec<MorseChar>,
}

impl MorseSequence {
    pub fn new(chars: Vec<MorseChar>) -> Self {
        Self { chars }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MorseChar> {
        self.chars.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MorseChar> {
        self.chars.iter()
    }

    /// Patterns only, in order (e.g. `["...", "---", "..."]` for SOS)
    pub fn patterns(&self) -> Vec<&str> {
        self.chars.iter().map(|c| c.pattern.as_str()).collect()
    }

    /// Every keyed pulse of the transmission, flattened
    pub fn flattened(&self) -> Vec<PulseSymbol> {
        self.chars.iter().flat_map(MorseChar::pulses).collect()
    }
}

/// Which text transform runs before encoding
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    #[default]
    None,
    Shift,
    Binary,
    Xor,
}

impl TransformMode {
    pub const ALL: [TransformMode; 4] = [Self::None, Self::Shift, Self::Binary, Self::Xor];

    /// Next mode in toggle order (wraps around)
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Shift,
            Self::Shift => Self::Binary,
            Self::Binary => Self::Xor,
            Self::Xor => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Shift => "shift",
            Self::Binary => "binary",
            Self::Xor => "xor",
        }
    }
}

impl FromStr for TransformMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "shift" => Ok(Self::Shift),
            "binary" => Ok(Self::Binary),
            "xor" => Ok(Self::Xor),
            _ => Err(format!(
                "Invalid transform mode: '{}'. Valid options: none, shift, binary, xor",
                s
            )),
        }
    }
}

impl std::fmt::Display for TransformMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A completed transmission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub plaintext: String,
    pub display_text: String,
    pub timestamp: DateTime<Utc>,
    pub mode: TransformMode,
}

impl HistoryEntry {
    pub fn new(plaintext: String, display_text: String, mode: TransformMode) -> Self {
        Self {
            plaintext,
            display_text,
            timestamp: Utc::now(),
            mode,
        }
    }
}

/// Persisted row of the transmission log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransmissionRecord {
    pub id: i64,
    pub message: String,
    pub encrypted: String,
    pub timestamp: DateTime<Utc>,
    pub mode: TransformMode,
    pub created_at: i64,
}

impl TransmissionRecord {
    pub fn from_entry(id: i64, entry: &HistoryEntry) -> Self {
        Self {
            id,
            message: entry.plaintext.clone(),
            encrypted: entry.display_text.clone(),
            timestamp: entry.timestamp,
            mode: entry.mode,
            created_at: Utc::now().timestamp(),
        }
    }

    pub fn to_entry(&self) -> HistoryEntry {
        HistoryEntry {
            plaintext: self.message.clone(),
            display_text: self.encrypted.clone(),
            timestamp: self.timestamp,
            mode: self.mode,
        }
    }
}
