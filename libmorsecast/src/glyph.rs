//! Message glyphs
//!
//! A glyph is an 8x8 bitmap derived from the SHA-256 digest of the message.
//! The left half comes from the first 32 bits of the digest and the right
//! half mirrors it, so every glyph is horizontally symmetric.

use sha2::{Digest, Sha256};

pub const GLYPH_SIZE: usize = 8;

const HALF: usize = GLYPH_SIZE / 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    cells: [[bool; GLYPH_SIZE]; GLYPH_SIZE],
}

impl Glyph {
    pub fn from_text(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        let mut cells = [[false; GLYPH_SIZE]; GLYPH_SIZE];

        for (row, byte) in digest.iter().take(GLYPH_SIZE / 2).enumerate() {
            // Each digest byte fills two rows of the left half
            for bit in 0..8 {
                let on = (byte >> (7 - bit)) & 1 == 1;
                let r = row * 2 + bit / HALF;
                let c = bit % HALF;
                cells[r][c] = on;
                cells[r][GLYPH_SIZE - 1 - c] = on;
            }
        }

        Self { cells }
    }

    pub fn cell(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    pub fn is_symmetric(&self) -> bool {
        self.cells
            .iter()
            .all(|row| (0..HALF).all(|c| row[c] == row[GLYPH_SIZE - 1 - c]))
    }

    /// Render as lines, one string per row
    pub fn render(&self, on: char, off: char) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|&lit| if lit { on } else { off }).collect())
            .collect()
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&lit| lit).count()
    }
}
