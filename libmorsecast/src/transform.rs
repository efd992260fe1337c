//! Text transforms applied before Morse translation
//!
//! None of these are encryption in any meaningful sense: they are reversible
//! text obfuscations with no key secrecy.

use crate::types::TransformMode;

/// XOR key used when the supplied key does not parse
pub const DEFAULT_XOR_KEY: u8 = 42;

/// Parameters consumed by the transforms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformParams {
    /// Shift cipher rotation (taken modulo 26)
    pub shift: u8,
    /// Raw XOR key text, parsed with [`parse_xor_key`]
    pub xor_key: String,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            shift: 3,
            xor_key: DEFAULT_XOR_KEY.to_string(),
        }
    }
}

/// Text to show in the log and text to encode into pulses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub display_text: String,
    pub morse_text: String,
}

/// Rotate ASCII uppercase letters by `k` positions; everything else passes through
pub fn shift(text: &str, k: u8) -> String {
    let k = k % 26;
    text.chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                let offset = (c as u8 - b'A' + k) % 26;
                (b'A' + offset) as char
            } else {
                c
            }
        })
        .collect()
}

/// Each code point as zero-padded 8-bit binary, space separated
pub fn to_bit_string(text: &str) -> String {
    text.chars()
        .map(|c| format!("{:08b}", c as u32))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an XOR key, falling back to [`DEFAULT_XOR_KEY`]
pub fn parse_xor_key(raw: &str) -> u8 {
    match raw.trim().parse::<u8>() {
        Ok(key) => key,
        Err(_) => {
            tracing::debug!("Unparseable XOR key {:?}, using default {}", raw, DEFAULT_XOR_KEY);
            DEFAULT_XOR_KEY
        }
    }
}

/// XOR each code point with the key and render it as two-digit hex
pub fn xor_encode(text: &str, key: &str) -> String {
    let key = u32::from(parse_xor_key(key));
    text.chars()
        .map(|c| format!("{:02X}", c as u32 ^ key))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reverse of [`xor_encode`]; tokens that are not valid hex become `?`
pub fn xor_decode(hex: &str, key: &str) -> String {
    let key = u32::from(parse_xor_key(key));
    hex.split_whitespace()
        .map(|token| {
            u32::from_str_radix(token, 16)
                .ok()
                .and_then(|code| char::from_u32(code ^ key))
                .unwrap_or('?')
        })
        .collect()
}

/// Compute the display text and the text to encode for a transmission
///
/// Shift mode encodes the shifted text. Binary and XOR modes only change the
/// logged text; the original message is what gets keyed.
pub fn prepare(text: &str, mode: TransformMode, params: &TransformParams) -> Prepared {
    match mode {
        TransformMode::None => Prepared {
            display_text: text.to_string(),
            morse_text: text.to_string(),
        },
        TransformMode::Shift => {
            let shifted = shift(&text.to_uppercase(), params.shift);
            Prepared {
                display_text: shifted.clone(),
                morse_text: shifted,
            }
        }
        TransformMode::Binary => Prepared {
            display_text: to_bit_string(text),
            morse_text: text.to_string(),
        },
        TransformMode::Xor => Prepared {
            display_text: xor_encode(text, &params.xor_key),
            morse_text: text.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_rotates_uppercase_only() {
        assert_eq!(shift("ABC XYZ", 3), "DEF ABC");
        assert_eq!(shift("abc-123", 3), "abc-123");
    }

    #[test]
    fn test_shift_inverse_for_every_k() {
        let text = "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG 42!";
        for k in 0..=25u8 {
            assert_eq!(shift(&shift(text, k), 26 - k), text, "k = {}", k);
        }
    }

    #[test]
    fn test_shift_wraps_large_keys() {
        assert_eq!(shift("A", 27), "B");
    }

    #[test]
    fn test_bit_string() {
        assert_eq!(to_bit_string("AB"), "01000001 01000010");
        assert_eq!(to_bit_string(""), "");
    }

    #[test]
    fn test_bit_string_widens_for_large_code_points() {
        assert_eq!(to_bit_string("é"), "11101001");
        assert_eq!(to_bit_string("€"), "10000010101100");
    }

    #[test]
    fn test_parse_xor_key_falls_back() {
        assert_eq!(parse_xor_key("7"), 7);
        assert_eq!(parse_xor_key(" 255 "), 255);
        assert_eq!(parse_xor_key("banana"), DEFAULT_XOR_KEY);
        assert_eq!(parse_xor_key("256"), DEFAULT_XOR_KEY);
        assert_eq!(parse_xor_key(""), DEFAULT_XOR_KEY);
    }

    #[test]
    fn test_xor_encode_renders_two_digit_hex() {
        // 'A' = 0x41, 0x41 ^ 0x01 = 0x40
        assert_eq!(xor_encode("A", "1"), "40");
        // key 65 zeroes 'A'
        assert_eq!(xor_encode("AB", "65"), "00 03");
    }

    #[test]
    fn test_xor_round_trip() {
        for key in ["0", "42", "255", "not-a-number"] {
            let text = "Hello, World! ÆØÅ ☃";
            assert_eq!(xor_decode(&xor_encode(text, key), key), text);
        }
    }

    #[test]
    fn test_xor_decode_marks_bad_tokens() {
        assert_eq!(xor_decode("40 zz", "1"), "A?");
    }

    #[test]
    fn test_prepare_none() {
        let prepared = prepare("sos", TransformMode::None, &TransformParams::default());
        assert_eq!(prepared.display_text, "sos");
        assert_eq!(prepared.morse_text, "sos");
    }

    #[test]
    fn test_prepare_shift_encodes_shifted_text() {
        let params = TransformParams {
            shift: 1,
            xor_key: "42".to_string(),
        };
        let prepared = prepare("sos", TransformMode::Shift, &params);
        assert_eq!(prepared.display_text, "TPT");
        assert_eq!(prepared.morse_text, "TPT");
    }

    #[test]
    fn test_prepare_binary_and_xor_key_the_original_text() {
        let params = TransformParams::default();

        let binary = prepare("SOS", TransformMode::Binary, &params);
        assert_eq!(binary.morse_text, "SOS");
        assert_eq!(binary.display_text, "01010011 01001111 01010011");

        let xor = prepare("SOS", TransformMode::Xor, &params);
        assert_eq!(xor.morse_text, "SOS");
        assert_eq!(xor.display_text, xor_encode("SOS", "42"));
    }
}
