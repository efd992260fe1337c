//! Morse symbol table
//!
//! Static bijective mapping between characters and pulse strings. Encoding
//! drops characters the table does not know; decoding renders unknown pulse
//! strings as [`UNKNOWN`].

use crate::types::{MorseChar, MorseSequence};

/// Placeholder rendered for pulse strings with no table entry
pub const UNKNOWN: char = '?';

/// Pulse string of the word separator (encodes a space)
pub const WORD_SEPARATOR: &str = "/";

const TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('\'', ".----."),
    ('!', "-.-.--"),
    ('/', "-..-."),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('&', ".-..."),
    (':', "---..."),
    (';', "-.-.-."),
    ('=', "-...-"),
    ('+', ".-.-."),
    ('-', "-....-"),
    ('_', "..--.-"),
    ('"', ".-..-."),
    ('$', "...-..-"),
    ('@', ".--.-."),
    (' ', WORD_SEPARATOR),
];

/// Look up the pulse string for a character (case-insensitive)
pub fn encode(c: char) -> Option<&'static str> {
    let upper = c.to_ascii_uppercase();
    TABLE
        .iter()
        .find(|(symbol, _)| *symbol == upper)
        .map(|(_, pattern)| *pattern)
}

/// Look up the character for a pulse string
pub fn decode(pattern: &str) -> Option<char> {
    TABLE
        .iter()
        .find(|(_, p)| *p == pattern)
        .map(|(symbol, _)| *symbol)
}

/// Decode one token, rendering unknown pulse strings as [`UNKNOWN`]
pub fn decode_token(token: &str) -> char {
    decode(token).unwrap_or(UNKNOWN)
}

/// Characters the table can encode
pub fn supported_chars() -> impl Iterator<Item = char> {
    TABLE.iter().map(|(symbol, _)| *symbol)
}

/// Translate text into a sequence, uppercasing first and dropping unsupported characters
pub fn encode_message(text: &str) -> MorseSequence {
    let chars = text
        .to_uppercase()
        .chars()
        .filter_map(|c| {
            encode(c).map(|pattern| MorseChar {
                character: c,
                pattern: pattern.to_string(),
            })
        })
        .collect();
    MorseSequence::new(chars)
}

/// Space-joined pulse strings for text
pub fn to_pulse_string(text: &str) -> String {
    encode_message(text).patterns().join(" ")
}

/// Decode whitespace-delimited pulse strings back to text
pub fn decode_message(input: &str) -> String {
    input.split_whitespace().map(decode_token).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_inverts_encode_for_every_supported_char() {
        for c in supported_chars() {
            let pattern = encode(c).unwrap();
            assert_eq!(decode(pattern), Some(c), "round trip failed for {:?}", c);
        }
    }

    #[test]
    fn test_lowercase_encodes_like_uppercase() {
        for c in 'a'..='z' {
            let pattern = encode(c).unwrap();
            assert_eq!(decode(pattern), Some(c.to_ascii_uppercase()));
        }
    }

    #[test]
    fn test_table_has_no_duplicate_patterns() {
        let mut patterns: Vec<&str> = TABLE.iter().map(|(_, p)| *p).collect();
        patterns.sort_unstable();
        let before = patterns.len();
        patterns.dedup();
        assert_eq!(before, patterns.len());
    }

    #[test]
    fn test_unsupported_chars_are_dropped() {
        let sequence = encode_message("S#O%S");
        assert_eq!(sequence.patterns(), vec!["...", "---", "..."]);
        assert_eq!(encode('#'), None);
        assert_eq!(encode('é'), None);
    }

    #[test]
    fn test_sos_pulse_string() {
        assert_eq!(to_pulse_string("sos"), "... --- ...");
    }

    #[test]
    fn test_space_maps_to_word_separator() {
        assert_eq!(to_pulse_string("HI YOU"), ".... .. / -.-- --- ..-");
        assert_eq!(decode_message(".... .. / -.-- --- ..-"), "HI YOU");
    }

    #[test]
    fn test_unknown_token_decodes_to_placeholder() {
        assert_eq!(decode("........"), None);
        assert_eq!(decode_token("........"), UNKNOWN);
        assert_eq!(decode_message("... ........ ..."), "S?S");
    }

    #[test]
    fn test_decode_message_tolerates_extra_whitespace() {
        assert_eq!(decode_message("  .-   -...\n-.-.  "), "ABC");
        assert_eq!(decode_message(""), "");
    }

    #[test]
    fn test_slash_char_differs_from_word_separator() {
        assert_eq!(encode('/'), Some("-..-."));
        assert_eq!(decode(WORD_SEPARATOR), Some(' '));
    }
}
