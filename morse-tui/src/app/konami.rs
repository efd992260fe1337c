//! ↑ ↑ ↓ ↓ ← → ← → B A

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub const SEQUENCE: [KeyCode; 10] = [
    KeyCode::Up,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Char('b'),
    KeyCode::Char('a'),
];

fn normalize(key: &KeyEvent) -> Option<KeyCode> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(KeyCode::Char(c.to_ascii_lowercase())),
        code => Some(code),
    }
}

/// Feed one key; returns the new progress and whether the sequence completed
///
/// A wrong key resets progress, unless it is the first key of the sequence,
/// which counts as step one.
pub fn advance(progress: usize, key: &KeyEvent) -> (usize, bool) {
    let Some(code) = normalize(key) else {
        return (0, false);
    };

    if SEQUENCE.get(progress) == Some(&code) {
        let next = progress + 1;
        if next == SEQUENCE.len() {
            return (0, true);
        }
        return (next, false);
    }

    if code == SEQUENCE[0] {
        (1, false)
    } else {
        (0, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_full_sequence_completes() {
        let mut progress = 0;
        for (i, code) in SEQUENCE.iter().enumerate() {
            let (next, done) = advance(progress, &press(*code));
            assert_eq!(done, i == SEQUENCE.len() - 1);
            progress = next;
        }
        assert_eq!(progress, 0);
    }

    #[test]
    fn test_wrong_key_resets() {
        assert_eq!(advance(4, &press(KeyCode::Char('x'))), (0, false));
    }

    #[test]
    fn test_wrong_first_key_counts_as_step_one() {
        assert_eq!(advance(3, &press(KeyCode::Up)), (1, false));
    }

    #[test]
    fn test_uppercase_letters_accepted() {
        let (progress, done) = advance(8, &KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT));
        assert_eq!((progress, done), (9, false));
        assert_eq!(advance(9, &press(KeyCode::Char('A'))), (0, true));
    }

    #[test]
    fn test_chorded_keys_reset() {
        let ctrl_b = KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL);
        assert_eq!(advance(8, &ctrl_b), (0, false));
    }
}
