use thiserror::Error;

/// Lines on the character panel, addressed 1..=LINES.
pub const LINES: usize = 4;
/// Character cells per line.
pub const WIDTH: usize = 20;

/// Selection marker and its same-width blank counterpart, so row text
/// never shifts when the cursor moves.
pub const MARKER: &str = "-> ";
pub const BLANK_MARKER: &str = "   ";

#[derive(Error, Debug, Clone)]
pub enum DisplayError {
    #[error("display write failed: {0}")]
    Write(String),
}

/// Four-line character panel. Callers hand over pre-truncated text; the
/// device itself does no wrapping or clipping.
pub trait PanelDisplay: Send {
    fn write_line(&mut self, line: usize, text: &str) -> Result<(), DisplayError>;
    fn clear(&mut self) -> Result<(), DisplayError>;
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    pub struct PanelState {
        pub lines: [String; LINES],
        /// Every write_line call in order, for minimal-diff assertions.
        pub writes: Vec<(usize, String)>,
        pub clears: usize,
        /// Fail this many upcoming write_line calls.
        pub fail_next_writes: usize,
    }

    /// Recording panel; clones share state so tests keep a handle after
    /// giving one to the code under test.
    #[derive(Clone, Default)]
    pub struct TestPanel(pub Arc<Mutex<PanelState>>);

    impl TestPanel {
        pub fn line(&self, line: usize) -> String {
            self.0.lock().unwrap().lines[line - 1].clone()
        }

        pub fn write_count(&self) -> usize {
            self.0.lock().unwrap().writes.len()
        }
    }

    impl PanelDisplay for TestPanel {
        fn write_line(&mut self, line: usize, text: &str) -> Result<(), DisplayError> {
            let mut state = self.0.lock().unwrap();
            if state.fail_next_writes > 0 {
                state.fail_next_writes -= 1;
                return Err(DisplayError::Write("simulated".to_string()));
            }
            assert!((1..=LINES).contains(&line), "line {line} out of range");
            state.lines[line - 1] = text.to_string();
            state.writes.push((line, text.to_string()));
            Ok(())
        }

        fn clear(&mut self) -> Result<(), DisplayError> {
            let mut state = self.0.lock().unwrap();
            state.lines = Default::default();
            state.clears += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_is_char_aware() {
        assert_eq!(truncate("abcdef", 4), "abcd");
        assert_eq!(truncate("ab", 4), "ab");
        assert_eq!(truncate("ééééé", 3), "ééé");
    }
}
