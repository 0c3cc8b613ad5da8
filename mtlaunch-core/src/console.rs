use std::collections::VecDeque;

/// Lines kept from the engine's stdout/stderr.
pub const CONSOLE_MAX_LINES: usize = 1000;

/// Bounded buffer of engine output; the oldest line is evicted first.
pub struct ConsoleLog {
    lines: VecDeque<String>,
    max_lines: usize,
    dirty: bool,
}

impl ConsoleLog {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines,
            dirty: false,
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        if self.lines.len() >= self.max_lines {
            self.lines.pop_front();
        }
        self.lines.push_back(text.into());
        self.dirty = true;
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    /// The whole buffer as newline-terminated text, if anything changed since
    /// the last call.
    pub fn take_update(&mut self) -> Option<String> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.lines().map(|l| format!("{l}\n")).collect())
    }
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new(CONSOLE_MAX_LINES)
    }
}
