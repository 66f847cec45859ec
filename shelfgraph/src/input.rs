//! Line-oriented interactive input
//!
//! Prompts are pulled through [`LineSource`] so the interactive loops can be
//! driven by a script in tests.

use shelfgraph_common::Result;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of user-entered lines
pub trait LineSource {
    /// Show `prompt` and read one line, without its line terminator
    ///
    /// `Ok(None)` means end of input.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads lines from the process's standard input
#[derive(Default)]
pub struct StdinLines;

impl LineSource for StdinLines {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Replays a fixed list of lines, recording the prompts it was shown
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Lines not yet consumed
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedLines {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_lines_replay_then_eof() {
        let mut lines = ScriptedLines::new(["10", ""]);
        assert_eq!(lines.next_line("a").unwrap().as_deref(), Some("10"));
        assert_eq!(lines.next_line("b").unwrap().as_deref(), Some(""));
        assert_eq!(lines.next_line("c").unwrap(), None);
        assert_eq!(lines.prompts(), &["a", "b", "c"]);
        assert_eq!(lines.remaining(), 0);
    }
}
