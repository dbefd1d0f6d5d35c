//! Terminal implementation of the correction prompt.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use pdfsect::CorrectionPrompt;

/// Asks the user on the terminal whether to correct and which word to use.
///
/// An empty answer accepts the suggestion. End of input declines.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    suggestion: Option<String>,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Read answers from stdin; questions go to stderr so stdout stays clean.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            suggestion: None,
        }
    }

    /// Suggest `word` instead of the loop's default reference word.
    pub fn with_suggestion(mut self, word: impl Into<String>) -> Self {
        self.suggestion = Some(word.into());
        self
    }

    /// Print `question` and read one trimmed line. `None` on end of input.
    fn ask(&mut self, question: &str) -> Option<String> {
        write!(self.output, "{}", question).ok()?;
        self.output.flush().ok()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl<R: BufRead, W: Write> CorrectionPrompt for TerminalPrompt<R, W> {
    fn should_continue(&mut self, failed: &[&str]) -> bool {
        let question = format!(
            "{} file(s) without sections. Do you want to correct them? [Y/n] ",
            failed.len()
        );
        match self.ask(&question) {
            Some(answer) => is_yes(&answer),
            None => false,
        }
    }

    fn reference_word(&mut self, default: &str) -> String {
        let default = self.suggestion.clone().unwrap_or_else(|| default.to_string());
        let question = format!("Specify a reference word: [{}] ", default.bold());
        match self.ask(&question) {
            Some(word) if !word.is_empty() => word,
            _ => default,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "" | "y" | "yes")
}
