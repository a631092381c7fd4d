//! Interactive prompt seam.
//!
//! Flows suspend at every prompt; a `None` answer means the user cancelled,
//! which short-circuits the enclosing flow with no remote mutation. The
//! terminal implementation lives here; tests use [`ScriptedPrompter`].

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Source of interactive answers.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Pick one option; `None` means cancelled.
    async fn pick_one(&self, prompt: &str, options: &[String]) -> io::Result<Option<String>>;

    /// Pick any number of options; `None` means cancelled.
    async fn pick_many(&self, prompt: &str, options: &[String])
        -> io::Result<Option<Vec<String>>>;

    /// Free-text input with an optional default; `None` means cancelled.
    async fn input(&self, prompt: &str, default: Option<&str>) -> io::Result<Option<String>>;

    /// Free-text input with no echo, for password confirmation.
    async fn input_masked(&self, prompt: &str) -> io::Result<Option<String>>;
}

// =============================================================================
// Terminal Prompter
// =============================================================================

/// A `Prompter` reading from the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }

    /// Read one line from stdin; `None` on EOF.
    async fn read_line() -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_options(prompt: &str, options: &[String]) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", prompt)?;
        for (index, option) in options.iter().enumerate() {
            writeln!(stdout, "  {}. {}", index + 1, option)?;
        }
        stdout.flush()
    }

    /// Parse a 1-based selection index.
    fn parse_index(input: &str, len: usize) -> Option<usize> {
        let index: usize = input.trim().parse().ok()?;
        if index >= 1 && index <= len {
            Some(index - 1)
        } else {
            None
        }
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn pick_one(&self, prompt: &str, options: &[String]) -> io::Result<Option<String>> {
        if options.is_empty() {
            return Ok(None);
        }
        Self::print_options(prompt, options)?;
        print!("Choice (empty cancels): ");
        io::stdout().flush()?;

        let answer = match Self::read_line().await? {
            Some(line) if !line.is_empty() => line,
            _ => return Ok(None),
        };

        Ok(Self::parse_index(&answer, options.len()).map(|index| options[index].clone()))
    }

    async fn pick_many(
        &self,
        prompt: &str,
        options: &[String],
    ) -> io::Result<Option<Vec<String>>> {
        if options.is_empty() {
            return Ok(None);
        }
        Self::print_options(prompt, options)?;
        print!("Choices, comma-separated (empty cancels): ");
        io::stdout().flush()?;

        let answer = match Self::read_line().await? {
            Some(line) if !line.is_empty() => line,
            _ => return Ok(None),
        };

        let mut chosen = Vec::new();
        for part in answer.split(',') {
            match Self::parse_index(part, options.len()) {
                Some(index) => {
                    let option = options[index].clone();
                    if !chosen.contains(&option) {
                        chosen.push(option);
                    }
                }
                None => return Ok(None),
            }
        }
        Ok(Some(chosen))
    }

    async fn input(&self, prompt: &str, default: Option<&str>) -> io::Result<Option<String>> {
        match default {
            Some(value) => print!("{} [{}]: ", prompt, value),
            None => print!("{}: ", prompt),
        }
        io::stdout().flush()?;

        let line = match Self::read_line().await? {
            Some(line) => line,
            None => return Ok(None),
        };

        if line.is_empty() {
            // Empty input takes the default; with no default it cancels.
            return Ok(default.map(str::to_string));
        }
        Ok(Some(line))
    }

    async fn input_masked(&self, prompt: &str) -> io::Result<Option<String>> {
        print!("{}: ", prompt);
        io::stdout().flush()?;

        let entered = tokio::task::spawn_blocking(read_masked_line)
            .await
            .map_err(io::Error::other)??;

        println!();
        Ok(entered)
    }
}

/// Read a line in raw mode without echoing, so the entry stays off screen.
fn read_masked_line() -> io::Result<Option<String>> {
    enable_raw_mode()?;
    let result = read_masked_keys();
    disable_raw_mode()?;
    result
}

fn read_masked_keys() -> io::Result<Option<String>> {
    let mut entered = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(Some(entered)),
                KeyCode::Esc => return Ok(None),
                KeyCode::Backspace => {
                    entered.pop();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(None);
                }
                KeyCode::Char(c) => entered.push(c),
                _ => {}
            }
        }
    }
}

// =============================================================================
// Scripted Prompter
// =============================================================================

/// One queued answer for a `ScriptedPrompter`.
#[derive(Debug, Clone)]
pub enum Answer {
    /// Answer a pick_one/input/input_masked prompt with this value.
    One(String),
    /// Answer a pick_many prompt with these values.
    Many(Vec<String>),
    /// Accept the prompt's default value (input prompts only).
    Default,
    /// Cancel the prompt.
    Cancel,
}

impl Answer {
    pub fn one(value: impl Into<String>) -> Self {
        Answer::One(value.into())
    }

    pub fn many<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Many(values.into_iter().map(Into::into).collect())
    }
}

/// A `Prompter` answering from a fixed script, intended primarily for testing.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }

    fn next(&self) -> Option<Answer> {
        self.answers.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn pick_one(&self, _prompt: &str, _options: &[String]) -> io::Result<Option<String>> {
        Ok(match self.next() {
            Some(Answer::One(value)) => Some(value),
            _ => None,
        })
    }

    async fn pick_many(
        &self,
        _prompt: &str,
        _options: &[String],
    ) -> io::Result<Option<Vec<String>>> {
        Ok(match self.next() {
            Some(Answer::Many(values)) => Some(values),
            Some(Answer::One(value)) => Some(vec![value]),
            _ => None,
        })
    }

    async fn input(&self, _prompt: &str, default: Option<&str>) -> io::Result<Option<String>> {
        Ok(match self.next() {
            Some(Answer::One(value)) => Some(value),
            Some(Answer::Default) => default.map(str::to_string),
            _ => None,
        })
    }

    async fn input_masked(&self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(match self.next() {
            Some(Answer::One(value)) => Some(value),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_bounds() {
        assert_eq!(TerminalPrompter::parse_index("1", 3), Some(0));
        assert_eq!(TerminalPrompter::parse_index(" 3 ", 3), Some(2));
        assert_eq!(TerminalPrompter::parse_index("0", 3), None);
        assert_eq!(TerminalPrompter::parse_index("4", 3), None);
        assert_eq!(TerminalPrompter::parse_index("x", 3), None);
    }

    #[tokio::test]
    async fn test_scripted_prompter_consumes_in_order() {
        let prompter = ScriptedPrompter::new([
            Answer::one("first"),
            Answer::Default,
            Answer::Cancel,
        ]);

        assert_eq!(
            prompter.pick_one("p", &[]).await.unwrap(),
            Some("first".to_string())
        );
        assert_eq!(
            prompter.input("p", Some("dflt")).await.unwrap(),
            Some("dflt".to_string())
        );
        assert_eq!(prompter.input("p", None).await.unwrap(), None);
        // Script exhausted: everything cancels.
        assert_eq!(prompter.input_masked("p").await.unwrap(), None);
    }
}
