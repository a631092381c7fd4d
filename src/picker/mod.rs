//! Selection mapping between remote records and picker entries.

pub mod labels;
mod prompt;

pub use prompt::{Answer, Prompter, ScriptedPrompter, TerminalPrompter};
