//! Line editor abstraction for the REPL.
//!
//! A swappable [`LineEditor`] trait over a concrete `rustyline` backend.
//! No keyword completion or syntax highlighting, just balanced-bracket
//! multi-line continuation so a form spanning several lines is accepted
//! as one submission.

use hissp_foundation::{Error, ErrorKind, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Config, Context, Editor, Helper, Validator as RLValidator};

/// Result of reading one submission from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line (possibly spanning several physical lines) was read.
    Line(String),
    /// The user pressed Ctrl+C.
    Interrupted,
    /// The user pressed Ctrl+D (end of input).
    Eof,
}

/// Abstraction over line editing, so the REPL loop does not depend on
/// `rustyline` directly.
pub trait LineEditor {
    /// Reads one submission with the given prompt, blocking until a
    /// complete, balanced form (or an interrupt/EOF) is produced.
    ///
    /// # Errors
    /// Returns an error if the underlying terminal interaction fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Adds a line to the editor's history.
    fn add_history(&mut self, line: &str);
}

#[derive(Helper, RLValidator)]
struct HisspHelper {
    #[rustyline(Validator)]
    validator: BracketValidator,
}

/// Accepts input only once every paren/bracket/brace is balanced, so a
/// form split across several lines reads as one submission.
#[derive(Default)]
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape_next = false;

        for c in ctx.input().chars() {
            if escape_next {
                escape_next = false;
                continue;
            }
            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '(' | '[' | '{' if !in_string => depth += 1,
                ')' | ']' | '}' if !in_string => depth -= 1,
                _ => {}
            }
        }

        Ok(if depth > 0 {
            ValidationResult::Incomplete
        } else {
            ValidationResult::Valid(None)
        })
    }
}

/// A [`LineEditor`] backed by `rustyline`.
pub struct RustylineEditor {
    editor: Editor<HisspHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new editor with history and bracket-aware multi-line
    /// input enabled.
    ///
    /// # Errors
    /// Returns an error if `rustyline` fails to initialize the terminal.
    pub fn new() -> Result<Self> {
        let config = Config::builder().auto_add_history(false).build();
        let mut editor = Editor::with_config(config)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
        editor.set_helper(Some(HisspHelper {
            validator: BracketValidator,
        }));
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::Internal(e.to_string()))),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}
