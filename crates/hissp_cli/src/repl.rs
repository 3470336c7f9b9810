//! The interactive read-eval-print loop: read one top-level form, expand
//! its macros, compile it to host source, evaluate that source through
//! the reference [`TreeWalkingHost`], and print the result, via Hissp's
//! Reader → `MacroExpander` → compiler → `HostBridge` pipeline.

use std::io::Write;

use hissp_core::compile_node;
use hissp_core::host::HostBridge;
use hissp_core::macro_expander::MacroExpander;
use hissp_core::reader::{Reader, ReaderConfig};
use hissp_core::value::{Namespace, Value};
use hissp_foundation::Result;
use hissp_host::TreeWalkingHost;

use crate::editor::{LineEditor, ReadResult};

/// Runs an interactive session over `editor` until end of input.
pub struct Repl<E: LineEditor> {
    editor: E,
    host: TreeWalkingHost,
    module: String,
    env: Namespace,
}

impl<E: LineEditor> Repl<E> {
    /// Creates a REPL over `module`, with a fresh [`TreeWalkingHost`]
    /// backing evaluation.
    #[must_use]
    pub fn new(editor: E, module: impl Into<String>) -> Self {
        let module = module.into();
        let host = TreeWalkingHost::new();
        let env = host.make_env(&module);
        Self { editor, host, module, env }
    }

    /// Runs the read-eval-print loop until Ctrl+D or input exhaustion.
    ///
    /// # Errors
    /// Returns an error only if the underlying line editor itself fails;
    /// errors raised by evaluating user input are caught and printed, not
    /// propagated.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.editor.read_line(&format!("{}=> ", self.module))? {
                ReadResult::Eof => {
                    println!();
                    return Ok(());
                }
                ReadResult::Interrupted => {
                    println!("KeyboardInterrupt");
                    continue;
                }
                ReadResult::Line(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.editor.add_history(&line);
                    self.eval_print(&line);
                }
            }
        }
    }

    fn eval_print(&mut self, source: &str) {
        let config = ReaderConfig::for_module(self.module.clone());
        let mut reader = Reader::new(source, config);
        loop {
            match reader.read_one(&self.host, &self.env) {
                Ok(None) => break,
                Ok(Some(form)) => {
                    if let Err(e) = self.compile_and_run(&form) {
                        print_error(&e);
                    }
                }
                Err(e) => {
                    print_error(&e);
                    break;
                }
            }
        }
    }

    fn compile_and_run(&mut self, form: &hissp_core::ir::Node) -> Result<()> {
        let mut expander = MacroExpander::new(&self.host, &self.env, self.module.clone());
        let expanded = expander.expand(form)?;
        let source = compile_node(&expanded, &self.module)?;
        let value = self.host.eval(&source, &self.env)?;
        if !matches!(value, Value::None) {
            println!("{}", self.host.repr(&value));
        }
        Ok(())
    }
}

fn print_error(err: &hissp_foundation::Error) {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "\x1b[1;31merror:\x1b[0m {err}");
}
