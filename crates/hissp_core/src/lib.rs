//! Tokenizer, reader, macroexpander, template engine, and Python code
//! generator for Hissp — a Lisp that compiles to a functional subset of
//! Python.
//!
//! This crate provides:
//! - [`munge`] / [`demunge`] — the bidirectional identifier mangler
//! - [`Tokenizer`] — lexical scanning of Lissp source
//! - [`Reader`] — parsing a token stream into Hissp IR, with tag dispatch
//! - [`ir`] — the [`Node`] intermediate representation
//! - [`MacroExpander`] — macro resolution and outside-in expansion
//! - [`template`] — quasiquote template processing
//! - [`compiler`] — translating expanded IR into Python source text
//! - [`HostBridge`] — the narrow contract a Python-evaluation backend must
//!   provide
//!
//! [`compile_source`] wires these stages together into the crate's one
//! top-level entry point: Lissp text in, Python source text out.
//!
//! # Example
//!
//! ```
//! use hissp_core::host::HostBridge;
//! use hissp_core::value::{Namespace, Value};
//! use hissp_core::{compile_source, ReaderConfig};
//!
//! struct NullHost;
//! impl HostBridge for NullHost {
//!     fn eval(&self, _source: &str, _env: &Namespace) -> hissp_foundation::Result<Value> {
//!         Ok(Value::None)
//!     }
//!     fn import_module(&self, dotted: &str) -> hissp_foundation::Result<Namespace> {
//!         Ok(Namespace::new(dotted))
//!     }
//!     fn make_env(&self, module_name: &str) -> Namespace {
//!         Namespace::new(module_name)
//!     }
//!     fn repr(&self, _value: &Value) -> String {
//!         String::new()
//!     }
//! }
//!
//! let host = NullHost;
//! let ns = host.make_env("user");
//! let source = compile_source("(add 1 2)", ReaderConfig::for_module("user"), &host, &ns).unwrap();
//! assert!(source.contains("add"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]
#![allow(clippy::missing_errors_doc)]

pub mod compiler;
pub mod gensym;
pub mod host;
pub mod ir;
pub mod macro_def;
pub mod macro_expander;
pub mod macro_registry;
pub mod munge;
pub mod pretty;
pub mod reader;
pub mod span;
pub mod template;
pub mod token;
pub mod tokenizer;
pub mod value;

use hissp_foundation::Result;

pub use compiler::{compile_node, compile_program};
pub use gensym::GensymGenerator;
pub use host::HostBridge;
pub use ir::{Foreign, Literal, Node};
pub use macro_expander::MacroExpander;
pub use macro_registry::{resolve_head, HeadResolution};
pub use munge::{demunge, munge};
pub use reader::{Reader, ReaderConfig};
pub use span::Span;
pub use template::TemplateForm;
pub use token::{Token, TokenKind};
pub use tokenizer::Tokenizer;
pub use value::{MacroFn, Namespace, Value};

/// Reads, macroexpands, and compiles a whole program of Lissp source text
/// in one call: the crate's one-stop entry point, used by `hissp_cli` and
/// the workspace integration tests.
///
/// Each top-level form is read and, if its original (pre-expansion) head
/// resolved to a macro, annotated in the output with that macro's qualified
/// name ("Output formatting").
///
/// # Errors
/// Returns an error from whichever stage — read, macro resolution,
/// expansion, or compile — first fails.
pub fn compile_source(
    source: &str,
    config: ReaderConfig,
    host: &dyn HostBridge,
    ns: &Namespace,
) -> Result<String> {
    let module = config.module.clone();
    let mut reader = Reader::new(source, config);
    let forms = reader.read_all(host, ns)?;

    let mut annotations = Vec::with_capacity(forms.len());
    for form in &forms {
        let head_macro = form
            .as_tuple()
            .and_then(|children| children.front())
            .and_then(Node::as_fragment)
            .map(|head| resolve_head(head, &module, ns, host))
            .transpose()?
            .and_then(|resolution| match resolution {
                HeadResolution::Macro { qualified_name, .. } => Some(qualified_name),
                _ => None,
            });
        annotations.push(head_macro);
    }

    let mut expander = MacroExpander::new(host, ns, module.clone());
    let expanded = expander.expand_all(&forms)?;
    compile_program(&expanded, &annotations, &module)
}
