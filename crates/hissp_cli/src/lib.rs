//! Batch compiler and REPL client for Hissp.
//!
//! Wires the reference [`hissp_host::TreeWalkingHost`] to a line editor and
//! to `hissp_core::compile_source`, in the two modes the `hissp` binary
//! exposes: compiling `.lissp` files to host source text, and an
//! interactive read-eval-print loop.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod editor;
pub mod repl;

pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::Repl;
