//! Hissp — a Lisp that compiles to a functional subset of Python.
//!
//! This crate re-exports the workspace's layers for convenient access from
//! the root integration tests. For detailed documentation, see the
//! individual crates.
//!
//! # Architecture
//!
//! ```text
//! hissp_cli          — batch compiler and REPL client (non-core)
//! hissp_host         — reference HostBridge: tree-walking evaluator
//! hissp_core         — tokenizer, reader, macroexpander, compiler
//! hissp_foundation   — error taxonomy and source-span tracking
//! ```

pub use hissp_cli as cli;
pub use hissp_core as core;
pub use hissp_foundation as foundation;
pub use hissp_host as host;
