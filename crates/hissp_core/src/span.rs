//! Source-span type, shared with every other Hissp crate.
//!
//! Re-exported here rather than duplicated so that `hissp_core`'s modules
//! can write `crate::span::Span` uniformly, instead of reaching into
//! `hissp_foundation` directly from every call site.

pub use hissp_foundation::Span;
