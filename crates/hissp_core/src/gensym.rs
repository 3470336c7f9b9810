//! Per-template gensym counter.
//!
//! Spec invariant: the counter is scoped to one reader invocation and is
//! monotonically non-decreasing; every `$#name` inside a given template
//! receives the same numeric suffix, and a later template never reuses it.
//!
//! # Example
//!
//! ```
//! use hissp_core::gensym::GensymGenerator;
//!
//! let mut gen = GensymGenerator::new();
//! let id = gen.next_template_id();
//! let a = GensymGenerator::rename("x", id);
//! let b = GensymGenerator::rename("x", id);
//! assert_eq!(a, b); // same template, same base: identical renaming
//!
//! let next_id = gen.next_template_id();
//! let c = GensymGenerator::rename("x", next_id);
//! assert_ne!(a, c); // a later template renames differently
//! ```

/// Hands out monotonically increasing template ids for one reader invocation.
#[derive(Clone, Debug, Default)]
pub struct GensymGenerator {
    next_id: u64,
}

impl GensymGenerator {
    /// Creates a fresh generator with its counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Bumps the counter and returns the id for the template about to be read.
    pub fn next_template_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Renames `base` for template `template_id`, producing `<base>_QzNo<N>_`.
    ///
    /// Calling this twice with the same `base` and `template_id` always
    /// produces the same name; this is what lets `$#x` used twice in one
    /// template refer to the same generated identifier.
    #[must_use]
    pub fn rename(base: &str, template_id: u64) -> String {
        format!("{base}_QzNo{template_id}_")
    }
}
