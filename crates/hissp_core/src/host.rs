//! The Host bridge contract: the narrow interface the core
//! needs from a running Python interpreter.
//!
//! The core never invokes anything on the host beyond these four
//! operations. `hissp_host` provides one concrete implementation; tests in
//! this crate can supply a stub or mock implementing the same trait.

use hissp_foundation::Result;

use crate::value::{Namespace, Value};

/// The minimal contract a Python-evaluation backend must provide.
pub trait HostBridge {
    /// Evaluates `source` (a fragment of the compiler's Python-subset
    /// output) in `env`, returning the resulting value. Used by the `.#`
    /// inject tag and by macro invocation.
    ///
    /// # Errors
    /// Returns an error if the source is malformed or raises while running.
    fn eval(&self, source: &str, env: &Namespace) -> Result<Value>;

    /// Imports a dotted module path, returning its namespace. Used to
    /// resolve qualified fragments and cross-module macro lookups.
    ///
    /// # Errors
    /// Returns an error if no such module is known to this bridge.
    fn import_module(&self, dotted: &str) -> Result<Namespace>;

    /// Produces a fresh namespace for `module_name`, with a `_macro_`
    /// sub-namespace pre-populated from that module's macros if any are
    /// already registered, plus any bridge-injected globals (`builtins`
    /// names and the like).
    fn make_env(&self, module_name: &str) -> Namespace;

    /// Renders a value's `repr()`, for opaque-serialization comments.
    fn repr(&self, value: &Value) -> String;
}
