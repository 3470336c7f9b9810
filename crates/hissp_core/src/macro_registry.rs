//! Macro head-lookup rules.
//!
//! Given the head [`Fragment`](Node::Fragment) of a non-empty tuple, decide
//! whether it names a macro, and if so resolve the callable. Implements the
//! ordered lookup rules, including the `QzMaybe_` deferred resolution the
//! template engine emits for fragments it could not classify at read time.

use hissp_foundation::Result;

use crate::host::HostBridge;
use crate::value::{MacroFn, Namespace};

/// The mnemonic a template inserts between a module path and a name it could
/// not statically classify as macro-or-not.
pub const MAYBE_MARKER: &str = "QzMaybe_";

/// What a head fragment resolved to.
pub enum HeadResolution {
    /// The head names a macro; expand by calling it.
    Macro {
        /// The resolved macro callable.
        macro_fn: MacroFn,
        /// A qualified name for this invocation, used in diagnostics.
        qualified_name: String,
    },
    /// A deferred `module..QzMaybe_.name` form that did not resolve to a
    /// macro; rewrite the call head to this plain qualified name and
    /// compile the form as an ordinary invocation.
    RewriteTo(String),
    /// Not a macro; compile as an ordinary invocation.
    NotMacro,
}

/// Resolves a head fragment's text against the macro-lookup rules.
///
/// `current_module` and `current_namespace` describe the form currently
/// being expanded; `host` is used to import other modules for qualified
/// lookups.
///
/// # Errors
/// Returns an error if a qualified lookup requires importing a module the
/// host bridge cannot resolve.
pub fn resolve_head(
    fragment_text: &str,
    current_module: &str,
    current_namespace: &Namespace,
    host: &dyn HostBridge,
) -> Result<HeadResolution> {
    // A deferred `module..QzMaybe_.name` form must be checked before the
    // generic qualified case below, since an unresolved maybe rewrites to a
    // plain call rather than falling through as NotMacro.
    if let Some((module_path, name)) = split_maybe_qualified(fragment_text) {
        return Ok(match lookup_qualified_macro(&module_path, &name, host)? {
            Some(macro_fn) => HeadResolution::Macro {
                macro_fn,
                qualified_name: format!("{module_path}..{name}"),
            },
            None => HeadResolution::RewriteTo(format!("{module_path}..{name}")),
        });
    }

    // Fully qualified `module..attr` (no further dots): a macro only if the
    // module's `_macro_` namespace defines it.
    if let Some((module_path, name)) = split_qualified(fragment_text) {
        return Ok(match lookup_qualified_macro(&module_path, &name, host)? {
            Some(macro_fn) => HeadResolution::Macro {
                macro_fn,
                qualified_name: format!("{module_path}..{name}"),
            },
            None => HeadResolution::NotMacro,
        });
    }

    // `_macro_.name`, relative to the current compilation namespace.
    if let Some(name) = fragment_text.strip_prefix("_macro_.") {
        if let Some(macro_fn) = current_namespace.lookup_macro(name) {
            return Ok(HeadResolution::Macro {
                macro_fn,
                qualified_name: format!("{current_module}.._macro_.{name}"),
            });
        }
        return Ok(HeadResolution::NotMacro);
    }

    // Unqualified name, looked up under the current namespace's `_macro_`.
    if let Some(macro_fn) = current_namespace.lookup_macro(fragment_text) {
        return Ok(HeadResolution::Macro {
            macro_fn,
            qualified_name: format!("{current_module}..{fragment_text}"),
        });
    }

    Ok(HeadResolution::NotMacro)
}

fn lookup_qualified_macro(
    module_path: &str,
    name: &str,
    host: &dyn HostBridge,
) -> Result<Option<MacroFn>> {
    let module_ns = host.import_module(module_path)?;
    Ok(module_ns.lookup_macro(name))
}

/// Splits `module..QzMaybe_.name` into `(module, name)`, or `None` if the
/// text is not in that exact shape.
fn split_maybe_qualified(text: &str) -> Option<(String, String)> {
    let (module_path, rest) = text.split_once("..")?;
    let name = rest.strip_prefix(&format!("{MAYBE_MARKER}."))?;
    if module_path.is_empty() || name.is_empty() || name.contains('.') {
        return None;
    }
    Some((module_path.to_string(), name.to_string()))
}

/// Splits `module..name` into `(module, name)` when `name` is a single,
/// unqualified attribute (no further dots, and not a `QzMaybe_` head).
fn split_qualified(text: &str) -> Option<(String, String)> {
    let (module_path, rest) = text.split_once("..")?;
    if module_path.is_empty() || rest.is_empty() || rest.contains('.') || rest == MAYBE_MARKER {
        return None;
    }
    Some((module_path.to_string(), rest.to_string()))
}
