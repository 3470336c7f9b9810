//! Invoking a resolved macro on unevaluated IR.
//!
//! A macro is a host-language function, executed by the Host bridge, with
//! its unevaluated argument IR nodes as actual arguments; here that
//! function is a [`MacroFn`] (see [`crate::value`]). This module is just
//! the thin, error-wrapping call site: it runs the macro body and turns any
//! failure into an `ExpansionError` carrying the invocation's source site.

use hissp_foundation::{Error, ErrorKind, Result};

use crate::ir::Node;
use crate::value::MacroFn;

/// Invokes `macro` with `args`, wrapping any failure as an `ExpansionError`
/// naming `site` (typically the qualified macro name or a rendering of the
/// call form).
///
/// # Errors
/// Returns `ErrorKind::Expansion` if the macro body raises.
pub fn invoke_macro(macro_fn: &MacroFn, args: &[Node], site: impl Into<String>) -> Result<Node> {
    macro_fn(args).map_err(|cause| {
        Error::new(ErrorKind::Expansion {
            cause: Box::new(cause),
            site: site.into(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hissp_foundation::{Error, ErrorKind};
    use std::rc::Rc;

    #[test]
    fn invoke_macro_returns_its_result() {
        let identity: MacroFn = Rc::new(|args: &[Node]| Ok(args[0].clone()));
        let arg = Node::frag("x");
        let result = invoke_macro(&identity, &[arg.clone()], "my-macro").unwrap();
        assert_eq!(result, arg);
    }

    #[test]
    fn invoke_macro_wraps_failure_as_expansion_error() {
        let failing: MacroFn =
            Rc::new(|_| Err(Error::new(ErrorKind::Internal("boom".to_string()))));
        let err = invoke_macro(&failing, &[], "(boom 1 2)").unwrap_err();
        match err.kind {
            ErrorKind::Expansion { site, .. } => assert_eq!(site, "(boom 1 2)"),
            other => panic!("expected Expansion, got {other:?}"),
        }
    }
}
