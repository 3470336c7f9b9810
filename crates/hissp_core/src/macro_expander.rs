//! Macro expansion engine.
//!
//! A macro call is a non-empty [`Tuple`](Node::Tuple) whose head [`Fragment`]
//! resolves, under [`resolve_head`]'s four ordered rules, to a callable
//! living in some module's `_macro_` namespace. Expansion is outside-in: the
//! outer form is expanded first, and the macro's *return value* is expanded
//! again from scratch, which lets a macro suppress expansion of part of its
//! own argument simply by quoting it.
//!
//! `quote` and `lambda` are the two special-form heads and are
//! never looked up as macros. `quote`'s argument is data, not code, and is
//! left completely untouched. `lambda`'s parameter list and body are code
//! and are recursed into like any other tuple's children.

use hissp_foundation::{Error, ErrorKind, Result};

use crate::host::HostBridge;
use crate::ir::Node;
use crate::macro_def::invoke_macro;
use crate::macro_registry::{resolve_head, HeadResolution};
use crate::span::Span;
use crate::value::Namespace;

/// Bounds runaway self-expanding macros; exceeding it produces a
/// distinguished `ErrorKind::Expansion`, not a stack overflow.
const MAX_EXPANSION_DEPTH: usize = 200;

/// Recursively expands macro calls in Hissp IR.
pub struct MacroExpander<'a> {
    host: &'a dyn HostBridge,
    ns: &'a Namespace,
    module: String,
    depth: usize,
}

impl<'a> MacroExpander<'a> {
    /// Creates an expander that resolves macro heads against `ns`'s
    /// `_macro_` namespace, qualifying unqualified heads against `module`.
    #[must_use]
    pub fn new(host: &'a dyn HostBridge, ns: &'a Namespace, module: impl Into<String>) -> Self {
        Self {
            host,
            ns,
            module: module.into(),
            depth: 0,
        }
    }

    /// Expands every form in `nodes`, independently.
    ///
    /// # Errors
    /// See [`MacroExpander::expand`].
    pub fn expand_all(&mut self, nodes: &[Node]) -> Result<Vec<Node>> {
        nodes.iter().map(|node| self.expand(node)).collect()
    }

    /// Expands a single form to a macro-free, compiler-ready form.
    ///
    /// # Errors
    /// Returns `ErrorKind::Expansion` if a macro body raises, or if the
    /// expansion-recursion depth is exceeded.
    pub fn expand(&mut self, node: &Node) -> Result<Node> {
        if self.depth > MAX_EXPANSION_DEPTH {
            return Err(Error::new(ErrorKind::Expansion {
                cause: Box::new(Error::new(ErrorKind::Internal(format!(
                    "expansion depth exceeded {MAX_EXPANSION_DEPTH} (possible infinite macro recursion)"
                )))),
                site: describe_site(node),
            }));
        }

        let Node::Tuple(children, span) = node else {
            return Ok(node.clone());
        };
        if children.is_empty() {
            return Ok(node.clone());
        }

        let head = &children[0];
        let Some(head_text) = head.as_fragment() else {
            // A tuple head (an immediately-applied lambda, say) can't be a
            // macro reference; just recurse into the children.
            return self.expand_children(children, *span);
        };

        if head_text == "quote" {
            return Ok(node.clone());
        }
        if head_text == "lambda" {
            return self.expand_children(children, *span);
        }

        match resolve_head(head_text, &self.module, self.ns, self.host)? {
            HeadResolution::Macro {
                macro_fn,
                qualified_name,
            } => {
                let args: Vec<Node> = children.iter().skip(1).cloned().collect();
                let expanded = invoke_macro(&macro_fn, &args, format!("({qualified_name} ...)"))?;
                self.depth += 1;
                let result = self.expand(&expanded);
                self.depth -= 1;
                result
            }
            HeadResolution::RewriteTo(plain_head) => {
                let mut rewritten = children.clone();
                rewritten.set(0, Node::Fragment(plain_head, head.span()));
                self.expand_children(&rewritten, *span)
            }
            HeadResolution::NotMacro => self.expand_children(children, *span),
        }
    }

    fn expand_children(&mut self, children: &im::Vector<Node>, span: Span) -> Result<Node> {
        let mut expanded = im::Vector::new();
        for child in children {
            expanded.push_back(self.expand(child)?);
        }
        Ok(Node::Tuple(expanded, span))
    }
}

/// Expands every top-level form in `nodes` against `ns`'s macro namespace.
///
/// # Errors
/// See [`MacroExpander::expand`].
pub fn expand_all(nodes: &[Node], host: &dyn HostBridge, ns: &Namespace, module: &str) -> Result<Vec<Node>> {
    MacroExpander::new(host, ns, module).expand_all(nodes)
}

fn describe_site(node: &Node) -> String {
    match node.as_fragment() {
        Some(text) => text.to_string(),
        None => match node.as_tuple().and_then(|c| c.front()).and_then(Node::as_fragment) {
            Some(head) => format!("({head} ...)"),
            None => node.type_name().to_string(),
        },
    }
}
