//! Runtime values exchanged with the Host bridge.
//!
//! A [`Value`] is how the core talks about a host-level (Python) object:
//! what `HostBridge::eval` returns, what `HostBridge::import_module` hands
//! back for a dotted module path, and what a macro closure actually sees
//! once it has been resolved out of a [`Namespace`]. It is deliberately a
//! small, inert data shape rather than a live Python object; the host
//! bridge implementation (`hissp_host`) is what gives it behavior.

use std::fmt;
use std::rc::Rc;

use hissp_foundation::Result;

use crate::ir::Node;

/// A macro: a host-language callable invoked with *unevaluated* IR nodes,
/// returning a new IR node.
pub type MacroFn = Rc<dyn Fn(&[Node]) -> Result<Node>>;

/// An ordinary host-language callable, invoked with evaluated [`Value`]s.
pub type CallableFn = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// A host-level value as seen by the core: the result of `HostBridge::eval`,
/// an imported module, or an argument to a [`CallableFn`].
#[derive(Clone)]
pub enum Value {
    /// `None`.
    None,
    /// `True` / `False`.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A complex number, `(real, imag)`.
    Complex(f64, f64),
    /// A string.
    Str(String),
    /// A bytes literal.
    Bytes(Vec<u8>),
    /// `...` (`Ellipsis`).
    Ellipsis,
    /// An ordered, immutable sequence (Python `tuple`).
    Tuple(Vec<Value>),
    /// An ordered, mutable sequence (Python `list`).
    List(Vec<Value>),
    /// An unordered collection of unique values (Python `set`).
    Set(Vec<Value>),
    /// An ordered mapping (Python `dict`).
    Dict(Vec<(Value, Value)>),
    /// A namespace: a module, or the `_macro_` namespace of one.
    Namespace(Namespace),
    /// A macro callable, resolved from some namespace's `_macro_` attribute.
    Macro(MacroFn),
    /// An ordinary function or method value.
    Callable(CallableFn),
}

impl Value {
    /// Returns a short, human-readable type name, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex(_, _) => "complex",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Ellipsis => "ellipsis",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Dict(_) => "dict",
            Self::Namespace(_) => "module",
            Self::Macro(_) => "macro",
            Self::Callable(_) => "function",
        }
    }

    /// Returns this value's nested [`Namespace`], if it is one.
    #[must_use]
    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Self::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    /// Returns true if this value has a canonical Python literal rendering
    /// that the compiler can emit verbatim, rather than needing the
    /// opaque-serialization fallback.
    #[must_use]
    pub fn has_literal_form(&self) -> bool {
        matches!(
            self,
            Self::None
                | Self::Bool(_)
                | Self::Int(_)
                | Self::Float(_)
                | Self::Complex(_, _)
                | Self::Str(_)
                | Self::Bytes(_)
                | Self::Ellipsis
                | Self::Tuple(_)
                | Self::List(_)
                | Self::Set(_)
                | Self::Dict(_)
        )
    }

    /// Renders a canonical Python literal for this value, if one exists.
    /// Returns `None` for namespaces, macros, and callables, which have no
    /// literal form and must go through the opaque-serialization fallback.
    #[must_use]
    pub fn literal(&self) -> Option<String> {
        match self {
            Self::None => Some("None".to_string()),
            Self::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(n) => Some(format_float(*n)),
            Self::Complex(re, im) => Some(format_complex(*re, *im)),
            Self::Str(s) => Some(python_str_literal(s)),
            Self::Bytes(b) => Some(python_bytes_literal(b)),
            Self::Ellipsis => Some("...".to_string()),
            Self::Tuple(items) => {
                let parts = items
                    .iter()
                    .map(Self::literal)
                    .collect::<Option<Vec<_>>>()?;
                Some(match parts.len() {
                    0 => "()".to_string(),
                    1 => format!("({},)", parts[0]),
                    _ => format!("({})", parts.join(", ")),
                })
            }
            Self::List(items) => {
                let parts = items
                    .iter()
                    .map(Self::literal)
                    .collect::<Option<Vec<_>>>()?;
                Some(format!("[{}]", parts.join(", ")))
            }
            Self::Set(items) => {
                let parts = items
                    .iter()
                    .map(Self::literal)
                    .collect::<Option<Vec<_>>>()?;
                Some(if parts.is_empty() {
                    "set()".to_string()
                } else {
                    format!("{{{}}}", parts.join(", "))
                })
            }
            Self::Dict(entries) => {
                let parts = entries
                    .iter()
                    .map(|(k, v)| Some(format!("{}: {}", k.literal()?, v.literal()?)))
                    .collect::<Option<Vec<_>>>()?;
                Some(format!("{{{}}}", parts.join(", ")))
            }
            Self::Namespace(_) | Self::Macro(_) | Self::Callable(_) => None,
        }
    }
}

fn format_float(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 {
            "float('inf')".to_string()
        } else {
            "float('-inf')".to_string()
        };
    }
    if n.is_nan() {
        return "float('nan')".to_string();
    }
    let text = format!("{n}");
    if text.contains('.') || text.contains('e') || text.contains('E') {
        text
    } else {
        format!("{text}.0")
    }
}

fn format_complex(re: f64, im: f64) -> String {
    if re == 0.0 {
        format!("{}j", format_float(im))
    } else {
        format!("({}{:+}j)", format_float(re), im)
    }
}

/// Renders `s` as a single-quoted Python string literal, escaping the
/// characters that would otherwise break out of the quotes.
#[must_use]
pub fn python_str_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Renders `bytes` as a single-quoted Python bytes literal.
#[must_use]
pub fn python_bytes_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            other => out.push_str(&format!("\\x{other:02x}")),
        }
    }
    out.push('\'');
    out
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace(ns) => write!(f, "Namespace({:?})", ns.module),
            Self::Macro(_) => write!(f, "Macro(<callable>)"),
            Self::Callable(_) => write!(f, "Callable(<callable>)"),
            other => write!(f, "{}", other.literal().unwrap_or_else(|| "<?>".into())),
        }
    }
}

/// One module's (or one module's `_macro_` object's) bindings.
///
/// The core treats a namespace as read-only: it never mutates one it
/// receives from the Host bridge, since the `_macro_` namespace of each
/// module is owned by the Host bridge. A [`Namespace`] is itself just a
/// plain mapping; `hissp_host` is what actually maintains live module
/// state and hands out (possibly shared) copies through the bridge.
#[derive(Clone, Default)]
pub struct Namespace {
    /// The dotted module path this namespace belongs to, e.g. `"pkg.mod"`.
    pub module: String,
    values: std::collections::HashMap<String, Value>,
}

impl Namespace {
    /// Creates a fresh, empty namespace for the given module path.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            values: std::collections::HashMap::new(),
        }
    }

    /// Binds `name` to `value` in this namespace.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Looks up `name` in this namespace.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns this namespace's `_macro_` sub-namespace, if it has one.
    #[must_use]
    pub fn macro_namespace(&self) -> Option<&Namespace> {
        self.get("_macro_").and_then(Value::as_namespace)
    }

    /// Looks up a macro named `name` under this namespace's `_macro_`
    /// attribute.
    #[must_use]
    pub fn lookup_macro(&self, name: &str) -> Option<MacroFn> {
        match self.macro_namespace()?.get(name) {
            Some(Value::Macro(f)) => Some(f.clone()),
            _ => None,
        }
    }

    /// Defines a macro named `name` under this namespace's `_macro_`
    /// attribute, creating the `_macro_` sub-namespace if it does not exist.
    pub fn define_macro(&mut self, name: impl Into<String>, f: MacroFn) {
        let mut macro_ns = self.macro_namespace().cloned().unwrap_or_else(|| {
            let mut ns = Namespace::new(format!("{}._macro_", self.module));
            ns.module = format!("{}._macro_", self.module);
            ns
        });
        macro_ns.set(name, Value::Macro(f));
        self.set("_macro_", Value::Namespace(macro_ns));
    }

    /// Iterates over `(name, value)` bindings in this namespace.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("module", &self.module)
            .field("bindings", &self.values.len())
            .finish()
    }
}
