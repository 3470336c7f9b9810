//! Opaque-atom serialization, backing the compiler's `Foreign`-atom
//! fallback. Uses `serde` + `rmp-serde` (`MessagePack`) for a stable
//! binary encoding of plain-data values.
//!
//! Only plain-data [`Value`] variants have a serialized form; a
//! [`Value::Namespace`], [`Value::Macro`], or [`Value::Callable`] has no
//! stable binary representation and is rejected.

use hissp_foundation::{Error, ErrorKind, Result};
use hissp_core::value::Value;
use serde::{Deserialize, Serialize};

/// A serializable mirror of the plain-data subset of [`Value`].
#[derive(Serialize, Deserialize)]
enum Wire {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(f64, f64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
    Tuple(Vec<Wire>),
    List(Vec<Wire>),
    Set(Vec<Wire>),
    Dict(Vec<(Wire, Wire)>),
}

fn to_wire(value: &Value) -> Result<Wire> {
    Ok(match value {
        Value::None => Wire::None,
        Value::Bool(b) => Wire::Bool(*b),
        Value::Int(n) => Wire::Int(*n),
        Value::Float(n) => Wire::Float(*n),
        Value::Complex(re, im) => Wire::Complex(*re, *im),
        Value::Str(s) => Wire::Str(s.clone()),
        Value::Bytes(b) => Wire::Bytes(b.clone()),
        Value::Ellipsis => Wire::Ellipsis,
        Value::Tuple(items) => Wire::Tuple(items.iter().map(to_wire).collect::<Result<_>>()?),
        Value::List(items) => Wire::List(items.iter().map(to_wire).collect::<Result<_>>()?),
        Value::Set(items) => Wire::Set(items.iter().map(to_wire).collect::<Result<_>>()?),
        Value::Dict(entries) => Wire::Dict(
            entries
                .iter()
                .map(|(k, v)| Ok((to_wire(k)?, to_wire(v)?)))
                .collect::<Result<_>>()?,
        ),
        other => {
            return Err(unrepresentable(other));
        }
    })
}

fn from_wire(wire: Wire) -> Value {
    match wire {
        Wire::None => Value::None,
        Wire::Bool(b) => Value::Bool(b),
        Wire::Int(n) => Value::Int(n),
        Wire::Float(n) => Value::Float(n),
        Wire::Complex(re, im) => Value::Complex(re, im),
        Wire::Str(s) => Value::Str(s),
        Wire::Bytes(b) => Value::Bytes(b),
        Wire::Ellipsis => Value::Ellipsis,
        Wire::Tuple(items) => Value::Tuple(items.into_iter().map(from_wire).collect()),
        Wire::List(items) => Value::List(items.into_iter().map(from_wire).collect()),
        Wire::Set(items) => Value::Set(items.into_iter().map(from_wire).collect()),
        Wire::Dict(entries) => {
            Value::Dict(entries.into_iter().map(|(k, v)| (from_wire(k), from_wire(v))).collect())
        }
    }
}

fn unrepresentable(value: &Value) -> Error {
    Error::new(ErrorKind::Internal(format!(
        "{} has no opaque-serializable form",
        value.type_name()
    )))
}

/// Serializes `value` to `MessagePack` bytes.
///
/// # Errors
/// Returns an error if `value` is a namespace, macro, or callable.
pub fn dumps(value: &Value) -> Result<Vec<u8>> {
    let wire = to_wire(value)?;
    rmp_serde::to_vec(&wire)
        .map_err(|e| Error::new(ErrorKind::Internal(format!("opaque serialization failed: {e}"))))
}

/// Deserializes a value previously produced by [`dumps`].
///
/// # Errors
/// Returns an error if `bytes` is not valid `MessagePack` for this shape.
pub fn loads(bytes: &[u8]) -> Result<Value> {
    let wire: Wire = rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::Internal(format!("opaque deserialization failed: {e}"))))?;
    Ok(from_wire(wire))
}
