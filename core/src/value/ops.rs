use std::cmp::Ordering;

use super::Value;

impl Value {
    /// Order two values of the same sortable kind: numbers by magnitude, strings and byte sequences
    /// lexicographically, `false < true`. Returns `None` for mismatched kinds and for kinds with no
    /// ordering (Uuid, Time).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::I8(a), Value::I8(b)) => Some(a.cmp(b)),
            (Value::I16(a), Value::I16(b)) => Some(a.cmp(b)),
            (Value::I32(a), Value::I32(b)) => Some(a.cmp(b)),
            (Value::I64(a), Value::I64(b)) => Some(a.cmp(b)),
            (Value::U8(a), Value::U8(b)) => Some(a.cmp(b)),
            (Value::U16(a), Value::U16(b)) => Some(a.cmp(b)),
            (Value::U32(a), Value::U32(b)) => Some(a.cmp(b)),
            (Value::U64(a), Value::U64(b)) => Some(a.cmp(b)),
            // NaN sorts last
            (Value::F32(a), Value::F32(b)) => Some(a.total_cmp(b)),
            (Value::F64(a), Value::F64(b)) => Some(a.total_cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Strict "less than" under `compare`.
    pub fn less(&self, other: &Value) -> Option<bool> { self.compare(other).map(|ord| ord == Ordering::Less) }

    /// Add two numeric values of the same kind. Integer addition wraps on overflow.
    pub(crate) fn add(&self, other: &Value) -> Option<Value> {
        Some(match (self, other) {
            (Value::I8(a), Value::I8(b)) => Value::I8(a.wrapping_add(*b)),
            (Value::I16(a), Value::I16(b)) => Value::I16(a.wrapping_add(*b)),
            (Value::I32(a), Value::I32(b)) => Value::I32(a.wrapping_add(*b)),
            (Value::I64(a), Value::I64(b)) => Value::I64(a.wrapping_add(*b)),
            (Value::U8(a), Value::U8(b)) => Value::U8(a.wrapping_add(*b)),
            (Value::U16(a), Value::U16(b)) => Value::U16(a.wrapping_add(*b)),
            (Value::U32(a), Value::U32(b)) => Value::U32(a.wrapping_add(*b)),
            (Value::U64(a), Value::U64(b)) => Value::U64(a.wrapping_add(*b)),
            (Value::F32(a), Value::F32(b)) => Value::F32(a + b),
            (Value::F64(a), Value::F64(b)) => Value::F64(a + b),
            _ => return None,
        })
    }
}
