use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Serialize, Serializer};

use super::Value;

/// Values serialize to their native JSON form. Non-finite floats have no JSON number form and are
/// written as `null`; byte sequences are base64 text.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::I8(x) => serializer.serialize_i8(*x),
            Value::I16(x) => serializer.serialize_i16(*x),
            Value::I32(x) => serializer.serialize_i32(*x),
            Value::I64(x) => serializer.serialize_i64(*x),
            Value::U8(x) => serializer.serialize_u8(*x),
            Value::U16(x) => serializer.serialize_u16(*x),
            Value::U32(x) => serializer.serialize_u32(*x),
            Value::U64(x) => serializer.serialize_u64(*x),
            Value::F32(x) if x.is_finite() => serializer.serialize_f32(*x),
            Value::F64(x) if x.is_finite() => serializer.serialize_f64(*x),
            Value::F32(_) | Value::F64(_) => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            Value::Uuid(id) => serializer.collect_str(id),
            Value::Time(time) => serializer.serialize_str(&time.to_rfc3339()),
        }
    }
}
