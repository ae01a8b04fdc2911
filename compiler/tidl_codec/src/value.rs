//! Runtime values.

use std::collections::BTreeMap;

use tidl_ir::ir::ConstValue;

/// A dynamically typed value, checked against a resolved schema type by
/// the encoder.
///
/// Struct values are keyed by field id; the map keeps them ordered so
/// encoding is canonical without a sort.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(BTreeMap<i16, Value>),
}

impl Value {
    /// Short description of the value's shape, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
        }
    }

    /// Materialize a resolved default or constant as a runtime value.
    pub fn from_const(value: &ConstValue) -> Value {
        match value {
            ConstValue::Bool(v) => Value::Bool(*v),
            ConstValue::Byte(v) => Value::Byte(*v),
            ConstValue::I16(v) => Value::I16(*v),
            ConstValue::I32(v) => Value::I32(*v),
            ConstValue::I64(v) => Value::I64(*v),
            ConstValue::Double(v) => Value::Double(*v),
            ConstValue::String(v) => Value::String(v.clone()),
            ConstValue::List(items) => Value::List(items.iter().map(Value::from_const).collect()),
            ConstValue::Set(items) => Value::Set(items.iter().map(Value::from_const).collect()),
            ConstValue::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (Value::from_const(k), Value::from_const(v)))
                    .collect(),
            ),
            ConstValue::Struct(fields) => Value::Struct(
                fields
                    .iter()
                    .map(|(id, v)| (*id, Value::from_const(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_const_struct() {
        let value = Value::from_const(&ConstValue::Struct(vec![
            (1, ConstValue::I32(7)),
            (3, ConstValue::String("x".to_string())),
        ]));
        let Value::Struct(fields) = value else {
            panic!("expected struct value");
        };
        assert_eq!(fields.get(&1), Some(&Value::I32(7)));
        assert_eq!(fields.get(&3), Some(&Value::String("x".to_string())));
    }
}
