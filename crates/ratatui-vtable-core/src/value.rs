use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

/// A raw value read out of a row by a column accessor.
///
/// Only [`CellValue::Text`] and [`CellValue::Number`] can be drawn directly. Everything else has
/// to go through a coercion function first.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<CellValue>),
    Map(BTreeMap<String, CellValue>),
    #[default]
    Null,
}

impl CellValue {
    /// Returns the drawable form of this value, or `None` for non-primitive values.
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            CellValue::Text(s) => Some(Primitive::Text(s.clone())),
            CellValue::Number(n) => Some(Primitive::Number(*n)),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, CellValue::Text(_) | CellValue::Number(_))
    }

    /// Short type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "string",
            CellValue::Number(_) => "number",
            CellValue::Bool(_) => "boolean",
            CellValue::List(_) => "list",
            CellValue::Map(_) => "map",
            CellValue::Null => "null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[CellValue]> {
        match self {
            CellValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a map.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        match self {
            CellValue::Map(m) => m.get(key),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        CellValue::Text(value.clone())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

macro_rules! number_into_cell_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(value: $t) -> Self {
                    CellValue::Number(value as f64)
                }
            }

            impl From<$t> for Primitive {
                fn from(value: $t) -> Self {
                    Primitive::Number(value as f64)
                }
            }
        )*
    };
}

number_into_cell_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl<T: Into<CellValue>> From<Vec<T>> for CellValue {
    fn from(value: Vec<T>) -> Self {
        CellValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, CellValue>> for CellValue {
    fn from(value: BTreeMap<String, CellValue>) -> Self {
        CellValue::Map(value)
    }
}

/// A value that a cell can draw: a string or a number.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Text(String),
    Number(f64),
}

impl Primitive {
    pub fn is_number(&self) -> bool {
        matches!(self, Primitive::Number(_))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Text(s) => f.write_str(s),
            Primitive::Number(n) => write_number(f, *n),
        }
    }
}

// Numbers print the way a script runtime would: `1` rather than `1.0`, `Infinity` rather than
// `inf`, negative zero as `0`, and exponent form (`1e+21`, `1e-7`) outside [1e-6, 1e21).
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        return f.write_str("NaN");
    }
    if n.is_infinite() {
        return f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if n == 0.0 {
        return f.write_str("0");
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return write!(f, "{n}");
    }
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => write!(f, "{mantissa}e+{power}"),
        _ => f.write_str(&exp),
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::Text(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::Text(value)
    }
}

/// Rows whose fields are looked up by name at render time.
///
/// Typed rows usually bind accessors through [`crate::column::Column::new`] instead; this trait
/// covers map-like rows where the column schema is the only description of the shape.
pub trait Record {
    /// Returns the value stored under `key`, or [`CellValue::Null`] when it is absent.
    fn field(&self, key: &str) -> CellValue;
}

impl Record for BTreeMap<String, CellValue> {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl<S: std::hash::BuildHasher> Record for HashMap<String, CellValue, S> {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl Record for CellValue {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or_default()
    }
}

#[cfg(feature = "json")]
mod json {
    use super::CellValue;
    use super::Record;

    impl From<serde_json::Value> for CellValue {
        fn from(value: serde_json::Value) -> Self {
            CellValue::from(&value)
        }
    }

    impl From<&serde_json::Value> for CellValue {
        fn from(value: &serde_json::Value) -> Self {
            match value {
                serde_json::Value::Null => CellValue::Null,
                serde_json::Value::Bool(b) => CellValue::Bool(*b),
                serde_json::Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
                serde_json::Value::String(s) => CellValue::Text(s.clone()),
                serde_json::Value::Array(items) => {
                    CellValue::List(items.iter().map(CellValue::from).collect())
                }
                serde_json::Value::Object(map) => CellValue::Map(
                    map.iter()
                        .map(|(k, v)| (k.clone(), CellValue::from(v)))
                        .collect(),
                ),
            }
        }
    }

    impl Record for serde_json::Value {
        fn field(&self, key: &str) -> CellValue {
            self.get(key).map(CellValue::from).unwrap_or_default()
        }
    }

}
