use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw per-target input: user-facing field name to value.
pub type RawFields = BTreeMap<String, Value>;

/// A raw or validated field value.
///
/// Untagged so that TOML and JSON inputs map onto it without wrappers. Variant
/// order matters for deserialization: a map of lists is tried before a map of
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    List(Vec<String>),
    ListMap(BTreeMap<String, Vec<String>>),
    Map(BTreeMap<String, String>),
}

impl Value {
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::List(_) => "list of strings",
            Value::ListMap(_) => "map of string lists",
            Value::Map(_) => "map of strings",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list_map(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Value::ListMap(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::List(items.into_iter().map(str::to_owned).collect())
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(map: BTreeMap<String, String>) -> Self {
        Value::Map(map)
    }
}

impl From<BTreeMap<String, Vec<String>>> for Value {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Value::ListMap(map)
    }
}

/// Declared shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Int,
    StringList,
    StringMap,
    StringListMap,
    /// List of absolute install paths.
    PathList,
}

impl ValueType {
    /// Coerce a raw value into this type, or hand it back on mismatch.
    ///
    /// An empty map deserializes as whichever map variant came first, so
    /// empty maps are accepted for both map types.
    pub(crate) fn coerce(self, raw: &Value) -> Option<Value> {
        match (self, raw) {
            (ValueType::String, Value::Str(_))
            | (ValueType::Int, Value::Int(_))
            | (ValueType::StringList | ValueType::PathList, Value::List(_))
            | (ValueType::StringMap, Value::Map(_))
            | (ValueType::StringListMap, Value::ListMap(_)) => Some(raw.clone()),
            (ValueType::StringMap, Value::ListMap(m)) if m.is_empty() => {
                Some(Value::Map(BTreeMap::new()))
            }
            (ValueType::StringListMap, Value::Map(m)) if m.is_empty() => {
                Some(Value::ListMap(BTreeMap::new()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::String => "string",
            ValueType::Int => "integer",
            ValueType::StringList => "list of strings",
            ValueType::StringMap => "map of strings",
            ValueType::StringListMap => "map of string lists",
            ValueType::PathList => "list of absolute paths",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_deserialization_picks_expected_variants() {
        let v: Value = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(v, Value::Str("x".into()));
        let v: Value = serde_json::from_str("7").unwrap();
        assert_eq!(v, Value::Int(7));
        let v: Value = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(v, Value::from(vec!["a", "b"]));
        let v: Value = serde_json::from_str(r#"{"k":["a"]}"#).unwrap();
        assert!(matches!(v, Value::ListMap(_)));
        let v: Value = serde_json::from_str(r#"{"k":"a"}"#).unwrap();
        assert!(matches!(v, Value::Map(_)));
    }

    #[test]
    fn empty_map_coerces_to_either_map_type() {
        let empty: Value = serde_json::from_str("{}").unwrap();
        assert_eq!(
            ValueType::StringMap.coerce(&empty),
            Some(Value::Map(BTreeMap::new()))
        );
        assert_eq!(
            ValueType::StringListMap.coerce(&empty),
            Some(Value::ListMap(BTreeMap::new()))
        );
    }

    #[test]
    fn mismatched_shape_is_rejected() {
        assert_eq!(ValueType::Int.coerce(&Value::from("1")), None);
        assert_eq!(ValueType::String.coerce(&Value::from(vec!["a"])), None);
    }
}
