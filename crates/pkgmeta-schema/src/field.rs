use crate::value::{Value, ValueType};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field '{field}' is required")]
    MissingRequired { field: String },
    #[error("field '{field}' must be one of {allowed:?}, got '{given}'")]
    InvalidChoice {
        field: String,
        given: String,
        allowed: Vec<String>,
    },
    #[error("field '{field}' expects a {expected}, got a {given}")]
    WrongType {
        field: String,
        expected: ValueType,
        given: &'static str,
    },
    #[error("field '{field}' has invalid value '{value}': {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Compile-time default for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::Str(s.to_owned()),
            DefaultValue::Int(i) => Value::Int(i),
        }
    }
}

/// A typed, named configuration slot.
///
/// `name` is what users write; `alias` is the dotted key the package builder
/// reads. An empty alias keeps the field out of the builder config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub alias: &'static str,
    pub value_type: ValueType,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub choices: Option<&'static [&'static str]>,
    /// Map entries with an empty value are dropped instead of kept.
    pub ignore_empty: bool,
}

impl Field {
    pub const fn new(name: &'static str, alias: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            alias,
            value_type,
            required: false,
            default: None,
            choices: None,
            ignore_empty: false,
        }
    }

    pub const fn string(name: &'static str, alias: &'static str) -> Self {
        Self::new(name, alias, ValueType::String)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn with_choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = Some(choices);
        self
    }

    pub const fn ignoring_empty(mut self) -> Self {
        self.ignore_empty = true;
        self
    }

    /// Validate a raw value for this field.
    ///
    /// Returns `Ok(None)` when the field is optional, absent, and has no
    /// default. Defaults only apply to absent values.
    pub fn validate(&self, raw: Option<&Value>) -> Result<Option<Value>, FieldError> {
        let Some(raw) = raw else {
            if self.required {
                return Err(FieldError::MissingRequired {
                    field: self.name.to_owned(),
                });
            }
            return Ok(self.default.map(DefaultValue::to_value));
        };

        let value = self
            .value_type
            .coerce(raw)
            .ok_or_else(|| FieldError::WrongType {
                field: self.name.to_owned(),
                expected: self.value_type,
                given: raw.shape(),
            })?;

        match value {
            Value::Str(s) => {
                self.check_choice(&s)?;
                Ok(Some(Value::Str(s)))
            }
            Value::List(items) if self.value_type == ValueType::PathList => {
                if let Some(bad) = items.iter().find(|p| !p.starts_with('/')) {
                    return Err(FieldError::InvalidValue {
                        field: self.name.to_owned(),
                        value: bad.clone(),
                        reason: "install paths must be absolute".to_owned(),
                    });
                }
                Ok(Some(Value::List(items)))
            }
            Value::Map(map) if self.ignore_empty => Ok(Some(Value::Map(drop_empty(map)))),
            other => Ok(Some(other)),
        }
    }

    fn check_choice(&self, given: &str) -> Result<(), FieldError> {
        match self.choices {
            Some(allowed) if !allowed.contains(&given) => Err(FieldError::InvalidChoice {
                field: self.name.to_owned(),
                given: given.to_owned(),
                allowed: allowed.iter().map(|s| (*s).to_owned()).collect(),
            }),
            _ => Ok(()),
        }
    }
}

fn drop_empty(map: BTreeMap<String, String>) -> BTreeMap<String, String> {
    map.into_iter().filter(|(_, v)| !v.is_empty()).collect()
}
