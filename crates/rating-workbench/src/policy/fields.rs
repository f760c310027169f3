//! Extension-bag values stored in [`PolicyTransaction::custom_fields`].
//!
//! [`PolicyTransaction::custom_fields`]: super::PolicyTransaction::custom_fields

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ordered key/value map used for `custom_fields` and nested entries.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Open-ended, JSON-compatible value held in the extension bag.
///
/// Money is never stored as [`FieldValue::Float`]; mappers write decimals as
/// [`FieldValue::Text`] so the scale survives storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(FieldMap),
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "string",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(values: Vec<FieldValue>) -> Self {
        FieldValue::List(values)
    }
}

impl From<FieldMap> for FieldValue {
    fn from(map: FieldMap) -> Self {
        FieldValue::Map(map)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// A stored extension-bag value could not be rebuilt into its typed shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing required field `{path}`")]
    MissingField { path: String },
    #[error("field `{path}` expected {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field `{path}` holds invalid value '{value}': {reason}")]
    InvalidValue {
        path: String,
        value: String,
        reason: String,
    },
}

impl DecodeError {
    pub fn path(&self) -> &str {
        match self {
            DecodeError::MissingField { path }
            | DecodeError::WrongType { path, .. }
            | DecodeError::InvalidValue { path, .. } => path,
        }
    }
}

/// Typed accessor over a [`FieldMap`] that reports failures with their full path.
pub struct FieldReader<'a> {
    fields: &'a FieldMap,
    prefix: String,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a FieldMap) -> Self {
        Self {
            fields,
            prefix: String::new(),
        }
    }

    fn nested(fields: &'a FieldMap, prefix: String) -> Self {
        Self { fields, prefix }
    }

    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    /// Returns `None` for both a missing key and an explicit null.
    fn present(&self, key: &str) -> Option<&'a FieldValue> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    fn wrong_type(&self, key: &str, expected: &'static str, found: &FieldValue) -> DecodeError {
        DecodeError::WrongType {
            path: self.path(key),
            expected,
            found: found.kind(),
        }
    }

    fn missing(&self, key: &str) -> DecodeError {
        DecodeError::MissingField {
            path: self.path(key),
        }
    }

    pub fn optional_text(&self, key: &str) -> Result<Option<String>, DecodeError> {
        match self.present(key) {
            None => Ok(None),
            Some(FieldValue::Text(value)) => Ok(Some(value.clone())),
            Some(other) => Err(self.wrong_type(key, "string", other)),
        }
    }

    pub fn required_text(&self, key: &str) -> Result<String, DecodeError> {
        self.optional_text(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn text_or(&self, key: &str, default: &str) -> Result<String, DecodeError> {
        Ok(self
            .optional_text(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn optional_decimal(&self, key: &str) -> Result<Option<Decimal>, DecodeError> {
        let value = match self.present(key) {
            None => return Ok(None),
            Some(value) => value,
        };

        let parsed = match value {
            FieldValue::Text(raw) => Decimal::from_str(raw.trim()).map_err(|err| {
                DecodeError::InvalidValue {
                    path: self.path(key),
                    value: raw.clone(),
                    reason: err.to_string(),
                }
            })?,
            FieldValue::Integer(raw) => Decimal::from(*raw),
            FieldValue::Float(raw) => {
                Decimal::try_from(*raw).map_err(|err| DecodeError::InvalidValue {
                    path: self.path(key),
                    value: raw.to_string(),
                    reason: err.to_string(),
                })?
            }
            other => return Err(self.wrong_type(key, "decimal string", other)),
        };

        Ok(Some(parsed))
    }

    pub fn required_decimal(&self, key: &str) -> Result<Decimal, DecodeError> {
        self.optional_decimal(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn decimal_or(&self, key: &str, default: Decimal) -> Result<Decimal, DecodeError> {
        Ok(self.optional_decimal(key)?.unwrap_or(default))
    }

    /// Non-negative whole number; numeric strings are accepted.
    pub fn optional_count(&self, key: &str) -> Result<Option<u32>, DecodeError> {
        let value = match self.present(key) {
            None => return Ok(None),
            Some(value) => value,
        };

        let invalid = |raw: String| DecodeError::InvalidValue {
            path: self.path(key),
            value: raw,
            reason: "expected a non-negative whole number".to_string(),
        };

        match value {
            FieldValue::Integer(raw) => u32::try_from(*raw)
                .map(Some)
                .map_err(|_| invalid(raw.to_string())),
            FieldValue::Text(raw) => raw
                .trim()
                .parse::<u32>()
                .map(Some)
                .map_err(|_| invalid(raw.clone())),
            other => Err(self.wrong_type(key, "integer", other)),
        }
    }

    pub fn required_count(&self, key: &str) -> Result<u32, DecodeError> {
        self.optional_count(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn count_or(&self, key: &str, default: u32) -> Result<u32, DecodeError> {
        Ok(self.optional_count(key)?.unwrap_or(default))
    }

    /// Parse an enum stored by its string code.
    pub fn required_code<T>(&self, key: &str) -> Result<T, DecodeError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.required_text(key)?;
        raw.parse::<T>().map_err(|err| DecodeError::InvalidValue {
            path: self.path(key),
            value: raw.clone(),
            reason: err.to_string(),
        })
    }

    /// Decode each map entry of a list; a missing list decodes as empty.
    pub fn list_of<T, F>(&self, key: &str, mut decode: F) -> Result<Vec<T>, DecodeError>
    where
        F: FnMut(&FieldReader<'_>) -> Result<T, DecodeError>,
    {
        let entries = match self.present(key) {
            None => return Ok(Vec::new()),
            Some(FieldValue::List(entries)) => entries,
            Some(other) => return Err(self.wrong_type(key, "list", other)),
        };

        let base = self.path(key);
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let entry_path = format!("{base}[{index}]");
                match entry {
                    FieldValue::Map(map) => decode(&FieldReader::nested(map, entry_path)),
                    other => Err(DecodeError::WrongType {
                        path: entry_path,
                        expected: "map",
                        found: other.kind(),
                    }),
                }
            })
            .collect()
    }
}
