//! Memoir data types shared by the API client, the page controller and the view

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const LABEL_REQUIRED: &str = "Please enter the name";
pub const VALUE_REQUIRED: &str = "Please enter the value";

/// One memoir: a name/value pair.
///
/// Fields the API assigns beyond `label` and `value` (ids, timestamps) are kept
/// verbatim in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub label: String,
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Record {
            label: label.into(),
            value: value.into(),
            extra: Map::new(),
        }
    }

    /// Build a record from an untrusted JSON value.
    ///
    /// The value must be an object with non-empty string `label` and `value`.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(AppError::InvalidResponse(format!(
                "expected a record object, got {}",
                json_kind(&value)
            )));
        }

        let record: Record = serde_json::from_value(value)
            .map_err(|e| AppError::InvalidResponse(format!("malformed record: {}", e)))?;

        if record.label.trim().is_empty() {
            return Err(AppError::InvalidResponse("record has an empty label".into()));
        }
        if record.value.trim().is_empty() {
            return Err(AppError::InvalidResponse("record has an empty value".into()));
        }

        Ok(record)
    }

    /// Build a list of records from an untrusted JSON value.
    ///
    /// A non-array body is an error. Items that are not valid records are
    /// skipped with a warning so one bad row does not hide the rest.
    pub fn list_from_value(value: Value) -> Result<Vec<Self>> {
        match value {
            Value::Array(items) => Ok(items
                .into_iter()
                .enumerate()
                .filter_map(|(index, item)| match Record::from_value(item) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!("Skipping list item {}: {}", index, e);
                        None
                    }
                })
                .collect()),
            other => Err(AppError::InvalidResponse(format!(
                "expected a list of records, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Unsaved form state of the creation panel. Also the create request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

impl Draft {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Draft {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Required-field check. Whitespace-only input counts as missing.
    pub fn validate(&self) -> std::result::Result<(), FieldErrors> {
        let errors = FieldErrors {
            label: self.label.trim().is_empty().then_some(LABEL_REQUIRED),
            value: self.value.trim().is_empty().then_some(VALUE_REQUIRED),
        };
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Field-level validation messages for the creation form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub label: Option<&'static str>,
    pub value: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.value.is_none()
    }
}
