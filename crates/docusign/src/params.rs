//! Typed, validating access to one item's parameters.

use nodes::ParameterAccessor;
use serde_json::{Map, Value};

use crate::error::{DocuSignError, Result};
use crate::validators::{validate_field, validate_optional, validate_required, FieldKind};

pub const UPDATE_FIELDS: &str = "updateFields";
pub const ADDITIONAL_FIELDS: &str = "additionalFields";

/// Renders scalars the way DocuSign wants them on the wire: as strings.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Non-blank string value of `key` in a collection parameter.
pub fn field_str(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(scalar_to_string)
}

/// Like [`field_str`], validated against `kind` when present.
pub fn field_checked(fields: &Map<String, Value>, key: &str, kind: FieldKind) -> Result<Option<String>> {
    validate_optional(fields.get(key), kind, key)?;
    Ok(field_str(fields, key))
}

pub fn field_bool(fields: &Map<String, Value>, key: &str) -> Option<bool> {
    match fields.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parameters of the item at `index`.
#[derive(Clone, Copy)]
pub struct ItemParams<'a> {
    accessor: &'a dyn ParameterAccessor,
    index: usize,
}

impl<'a> ItemParams<'a> {
    pub fn new(accessor: &'a dyn ParameterAccessor, index: usize) -> Self {
        Self { accessor, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raw(&self, name: &str) -> Option<Value> {
        self.accessor.parameter(name, self.index)
    }

    /// Non-blank string form of a scalar parameter.
    pub fn string(&self, name: &str) -> Option<String> {
        self.raw(name).as_ref().and_then(scalar_to_string)
    }

    /// Fails with `"<name> is required"` when absent or blank.
    pub fn required(&self, name: &str) -> Result<String> {
        let value = self.raw(name);
        validate_required(value.as_ref(), name)?;
        value
            .as_ref()
            .and_then(scalar_to_string)
            .ok_or_else(|| DocuSignError::validation(format!("{name} is required")))
    }

    /// Required and checked against `kind`.
    pub fn checked(&self, name: &str, kind: FieldKind) -> Result<String> {
        let value = self.raw(name);
        validate_field(value.as_ref(), kind, name)?;
        value
            .as_ref()
            .and_then(scalar_to_string)
            .ok_or_else(|| DocuSignError::validation(format!("{name} is required")))
    }

    /// Checked against `kind` only when present.
    pub fn optional_checked(&self, name: &str, kind: FieldKind) -> Result<Option<String>> {
        let value = self.raw(name);
        validate_optional(value.as_ref(), kind, name)?;
        Ok(value.as_ref().and_then(scalar_to_string))
    }

    pub fn boolean(&self, name: &str, default: bool) -> bool {
        match self.raw(name) {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => match s.trim() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }

    /// A non-negative integer parameter; missing or unparsable values yield `default`.
    pub fn usize_or(&self, name: &str, default: usize) -> usize {
        match self.raw(name) {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .map(|n| n as usize)
                .unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// An object-valued parameter (e.g. `additionalFields`); empty when absent.
    pub fn collection(&self, name: &str) -> Map<String, Value> {
        match self.raw(name) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// A list-valued parameter; a single object counts as a one-element list.
    pub fn list(&self, name: &str) -> Vec<Value> {
        match self.raw(name) {
            Some(Value::Array(items)) => items,
            Some(v @ Value::Object(_)) => vec![v],
            _ => Vec::new(),
        }
    }

    /// The `updateFields` collection, which must name at least one field.
    pub fn update_fields(&self) -> Result<Map<String, Value>> {
        let fields: Map<String, Value> = self
            .collection(UPDATE_FIELDS)
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .collect();
        if fields.is_empty() {
            return Err(DocuSignError::validation(
                "At least one update field must be provided",
            ));
        }
        Ok(fields)
    }

    pub fn additional_fields(&self) -> Map<String, Value> {
        self.collection(ADDITIONAL_FIELDS)
    }
}
