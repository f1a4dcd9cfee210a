// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Form schemas, stored form values, and structural materialization.
//!
//! User-facing configuration is described as a flat list of named forms,
//! each holding named inputs. Values entered against a schema are stored in
//! the repository as a [`FormValues`] map keyed by `form.input`. At submit
//! time [`materialize`] folds stored values back into a nested configuration
//! object after checking them structurally against the schema.
//!
//! Materialization is structural only: it rejects unknown inputs and values
//! of the wrong shape, but attaches no meaning to them. Semantic validation
//! belongs to whoever owns the configuration type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Stored form values, keyed by `form.input`.
pub type FormValues = BTreeMap<String, Value>;

/// Errors from structural materialization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormError {
    /// A stored value references an input the schema does not declare.
    #[error("Unknown form input: {0}")]
    UnknownInput(String),

    /// A stored value has the wrong shape for its declared input kind.
    #[error("Input '{input}' expects a {expected} value")]
    TypeMismatch {
        /// The offending `form.input` key.
        input: String,
        /// Human-readable name of the expected shape.
        expected: &'static str,
    },

    /// A stored key is not of the `form.input` shape.
    #[error("Malformed form value key: {0}")]
    MalformedKey(String),
}

/// The shape of a single user-facing input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    /// Free text, bounded in length.
    String {
        /// Maximum accepted length in characters.
        max_length: u32,
    },
    /// A 64-bit integer.
    Integer,
    /// A boolean flag.
    Boolean,
    /// A string-to-string map.
    Map,
}

/// A single named input inside a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    /// Input name, unique within its form.
    pub name: String,
    /// Shape of the accepted value.
    pub kind: InputKind,
    /// Sensitive inputs (passwords, keys) are masked in user interfaces.
    #[serde(default)]
    pub sensitive: bool,
}

impl FormInput {
    /// Declare a string input.
    pub fn string(name: impl Into<String>, max_length: u32) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::String { max_length },
            sensitive: false,
        }
    }

    /// Declare an integer input.
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::Integer,
            sensitive: false,
        }
    }

    /// Declare a boolean input.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::Boolean,
            sensitive: false,
        }
    }

    /// Declare a map input.
    pub fn map(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::Map,
            sensitive: false,
        }
    }

    /// Mark the input as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// A named group of inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    /// Form name, unique within its schema.
    pub name: String,
    /// Inputs presented by this form.
    pub inputs: Vec<FormInput>,
}

impl Form {
    /// Create a form from its inputs.
    pub fn new(name: impl Into<String>, inputs: Vec<FormInput>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }
}

/// An ordered set of forms describing one configuration surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    /// The forms, in display order.
    pub forms: Vec<Form>,
}

impl FormSchema {
    /// Create a schema from its forms.
    pub fn new(forms: Vec<Form>) -> Self {
        Self { forms }
    }

    /// Look up an input by its `form.input` key.
    pub fn input(&self, form: &str, input: &str) -> Option<&FormInput> {
        self.forms
            .iter()
            .find(|f| f.name == form)?
            .inputs
            .iter()
            .find(|i| i.name == input)
    }
}

fn kind_matches(kind: &InputKind, value: &Value) -> bool {
    match kind {
        InputKind::String { .. } => value.is_string(),
        InputKind::Integer => value.is_i64() || value.is_u64(),
        InputKind::Boolean => value.is_boolean(),
        InputKind::Map => {
            value.is_object()
                && value
                    .as_object()
                    .is_some_and(|m| m.values().all(Value::is_string))
        }
    }
}

fn kind_name(kind: &InputKind) -> &'static str {
    match kind {
        InputKind::String { .. } => "string",
        InputKind::Integer => "integer",
        InputKind::Boolean => "boolean",
        InputKind::Map => "string map",
    }
}

/// Fold stored form values into a nested configuration object.
///
/// The result is a JSON object with one member per form, each holding the
/// values entered for that form's inputs. Inputs with no stored value are
/// omitted. Null stored values are treated as absent.
pub fn materialize(schema: &FormSchema, values: &FormValues) -> Result<Value, FormError> {
    let mut root = Map::new();
    for form in &schema.forms {
        root.insert(form.name.clone(), Value::Object(Map::new()));
    }

    for (key, value) in values {
        if value.is_null() {
            continue;
        }
        let (form, input) = key
            .split_once('.')
            .ok_or_else(|| FormError::MalformedKey(key.clone()))?;
        let declared = schema
            .input(form, input)
            .ok_or_else(|| FormError::UnknownInput(key.clone()))?;
        if !kind_matches(&declared.kind, value) {
            return Err(FormError::TypeMismatch {
                input: key.clone(),
                expected: kind_name(&declared.kind),
            });
        }
        // The form object was seeded above; an unknown form would have
        // already failed the input lookup.
        if let Some(members) = root.get_mut(form).and_then(Value::as_object_mut) {
            members.insert(input.to_string(), value.clone());
        }
    }

    Ok(Value::Object(root))
}
