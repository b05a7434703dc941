//! Translation of CMS attribute definitions into record validators.
//!
//! The CMS describes each content type as a map of field name to
//! `{ "type": <tag>, ...metadata }`. Each tag resolves to one
//! [`FieldValidator`]; composite tags (`array`, `object`) resolve
//! recursively. Unknown tags never fail the translation: they become
//! [`FieldValidator::Unvalidated`] so that a schema change on the CMS side
//! cannot break a site build.

use crate::domain::model::record_id;
use crate::utils::error::{LoaderError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum FieldValidator {
    String,
    /// RFC 3339 / ISO-8601 timestamp string.
    DateTime,
    Boolean,
    Number,
    Array(Box<FieldValidator>),
    Object(ObjectShape),
    /// `{url, alternativeText?, caption?, width?, height?}`
    Media,
    /// Sequence of components, each tagged with a `__component` string.
    DynamicZone,
    /// Accepts any value, including absence.
    Unvalidated(Unvalidated),
}

/// Why a field is left unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "tag", rename_all = "snake_case")]
pub enum Unvalidated {
    /// Relations are not resolved by the loader.
    Relation,
    UnknownType(String),
    /// The definition carried no string `type` tag.
    Untagged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeField {
    pub validator: FieldValidator,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl ShapeField {
    pub fn required(validator: FieldValidator) -> Self {
        Self {
            validator,
            optional: false,
        }
    }

    /// Optional fields accept both absence and `null`.
    pub fn optional(validator: FieldValidator) -> Self {
        Self {
            validator,
            optional: true,
        }
    }
}

/// Named fields of a record. Keys not listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ObjectShape {
    fields: BTreeMap<String, ShapeField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn issue(issues: &mut Vec<ValidationIssue>, path: &str, message: impl Into<String>) {
    issues.push(ValidationIssue {
        path: path.to_string(),
        message: message.into(),
    });
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl FieldValidator {
    /// Appends every mismatch between `value` and this validator to `issues`.
    pub fn check(&self, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
        match self {
            Self::String => {
                if !value.is_string() {
                    issue(issues, path, format!("expected string, found {}", describe(value)));
                }
            }
            Self::DateTime => match value.as_str() {
                Some(s) if chrono::DateTime::parse_from_rfc3339(s).is_ok() => {}
                Some(s) => issue(issues, path, format!("invalid datetime '{}'", s)),
                None => issue(
                    issues,
                    path,
                    format!("expected datetime string, found {}", describe(value)),
                ),
            },
            Self::Boolean => {
                if !value.is_boolean() {
                    issue(issues, path, format!("expected boolean, found {}", describe(value)));
                }
            }
            Self::Number => {
                if !value.is_number() {
                    issue(issues, path, format!("expected number, found {}", describe(value)));
                }
            }
            Self::Array(items) => match value.as_array() {
                Some(elements) => {
                    for (index, element) in elements.iter().enumerate() {
                        items.check(element, &format!("{}[{}]", path, index), issues);
                    }
                }
                None => issue(issues, path, format!("expected array, found {}", describe(value))),
            },
            Self::Object(shape) => shape.check(value, path, issues),
            Self::Media => media_shape().check(value, path, issues),
            Self::DynamicZone => {
                FieldValidator::Array(Box::new(FieldValidator::Object(component_shape())))
                    .check(value, path, issues)
            }
            Self::Unvalidated(_) => {}
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        let mut issues = Vec::new();
        self.check(value, "", &mut issues);
        issues.is_empty()
    }

    fn accepts_missing(&self) -> bool {
        matches!(self, Self::Unvalidated(_))
    }
}

impl ObjectShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, field: ShapeField) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&ShapeField> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn check(&self, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
        let Some(record) = value.as_object() else {
            issue(issues, path, format!("expected object, found {}", describe(value)));
            return;
        };

        for (name, field) in &self.fields {
            let field_path = join_path(path, name);
            match record.get(name) {
                None | Some(Value::Null) if field.optional => {}
                None if field.validator.accepts_missing() => {}
                None => issue(issues, &field_path, "required field is missing"),
                Some(value) => field.validator.check(value, &field_path, issues),
            }
        }
    }
}

fn media_shape() -> ObjectShape {
    ObjectShape::new()
        .with_field("url", ShapeField::required(FieldValidator::String))
        .with_field("alternativeText", ShapeField::optional(FieldValidator::String))
        .with_field("caption", ShapeField::optional(FieldValidator::String))
        .with_field("width", ShapeField::optional(FieldValidator::Number))
        .with_field("height", ShapeField::optional(FieldValidator::Number))
}

fn component_shape() -> ObjectShape {
    ObjectShape::new().with_field("__component", ShapeField::required(FieldValidator::String))
}

/// Top-level validator for records of one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContentSchema {
    shape: ObjectShape,
}

impl ContentSchema {
    pub fn field(&self, name: &str) -> Option<&FieldValidator> {
        self.shape.field(name).map(|f| &f.validator)
    }

    pub fn len(&self) -> usize {
        self.shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    pub fn check(&self, record: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.shape.check(record, "", &mut issues);
        issues
    }

    pub fn accepts(&self, record: &Value) -> bool {
        self.check(record).is_empty()
    }

    pub fn validate(&self, record: &Value) -> Result<()> {
        let issues = self.check(record);
        if issues.is_empty() {
            return Ok(());
        }

        Err(LoaderError::RecordValidation {
            record: record_id(record).unwrap_or_else(|| "<unidentified>".to_string()),
            issues: issues.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Builds the record validator for an `attributes` map.
///
/// A definition that is not an object carries no type tag and is left
/// unvalidated.
pub fn translate_attributes(attributes: &Map<String, Value>) -> Result<ContentSchema> {
    let mut shape = ObjectShape::new();

    for (name, definition) in attributes {
        let validator = match definition.as_object() {
            Some(definition) => resolve_field(type_tag(definition), definition, name)?,
            None => FieldValidator::Unvalidated(Unvalidated::Untagged),
        };
        shape.fields.insert(name.clone(), ShapeField::required(validator));
    }

    tracing::debug!("Translated {} schema attributes", shape.len());
    Ok(ContentSchema { shape })
}

fn type_tag(definition: &Map<String, Value>) -> Option<&str> {
    definition.get("type").and_then(Value::as_str)
}

/// Resolves one field definition. `path` names the field in errors.
pub fn resolve_field(
    tag: Option<&str>,
    definition: &Map<String, Value>,
    path: &str,
) -> Result<FieldValidator> {
    let Some(tag) = tag else {
        return Ok(FieldValidator::Unvalidated(Unvalidated::Untagged));
    };

    let validator = match tag {
        "string" | "uid" | "documentId" | "richtext" | "text" => FieldValidator::String,
        "datetime" => FieldValidator::DateTime,
        "boolean" => FieldValidator::Boolean,
        "number" => FieldValidator::Number,
        "array" => {
            let items_path = join_path(path, "items");
            let items = definition
                .get("items")
                .and_then(Value::as_object)
                .ok_or_else(|| LoaderError::invalid_field(items_path.as_str()))?;
            FieldValidator::Array(Box::new(resolve_field(type_tag(items), items, &items_path)?))
        }
        "object" => FieldValidator::Object(resolve_properties(definition, path)?),
        "media" => FieldValidator::Media,
        "relation" => FieldValidator::Unvalidated(Unvalidated::Relation),
        "dynamiczone" => FieldValidator::DynamicZone,
        other => {
            tracing::debug!("Unrecognized field type '{}' at {}, leaving unvalidated", other, path);
            FieldValidator::Unvalidated(Unvalidated::UnknownType(other.to_string()))
        }
    };

    Ok(validator)
}

fn resolve_properties(definition: &Map<String, Value>, path: &str) -> Result<ObjectShape> {
    let properties = definition
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| LoaderError::invalid_field(join_path(path, "properties")))?;

    let mut shape = ObjectShape::new();
    for (key, value) in properties {
        let property_path = join_path(path, key);
        let property = value
            .as_object()
            .filter(|p| p.contains_key("type"))
            .ok_or_else(|| LoaderError::invalid_field(property_path.as_str()))?;

        let validator = resolve_field(type_tag(property), property, &property_path)?;
        shape.fields.insert(key.clone(), ShapeField::required(validator));
    }

    Ok(shape)
}
