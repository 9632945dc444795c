//! # Attribute Types and Raw Values
//!
//! [`AttributeType`] is the single definition of every value type a rule
//! attribute may declare. Every `match` on it is exhaustive, so adding a
//! type forces constraint compatibility and shape checking to handle it.
//!
//! [`AttributeValue`] is the untyped value a build-description parser
//! hands over. It deserializes untagged from YAML or JSON; whether a value
//! fits an attribute is decided by [`AttributeType::check_shape`]. Every
//! YAML or JSON value has a representation, including floats, nulls and
//! maps that no attribute type accepts, so a malformed value surfaces as a
//! per-attribute type mismatch instead of failing the whole description.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::CoreError;
use crate::label::Label;

/// The declared value type of a rule attribute.
///
/// | Type | Collection | File-like | Accepts |
/// |------|------------|-----------|---------|
/// | `Label` | no | yes | text that parses as a [`Label`] |
/// | `LabelList` | yes | yes | list of label text |
/// | `String` | no | no | any text |
/// | `StringList` | yes | no | list of text |
/// | `Bool` | no | no | boolean |
/// | `Integer` | no | no | signed 64-bit integer |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A single target or file reference.
    Label,
    /// An ordered list of target or file references.
    LabelList,
    /// Free-form text.
    String,
    /// An ordered list of free-form text.
    StringList,
    /// A boolean switch.
    Bool,
    /// A signed integer.
    Integer,
}

impl AttributeType {
    /// Returns every attribute type in declaration order.
    pub fn all() -> &'static [AttributeType] {
        &[
            Self::Label,
            Self::LabelList,
            Self::String,
            Self::StringList,
            Self::Bool,
            Self::Integer,
        ]
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::LabelList => "label_list",
            Self::String => "string",
            Self::StringList => "string_list",
            Self::Bool => "bool",
            Self::Integer => "integer",
        }
    }

    /// Returns the element type for list types, `None` for scalars.
    pub fn element_type(&self) -> Option<AttributeType> {
        match self {
            Self::LabelList => Some(Self::Label),
            Self::StringList => Some(Self::String),
            Self::Label | Self::String | Self::Bool | Self::Integer => None,
        }
    }

    /// True for types whose values are lists.
    pub fn is_collection(&self) -> bool {
        self.element_type().is_some()
    }

    /// True for types whose values refer to files or targets.
    pub fn is_file_like(&self) -> bool {
        matches!(self, Self::Label | Self::LabelList)
    }

    /// Check that a raw value has the runtime shape this type requires.
    ///
    /// On mismatch, returns a human-readable reason naming the expected
    /// type and what was found instead.
    pub fn check_shape(&self, value: &AttributeValue) -> Result<(), String> {
        match (self, value) {
            (Self::Bool, AttributeValue::Bool(_)) => Ok(()),
            (Self::Integer, AttributeValue::Integer(_)) => Ok(()),
            (Self::String, AttributeValue::Text(_)) => Ok(()),
            (Self::Label, AttributeValue::Text(s)) => Label::parse(s)
                .map(|_| ())
                .map_err(|e| format!("expected label, got {e}")),
            (Self::LabelList | Self::StringList, AttributeValue::List(items)) => {
                let Some(element) = self.element_type() else {
                    return Err(format!("expected {self}, got list"));
                };
                for (i, item) in items.iter().enumerate() {
                    element
                        .check_shape(item)
                        .map_err(|reason| format!("element {i} of {self}: {reason}"))?;
                }
                Ok(())
            }
            _ => Err(format!("expected {self}, got {}", value.shape_name())),
        }
    }

    /// Returns true if `value` has the shape this type requires.
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        self.check_shape(value).is_ok()
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(Self::Label),
            "label_list" => Ok(Self::LabelList),
            "string" => Ok(Self::String),
            "string_list" => Ok(Self::StringList),
            "bool" => Ok(Self::Bool),
            "integer" => Ok(Self::Integer),
            other => Err(CoreError::UnknownAttributeType(other.to_string())),
        }
    }
}

/// A raw attribute value as supplied by a build description.
///
/// Labels and strings share the `Text` representation; the declared
/// [`AttributeType`] decides how text is interpreted.
///
/// Variant order matters for untagged deserialization: integers are tried
/// before floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating-point number. No attribute type accepts it.
    Float(f64),
    /// Text: a string, or a label when the attribute is label-typed.
    Text(String),
    /// A list of values.
    List(Vec<AttributeValue>),
    /// A mapping. No attribute type accepts it.
    Map(BTreeMap<String, AttributeValue>),
    /// An explicit null (`~` or `null`). No attribute type accepts it.
    Null,
}

impl AttributeValue {
    /// Build a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Build a list of text values, e.g. for a label or string list.
    pub fn text_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::Text(s.into())).collect())
    }

    /// Name of the runtime shape, used in mismatch reports.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Null => "null",
        }
    }

    /// The text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Label> for AttributeValue {
    fn from(label: Label) -> Self {
        Self::Text(label.into())
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
