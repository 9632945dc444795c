//! # Validation Violations
//!
//! A [`Violation`] is one problem found while checking a build
//! description's attribute values against a rule schema. Violations are
//! recoverable: they are collected into a report and shown to the author
//! of the build description all at once.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attribute::AttributeType;

/// What kind of problem a [`Violation`] describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A mandatory attribute has no value.
    MissingMandatoryAttribute,
    /// A value's runtime shape does not match the declared type.
    TypeMismatch {
        /// The declared attribute type.
        expected: AttributeType,
    },
    /// A file-like value has a suffix outside the allowed set.
    DisallowedFileType {
        /// The offending label or path.
        value: String,
    },
    /// A non-empty collection attribute was given an empty list.
    EmptyRequiredCollection,
    /// A value was supplied for an attribute the schema does not declare.
    UnknownAttribute,
}

impl ViolationKind {
    /// Stable snake_case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingMandatoryAttribute => "missing_mandatory_attribute",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::DisallowedFileType { .. } => "disallowed_file_type",
            Self::EmptyRequiredCollection => "empty_required_collection",
            Self::UnknownAttribute => "unknown_attribute",
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Name of the attribute the violation concerns.
    pub attribute: String,
    /// Structured kind of the violation.
    #[serde(flatten)]
    pub kind: ViolationKind,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    /// A mandatory attribute was left unset.
    pub fn missing_mandatory(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            kind: ViolationKind::MissingMandatoryAttribute,
            message: format!("missing value for mandatory attribute '{attribute}'"),
        }
    }

    /// A value does not have the shape `expected` requires; `reason` comes
    /// from [`AttributeType::check_shape`].
    pub fn type_mismatch(attribute: &str, expected: AttributeType, reason: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            kind: ViolationKind::TypeMismatch { expected },
            message: format!("bad value for attribute '{attribute}': {reason}"),
        }
    }

    /// A file reference `value` is not in the `allowed` set, rendered for
    /// the message.
    pub fn disallowed_file_type(attribute: &str, value: &str, allowed: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            kind: ViolationKind::DisallowedFileType {
                value: value.to_string(),
            },
            message: format!(
                "'{value}' is not a permitted file type for attribute '{attribute}' \
                 (expected {allowed})"
            ),
        }
    }

    /// A list that must be non-empty has no elements.
    pub fn empty_collection(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            kind: ViolationKind::EmptyRequiredCollection,
            message: format!("attribute '{attribute}' must contain at least one element"),
        }
    }

    /// A value was given for an attribute that rule type `rule` does not declare.
    pub fn unknown_attribute(attribute: &str, rule: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            kind: ViolationKind::UnknownAttribute,
            message: format!("no such attribute '{attribute}' in '{rule}' rule"),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {}", self.attribute, self.message)
    }
}
