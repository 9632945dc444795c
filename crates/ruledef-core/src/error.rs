//! # Error Types
//!
//! Errors raised while constructing core values. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! These are construction-time failures. Problems found while checking a
//! build description against a schema are not errors in this sense; they
//! are collected as [`Violation`](crate::Violation)s and reported together.

use thiserror::Error;

use crate::attribute::AttributeType;

/// Top-level error type for ruledef core values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A string could not be parsed as a label.
    #[error("invalid label {label:?}: {reason}")]
    InvalidLabel {
        /// The rejected input.
        label: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An attribute type name was not recognized.
    #[error("unknown attribute type: {0:?}")]
    UnknownAttributeType(String),

    /// A constraint was attached to an attribute type it cannot apply to.
    #[error("constraint {constraint} cannot apply to {value_type} attributes: {reason}")]
    IncompatibleConstraint {
        /// Display name of the constraint.
        constraint: String,
        /// The attribute type it was attached to.
        value_type: AttributeType,
        /// Why the pairing is rejected.
        reason: String,
    },

    /// A file suffix in an allowed-file-types set was malformed.
    #[error("invalid file type suffix {0:?}: suffixes must be non-empty")]
    InvalidFileType(String),
}
