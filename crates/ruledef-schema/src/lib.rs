//! # ruledef-schema — Rule Schemas & Attribute Validation
//!
//! Declares the attribute shape of rule types and checks the attribute
//! values of build-description targets against it.
//!
//! ## Schema Construction (`schema`)
//!
//! [`SchemaBuilder`] collects attribute declarations, merges in ancestor
//! schemas and freezes the result as a [`RuleSchema`]. Every malformed
//! declaration is a [`SchemaError`]: a rule type that cannot be described
//! consistently is never registered.
//!
//! ## Validation (`validate`)
//!
//! [`validate`] checks one target's raw attribute values and returns a
//! [`ValidationReport`] holding every violation found. Reports are data,
//! not errors; the caller decides whether a non-empty report fails the
//! target.
//!
//! ## Registry (`registry`, `builtin`)
//!
//! [`RuleRegistry`] maps rule type names to schemas. Rule types are
//! registered explicitly, ancestors first, so startup is deterministic.
//!
//! ## Crate Policy
//!
//! - Depends only on `ruledef-core` internally.
//! - Schemas are immutable once built and shared as `Arc<RuleSchema>`.
//! - Validation is a pure function; it never panics on any input.

pub mod builtin;
pub mod registry;
pub mod schema;
pub mod validate;

pub use registry::{RegistryError, RuleRegistry};
pub use schema::{AttributeSpec, RuleSchema, SchemaBuilder, SchemaError};
pub use validate::{validate, RawAttributes, ValidationError, ValidationReport};
