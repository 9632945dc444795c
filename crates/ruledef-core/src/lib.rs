//! # ruledef-core — Foundational Types for Rule Definitions
//!
//! This crate defines the value types shared by schema construction,
//! attribute validation and the external build layers that consume them.
//! Every other crate in the workspace depends on `ruledef-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One `AttributeType` enum.** Exhaustive `match` everywhere, so a new
//!    value type forces shape checking and constraint compatibility to
//!    handle it.
//!
//! 2. **Constraints are plain values.** `TypeConstraint` holds no state and
//!    evaluates purely, so a schema's constraint lists can be read from any
//!    number of threads.
//!
//! 3. **Structural keys.** `ContextKey` equality and hashing are derived
//!    from its full field list. Output groups live in a `BTreeSet` so
//!    insertion order never leaks into identity.
//!
//! 4. **Problems are data.** Construction errors are `CoreError`; problems
//!    in a build description are `Violation`s, collected and reported
//!    together.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ruledef-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod attribute;
pub mod constraint;
pub mod context;
pub mod error;
pub mod label;
pub mod timing;
pub mod violation;

// Re-export primary types for ergonomic imports.
pub use attribute::{AttributeType, AttributeValue};
pub use constraint::{FileTypeSet, TypeConstraint};
pub use context::ContextKey;
pub use error::CoreError;
pub use label::Label;
pub use timing::{StartTimestamp, TimingObserver, WorkTimingRecord};
pub use violation::{Violation, ViolationKind};
