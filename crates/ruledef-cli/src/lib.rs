//! # ruledef-cli — Rule Definition Command-Line Interface
//!
//! A thin clap-based front end over `ruledef-schema`.
//!
//! ## Subcommands
//!
//! - `rules` — List registered rule types and their attributes
//! - `validate` — Check a build description's targets against their rule types
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the domain crates.
//! - Handlers return the process exit code; errors are reported by `main`.

pub mod description;
pub mod rules;
pub mod validate;
