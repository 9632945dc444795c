//! # Context Keys
//!
//! [`ContextKey`] captures the command-level options that decide which
//! outputs of top-level targets get built: the command selector, the
//! `--compile_only`, `--compilation_prerequisites_only` and exclusive-test
//! switches, and the requested output groups.
//!
//! Build state is memoized in maps keyed by `ContextKey`, so equality and
//! hashing are purely structural. Output groups are held in a `BTreeSet`:
//! two keys built from the same groups in a different order are equal and
//! hash identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Immutable options controlling the set of artifacts built for top-level targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextKey {
    selector: String,
    compile_only: bool,
    prerequisites_only: bool,
    exclusive_tests: bool,
    output_groups: BTreeSet<String>,
}

impl ContextKey {
    /// Build a key from its five fields.
    pub fn new<I, S>(
        selector: impl Into<String>,
        compile_only: bool,
        prerequisites_only: bool,
        exclusive_tests: bool,
        output_groups: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selector: selector.into(),
            compile_only,
            prerequisites_only,
            exclusive_tests,
            output_groups: output_groups.into_iter().map(Into::into).collect(),
        }
    }

    /// The build command, e.g. `build` or `test`.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Value of the `--compile_only` flag.
    pub fn compile_only(&self) -> bool {
        self.compile_only
    }

    /// Value of the `--compilation_prerequisites_only` flag.
    pub fn prerequisites_only(&self) -> bool {
        self.prerequisites_only
    }

    /// Whether tests run in exclusive mode.
    pub fn exclusive_tests(&self) -> bool {
        self.exclusive_tests
    }

    /// The requested output groups, in sorted order.
    pub fn output_groups(&self) -> &BTreeSet<String> {
        &self.output_groups
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selector = if self.selector.is_empty() {
            "<default>"
        } else {
            &self.selector
        };
        write!(f, "{selector}")?;
        if self.compile_only {
            f.write_str(" +compile_only")?;
        }
        if self.prerequisites_only {
            f.write_str(" +prerequisites_only")?;
        }
        if self.exclusive_tests {
            f.write_str(" +exclusive_tests")?;
        }
        if !self.output_groups.is_empty() {
            let groups: Vec<&str> = self.output_groups.iter().map(String::as_str).collect();
            write!(f, " [{}]", groups.join(","))?;
        }
        Ok(())
    }
}
