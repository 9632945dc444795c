//! # Type Constraints
//!
//! Predicates attached to rule attributes. A constraint is a plain value:
//! it holds no state and evaluating it has no side effects, so one
//! constraint list can be shared by any number of concurrent validations.
//!
//! Whether a constraint may be attached to an attribute at all is decided
//! once, when the attribute is declared, by
//! [`TypeConstraint::check_applicable`]. Evaluation assumes the value has
//! already passed the attribute's shape check.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::attribute::{AttributeType, AttributeValue};
use crate::error::CoreError;
use crate::violation::Violation;

/// The set of file suffixes a file-like attribute accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileTypeSet {
    /// Every file is accepted.
    Any,
    /// Only files ending in one of these suffixes are accepted.
    Only(BTreeSet<String>),
}

impl FileTypeSet {
    /// A set accepting every file.
    pub fn any() -> Self {
        Self::Any
    }

    /// A set accepting no file at all.
    pub fn none() -> Self {
        Self::Only(BTreeSet::new())
    }

    /// A set accepting exactly the given suffixes, e.g. `[".png", ".jpg"]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFileType`] for an empty suffix, which
    /// would otherwise silently accept every file.
    pub fn of<I, S>(suffixes: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for suffix in suffixes {
            let suffix = suffix.into();
            if suffix.is_empty() {
                return Err(CoreError::InvalidFileType(suffix));
            }
            set.insert(suffix);
        }
        Ok(Self::Only(set))
    }

    /// True if this set accepts every file.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// True if `path` is accepted by this set.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(suffixes) => suffixes.iter().any(|s| path.ends_with(s.as_str())),
        }
    }
}

impl fmt::Display for FileTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any file"),
            Self::Only(suffixes) if suffixes.is_empty() => f.write_str("no files"),
            Self::Only(suffixes) => {
                let joined: Vec<&str> = suffixes.iter().map(String::as_str).collect();
                f.write_str(&joined.join(", "))
            }
        }
    }
}

/// A validation predicate attached to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeConstraint {
    /// The attribute must be given a value.
    Mandatory,
    /// A list-typed value must have at least one element.
    NonEmpty,
    /// Every file-like value must match the set.
    AllowedFileTypes(FileTypeSet),
}

impl TypeConstraint {
    /// Stable snake_case name of the constraint.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::NonEmpty => "non_empty",
            Self::AllowedFileTypes(_) => "allowed_file_types",
        }
    }

    /// Check that this constraint can be attached to an attribute of type `ty`.
    ///
    /// # Errors
    ///
    /// - `NonEmpty` requires a collection type.
    /// - `AllowedFileTypes` requires a file-like type.
    pub fn check_applicable(&self, ty: AttributeType) -> Result<(), CoreError> {
        let reason = match self {
            Self::Mandatory => None,
            Self::NonEmpty if !ty.is_collection() => Some("only list types can be non-empty"),
            Self::AllowedFileTypes(_) if !ty.is_file_like() => {
                Some("only label types refer to files")
            }
            Self::NonEmpty | Self::AllowedFileTypes(_) => None,
        };
        match reason {
            None => Ok(()),
            Some(reason) => Err(CoreError::IncompatibleConstraint {
                constraint: self.name().to_string(),
                value_type: ty,
                reason: reason.to_string(),
            }),
        }
    }

    /// Evaluate the constraint against the value given for `attribute`,
    /// `None` meaning the build description left it unset.
    ///
    /// Returns every violation found; an empty vector means the
    /// constraint holds. `AllowedFileTypes` reports each offending list
    /// element separately.
    pub fn violations(
        &self,
        attribute: &str,
        value: Option<&AttributeValue>,
    ) -> Vec<Violation> {
        match (self, value) {
            (Self::Mandatory, None) => vec![Violation::missing_mandatory(attribute)],
            (Self::Mandatory, Some(_)) => Vec::new(),
            (Self::NonEmpty, Some(AttributeValue::List(items))) if items.is_empty() => {
                vec![Violation::empty_collection(attribute)]
            }
            (Self::NonEmpty, _) => Vec::new(),
            (Self::AllowedFileTypes(set), Some(value)) => {
                file_type_violations(attribute, set, value)
            }
            (Self::AllowedFileTypes(_), None) => Vec::new(),
        }
    }

    /// True if the constraint holds for `value`.
    pub fn is_satisfied_by(&self, value: Option<&AttributeValue>) -> bool {
        self.violations("", value).is_empty()
    }
}

fn file_type_violations(
    attribute: &str,
    set: &FileTypeSet,
    value: &AttributeValue,
) -> Vec<Violation> {
    if set.is_any() {
        return Vec::new();
    }
    let paths: Vec<&str> = match value {
        AttributeValue::Text(s) => vec![s.as_str()],
        AttributeValue::List(items) => {
            items.iter().filter_map(AttributeValue::as_text).collect()
        }
        AttributeValue::Bool(_)
        | AttributeValue::Integer(_)
        | AttributeValue::Float(_)
        | AttributeValue::Map(_)
        | AttributeValue::Null => Vec::new(),
    };
    let allowed = set.to_string();
    paths
        .into_iter()
        .filter(|p| !set.matches(p))
        .map(|p| Violation::disallowed_file_type(attribute, p, &allowed))
        .collect()
}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllowedFileTypes(set) => write!(f, "allowed_file_types({set})"),
            other => f.write_str(other.name()),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The `Any` set accepts every suffix.
        #[test]
        fn any_accepts_every_path(path in "[a-zA-Z0-9_./]{1,40}") {
            let c = TypeConstraint::AllowedFileTypes(FileTypeSet::any());
            prop_assert!(c.is_satisfied_by(Some(&AttributeValue::text(path))));
        }

        /// A restricted set accepts exactly the paths ending in one of its suffixes.
        #[test]
        fn restricted_set_accepts_exactly_its_suffixes(
            stem in "[a-z]{1,10}",
            suffixes in prop::collection::btree_set("\\.[a-z]{1,4}", 1..5),
            other in "\\.[A-Z]{1,4}",
        ) {
            let set = FileTypeSet::of(suffixes.iter().cloned()).unwrap();
            for s in &suffixes {
                let name = format!("{stem}{s}");
                prop_assert!(set.matches(&name));
            }
            // Upper-case suffixes never end with a lower-case one.
            let name = format!("{stem}{other}");
            prop_assert!(!set.matches(&name));
        }

        /// Empty lists fail NonEmpty regardless of the declared element type.
        #[test]
        fn empty_list_always_fails_non_empty(ty in prop::sample::select(vec![
            AttributeType::LabelList,
            AttributeType::StringList,
        ])) {
            prop_assert!(TypeConstraint::NonEmpty.check_applicable(ty).is_ok());
            let v = TypeConstraint::NonEmpty.violations("xs", Some(&AttributeValue::List(vec![])));
            prop_assert_eq!(v.len(), 1);
        }
    }
}
