//! # Attribute Validation
//!
//! Checks the raw attribute values of one target in a build description
//! against its rule type's [`RuleSchema`].
//!
//! ## Reporting
//!
//! Validation is not fail-fast. Every attribute is checked and every
//! problem is collected into one [`ValidationReport`], so the author of a
//! build description sees all of them in a single pass. An empty report
//! means the values are valid; turning them into a rule instance is the
//! caller's business.
//!
//! ## Order
//!
//! Attributes are checked in schema order. For each one:
//!
//! 1. `Mandatory` and absent: `MissingMandatoryAttribute`.
//! 2. Present with the wrong shape: `TypeMismatch`, and the remaining
//!    constraints of that attribute are skipped.
//! 3. Otherwise every other constraint is applied.
//!
//! Supplied values the schema does not declare are then reported as
//! `UnknownAttribute`, in sorted name order.
//!
//! ## Concurrency
//!
//! [`validate`] is a pure function of its two borrowed inputs and may run
//! on any number of threads against one shared schema.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use ruledef_core::{AttributeValue, TypeConstraint, Violation};

use crate::schema::RuleSchema;

/// Attribute values of one target, keyed by attribute name.
pub type RawAttributes = BTreeMap<String, AttributeValue>;

/// All violations found by one [`validate`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    rule: String,
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// The rule type the values were checked against.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations, in reporting order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations concerning one attribute.
    pub fn for_attribute<'a>(
        &'a self,
        attribute: &'a str,
    ) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.attribute == attribute)
    }

    /// `Ok(())` for an empty report, otherwise a [`ValidationError`].
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { report: self })
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A non-empty validation report, as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} violation(s) of rule '{}':\n{report}", .report.len(), .report.rule())]
pub struct ValidationError {
    /// The violations found.
    pub report: ValidationReport,
}

/// Validate the attribute values of one target against `schema`.
pub fn validate(schema: &RuleSchema, raw: &RawAttributes) -> ValidationReport {
    let mut violations = Vec::new();

    for spec in schema.attributes() {
        let value = raw.get(spec.name());

        if let Some(value) = value {
            if let Err(reason) = spec.value_type().check_shape(value) {
                violations.push(Violation::type_mismatch(spec.name(), spec.value_type(), &reason));
                continue;
            }
        }

        // Mandatory first, so a missing value is reported ahead of anything else.
        let (mandatory, rest): (Vec<&TypeConstraint>, Vec<&TypeConstraint>) = spec
            .constraints()
            .iter()
            .partition(|c| matches!(c, TypeConstraint::Mandatory));
        for constraint in mandatory.into_iter().chain(rest) {
            violations.extend(constraint.violations(spec.name(), value));
        }
    }

    for name in raw.keys() {
        if !schema.contains(name) {
            violations.push(Violation::unknown_attribute(name, schema.name()));
        }
    }

    tracing::debug!(
        rule = %schema.name(),
        supplied = raw.len(),
        violations = violations.len(),
        "validated attribute values"
    );

    ValidationReport {
        rule: schema.name().to_string(),
        violations,
    }
}

impl RuleSchema {
    /// Validate the attribute values of one target against this schema.
    ///
    /// Shorthand for [`validate`].
    pub fn validate(&self, raw: &RawAttributes) -> ValidationReport {
        validate(self, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;
    use ruledef_core::{AttributeType, FileTypeSet, ViolationKind};

    fn raw(pairs: &[(&str, AttributeValue)]) -> RawAttributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn library_schema() -> RuleSchema {
        let mut b = SchemaBuilder::new("library");
        b.declare_attribute("name", AttributeType::String, [TypeConstraint::Mandatory])
            .unwrap()
            .declare_attribute(
                "srcs",
                AttributeType::LabelList,
                [
                    TypeConstraint::NonEmpty,
                    TypeConstraint::AllowedFileTypes(FileTypeSet::of([".c", ".h"]).unwrap()),
                ],
            )
            .unwrap()
            .declare_attribute("linkstatic", AttributeType::Bool, [])
            .unwrap();
        b.build().unwrap()
    }

    fn kinds(report: &ValidationReport) -> Vec<(&str, &ViolationKind)> {
        report
            .violations()
            .iter()
            .map(|v| (v.attribute.as_str(), &v.kind))
            .collect()
    }

    #[test]
    fn test_valid_values_give_empty_report() {
        let report = validate(
            &library_schema(),
            &raw(&[
                ("name", "lib".into()),
                ("srcs", AttributeValue::text_list(["a.c", "a.h"])),
                ("linkstatic", true.into()),
            ]),
        );
        assert!(report.is_empty(), "unexpected violations:\n{report}");
        assert_eq!(report.rule(), "library");
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_optional_attributes_may_be_absent() {
        let report = validate(&library_schema(), &raw(&[("name", "lib".into())]));
        assert!(report.is_empty(), "unexpected violations:\n{report}");
    }

    #[test]
    fn test_all_violations_are_collected() {
        let report = validate(
            &library_schema(),
            &raw(&[
                ("srcs", AttributeValue::text_list(["a.c", "notes.txt"])),
                ("linkstatic", "yes".into()),
                ("copts", AttributeValue::text_list(["-O2"])),
            ]),
        );
        assert_eq!(
            kinds(&report),
            vec![
                ("name", &ViolationKind::MissingMandatoryAttribute),
                (
                    "srcs",
                    &ViolationKind::DisallowedFileType {
                        value: "notes.txt".to_string()
                    }
                ),
                (
                    "linkstatic",
                    &ViolationKind::TypeMismatch {
                        expected: AttributeType::Bool
                    }
                ),
                ("copts", &ViolationKind::UnknownAttribute),
            ]
        );
    }

    #[test]
    fn test_type_mismatch_skips_remaining_constraints() {
        let report = validate(
            &library_schema(),
            &raw(&[("name", "lib".into()), ("srcs", "single.txt".into())]),
        );
        assert_eq!(report.len(), 1);
        assert!(matches!(
            report.violations()[0].kind,
            ViolationKind::TypeMismatch {
                expected: AttributeType::LabelList
            }
        ));
    }

    #[test]
    fn test_unknown_attributes_reported_in_sorted_order() {
        let report = validate(
            &library_schema(),
            &raw(&[("name", "lib".into()), ("zeta", 1i64.into()), ("alpha", 2i64.into())]),
        );
        let names: Vec<_> = report.violations().iter().map(|v| v.attribute.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(report.violations()[0].message.contains("'library'"));
    }

    #[test]
    fn test_for_attribute_filters() {
        let report = validate(
            &library_schema(),
            &raw(&[
                ("name", "lib".into()),
                ("srcs", AttributeValue::text_list(["x.txt", "y.txt"])),
            ]),
        );
        assert_eq!(report.for_attribute("srcs").count(), 2);
        assert_eq!(report.for_attribute("name").count(), 0);
    }

    #[test]
    fn test_into_result_error_display() {
        let err = validate(&library_schema(), &RawAttributes::new())
            .into_result()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("1 violation(s) of rule 'library':"), "{msg}");
        assert!(msg.contains("name: missing value"), "{msg}");
    }

    #[test]
    fn test_mandatory_reported_before_other_constraints() {
        let mut b = SchemaBuilder::new("r");
        b.declare_attribute(
            "xs",
            AttributeType::LabelList,
            [TypeConstraint::NonEmpty, TypeConstraint::Mandatory],
        )
        .unwrap();
        let report = validate(&b.build().unwrap(), &RawAttributes::new());
        assert_eq!(kinds(&report), vec![("xs", &ViolationKind::MissingMandatoryAttribute)]);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = validate(&library_schema(), &RawAttributes::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rule"], "library");
        assert_eq!(json["violations"][0]["kind"], "missing_mandatory_attribute");
    }
}
