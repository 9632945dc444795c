//! Integration tests: the `bundle_imports` scenarios against a hand-built
//! schema and against the registered `objc_bundle` rule type, with raw
//! values read from YAML the way a build-description parser supplies them.

use std::sync::Arc;

use ruledef_core::{AttributeType, AttributeValue, FileTypeSet, TypeConstraint, ViolationKind};
use ruledef_schema::builtin::OBJC_BUNDLE;
use ruledef_schema::{validate, RawAttributes, RuleRegistry, RuleSchema, SchemaBuilder};

fn bundle_schema() -> RuleSchema {
    let mut b = SchemaBuilder::new("bundle");
    b.declare_attribute(
        "bundle_imports",
        AttributeType::LabelList,
        [
            TypeConstraint::Mandatory,
            TypeConstraint::NonEmpty,
            TypeConstraint::AllowedFileTypes(FileTypeSet::any()),
        ],
    )
    .expect("declaration should be valid");
    b.build().expect("schema should build")
}

fn yaml(src: &str) -> RawAttributes {
    serde_yaml::from_str(src).expect("raw attributes should parse")
}

#[test]
fn test_missing_bundle_imports() {
    let report = validate(&bundle_schema(), &RawAttributes::new());
    assert_eq!(report.len(), 1);
    let v = &report.violations()[0];
    assert_eq!(v.attribute, "bundle_imports");
    assert_eq!(v.kind, ViolationKind::MissingMandatoryAttribute);
}

#[test]
fn test_empty_bundle_imports() {
    let report = validate(&bundle_schema(), &yaml("bundle_imports: []"));
    assert_eq!(report.len(), 1);
    let v = &report.violations()[0];
    assert_eq!(v.attribute, "bundle_imports");
    assert_eq!(v.kind, ViolationKind::EmptyRequiredCollection);
}

#[test]
fn test_single_bundle_import_is_valid() {
    let report = validate(&bundle_schema(), &yaml("bundle_imports: [a.bundle/x.png]"));
    assert!(report.is_empty(), "unexpected violations:\n{report}");
}

#[test]
fn test_registered_objc_bundle_target() {
    let registry = RuleRegistry::with_builtin_rules().expect("builtins should register");
    let raw = yaml(
        "name: assets\n\
         bundle_imports:\n  - a.bundle/x.png\n  - a.bundle/y.strings\n\
         tags: [manual]\n\
         testonly: false\n",
    );
    let report = registry.validate(OBJC_BUNDLE, &raw).expect("rule type exists");
    assert!(report.is_empty(), "unexpected violations:\n{report}");
}

#[test]
fn test_registered_objc_bundle_reports_everything_at_once() {
    let registry = RuleRegistry::with_builtin_rules().expect("builtins should register");
    let raw = yaml(
        "bundle_imports: []\n\
         testonly: maybe\n\
         visibility: [\"//visibility:public\", \"not a label\"]\n\
         srcs: [main.m]\n",
    );
    let report = registry.validate(OBJC_BUNDLE, &raw).expect("rule type exists");
    let got: Vec<(&str, &str)> = report
        .violations()
        .iter()
        .map(|v| (v.attribute.as_str(), v.kind.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("name", "missing_mandatory_attribute"),
            ("visibility", "type_mismatch"),
            ("testonly", "type_mismatch"),
            ("bundle_imports", "empty_required_collection"),
            ("srcs", "unknown_attribute"),
        ]
    );
}

#[test]
fn test_concurrent_validation_shares_one_schema() {
    let schema = Arc::new(bundle_schema());
    let inputs = vec![
        RawAttributes::new(),
        yaml("bundle_imports: []"),
        yaml("bundle_imports: [a.bundle/x.png]"),
    ];
    let expected: Vec<usize> = inputs.iter().map(|raw| schema.validate(raw).len()).collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let schema = Arc::clone(&schema);
            let inputs = inputs.clone();
            std::thread::spawn(move || {
                inputs
                    .iter()
                    .map(|raw| schema.validate(raw).len())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().expect("thread should not panic"), expected);
    }
    assert_eq!(expected, vec![1, 1, 0]);
}

#[test]
fn test_values_built_in_code_match_yaml() {
    let from_code: RawAttributes = [(
        "bundle_imports".to_string(),
        AttributeValue::text_list(["a.bundle/x.png"]),
    )]
    .into_iter()
    .collect();
    assert_eq!(from_code, yaml("bundle_imports: [a.bundle/x.png]"));
}
