//! # Built-in Rule Types
//!
//! Rule types every registry created by
//! [`RuleRegistry::with_builtin_rules`](crate::RuleRegistry::with_builtin_rules)
//! starts with, registered in this order:
//!
//! | Rule | Ancestors | Own attributes |
//! |------|-----------|----------------|
//! | `base_rule` | (none) | `name`, `visibility`, `tags`, `deprecation`, `testonly` |
//! | `objc_uses_tools` | (none) | `plmerge`, `xcodegen` |
//! | `objc_bundle` | `base_rule`, `objc_uses_tools` | `bundle_imports` |

use ruledef_core::{AttributeType, FileTypeSet, TypeConstraint};

use crate::registry::{RegistryError, RuleRegistry};
use crate::schema::{SchemaBuilder, SchemaError};

/// Attributes shared by every buildable rule.
pub const BASE_RULE: &str = "base_rule";
/// Tool attributes shared by Objective-C rules.
pub const OBJC_USES_TOOLS: &str = "objc_uses_tools";
/// An already-built bundle, defined by the files in one or more `.bundle` directories.
pub const OBJC_BUNDLE: &str = "objc_bundle";

/// Register the built-in rule types, ancestors first.
pub fn register_builtin_rules(registry: &mut RuleRegistry) -> Result<(), RegistryError> {
    registry.register(BASE_RULE, &[], define_base_rule)?;
    registry.register(OBJC_USES_TOOLS, &[], define_objc_uses_tools)?;
    registry.register(OBJC_BUNDLE, &[BASE_RULE, OBJC_USES_TOOLS], define_objc_bundle)?;
    Ok(())
}

fn define_base_rule(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    b.declare_attribute("name", AttributeType::String, [TypeConstraint::Mandatory])?
        .declare_attribute("visibility", AttributeType::LabelList, [])?
        .declare_attribute("tags", AttributeType::StringList, [])?
        .declare_attribute("deprecation", AttributeType::String, [])?
        .declare_attribute("testonly", AttributeType::Bool, [])?;
    Ok(())
}

fn define_objc_uses_tools(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let any_file = || [TypeConstraint::AllowedFileTypes(FileTypeSet::any())];
    b.declare_attribute("plmerge", AttributeType::Label, any_file())?
        .declare_attribute("xcodegen", AttributeType::Label, any_file())?;
    Ok(())
}

fn define_objc_bundle(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    // The files under the `.bundle` directories, provided to Objective-C
    // targets that depend on this one.
    b.declare_attribute(
        "bundle_imports",
        AttributeType::LabelList,
        [
            TypeConstraint::Mandatory,
            TypeConstraint::NonEmpty,
            TypeConstraint::AllowedFileTypes(FileTypeSet::any()),
        ],
    )?;
    Ok(())
}
