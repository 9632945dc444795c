//! # Rule Schemas
//!
//! A [`RuleSchema`] describes the attribute shape of one rule type. It is
//! built once, at registration, by a [`SchemaBuilder`] that merges the
//! schemas of zero or more ancestor rule types with the rule's own
//! attribute declarations.
//!
//! ## Merge Order
//!
//! Ancestors are merged in the order given, then own declarations are
//! overlaid. An attribute keeps the position of its first appearance, so
//! iteration order is ancestor declaration order followed by the rule's
//! own new attributes.
//!
//! ## Conflict Policy
//!
//! - A name declared with different types by two ancestors, or by an
//!   ancestor and the rule itself, is an [`SchemaError::AncestorAttributeConflict`].
//! - Same-name, same-type declarations are allowed: a later ancestor's
//!   constraints replace an earlier one's, and own declarations replace
//!   any ancestor's.
//!
//! ## Thread Safety
//!
//! `RuleSchema` has no mutating API. Ancestors are shared through `Arc`,
//! so schemas are `Send + Sync` and can be read from any number of
//! validation threads without locking.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use ruledef_core::{AttributeType, CoreError, TypeConstraint};

/// Error while declaring attributes or building a schema.
///
/// All variants are construction-time failures: a rule type whose schema
/// fails to build must not be registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The same attribute name was declared twice in one builder.
    #[error("attribute '{attribute}' is declared more than once in rule '{rule}'")]
    DuplicateAttribute {
        /// Rule being built.
        rule: String,
        /// The repeated attribute name.
        attribute: String,
    },

    /// A constraint does not fit the attribute's value type.
    #[error("invalid constraint on attribute '{attribute}': {source}")]
    InvalidConstraint {
        /// Attribute carrying the constraint.
        attribute: String,
        /// The underlying incompatibility.
        #[source]
        source: CoreError,
    },

    /// Two declarations of one attribute name disagree on its type.
    #[error(
        "attribute '{attribute}' of rule '{rule}' is declared as {first_type} by '{first_origin}' \
         but as {second_type} by '{second_origin}'"
    )]
    AncestorAttributeConflict {
        /// Rule being built.
        rule: String,
        /// The conflicting attribute name.
        attribute: String,
        /// Schema that first declared the attribute.
        first_origin: String,
        /// Type given by the first declaration.
        first_type: AttributeType,
        /// Schema whose declaration conflicts.
        second_origin: String,
        /// Type given by the conflicting declaration.
        second_type: AttributeType,
    },

    /// The same kind of constraint appears more than once on one attribute.
    #[error("constraint '{constraint}' is given more than once on attribute '{attribute}'")]
    RepeatedConstraint {
        /// Attribute carrying the constraints.
        attribute: String,
        /// Name of the repeated constraint kind.
        constraint: &'static str,
    },

    /// An attribute name is not a valid identifier.
    #[error("invalid attribute name {name:?}: {reason}")]
    InvalidAttributeName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A rule type name is not a valid identifier.
    #[error(
        "invalid rule name {0:?}: names must be non-empty and contain only ASCII letters, \
         digits and '_'"
    )]
    InvalidRuleName(String),
}

/// One named, typed attribute and its constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSpec {
    name: String,
    value_type: AttributeType,
    constraints: Vec<TypeConstraint>,
}

impl AttributeSpec {
    /// Create an attribute spec, checking every constraint against the type.
    ///
    /// Attribute names start with an ASCII letter or `_` (or `$`/`:` for
    /// implicit and computed attributes) followed by ASCII letters, digits
    /// or `_`.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::InvalidAttributeName`] for a malformed name.
    /// - [`SchemaError::InvalidConstraint`] for the first constraint that
    ///   cannot apply to `value_type`.
    /// - [`SchemaError::RepeatedConstraint`] when a constraint kind is
    ///   given twice, even with different file type sets.
    pub fn new(
        name: impl Into<String>,
        value_type: AttributeType,
        constraints: impl IntoIterator<Item = TypeConstraint>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        check_attribute_name(&name)?;
        let constraints: Vec<TypeConstraint> = constraints.into_iter().collect();
        for (i, constraint) in constraints.iter().enumerate() {
            if constraints[..i].iter().any(|c| c.name() == constraint.name()) {
                return Err(SchemaError::RepeatedConstraint {
                    attribute: name,
                    constraint: constraint.name(),
                });
            }
            constraint
                .check_applicable(value_type)
                .map_err(|source| SchemaError::InvalidConstraint {
                    attribute: name.clone(),
                    source,
                })?;
        }
        Ok(Self {
            name,
            value_type,
            constraints,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> AttributeType {
        self.value_type
    }

    /// Constraints in declaration order.
    pub fn constraints(&self) -> &[TypeConstraint] {
        &self.constraints
    }

    /// True if a value must be supplied for this attribute.
    pub fn is_mandatory(&self) -> bool {
        self.constraints.contains(&TypeConstraint::Mandatory)
    }
}

fn check_attribute_name(name: &str) -> Result<(), SchemaError> {
    let invalid = |reason: &str| SchemaError::InvalidAttributeName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    let body = name.strip_prefix(&['$', ':'][..]).unwrap_or(name);
    let mut chars = body.chars();
    match chars.next() {
        None => return Err(invalid("name is empty")),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err(invalid("name must start with a letter or '_'"));
        }
        Some(_) => {}
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return Err(invalid("name may contain only ASCII letters, digits and '_'"));
    }
    Ok(())
}

fn is_valid_rule_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The immutable attribute shape of a rule type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSchema {
    name: String,
    ancestors: Vec<Arc<RuleSchema>>,
    attributes: Vec<AttributeSpec>,
    index: HashMap<String, usize>,
}

impl RuleSchema {
    /// The rule type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct ancestors, in merge order.
    pub fn ancestors(&self) -> &[Arc<RuleSchema>] {
        &self.ancestors
    }

    /// All attributes, own and inherited, in merge order.
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Attribute names in merge order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(AttributeSpec::name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// True if `name` is this rule type or any transitive ancestor of it.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.ancestors.iter().any(|a| a.is_a(name))
    }
}

/// Accumulates attribute declarations and ancestors for one rule type.
///
/// Constraint compatibility and duplicate names are checked as each
/// attribute is declared; ancestor conflicts are checked by
/// [`SchemaBuilder::build`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    ancestors: Vec<Arc<RuleSchema>>,
    attributes: Vec<AttributeSpec>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ancestors: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// The rule type being built.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append ancestors to merge, in the given order.
    pub fn with_ancestors(mut self, ancestors: impl IntoIterator<Item = Arc<RuleSchema>>) -> Self {
        self.ancestors.extend(ancestors);
        self
    }

    /// Declare an attribute owned by this rule type.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::DuplicateAttribute`] if `name` was already declared
    ///   in this builder.
    /// - Any error from [`AttributeSpec::new`].
    pub fn declare_attribute(
        &mut self,
        name: impl Into<String>,
        value_type: AttributeType,
        constraints: impl IntoIterator<Item = TypeConstraint>,
    ) -> Result<&mut Self, SchemaError> {
        let spec = AttributeSpec::new(name, value_type, constraints)?;
        self.declare(spec)
    }

    /// Declare a pre-built attribute spec.
    pub fn declare(&mut self, spec: AttributeSpec) -> Result<&mut Self, SchemaError> {
        if self.attributes.iter().any(|a| a.name == spec.name) {
            return Err(SchemaError::DuplicateAttribute {
                rule: self.name.clone(),
                attribute: spec.name,
            });
        }
        self.attributes.push(spec);
        Ok(self)
    }

    /// Merge ancestors with own declarations and freeze the result.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::InvalidRuleName`] for a malformed rule name.
    /// - [`SchemaError::AncestorAttributeConflict`] when two declarations
    ///   of one name disagree on type.
    pub fn build(self) -> Result<RuleSchema, SchemaError> {
        if !is_valid_rule_name(&self.name) {
            return Err(SchemaError::InvalidRuleName(self.name));
        }
        let (attributes, index) = merge_attributes(&self.name, &self.ancestors, self.attributes)?;
        tracing::debug!(
            rule = %self.name,
            ancestors = self.ancestors.len(),
            attributes = attributes.len(),
            "built rule schema"
        );
        Ok(RuleSchema {
            name: self.name,
            ancestors: self.ancestors,
            attributes,
            index,
        })
    }
}

/// Merge ancestor attributes in order, then overlay `own`.
///
/// Pure function of its inputs: the same ancestors and declarations always
/// yield the same attribute list.
fn merge_attributes(
    rule: &str,
    ancestors: &[Arc<RuleSchema>],
    own: Vec<AttributeSpec>,
) -> Result<(Vec<AttributeSpec>, HashMap<String, usize>), SchemaError> {
    let mut merged: Vec<(AttributeSpec, String)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let inherited = ancestors
        .iter()
        .flat_map(|a| a.attributes.iter().map(move |spec| (spec.clone(), a.name.clone())));
    let declared = own.into_iter().map(|spec| (spec, rule.to_string()));

    for (spec, origin) in inherited.chain(declared) {
        match index.get(&spec.name).copied() {
            None => {
                index.insert(spec.name.clone(), merged.len());
                merged.push((spec, origin));
            }
            Some(i) => {
                let (existing, existing_origin) = &merged[i];
                if existing.value_type != spec.value_type {
                    return Err(SchemaError::AncestorAttributeConflict {
                        rule: rule.to_string(),
                        attribute: spec.name,
                        first_origin: existing_origin.clone(),
                        first_type: existing.value_type,
                        second_origin: origin,
                        second_type: spec.value_type,
                    });
                }
                tracing::trace!(
                    rule,
                    attribute = %spec.name,
                    from = %existing_origin,
                    to = %origin,
                    "attribute constraints overridden"
                );
                merged[i] = (spec, origin);
            }
        }
    }

    Ok((merged.into_iter().map(|(spec, _)| spec).collect(), index))
}
