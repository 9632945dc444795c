//! # Rule Registry
//!
//! Maps rule type names to their built [`RuleSchema`]s.
//!
//! Rule types are registered explicitly, by name, with the names of their
//! ancestors and a definition function that declares their own attributes.
//! Ancestors must already be registered, so the registration sequence is a
//! topological order of the inheritance graph and startup is fully
//! deterministic.
//!
//! After startup the registry is only read. Schemas are handed out as
//! `Arc<RuleSchema>` and can be shared with validation threads.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::builtin;
use crate::schema::{RuleSchema, SchemaBuilder, SchemaError};
use crate::validate::{RawAttributes, ValidationReport};

/// Error while registering or looking up a rule type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A rule type with this name is already registered.
    #[error("rule type '{0}' is already registered")]
    DuplicateRuleType(String),

    /// A rule type names an ancestor that has not been registered.
    #[error("rule type '{rule}' names unknown ancestor '{ancestor}'")]
    UnknownAncestor {
        /// Rule being registered.
        rule: String,
        /// The missing ancestor.
        ancestor: String,
    },

    /// No rule type with this name is registered.
    #[error("unknown rule type '{0}'")]
    UnknownRuleType(String),

    /// The rule type's schema failed to build.
    #[error("cannot register rule type '{rule}': {source}")]
    Schema {
        /// Rule being registered.
        rule: String,
        /// The construction failure.
        #[source]
        source: SchemaError,
    },
}

/// The set of registered rule types.
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    order: Vec<String>,
    schemas: HashMap<String, Arc<RuleSchema>>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in rule types.
    pub fn with_builtin_rules() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        builtin::register_builtin_rules(&mut registry)?;
        Ok(registry)
    }

    /// Register a rule type.
    ///
    /// `define` declares the rule's own attributes on a builder already
    /// seeded with the named ancestors.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateRuleType`] if `name` is taken.
    /// - [`RegistryError::UnknownAncestor`] if an ancestor is not registered.
    /// - [`RegistryError::Schema`] if `define` or the merge fails; nothing
    ///   is registered in that case.
    pub fn register<F>(
        &mut self,
        name: &str,
        ancestors: &[&str],
        define: F,
    ) -> Result<Arc<RuleSchema>, RegistryError>
    where
        F: FnOnce(&mut SchemaBuilder) -> Result<(), SchemaError>,
    {
        if self.schemas.contains_key(name) {
            return Err(RegistryError::DuplicateRuleType(name.to_string()));
        }
        let parents = ancestors
            .iter()
            .map(|a| {
                self.schemas
                    .get(*a)
                    .cloned()
                    .ok_or_else(|| RegistryError::UnknownAncestor {
                        rule: name.to_string(),
                        ancestor: a.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let schema_error = |source| RegistryError::Schema {
            rule: name.to_string(),
            source,
        };
        let mut builder = SchemaBuilder::new(name).with_ancestors(parents);
        define(&mut builder).map_err(schema_error)?;
        let schema = builder.build().map_err(schema_error)?;
        self.insert(schema)
    }

    /// Register a schema built elsewhere.
    ///
    /// The schema's ancestors are taken as they are; they need not be
    /// registered themselves.
    pub fn register_schema(
        &mut self,
        schema: RuleSchema,
    ) -> Result<Arc<RuleSchema>, RegistryError> {
        if self.schemas.contains_key(schema.name()) {
            return Err(RegistryError::DuplicateRuleType(schema.name().to_string()));
        }
        self.insert(schema)
    }

    fn insert(&mut self, schema: RuleSchema) -> Result<Arc<RuleSchema>, RegistryError> {
        let name = schema.name().to_string();
        let schema = Arc::new(schema);
        tracing::debug!(rule = %name, attributes = schema.len(), "registered rule type");
        self.order.push(name.clone());
        self.schemas.insert(name, Arc::clone(&schema));
        Ok(schema)
    }

    /// Look up a rule type.
    pub fn get(&self, name: &str) -> Option<&Arc<RuleSchema>> {
        self.schemas.get(name)
    }

    /// Rule type names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<RuleSchema>> {
        self.order.iter().filter_map(|n| self.schemas.get(n))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Validate the attribute values of one target of rule type `rule`.
    pub fn validate(
        &self,
        rule: &str,
        raw: &RawAttributes,
    ) -> Result<ValidationReport, RegistryError> {
        let schema = self
            .get(rule)
            .ok_or_else(|| RegistryError::UnknownRuleType(rule.to_string()))?;
        Ok(schema.validate(raw))
    }
}
