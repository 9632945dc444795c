//! # Rules Subcommand
//!
//! Lists registered rule types with their merged attributes.

use anyhow::{bail, Result};
use clap::Args;

use ruledef_core::TypeConstraint;
use ruledef_schema::{RuleRegistry, RuleSchema};

/// Arguments for the rules subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Show only this rule type.
    pub rule: Option<String>,

    /// Print rule types as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Render one schema as indented text.
pub fn describe_schema(schema: &RuleSchema) -> String {
    let mut out = schema.name().to_string();
    if !schema.ancestors().is_empty() {
        let parents: Vec<&str> = schema.ancestors().iter().map(|a| a.name()).collect();
        out.push_str(&format!(" (inherits {})", parents.join(", ")));
    }
    for spec in schema.attributes() {
        out.push_str(&format!("\n  {}: {}", spec.name(), spec.value_type()));
        if !spec.constraints().is_empty() {
            let constraints: Vec<String> =
                spec.constraints().iter().map(TypeConstraint::to_string).collect();
            out.push_str(&format!(" [{}]", constraints.join(", ")));
        }
    }
    out
}

fn schema_json(schema: &RuleSchema) -> serde_json::Value {
    serde_json::json!({
        "name": schema.name(),
        "ancestors": schema.ancestors().iter().map(|a| a.name()).collect::<Vec<_>>(),
        "attributes": schema.attributes(),
    })
}

/// Execute the rules subcommand.
pub fn run_rules(args: &RulesArgs, registry: &RuleRegistry) -> Result<u8> {
    let schemas: Vec<_> = match &args.rule {
        Some(name) => match registry.get(name) {
            Some(schema) => vec![schema],
            None => bail!("unknown rule type '{name}'"),
        },
        None => registry.schemas().collect(),
    };

    if args.json {
        let out: Vec<_> = schemas.iter().map(|s| schema_json(s)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for schema in schemas {
            println!("{}\n", describe_schema(schema));
        }
    }
    Ok(0)
}
