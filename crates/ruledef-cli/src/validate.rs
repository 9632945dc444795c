//! # Validate Subcommand
//!
//! Checks every target of a build description against the schema of its
//! rule type, under the build context given on the command line.
//!
//! ```bash
//! ruledef validate BUILD.yaml
//! ruledef validate BUILD.yaml --compile-only --output-groups headers,sources
//! ruledef validate BUILD.json --json
//! ```
//!
//! Exit code 0 when every target is valid, 1 otherwise.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use ruledef_core::{ContextKey, StartTimestamp, TimingObserver, WorkTimingRecord};
use ruledef_schema::{RuleRegistry, ValidationReport};

use crate::description::{BuildDescription, TargetDecl};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Build description to check (YAML or JSON).
    pub file: PathBuf,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Command flags selecting which outputs of top-level targets are built.
#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// Build command the context applies to.
    #[arg(long, default_value = "build")]
    pub selector: String,

    /// Build only compilation outputs.
    #[arg(long)]
    pub compile_only: bool,

    /// Build only the prerequisites of compilation.
    #[arg(long)]
    pub prerequisites_only: bool,

    /// Run tests exclusively.
    #[arg(long)]
    pub exclusive_tests: bool,

    /// Output groups to build (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub output_groups: Vec<String>,
}

impl ContextArgs {
    /// The context key these flags select.
    pub fn to_context_key(&self) -> ContextKey {
        ContextKey::new(
            self.selector.clone(),
            self.compile_only,
            self.prerequisites_only,
            self.exclusive_tests,
            self.output_groups.iter().cloned(),
        )
    }
}

/// Result of checking one target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    /// Display name of the target.
    pub target: String,
    /// Rule type named by the target.
    pub rule: String,
    /// Violations found, absent if the rule type is unknown.
    pub report: Option<ValidationReport>,
}

impl TargetOutcome {
    /// True if the target's rule type exists and its values are valid.
    pub fn is_valid(&self) -> bool {
        self.report.as_ref().is_some_and(ValidationReport::is_empty)
    }
}

/// Logs the start of each target check.
struct LogTimingObserver;

impl TimingObserver<TargetDecl> for LogTimingObserver {
    fn work_started(&self, record: WorkTimingRecord<TargetDecl>) {
        tracing::trace!(
            rule = %record.subject().rule,
            start = %record.start(),
            "target check started"
        );
    }
}

/// Check every target in `description`.
pub fn check_description(
    registry: &RuleRegistry,
    description: &BuildDescription,
    observer: &dyn TimingObserver<TargetDecl>,
) -> Vec<TargetOutcome> {
    description
        .targets
        .iter()
        .enumerate()
        .map(|(i, target)| {
            let subject = Arc::new(target.clone());
            let start = StartTimestamp::now();
            observer.work_started(WorkTimingRecord::new(Arc::clone(&subject), start));

            let report = match registry.get(&target.rule) {
                Some(schema) => Some(schema.validate(&target.attributes)),
                None => {
                    tracing::warn!(rule = %target.rule, index = i, "unknown rule type");
                    None
                }
            };

            if let Some(elapsed) = StartTimestamp::now().duration_since(start) {
                tracing::debug!(index = i, rule = %target.rule, ?elapsed, "target checked");
            }

            TargetOutcome {
                target: target.display_name(i),
                rule: target.rule.clone(),
                report,
            }
        })
        .collect()
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, registry: &RuleRegistry) -> Result<u8> {
    let key = args.context.to_context_key();
    tracing::info!(context = %key, file = %args.file.display(), "validating build description");

    let description = BuildDescription::load(&args.file)?;
    let outcomes = check_description(registry, &description, &LogTimingObserver);
    let failed = outcomes.iter().filter(|o| !o.is_valid()).count();

    if args.json {
        let out = serde_json::json!({
            "context": key,
            "targets": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for outcome in outcomes.iter().filter(|o| !o.is_valid()) {
            match &outcome.report {
                Some(report) => println!("{} ({}):\n{report}", outcome.target, outcome.rule),
                None => println!("{}: unknown rule type '{}'", outcome.target, outcome.rule),
            }
        }
        println!(
            "Checked {} target(s) under '{key}': {failed} with problems",
            outcomes.len()
        );
    }

    Ok(if failed == 0 { 0 } else { 1 })
}
