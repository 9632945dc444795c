//! # ruledef CLI entry point
//!
//! Parses command-line arguments, registers the built-in rule types and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ruledef_cli::rules::{run_rules, RulesArgs};
use ruledef_cli::validate::{run_validate, ValidateArgs};
use ruledef_schema::RuleRegistry;

/// Rule schema inspection and build-description validation.
#[derive(Parser, Debug)]
#[command(name = "ruledef", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered rule types and their attributes.
    Rules(RulesArgs),

    /// Validate the targets of a build description.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG, when set, overrides the verbosity flag.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry = match RuleRegistry::with_builtin_rules() {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };
    tracing::debug!(rule_types = registry.len(), "registered built-in rule types");

    let result = match cli.command {
        Commands::Rules(args) => run_rules(&args, &registry),
        Commands::Validate(args) => run_validate(&args, &registry),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_validate_with_context_flags() {
        let cli = Cli::try_parse_from([
            "ruledef",
            "validate",
            "BUILD.yaml",
            "--compile-only",
            "--output-groups",
            "headers,sources",
        ])
        .unwrap();
        match cli.command {
            Commands::Validate(args) => {
                let key = args.context.to_context_key();
                assert_eq!(key.selector(), "build");
                assert!(key.compile_only());
                assert!(!key.exclusive_tests());
                assert_eq!(key.output_groups().len(), 2);
            }
            other => panic!("expected validate, got {other:?}"),
        }
    }

    #[test]
    fn cli_parse_rules_with_filter() {
        let cli =
            Cli::try_parse_from(["ruledef", "-vv", "rules", "objc_bundle", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Rules(args) => {
                assert_eq!(args.rule.as_deref(), Some("objc_bundle"));
                assert!(args.json);
            }
            other => panic!("expected rules, got {other:?}"),
        }
    }

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["ruledef"]).is_err());
    }
}
