//! Sous CLI
//!
//! Offline tooling over JSON recipe and patch-set files. The library half
//! holds argument definitions and command logic so both can be tested
//! without spawning the binary.
//!
//! # Commands
//!
//! - `validate`: Print the validator's verdict
//! - `apply`: Print the recipe after atomic application
//! - `review`: Run the proposal through the review ledger and approve or reject it

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::de::DeserializeOwned;
use serde_json::json;
use sous_patch::{apply, validate, Validation};
use sous_recipe::{PatchSet, Recipe};
use sous_review::ReviewLedger;
use sous_session::{HiddenContext, SessionConfig};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// What a command printed and whether it succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Text for stdout
    pub output: String,
    /// Exit with status 0 when true
    pub success: bool,
}

impl Report {
    fn ok(output: String) -> Self {
        Self {
            output,
            success: true,
        }
    }

    fn failed(output: String) -> Self {
        Self {
            output,
            success: false,
        }
    }
}

/// Reviewer verdict for the `review` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the changes and purge removed rows
    Approve,
    /// Roll back and report the rejection
    Reject,
}

/// Argument definitions
#[must_use]
pub fn command() -> Command {
    let recipe_arg = Arg::new("recipe")
        .long("recipe")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Recipe JSON file");
    let patches_arg = Arg::new("patches")
        .long("patches")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Patch set JSON file");

    Command::new("sous")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate, apply and review recipe patch sets")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Session configuration (TOML)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a patch set against a recipe")
                .arg(recipe_arg.clone())
                .arg(patches_arg.clone())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply a patch set and print the new recipe")
                .arg(recipe_arg.clone())
                .arg(patches_arg.clone())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the new recipe here instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("review")
                .about("Propose a patch set to the review ledger and decide on it")
                .arg(recipe_arg)
                .arg(patches_arg)
                .arg(
                    Arg::new("decision")
                        .long("decision")
                        .required(true)
                        .value_parser(["approve", "reject"])
                        .help("Approve or reject the proposal"),
                ),
        )
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Load configuration named by `--config`, or defaults
///
/// # Errors
/// Fails when the file cannot be read or parsed
pub fn load_config(matches: &ArgMatches) -> Result<SessionConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => SessionConfig::load(path).context("loading --config"),
        None => Ok(SessionConfig::default()),
    }
}

/// Dispatch a parsed command line
///
/// # Errors
/// Fails on unreadable or malformed input files. An invalid patch set is
/// not an error; it yields an unsuccessful [`Report`].
pub fn run(matches: &ArgMatches, config: &SessionConfig) -> Result<Report> {
    let report = match matches.subcommand() {
        Some(("validate", args)) => {
            let (recipe, patch_set) = read_inputs(args)?;
            validate_command(&recipe, &patch_set, args.get_flag("json"))
        }
        Some(("apply", args)) => {
            let (recipe, patch_set) = read_inputs(args)?;
            let report = apply_command(&recipe, &patch_set)?;
            match args.get_one::<PathBuf>("out") {
                Some(out) if report.success => {
                    std::fs::write(out, &report.output)
                        .with_context(|| format!("writing {}", out.display()))?;
                    Ok(Report::ok(format!("wrote {}", out.display())))
                }
                _ => Ok(report),
            }
        }
        Some(("review", args)) => {
            let (recipe, patch_set) = read_inputs(args)?;
            let decision = match args.get_one::<String>("decision").map(String::as_str) {
                Some("approve") => Decision::Approve,
                Some("reject") => Decision::Reject,
                other => bail!("unknown decision {other:?}"),
            };
            review_command(recipe, &patch_set, decision, config)
        }
        Some((name, _)) => bail!("unknown command {name}"),
        None => bail!("no command given"),
    }?;

    tracing::info!(
        command = matches.subcommand_name().unwrap_or_default(),
        success = report.success,
        "command finished"
    );
    Ok(report)
}

/// Verdict for `validate`
///
/// # Errors
/// Fails only if JSON encoding fails
pub fn validate_command(recipe: &Recipe, patch_set: &PatchSet, json: bool) -> Result<Report> {
    let validation = validate(patch_set, recipe);
    let output = if json {
        serde_json::to_string_pretty(&json!({
            "valid": validation.is_valid(),
            "errors": validation
                .errors()
                .iter()
                .map(|e| json!({ "code": e.code().as_str(), "message": e.to_string() }))
                .collect::<Vec<_>>(),
        }))?
    } else {
        render_validation(&validation)
    };

    Ok(if validation.is_valid() {
        Report::ok(output)
    } else {
        Report::failed(output)
    })
}

/// New recipe for `apply`, or the violations
///
/// # Errors
/// Fails only if JSON encoding fails
pub fn apply_command(recipe: &Recipe, patch_set: &PatchSet) -> Result<Report> {
    match apply(patch_set, recipe) {
        Ok(next) => Ok(Report::ok(serde_json::to_string_pretty(&next)?)),
        Err(e) => Ok(Report::failed(render_validation(&Validation::Invalid(
            e.errors().to_vec(),
        )))),
    }
}

/// Ledger outcome for `review`
///
/// # Errors
/// Fails only if JSON encoding fails
pub fn review_command(
    recipe: Recipe,
    patch_set: &PatchSet,
    decision: Decision,
    config: &SessionConfig,
) -> Result<Report> {
    let mut ledger = ReviewLedger::with_config(recipe, config.ledger.clone());
    if let Err(e) = ledger.propose(patch_set) {
        let validation = Validation::Invalid(e.validation_errors().to_vec());
        return Ok(Report::failed(format!("{e}\n{}", render_validation(&validation))));
    }

    let (change_set, hidden) = match decision {
        Decision::Approve => (ledger.approve_changes(), HiddenContext::new()),
        Decision::Reject => {
            let change_set = ledger.reject_changes();
            let mut hidden = HiddenContext::new();
            if let Some(change_set) = &change_set {
                hidden.record_rejected_changes(change_set);
            }
            (change_set, hidden)
        }
    };

    let output = serde_json::to_string_pretty(&json!({
        "decision": match decision {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        },
        "recipe": ledger.recipe(),
        "changeSet": change_set,
        "hiddenContext": hidden,
    }))?;
    Ok(Report::ok(output))
}

fn render_validation(validation: &Validation) -> String {
    match validation {
        Validation::Valid => "valid".to_string(),
        Validation::Invalid(errors) => {
            let mut out = format!("invalid ({} error(s))", errors.len());
            for error in errors {
                let _ = write!(out, "\n  {}: {error}", error.code());
            }
            out
        }
    }
}

fn read_inputs(args: &ArgMatches) -> Result<(Recipe, PatchSet)> {
    let recipe_path = args
        .get_one::<PathBuf>("recipe")
        .context("--recipe is required")?;
    let patches_path = args
        .get_one::<PathBuf>("patches")
        .context("--patches is required")?;
    tracing::debug!(
        recipe = %recipe_path.display(),
        patches = %patches_path.display(),
        "reading inputs"
    );
    Ok((read_json(recipe_path)?, read_json(patches_path)?))
}

/// Read and decode a JSON file
///
/// # Errors
/// Fails when the file cannot be read or does not match `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
