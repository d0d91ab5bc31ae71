//! `variants` - resolve and validate variant configurations from the shell.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use variants_core::variant::loader;
use variants_core::{validate_variants_schema, EvaluationContext, Variants};

/// Resolve which variant mods are active for a user and request.
#[derive(Parser)]
#[command(name = "variants")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved mods as JSON
    Mods(ResolveArgs),

    /// Print the per-variant resolution report as JSON
    Explain(ResolveArgs),

    /// Check a configuration against the schema and the condition kinds
    Validate {
        /// Variants configuration (.json, .yaml or .yml)
        config: PathBuf,
    },

    /// List the registered condition types
    Types,
}

#[derive(Args)]
struct ResolveArgs {
    /// Variants configuration (.json, .yaml or .yml)
    config: PathBuf,

    /// Context file with username, groups and search
    #[arg(long)]
    context: Option<PathBuf>,

    /// Current username
    #[arg(long)]
    username: Option<String>,

    /// Group membership (repeatable)
    #[arg(long = "group")]
    groups: Vec<String>,

    /// Query string, e.g. "variants=new-nav"
    #[arg(long)]
    search: Option<String>,

    /// Seed for RANDOM and RANDOM_MOD draws
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_context(args: &ResolveArgs) -> Result<EvaluationContext> {
    let mut context = match &args.context {
        Some(path) => read_context(path)?,
        None => EvaluationContext::new(),
    };

    if let Some(username) = &args.username {
        context.username = Some(username.clone());
    }
    if !args.groups.is_empty() {
        context.groups = Some(args.groups.clone());
    }
    if let Some(search) = &args.search {
        context.search = Some(search.clone());
    }
    Ok(context)
}

fn read_context(path: &Path) -> Result<EvaluationContext> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file {}", path.display()))?;

    // YAML is a superset of JSON
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse context file {}", path.display()))
}

fn resolve(engine: &Variants, args: &ResolveArgs, explain: bool) -> Result<()> {
    let config = loader::from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let context = load_context(args)?;
    tracing::debug!(?context, "Resolving variants");

    let mut scope = match args.seed {
        Some(seed) => engine.scope().seeded(seed),
        None => engine.scope(),
    };
    let resolution = engine.resolve_in_scope(&config, &context, &mut scope)?;

    let output = if explain {
        serde_json::to_string_pretty(&resolution)?
    } else {
        serde_json::to_string_pretty(&resolution.mods)?
    };
    println!("{}", output);
    Ok(())
}

fn validate(engine: &Variants, path: &Path) -> Result<bool> {
    let config = loader::from_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let mut problems = match validate_variants_schema(&config) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };
    if let Err(e) = engine.parse(&config) {
        problems.push(e.to_string());
    }

    if problems.is_empty() {
        println!("OK: {}", path.display());
        return Ok(true);
    }

    for problem in &problems {
        println!("ERROR: {}", problem);
    }
    Ok(false)
}

fn run(cli: Cli) -> Result<bool> {
    let engine = Variants::new();

    match cli.command {
        Command::Mods(args) => resolve(&engine, &args, false).map(|()| true),
        Command::Explain(args) => resolve(&engine, &args, true).map(|()| true),
        Command::Validate { config } => validate(&engine, &config),
        Command::Types => {
            let registry = engine.registry();
            for condition_type in registry.available_types() {
                let description = registry
                    .get_factory(condition_type)
                    .map(|f| f.description())
                    .unwrap_or_default();
                println!("{:<20} {}", condition_type, description);
            }
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
