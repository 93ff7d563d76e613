use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use cmdform_core::{
    CommandId, CommandSchema, FormValues, MultiValueParamData, ParamKey, ParamSchema,
    SchemaTree, UserCommandData, Value, validate_tree,
};
use cmdform_introspect::{FormConfig, Introspector, OutputFormat, format_tree, introspect_file};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CMDFORM_LOG";

/// Name of the synthetic root joining several declaration files.
const FOREST_ROOT: &str = "cmdform";

#[derive(Debug, Parser)]
#[command(name = "cmdform")]
#[command(about = "Form schemas from command declarations and command-line reconstruction")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the form schema of one or more declarations.
    Schema(SchemaArgs),
    /// Check declarations for schema problems.
    Validate(ValidateArgs),
    /// Reconstruct a command line from form values.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Declaration files (JSON or YAML). Defaults to cmdform's own commands.
    #[arg(long = "decl")]
    decls: Vec<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Declaration files (JSON or YAML).
    #[arg(long = "decl", required = true)]
    decls: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Declaration files (JSON or YAML).
    #[arg(long = "decl", required = true)]
    decls: Vec<PathBuf>,
    /// Space separated subcommand path below the root (e.g. "remote add").
    #[arg(long)]
    command: Option<String>,
    /// Form value as KEY=VALUE. KEY is a parameter key, an option spelling or
    /// an argument name; repeat a key to supply several values.
    #[arg(
        long = "set",
        value_name = "KEY=VALUE",
        value_parser = parse_assignment,
        allow_hyphen_values = true
    )]
    set: Vec<(String, String)>,
    /// Emit the root command name too.
    #[arg(long)]
    include_root: bool,
    /// Output mode.
    #[arg(long, default_value = "string")]
    output: RenderOutput,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum RenderOutput {
    /// One shell-quoted line.
    String,
    /// One argument per line.
    Args,
    /// JSON report.
    Json,
}

/// JSON form of a reconstructed command line.
#[derive(Debug, Serialize)]
struct RenderReport {
    args: Vec<String>,
    display: String,
    complete: bool,
    missing: usize,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Schema(args) => run_schema(args, &config),
        Command::Validate(args) => run_validate(args, &config),
        Command::Render(args) => run_render(args, &config),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<FormConfig, String> {
    match path {
        Some(path) => FormConfig::load(path)
            .map_err(|e| format!("failed to load config '{}': {e}", path.display())),
        None => Ok(FormConfig::default()),
    }
}

fn load_tree(path: &Path, introspector: &Introspector) -> Result<SchemaTree, String> {
    introspect_file(path, introspector).map_err(|e| format!("{}: {e}", path.display()))
}

/// Loads every declaration, joining several under a synthetic root.
fn load_trees(paths: &[PathBuf], introspector: &Introspector) -> Result<SchemaTree, String> {
    let mut trees = paths
        .iter()
        .map(|path| load_tree(path, introspector))
        .collect::<Result<Vec<_>, _>>()?;

    let tree = if trees.len() == 1 {
        trees.remove(0)
    } else {
        SchemaTree::from_forest(FOREST_ROOT, None, trees).map_err(|e| e.to_string())?
    };
    info!(files = paths.len(), commands = tree.len(), "loaded declarations");
    Ok(tree)
}

fn run_schema(args: SchemaArgs, config: &FormConfig) -> Result<(), String> {
    let introspector = Introspector::from_config(config);
    let tree = if args.decls.is_empty() {
        introspector.introspect(&Cli::command())
    } else {
        load_trees(&args.decls, &introspector)?
    };
    let output = format_tree(&tree, args.format)?;
    println!("{output}");
    Ok(())
}

fn run_validate(args: ValidateArgs, config: &FormConfig) -> Result<(), String> {
    let introspector = Introspector::from_config(config);
    let mut commands = 0;
    let mut findings = 0;
    for path in &args.decls {
        let tree = load_tree(path, &introspector)?;
        commands += tree.len();
        for error in validate_tree(&tree) {
            println!("{}: {error}", path.display());
            findings += 1;
        }
    }

    if findings > 0 {
        return Err(format!("{findings} validation finding(s)"));
    }
    println!(
        "Validated {} declaration file(s) for {commands} command(s).",
        args.decls.len()
    );
    Ok(())
}

fn run_render(args: RenderArgs, config: &FormConfig) -> Result<(), String> {
    let introspector = Introspector::from_config(config);
    let tree = load_trees(&args.decls, &introspector)?;
    let root = tree
        .roots()
        .next()
        .ok_or_else(|| "declarations contain no commands".to_string())?;

    let mut path = vec![root.name.as_str()];
    if let Some(ref command) = args.command {
        path.extend(command.split_whitespace());
    }
    let selected = tree
        .find_path(&path)
        .ok_or_else(|| format!("unknown command: {}", path.join(" ")))?;

    let values = form_values(&tree, selected, &args.set)?;
    let mut data = UserCommandData::from_form(&tree, selected, &values)
        .ok_or_else(|| format!("unknown command: {}", path.join(" ")))?;
    data.fill_defaults(root);

    let tokens = data.to_cli_tokens(args.include_root);
    let missing = tokens.iter().filter(|t| t.is_missing()).count();
    info!(command = %path.join(" "), tokens = tokens.len(), missing, "reconstructed command line");

    match args.output {
        RenderOutput::String => {
            println!("{}", data.to_cli_string_with(args.include_root, &config.render));
        }
        RenderOutput::Args => {
            for arg in data.to_cli_args_with(args.include_root, &config.render) {
                println!("{arg}");
            }
        }
        RenderOutput::Json => {
            let report = RenderReport {
                args: data.to_cli_args_with(args.include_root, &config.render),
                display: data.to_cli_string_with(args.include_root, &config.render),
                complete: data.is_complete(),
                missing,
            };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Turns `KEY=VALUE` assignments into form values for the selected command.
///
/// Values are coerced by the type at their tuple position and grouped into
/// tuples of the parameter's `nargs`.
fn form_values(
    tree: &SchemaTree,
    selected: CommandId,
    assignments: &[(String, String)],
) -> Result<FormValues, String> {
    let levels: Vec<&CommandSchema> = tree
        .path_from_root(selected)
        .into_iter()
        .filter_map(|id| tree.get(id))
        .collect();

    let mut collected: HashMap<ParamKey, (&ParamSchema, Vec<Value>)> = HashMap::new();
    for (key, raw) in assignments {
        let param = resolve_param(&levels, key).ok_or_else(|| format!("unknown parameter: {key}"))?;
        let (_, values) = collected
            .entry(param.key.clone())
            .or_insert_with(|| (param, Vec::new()));
        let position = if param.types.len() > 1 {
            values.len() % param.types.len()
        } else {
            0
        };
        let value = param
            .types
            .get(position)
            .map_or_else(|| Value::from(raw.as_str()), |kind| kind.coerce(raw));
        debug!(key = %param.key, raw = %raw, "collected form value");
        values.push(value);
    }

    Ok(collected
        .into_iter()
        .map(|(key, (param, values))| {
            let nargs = if param.multi_value { param.nargs } else { 1 };
            (key, MultiValueParamData::from_flat(values, nargs))
        })
        .collect())
}

/// Finds a parameter by key, then by option spelling, then by argument name.
///
/// Spellings and names are looked up from the deepest level upwards.
fn resolve_param<'t>(levels: &[&'t CommandSchema], key: &str) -> Option<&'t ParamSchema> {
    levels
        .iter()
        .copied()
        .flat_map(CommandSchema::params)
        .find(|param| param.key.as_str() == key)
        .or_else(|| {
            levels
                .iter()
                .rev()
                .copied()
                .find_map(|schema| schema.find_option(key))
                .map(|option| &option.param)
        })
        .or_else(|| {
            levels
                .iter()
                .rev()
                .copied()
                .find_map(|schema| schema.find_argument(key))
                .map(|argument| &argument.param)
        })
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}
