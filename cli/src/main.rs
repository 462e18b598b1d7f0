use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use rpgs::layout::{infer_system, instance_files, load_registry, systems, SystemLayout, SYSTEMS_DIR};
use rpgs::{format_files, validate_files};

const DEFAULT_SYSTEM: &str = "5e";

#[derive(Parser, Debug)]
#[command(name = "rpgs", version)]
#[command(about = "Validate and format resource instances against stats.rpgs schemas", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Repository root containing `systems/` (defaults to the nearest ancestor that has one)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate resource instance files against their system's stats.rpgs schemas
    Validate(ValidateArgs),

    /// Rewrite resource instance files in canonical form
    Format(FormatArgs),

    /// Print the compiled schemas of a system as JSON
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// System folder under systems/ (default: inferred from --file, else 5e)
    #[arg(long)]
    system: Option<String>,

    /// Override the resource_instances folder
    #[arg(long)]
    instances: Option<PathBuf>,

    /// Validate a single resource instance file
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Limit formatting to one system folder under systems/
    #[arg(long)]
    system: Option<String>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// System folder under systems/
    #[arg(long, default_value = DEFAULT_SYSTEM)]
    system: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let repo_root = cli.root.clone().unwrap_or_else(resolve_repo_root);
    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &repo_root),
        Commands::Format(args) => run_format(args, &repo_root),
        Commands::Schema(args) => run_schema(args, &repo_root),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Nearest ancestor of the current directory containing `systems/`, or the
/// current directory itself.
fn resolve_repo_root() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    cwd.ancestors()
        .find(|dir| dir.join(SYSTEMS_DIR).is_dir())
        .map(Path::to_path_buf)
        .unwrap_or(cwd)
}

fn run_validate(args: &ValidateArgs, repo_root: &Path) -> Result<u8> {
    if let Some(file) = &args.file {
        if !file.is_file() {
            eprintln!("Missing file: {}", file.display());
            return Ok(2);
        }
    }

    let system = args
        .system
        .clone()
        .or_else(|| args.file.as_deref().and_then(|f| infer_system(f, repo_root)))
        .unwrap_or_else(|| DEFAULT_SYSTEM.to_owned());
    let layout = SystemLayout::new(repo_root, &system);
    let resources_dir = layout.resources_dir();
    let instances_dir = args.instances.clone().unwrap_or_else(|| layout.instances_dir());

    if !resources_dir.is_dir() {
        eprintln!("Missing resources folder: {}", resources_dir.display());
        return Ok(2);
    }
    if args.file.is_none() && !instances_dir.is_dir() {
        eprintln!("Missing resource_instances folder: {}", instances_dir.display());
        return Ok(2);
    }

    let (registry, schema_failures) = load_registry(&resources_dir);
    let files = match &args.file {
        Some(file) => vec![file.clone()],
        None => instance_files(&instances_dir),
    };
    tracing::info!(system = %system, files = files.len(), "validating resource instances");

    let report = validate_files(&files, &registry, repo_root);
    let mut lines: Vec<String> = schema_failures.iter().map(|e| e.to_string()).collect();
    lines.extend(report.errors.iter().map(|e| e.to_string()));

    if !lines.is_empty() {
        eprintln!("Validation errors:");
        for line in &lines {
            eprintln!("- {}", line);
        }
        eprintln!("{} error(s) found in {} file(s).", lines.len(), report.files_checked);
        return Ok(1);
    }

    println!("OK: {} resource instance file(s) validated.", report.files_checked);
    Ok(0)
}

fn run_format(args: &FormatArgs, repo_root: &Path) -> Result<u8> {
    let systems_root = repo_root.join(SYSTEMS_DIR);
    if !systems_root.is_dir() {
        eprintln!("Missing systems folder: {}", systems_root.display());
        return Ok(2);
    }

    let layouts = systems(repo_root, args.system.as_deref())
        .with_context(|| format!("failed to list systems in {}", systems_root.display()))?;
    let files: Vec<PathBuf> = layouts
        .iter()
        .map(SystemLayout::instances_dir)
        .filter(|dir| dir.is_dir())
        .flat_map(|dir| instance_files(&dir))
        .collect();

    if files.is_empty() {
        let target = args.system.as_deref().unwrap_or("<all>");
        eprintln!("No resource instance files found for {}.", target);
        return Ok(1);
    }

    let report = format_files(&files, repo_root);
    if !report.errors.is_empty() {
        eprintln!("Formatting errors:");
        for err in &report.errors {
            eprintln!("- {}", err);
        }
        eprintln!("{} error(s).", report.errors.len());
        return Ok(1);
    }

    println!("Formatted {} file(s) out of {}.", report.changed, report.files);
    Ok(0)
}

fn run_schema(args: &SchemaArgs, repo_root: &Path) -> Result<u8> {
    let layout = SystemLayout::new(repo_root, &args.system);
    let resources_dir = layout.resources_dir();
    if !resources_dir.is_dir() {
        eprintln!("Missing resources folder: {}", resources_dir.display());
        return Ok(2);
    }

    let (registry, failures) = load_registry(&resources_dir);
    for failure in &failures {
        eprintln!("- {}", failure);
    }
    let json = serde_json::to_string_pretty(&registry).context("failed to serialize schema registry")?;
    println!("{}", json);

    Ok(if failures.is_empty() { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn seed(root: &Path) {
        write(
            &root.join("systems/5e/system/resources/monster/stats.rpgs"),
            b"base integer hp(1)\n",
        );
        write(
            &root.join("systems/5e/resource_instances/orc.json"),
            br#"{"resource_id":"monster","stats":{"hp":{"value":15}}}"#,
        );
    }

    #[test]
    fn test_parse_validate_flags() {
        let cli = Cli::try_parse_from(["rpgs", "-vv", "validate", "--system", "pf2", "--file", "x.json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.system.as_deref(), Some("pf2"));
                assert_eq!(args.file, Some(PathBuf::from("x.json")));
                assert!(args.instances.is_none());
            }
            other => panic!("expected validate, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_root_after_subcommand() {
        let cli = Cli::try_parse_from(["rpgs", "format", "--root", "/srv/repo"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/srv/repo")));
        assert!(matches!(cli.command, Commands::Format(FormatArgs { system: None })));
    }

    #[test]
    fn test_parse_schema_default_system() {
        let cli = Cli::try_parse_from(["rpgs", "schema"]).unwrap();
        match cli.command {
            Commands::Schema(args) => assert_eq!(args.system, DEFAULT_SYSTEM),
            other => panic!("expected schema, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let args = ValidateArgs { system: None, instances: None, file: None };
        assert_eq!(run_validate(&args, dir.path()).unwrap(), 2);

        seed(dir.path());
        assert_eq!(run_validate(&args, dir.path()).unwrap(), 0);

        write(
            &dir.path().join("systems/5e/resource_instances/bad.json"),
            br#"{"resource_id":"monster","stats":{"hp":{"value":false}}}"#,
        );
        assert_eq!(run_validate(&args, dir.path()).unwrap(), 1);

        let single = ValidateArgs {
            system: None,
            instances: None,
            file: Some(dir.path().join("systems/5e/resource_instances/orc.json")),
        };
        assert_eq!(run_validate(&single, dir.path()).unwrap(), 0);

        let missing = ValidateArgs { system: None, instances: None, file: Some(dir.path().join("nope.json")) };
        assert_eq!(run_validate(&missing, dir.path()).unwrap(), 2);
    }

    #[test]
    fn test_format_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run_format(&FormatArgs { system: None }, dir.path()).unwrap(), 2);

        seed(dir.path());
        assert_eq!(run_format(&FormatArgs { system: Some("pf2".into()) }, dir.path()).unwrap(), 1);
        assert_eq!(run_format(&FormatArgs { system: None }, dir.path()).unwrap(), 0);

        let formatted = fs::read_to_string(dir.path().join("systems/5e/resource_instances/orc.json")).unwrap();
        assert!(formatted.starts_with("{\n  \"resource_id\": \"monster\",\n"));
        assert!(formatted.ends_with("}\n"));
    }

    #[test]
    fn test_schema_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let args = SchemaArgs { system: DEFAULT_SYSTEM.to_owned() };
        assert_eq!(run_schema(&args, dir.path()).unwrap(), 2);

        seed(dir.path());
        assert_eq!(run_schema(&args, dir.path()).unwrap(), 0);
    }
}
