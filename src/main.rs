//! envstate CLI entrypoint.
//!
//! This is the main entrypoint for the envstate command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use envstate::api::{GetEnvironmentHandler, GetEnvironmentRequest};
use envstate::cli::{Cli, Commands, CompareStatus, OutputFormatter};
use envstate::config::{
    apply_overrides, find_config_file, LogFormat, Settings, SettingsParser, SettingsValidator,
    StoreBackend,
};
use envstate::error::{ConfigError, Result};
use envstate::materials::{EnvironmentState, MaterialsHasher};
use envstate::reconciler::Reconciler;
use envstate::source::{read_state_file, FileMaterialsSource};
use envstate::store::{Environment, EnvironmentStore, LocalStore, MemoryStore};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let max_attempts = cli.command.max_attempts_override();
    let (settings, warnings) = match load_settings(cli.config.as_ref(), max_attempts) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            return failure_code(&cli.command);
        }
    };

    // Initialize logging
    init_logging(cli.verbose, &settings);
    for warning in &warnings {
        warn!("{warning}");
    }

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return failure_code(&cli.command);
        }
    };

    match runtime.block_on(run(cli, settings)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` wins over the settings file; `--verbose` wins over both.
fn init_logging(verbose: bool, settings: &Settings) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(settings.logging.level.as_deref().unwrap_or("info"))
        })
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match settings.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Main async entry point.
async fn run(cli: Cli, settings: Settings) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Compare { lhs, rhs } => {
            let result = cmd_compare(&lhs, &rhs, &formatter);
            if let Err(e) = &result {
                eprintln!("Error: {e}");
            }
            Ok(ExitCode::from(CompareStatus::from_result(&result).code()))
        }
        Commands::Fingerprint { file, short } => cmd_fingerprint(&file, short, &formatter),
        Commands::Get { project, name } => {
            let store = create_store(&settings)?;
            cmd_get(&store, project, name, &formatter).await
        }
        Commands::Init {
            project,
            environments,
        } => {
            let store = create_store(&settings)?;
            cmd_init(&store, &project, &environments).await
        }
        Commands::Reconcile {
            project,
            name,
            source,
            ..
        } => {
            let store = create_store(&settings)?;
            cmd_reconcile(&store, &settings, &project, name.as_deref(), source, &formatter).await
        }
    }
}

/// Compare two state files, returning whether their materials are the same.
fn cmd_compare(lhs_path: &Path, rhs_path: &Path, formatter: &OutputFormatter) -> Result<bool> {
    let lhs = read_state_file(lhs_path)?;
    let rhs = read_state_file(rhs_path)?;

    let same = EnvironmentState::same_materials(Some(&lhs), Some(&rhs));
    debug!(
        "Compared {} and {}: same = {same}",
        lhs_path.display(),
        rhs_path.display()
    );

    print!("{}", formatter.format_comparison(same, &lhs, &rhs));
    Ok(same)
}

/// Print the fingerprint of a state file.
fn cmd_fingerprint(path: &Path, short: bool, formatter: &OutputFormatter) -> Result<ExitCode> {
    let state = read_state_file(path)?;
    let mut fingerprint = MaterialsHasher::new().hash_state(&state);
    if short {
        fingerprint = MaterialsHasher::short_hash(&fingerprint);
    }

    print!("{}", formatter.format_fingerprint(&fingerprint));
    Ok(ExitCode::SUCCESS)
}

/// Show one environment through the read handler.
async fn cmd_get<S: EnvironmentStore>(
    store: &S,
    project: String,
    name: String,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let handler = GetEnvironmentHandler::new(store);
    let response = handler
        .get_environment(&GetEnvironmentRequest::new(project, name))
        .await?;

    print!("{}", formatter.format_environment(&response.environment));
    Ok(ExitCode::SUCCESS)
}

/// Create a project namespace and empty environments.
async fn cmd_init<S: EnvironmentStore>(
    store: &S,
    project: &str,
    environments: &[String],
) -> Result<ExitCode> {
    store.create_namespace(project).await?;
    eprintln!("Namespace ready: {project}");

    for name in environments {
        if store.get(project, name).await?.is_some() {
            eprintln!("Environment already exists: {project}/{name}");
            continue;
        }
        store.put(&Environment::new(project, name)).await?;
        eprintln!("Created environment: {project}/{name}");
    }

    Ok(ExitCode::SUCCESS)
}

/// Reconcile one environment or a whole project.
async fn cmd_reconcile<S: EnvironmentStore>(
    store: &S,
    settings: &Settings,
    project: &str,
    name: Option<&str>,
    source: Option<PathBuf>,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let source_dir = source
        .or_else(|| settings.reconcile.source_path.clone())
        .ok_or_else(|| {
            ConfigError::validation(
                "No desired state directory: pass --source or set reconcile.source_path",
                "reconcile.source_path",
            )
        })?;
    info!("Resolving desired states from: {}", source_dir.display());

    let source = FileMaterialsSource::new(source_dir);
    let reconciler = Reconciler::new(store, &source).with_config(&settings.reconcile);

    if let Some(name) = name {
        let outcome = reconciler.reconcile(project, name).await?;
        print!("{}", formatter.format_outcome(project, name, &outcome));
        return Ok(ExitCode::SUCCESS);
    }

    let summary = reconciler.reconcile_all(project).await?;
    print!("{}", formatter.format_summary(&summary));

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads, overrides and validates settings.
///
/// Command-line overrides are applied last and validated with the rest.
/// A missing settings file is not an error; defaults apply. Validation
/// warnings are returned so they can be logged once logging is up.
fn load_settings(
    config_path: Option<&PathBuf>,
    max_attempts: Option<u32>,
) -> Result<(Settings, Vec<String>)> {
    let config_file = config_path.cloned().or_else(|| find_config_file("."));

    let base = config_file
        .as_deref()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let parser = SettingsParser::new().with_base_path(base);
    parser.load_dotenv()?;

    let mut settings = if let Some(path) = config_file {
        parser.load_with_env(&path)?
    } else {
        let mut settings = Settings::default();
        apply_overrides(&mut settings, |name| std::env::var(name).ok())?;
        settings
    };

    settings.apply_cli_overrides(max_attempts);

    let result = SettingsValidator::new().validate(&settings)?;
    Ok((settings, result.warnings))
}

/// Exit code for a run that failed before its command started.
fn failure_code(command: &Commands) -> ExitCode {
    match command {
        Commands::Compare { .. } => ExitCode::from(CompareStatus::Trouble.code()),
        _ => ExitCode::FAILURE,
    }
}

/// Creates the configured environment store.
fn create_store(settings: &Settings) -> Result<Box<dyn EnvironmentStore>> {
    let store: Box<dyn EnvironmentStore> = match settings.store.backend {
        StoreBackend::Local => match &settings.store.path {
            Some(path) => Box::new(LocalStore::with_base_dir(path)),
            None => Box::new(LocalStore::new()?),
        },
        StoreBackend::Memory => Box::new(MemoryStore::new()),
    };

    debug!("Using {} environment store", store.backend_type());
    Ok(store)
}
