// # gandalf - configuration file renderer
//
// This binary is a THIN integration layer:
// - All parsing, rendering and serial logic lives in gandalf-core
// - The binary reads files, wires configuration, logs, and writes results
//
// The gandalf binary is responsible for:
// 1. Parsing command line arguments and setting up logging
// 2. Loading the variables file and the host inventory (fatal on error)
// 3. Mapping artifact specs to output paths
// 4. Building and writing every artifact (per-artifact errors are logged
//    and the artifact skipped)
//
// ## Exit codes
//
// - `0`: completed, even if some artifacts were skipped
// - `1`: inventory file unreadable
// - `2`: inventory file malformed (CSV structure, missing columns)
// - `3`: inventory integrity violation (a field failed validation)
// - `4`: variables file unreadable
// - `5`: variables file malformed
// - `6`: runtime could not be started
// - `64`: invalid command line (usage error)
//
// ## Example
//
// ```bash
// gandalf hosts.csv specs/ /srv/netconf --var vars.yaml
// GANDALF_LOG_LEVEL=debug gandalf hosts.csv specs/db.bar.com /etc/bind/db.bar.com
// ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gandalf_core::inventory;
use gandalf_core::{
    ArtifactPath, ArtifactSpec, Error, GandalfConfig, HostRecord, ZoneReconciler, find_artifacts,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the distinct fatal failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GandalfExitCode {
    /// All artifacts processed (individual ones may have been skipped)
    Completed = 0,
    /// Inventory file could not be read
    InventoryUnreadable = 1,
    /// Inventory file is not a usable CSV inventory
    InventoryMalformed = 2,
    /// Inventory row failed validation
    InventoryIntegrity = 3,
    /// Variables file could not be read
    VariablesUnreadable = 4,
    /// Variables file is not valid
    VariablesMalformed = 5,
    /// Async runtime could not be created
    RuntimeError = 6,
    /// Command line could not be parsed
    UsageError = 64,
}

impl From<GandalfExitCode> for ExitCode {
    fn from(code: GandalfExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "gandalf")]
#[command(about = "Render hosts, DNS zone and DHCP lease files from a CSV host inventory")]
struct Cli {
    /// CSV file containing hosts
    csvfile: PathBuf,

    /// Artifact spec file or directory of specs
    specs: PathBuf,

    /// Output file or directory
    output: PathBuf,

    /// YAML file with variables
    #[arg(short = 'v', long = "var", value_name = "VARFILE")]
    var: Option<PathBuf>,

    /// Inventory column marking rows to skip (overrides the variables file)
    #[arg(long, value_name = "COLUMN")]
    ignore_column: Option<String>,

    /// Log level
    #[arg(long, env = "GANDALF_LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

/// Everything an artifact task reads
struct RunContext {
    hosts: Vec<HostRecord>,
    config: GandalfConfig,
    reconciler: ZoneReconciler,
}

/// Counts reported when the run finishes
#[derive(Debug, Default, PartialEq, Eq)]
struct RunSummary {
    written: usize,
    skipped: usize,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return usage_exit_code(&e).into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let mut config = match load_config(cli.var.as_deref()) {
        Ok(config) => config,
        Err(code) => return code.into(),
    };
    if let Some(column) = cli.ignore_column {
        config.ignore_column = column;
    }

    let hosts = match load_inventory(&cli.csvfile, &config) {
        Ok(hosts) => hosts,
        Err(code) => return code.into(),
    };
    info!(
        "Loaded {} host(s) from {}",
        hosts.len(),
        cli.csvfile.display()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return GandalfExitCode::RuntimeError.into();
        }
    };

    let context = RunContext {
        reconciler: ZoneReconciler::new(config.zone.clone()),
        hosts,
        config,
    };
    let summary = rt.block_on(run_artifacts(&cli.specs, &cli.output, Arc::new(context)));
    info!(
        "Done: {} artifact(s) written, {} skipped",
        summary.written, summary.skipped
    );

    GandalfExitCode::Completed.into()
}

/// Help output is a success; every other parse failure is a usage error
fn usage_exit_code(error: &clap::Error) -> GandalfExitCode {
    if error.use_stderr() {
        GandalfExitCode::UsageError
    } else {
        GandalfExitCode::Completed
    }
}

/// Load the variables file, or defaults without one
fn load_config(path: Option<&Path>) -> std::result::Result<GandalfConfig, GandalfExitCode> {
    let Some(path) = path else {
        return Ok(GandalfConfig::default());
    };

    GandalfConfig::from_file(path).map_err(|e| match e {
        Error::Io(io) => {
            error!("Unable to open {}: {}", path.display(), io);
            GandalfExitCode::VariablesUnreadable
        }
        other => {
            error!("Error in variables file {}: {}", path.display(), other);
            GandalfExitCode::VariablesMalformed
        }
    })
}

/// Parse the inventory, mapping failures to their exit code
fn load_inventory(
    path: &Path,
    config: &GandalfConfig,
) -> std::result::Result<Vec<HostRecord>, GandalfExitCode> {
    inventory::parse_file(path, &config.inventory_options()).map_err(|e| {
        let code = inventory_exit_code(&e);
        match code {
            GandalfExitCode::InventoryUnreadable => {
                error!("Unable to open {}: {}", path.display(), e)
            }
            GandalfExitCode::InventoryIntegrity => error!("Error in CSV file: {}", e),
            _ => error!("Unable to parse CSV file {}: {}", path.display(), e),
        }
        code
    })
}

fn inventory_exit_code(error: &Error) -> GandalfExitCode {
    match error {
        Error::Io(io) if io.kind() != ErrorKind::InvalidData => GandalfExitCode::InventoryUnreadable,
        Error::Integrity { .. } => GandalfExitCode::InventoryIntegrity,
        _ => GandalfExitCode::InventoryMalformed,
    }
}

/// Build every artifact concurrently; failures are logged and skipped
async fn run_artifacts(specs: &Path, output: &Path, context: Arc<RunContext>) -> RunSummary {
    let mut summary = RunSummary::default();

    let artifacts = match find_artifacts(specs, output) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!("Unable to read artifact specs at {}: {}", specs.display(), e);
            return summary;
        }
    };
    debug!("Found {} artifact spec(s)", artifacts.len());

    let mut tasks = JoinSet::new();
    for artifact in artifacts {
        let context = Arc::clone(&context);
        tasks.spawn(async move {
            let result = process_artifact(&artifact, &context).await;
            (artifact, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((artifact, Ok(()))) => {
                debug!("Wrote {}", artifact.output.display());
                summary.written += 1;
            }
            Ok((artifact, Err(e))) => {
                error!("Skipping {}: {:#}", artifact.spec.display(), e);
                summary.skipped += 1;
            }
            Err(e) => {
                error!("Artifact task failed: {}", e);
                summary.skipped += 1;
            }
        }
    }

    summary
}

/// Read, build and write one artifact
async fn process_artifact(artifact: &ArtifactPath, context: &RunContext) -> Result<()> {
    let text = tokio::fs::read_to_string(&artifact.spec)
        .await
        .with_context(|| format!("unable to open {}", artifact.spec.display()))?;
    let spec = ArtifactSpec::from_yaml(&text)
        .with_context(|| format!("invalid artifact spec {}", artifact.spec.display()))?;

    let previous = if spec.zone {
        let path = spec.previous.as_deref().unwrap_or(artifact.output.as_path());
        read_previous_zone(path).await
    } else {
        None
    };

    let built = spec
        .build(
            &context.hosts,
            &context.config,
            &context.reconciler,
            previous.as_deref(),
        )
        .with_context(|| format!("unable to render {}", artifact.spec.display()))?;

    if let Some(zone) = &built.zone {
        info!(
            "{}: serial {} (previous {}, {})",
            artifact.output.display(),
            zone.version,
            zone.previous_version,
            if zone.changed { "changed" } else { "unchanged" }
        );
    }

    if let Some(parent) = artifact
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("could not create directory {}", parent.display()))?;
    }

    write_atomically(&artifact.output, &built.text).await?;

    Ok(())
}

/// Replace `path` with `text` through a sibling temporary file
///
/// Readers of `path` see either the old or the new content, never a
/// partial write.
async fn write_atomically(path: &Path, text: &str) -> Result<()> {
    let temp_path = temp_path(path);
    {
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .with_context(|| format!("could not create temp file {}", temp_path.display()))?;
        file.write_all(text.as_bytes())
            .await
            .with_context(|| format!("could not write to temp file {}", temp_path.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("could not flush temp file {}", temp_path.display()))?;
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e).with_context(|| {
            format!(
                "could not rename {} to {}",
                temp_path.display(),
                path.display()
            )
        });
    }
    Ok(())
}

/// Hidden temporary name next to `path`, unique per output file
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.gandalf-tmp", name))
}

/// The deployed zone, or `None` when it cannot be read (no history)
async fn read_previous_zone(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No previous zone at {}; starting a new serial", path.display());
            None
        }
        Err(e) => {
            warn!(
                "Unable to read previous zone {}: {}; treating it as absent",
                path.display(),
                e
            );
            None
        }
    }
}
