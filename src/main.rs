/// Version injected at compile time via TFARCH_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("TFARCH_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tfarch::config::{Config, OutputFormat};
use tfarch::cost::{services_with_cost, CostAndUsageResponse, CostWindow};
use tfarch::merge::{merge_fragments, Fragments};
use tfarch::output::{read_fragment, render, write_document};
use tfarch::pipeline::{self, ArchitectureBuild};
use tfarch::region::region_from_file;
use tfarch::resource::{display_name, get_registry, load_records_or_empty};
use tfarch::topology::TopologyOptions;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Rebuild architecture documents from Terraform state exports
#[derive(Parser, Debug)]
#[command(name = "tfarch", version = VERSION, about, long_about = None)]
struct Args {
    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

/// Inputs shared by the single-fragment commands
#[derive(clap::Args, Debug)]
struct SourceArgs {
    /// Terraform state export (`terraform show -json`)
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Terraform configuration scanned for the region
    #[arg(short, long)]
    main_tf: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the network topology document
    Topology(SourceArgs),
    /// Build the load balancer document
    LoadBalancers(SourceArgs),
    /// Build the database document
    Databases(SourceArgs),
    /// Merge previously written fragment documents
    Merge {
        #[arg(long)]
        topology: Option<PathBuf>,
        #[arg(long)]
        load_balancers: Option<PathBuf>,
        #[arg(long)]
        databases: Option<PathBuf>,
        /// Region used when the topology fragment has none
        #[arg(long)]
        region: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Build every fragment and the merged document for one or more states
    Build {
        /// State exports; each gets its own directory under --out-dir
        #[arg(required = true)]
        states: Vec<PathBuf>,
        #[arg(short, long)]
        main_tf: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Print the previous calendar month's billing window
    CostWindow,
    /// List services with non-zero cost from a saved GetCostAndUsage response
    CostServices {
        /// Response JSON (as written by `aws ce get-cost-and-usage`)
        #[arg(long)]
        response: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List recognized resource kinds and the type tags mapped to them
    Kinds,
    /// Persist defaults to the config file
    Config {
        #[arg(long)]
        state_file: Option<PathBuf>,
        #[arg(long)]
        main_tf: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        #[arg(long)]
        derive_visibility: Option<bool>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return None;
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("tfarch {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("tfarch").join("tfarch.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tfarch").join("tfarch.log");
    }
    PathBuf::from("tfarch.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();

    match args.command {
        Command::Topology(source) => {
            let options = topology_options(&config);
            emit_fragment(&config, source, |records, region| {
                Ok(serde_json::to_value(pipeline::topology_document(
                    records, region, options,
                )?)?)
            })
        }
        Command::LoadBalancers(source) => emit_fragment(&config, source, |records, region| {
            Ok(serde_json::to_value(pipeline::load_balancer_document(
                records, region,
            )?)?)
        }),
        Command::Databases(source) => emit_fragment(&config, source, |records, region| {
            Ok(serde_json::to_value(pipeline::database_document(
                records, region,
            )?)?)
        }),
        Command::Merge {
            topology,
            load_balancers,
            databases,
            region,
            output,
            format,
        } => {
            let topology = topology.as_deref().and_then(read_fragment);
            let load_balancers = load_balancers.as_deref().and_then(read_fragment);
            let databases = databases.as_deref().and_then(read_fragment);

            let merged = merge_fragments(
                Fragments {
                    topology: topology.as_ref(),
                    load_balancers: load_balancers.as_ref(),
                    databases: databases.as_ref(),
                },
                region.as_deref(),
            )
            .context("Failed to merge fragments")?;

            emit(&merged, output.as_deref(), config.effective_format(format))
        }
        Command::Build {
            states,
            main_tf,
            out_dir,
            format,
        } => {
            let region = region_from_file(&config.effective_main_tf(main_tf));
            let out_dir = config.effective_output_dir(out_dir);
            let format = config.effective_format(format);
            let options = topology_options(&config);

            run_builds(states, region, out_dir, format, options).await
        }
        Command::Kinds => {
            for (kind, def) in &get_registry().kinds {
                println!(
                    "{:<16} {:<16} {}",
                    kind.as_str(),
                    display_name(*kind),
                    def.type_tags.join(", ")
                );
            }
            Ok(())
        }
        Command::CostWindow => {
            let window = CostWindow::previous_month(Local::now().date_naive());
            println!("{} {}", window.start_str(), window.end_str());
            Ok(())
        }
        Command::CostServices { response, output } => {
            let content = std::fs::read_to_string(&response)
                .with_context(|| format!("Failed to read {:?}", response))?;
            let parsed: CostAndUsageResponse =
                serde_json::from_str(&content).context("Failed to parse cost response")?;

            let mut listing = String::new();
            for service in services_with_cost(&parsed) {
                listing.push_str(&service);
                listing.push('\n');
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, listing)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    eprintln!("Service names with non-zero costs saved to {:?}", path);
                }
                None => print!("{}", listing),
            }
            Ok(())
        }
        Command::Config {
            state_file,
            main_tf,
            output_dir,
            format,
            derive_visibility,
        } => {
            if state_file.is_some() {
                config.state_file = state_file;
            }
            if main_tf.is_some() {
                config.main_tf = main_tf;
            }
            if output_dir.is_some() {
                config.output_dir = output_dir;
            }
            if format.is_some() {
                config.output_format = format;
            }
            if derive_visibility.is_some() {
                config.derive_visibility = derive_visibility;
            }
            config.save().context("Failed to save config")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn topology_options(config: &Config) -> TopologyOptions {
    TopologyOptions {
        derive_visibility: config.effective_derive_visibility(),
    }
}

/// Load the state and region for one fragment command, build, and write
fn emit_fragment<F>(config: &Config, source: SourceArgs, build: F) -> Result<()>
where
    F: FnOnce(&[tfarch::resource::ResourceRecord], Option<&str>) -> Result<serde_json::Value>,
{
    let state = config.effective_state_file(source.state);
    let region = region_from_file(&config.effective_main_tf(source.main_tf));
    tracing::info!("Building from {:?} (region override: {})", state, region);

    let records = load_records_or_empty(&state)
        .with_context(|| format!("Invalid state document {:?}", state))?;
    let document = build(&records, Some(&region))?;

    emit(&document, source.output.as_deref(), config.effective_format(source.format))
}

fn emit<T: serde::Serialize>(document: &T, output: Option<&Path>, format: OutputFormat) -> Result<()> {
    match output {
        Some(path) => {
            write_document(path, document, format)
                .with_context(|| format!("Failed to write {:?}", path))?;
        }
        None => print!("{}", render(document, format)?),
    }
    Ok(())
}

/// Build each state on the blocking pool; states share nothing
async fn run_builds(
    states: Vec<PathBuf>,
    region: String,
    out_dir: PathBuf,
    format: OutputFormat,
    options: TopologyOptions,
) -> Result<()> {
    let targets = build_targets(states, &out_dir)?;
    let tasks = targets.into_iter().map(|(state, target)| {
        let region = region.clone();
        tokio::task::spawn_blocking(move || {
            let result = build_one(&state, &region, &target, format, options);
            (state, result)
        })
    });

    let mut failures = 0;
    for joined in futures::future::join_all(tasks).await {
        let (state, result) = joined.context("Build task panicked")?;
        match result {
            Ok(()) => eprintln!("Built {:?}", state),
            Err(e) => {
                tracing::error!("Build failed for {:?}: {:?}", state, e);
                eprintln!("Build failed for {:?}: {:#}", state, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(anyhow::anyhow!("{} state file(s) failed to build", failures));
    }
    Ok(())
}

fn build_one(
    state: &Path,
    region: &str,
    target: &Path,
    format: OutputFormat,
    options: TopologyOptions,
) -> Result<()> {
    let records = load_records_or_empty(state)
        .with_context(|| format!("Invalid state document {:?}", state))?;
    let build = ArchitectureBuild::from_records(&records, Some(region), options)?;

    let ext = format.extension();
    write_document(&target.join(format!("architecture.{}", ext)), &build.topology, format)?;
    write_document(&target.join(format!("load_balancers.{}", ext)), &build.load_balancers, format)?;
    write_document(&target.join(format!("databases.{}", ext)), &build.databases, format)?;
    write_document(&target.join(format!("combined_architecture.{}", ext)), &build.merged, format)?;
    Ok(())
}

/// Pair each state with its output directory. States that would share a
/// directory are rejected up front since their builds run concurrently.
fn build_targets(states: Vec<PathBuf>, out_dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut claimed: HashMap<String, PathBuf> = HashMap::new();
    let mut targets = Vec::with_capacity(states.len());

    for state in states {
        let stem = state_stem(&state);
        if let Some(previous) = claimed.get(&stem) {
            anyhow::bail!(
                "{:?} and {:?} would both write to {:?}; rename one of them",
                previous,
                state,
                out_dir.join(&stem)
            );
        }
        claimed.insert(stem.clone(), state.clone());
        targets.push((state, out_dir.join(stem)));
    }

    Ok(targets)
}

fn state_stem(state: &Path) -> String {
    state
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string())
}
