// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use asset_mill::backends::local::LocalProcessorFactory;
use asset_mill::config::{load_and_validate_config, RuntimeBuilder};
use asset_mill::engine::{BuildReport, DirectoryStore, ItemOutcome, MemoryStore, OutputStore};
use asset_mill::errors::FailureStrategy;
use asset_mill::native::{self, NativeSymbols};
use asset_mill::observability::TracingLogger;

#[derive(Parser, Debug)]
#[command(name = "asset-mill", version, about = "Build game content through staged processors")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build every item under the configured input root.
    Build(BuildArgs),
    /// List the registered content types and their extensions.
    ListTypes(ListTypesArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Build configuration (.yaml, .yml, .toml or .json).
    #[arg(long, short)]
    config: PathBuf,

    /// Override the number of worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Override the native image library.
    #[arg(long)]
    native_lib: Option<PathBuf>,

    /// Stop dispatching items after the first failure.
    #[arg(long, default_value_t = false)]
    fail_fast: bool,

    /// Write the JSON build report to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Build everything but keep the output in memory.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Parser, Debug)]
struct ListTypesArgs {
    /// Native image library to register the texture processor against.
    #[arg(long)]
    native_lib: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.cmd {
        Command::Build(args) => cmd_build(args).await,
        Command::ListTypes(args) => cmd_list_types(args),
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .try_init()
        .ok();
}

async fn cmd_build(args: BuildArgs) -> anyhow::Result<ExitCode> {
    let start_time = Instant::now();

    let mut config = load_and_validate_config(&args.config)
        .with_context(|| format!("load config '{}'", args.config.display()))?;
    if let Some(workers) = args.workers {
        config.executor_options.max_workers = Some(workers);
    }
    if let Some(library) = args.native_lib {
        config.native.library = Some(library);
    }
    if args.fail_fast {
        config.failure_strategy = FailureStrategy::FailFast;
    }

    let runtime = RuntimeBuilder::from_config(&config).context("initialize build runtime")?;
    let items = runtime.discover(&config).context("discover content")?;

    let store: Arc<dyn OutputStore> = if args.dry_run {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(DirectoryStore::new(&config.output_root))
    };
    let job = runtime.job(items, store, Arc::new(TracingLogger));

    let report = runtime
        .executor
        .execute_with_strategy(job, runtime.failure_strategy)
        .await
        .context("run build")?;

    print_summary(&report);
    if let Some(path) = &args.report {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create report dir '{}'", parent.display()))?;
        }
        let json = report.to_json().context("serialize build report")?;
        std::fs::write(path, json).with_context(|| format!("write report '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }

    eprintln!("finished in {:.2?}", start_time.elapsed());
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_list_types(args: ListTypesArgs) -> anyhow::Result<ExitCode> {
    let library = native::open(args.native_lib.as_deref(), &NativeSymbols::default())
        .context("open native library")?;
    let registry = LocalProcessorFactory::registry(library)?;

    for descriptor in registry.descriptors() {
        println!(
            "{:<10} {:<12} {}",
            descriptor.content_type(),
            descriptor.display_name(),
            descriptor.extensions().join(", ")
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(report: &BuildReport) {
    for item in &report.items {
        match &item.outcome {
            ItemOutcome::Built { bytes, loops, .. } => {
                println!("  built   {} ({} bytes, {} loops)", item.name, bytes, loops)
            }
            ItemOutcome::Failed { message, site, causes } => {
                println!("  FAILED  {}: {} at {}", item.name, message, site);
                for cause in causes {
                    println!("          caused by: {}", cause);
                }
            }
            ItemOutcome::Skipped { reason } => println!("  skipped {}: {}", item.name, reason),
        }
    }
    println!(
        "{}: {} built, {} failed, {} skipped{}",
        report.executor,
        report.succeeded,
        report.failed,
        report.skipped,
        if report.aborted { " (aborted)" } else { "" }
    );
}
