use clap::{Parser, Subcommand};
use kosha::{PipelineBuilder, PipelineError};
use kosha_types::Entry;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

// Use mimalloc to prevent heap fragmentation: a full dictionary export
// makes many small allocations across long-lived worker threads.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Compile a Pali dictionary database into distributable artifacts.
#[derive(Parser)]
#[command(name = "kosha", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the export pipeline and write the release archive.
    Export {
        /// Path to the dictionary SQLite database.
        #[arg(long)]
        db: PathBuf,
        /// Path to the versioned rule table (JSON). Grammar derivation is
        /// skipped when omitted.
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Path to the export configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory for the release archive and run report.
        #[arg(long, default_value = "dist")]
        out: PathBuf,
        /// Comma-separated targets (anki, stardict, epub). Overrides the
        /// config file.
        #[arg(long, value_delimiter = ',')]
        targets: Option<Vec<String>>,
        /// Comma-separated letter filter for a partial export.
        #[arg(long, value_delimiter = ',')]
        letters: Option<Vec<String>>,
        /// Worker thread count. Defaults to all cores.
        #[arg(long)]
        jobs: Option<usize>,
        /// Run stages sequentially on one thread.
        #[arg(long)]
        sync: bool,
    },
    /// Import a JSON entry dump into a dictionary database.
    Import {
        /// Path to the SQLite database to create or update.
        #[arg(long)]
        db: PathBuf,
        /// Path to the JSON file holding an array of entries.
        #[arg(long)]
        entries: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Export {
            db,
            rules,
            config,
            out,
            targets,
            letters,
            jobs,
            sync,
        } => run_export(db, rules, config, out, targets, letters, jobs, sync),
        Command::Import { db, entries } => run_import(db, entries),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_export(
    db: PathBuf,
    rules: Option<PathBuf>,
    config: Option<PathBuf>,
    out: PathBuf,
    targets: Option<Vec<String>>,
    letters: Option<Vec<String>>,
    jobs: Option<usize>,
    sync: bool,
) -> Result<(), PipelineError> {
    let mut builder = PipelineBuilder::new()
        .with_store_path(db)?
        .with_output_dir(&out)
        .with_sync_executor(sync);

    if let Some(rules) = rules {
        builder = builder.with_rule_table_file(rules)?;
    }
    if let Some(config) = config {
        builder = builder.with_config_file(config)?;
    }
    if let Some(targets) = targets {
        builder = builder.with_targets(targets);
    }
    if let Some(letters) = letters {
        builder = builder.with_letters(letters);
    }
    if let Some(jobs) = jobs {
        builder = builder.with_worker_count(jobs);
    }

    let report = builder.build()?.run_to_dir()?;

    println!(
        "{}: {} entries exported, {} warnings, {} artifacts ({} failed)",
        report.final_state,
        report.exported_entries,
        report.warnings.len(),
        report.artifacts.len(),
        report.failed_targets.len()
    );
    for artifact in &report.artifacts {
        println!(
            "  {:<10} {:>10} bytes  {}",
            artifact.target,
            artifact.bytes,
            artifact.container.as_deref().unwrap_or("-")
        );
    }
    for failed in &report.failed_targets {
        println!("  {:<10} FAILED: {}", failed.target, failed.cause);
    }
    println!("report: {}", out.join("report.json").display());
    Ok(())
}

fn run_import(db: PathBuf, entries_path: PathBuf) -> Result<(), PipelineError> {
    let json = fs::read_to_string(&entries_path)?;
    let entries: Vec<Entry> = serde_json::from_str(&json)?;
    kosha_store::seed::import_to_file(&db, &entries)?;
    println!("imported {} entries into {}", entries.len(), db.display());
    Ok(())
}
