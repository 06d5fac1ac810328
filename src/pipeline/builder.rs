// src/pipeline/builder.rs
use super::config::{ALL_TARGETS, ExportConfig};
use crate::archive::ZipArchiver;
use kosha_core::{DriverOptions, PipelineError, PipelineState, RunOutcome, RunReport};
use kosha_core::driver::PipelineDriver;
use kosha_executor::ExecutorImpl;
use kosha_export_anki::AnkiExporter;
use kosha_export_core::Exporter;
use kosha_export_epub::EpubExporter;
use kosha_export_stardict::StarDictExporter;
use kosha_grammar::RuleTable;
use kosha_store::SqliteEntryStore;
use kosha_traits::{CancelToken, EntryStore, Scheme, SyncExecutor, Transliterator};
use log::info;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A builder for creating an [`ExportPipeline`].
pub struct PipelineBuilder {
    store: Option<Arc<dyn EntryStore>>,
    rules: Option<RuleTable>,
    config: ExportConfig,
    transliterator: Option<(Arc<dyn Transliterator>, Scheme)>,
    worker_count: Option<usize>,
    force_sync: bool,
    out_dir: PathBuf,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            store: None,
            rules: None,
            config: ExportConfig::default(),
            transliterator: None,
            worker_count: None,
            force_sync: false,
            out_dir: PathBuf::from("dist"),
        }
    }
}

impl PipelineBuilder {
    /// Creates a new `PipelineBuilder` with default settings.
    pub fn new() -> Self {
        Default::default()
    }

    /// Opens the SQLite entry store at `path`. Fatal if it cannot be
    /// opened: no partial run is attempted without the full entry set.
    pub fn with_store_path<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        self.store = Some(Arc::new(SqliteEntryStore::open(path)?));
        Ok(self)
    }

    /// Uses an already-constructed entry store (in-memory stores in tests,
    /// custom backends in embedding applications).
    pub fn with_store(mut self, store: Arc<dyn EntryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Loads the versioned morphological rule table from a JSON file.
    pub fn with_rule_table_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        self.rules = Some(RuleTable::load(path)?);
        Ok(self)
    }

    pub fn with_rule_table(mut self, rules: RuleTable) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Loads the export configuration from a JSON file.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        let json = fs::read_to_string(path)?;
        self.config = serde_json::from_str(&json)?;
        Ok(self)
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    /// Restricts the run to the given targets (overrides the config file).
    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.config.targets = targets;
        self
    }

    /// Restricts the export to the given letters (overrides the config).
    pub fn with_letters(mut self, letters: Vec<String>) -> Self {
        self.config.letters = Some(letters);
        self
    }

    /// Installs a transliteration service applied during rendering.
    pub fn with_transliterator(
        mut self,
        service: Arc<dyn Transliterator>,
        scheme: Scheme,
    ) -> Self {
        self.transliterator = Some((service, scheme));
        self
    }

    /// Bounds the worker pool. Defaults to the executor's own sizing
    /// (all cores for the rayon executor).
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = Some(workers);
        self
    }

    /// Forces sequential execution. Useful for debugging and for
    /// determinism comparisons against the parallel path.
    pub fn with_sync_executor(mut self, force_sync: bool) -> Self {
        self.force_sync = force_sync;
        self
    }

    /// Directory the release archive and run report are written to.
    pub fn with_output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.out_dir = path.as_ref().to_path_buf();
        self
    }

    /// Consumes the builder and creates the `ExportPipeline`.
    pub fn build(self) -> Result<ExportPipeline, PipelineError> {
        let executor = self.select_executor();

        let store = self.store.ok_or_else(|| {
            PipelineError::Config(
                "No entry store has been configured. Use `with_store_path` or `with_store`."
                    .to_string(),
            )
        })?;

        let rules = self.rules.unwrap_or_else(|| {
            info!("[PIPELINE] No rule table configured; grammar derivation is skipped.");
            RuleTable::empty()
        });
        info!(
            "[PIPELINE] Using {} with parallelism {}",
            kosha_traits::Executor::name(&executor),
            kosha_traits::Executor::parallelism(&executor)
        );

        let options = DriverOptions {
            packaging: self.config.packaging.clone(),
            filter_letters: self
                .config
                .letters
                .as_ref()
                .map(|letters| letters.iter().cloned().collect::<BTreeSet<String>>()),
            use_cache: self.config.use_cache,
        };

        let mut driver = PipelineDriver::new(store, rules, executor, options)
            .with_archiver(Box::new(ZipArchiver));
        for exporter in select_exporters(&self.config.targets)? {
            driver = driver.with_exporter(exporter);
        }
        if let Some((service, scheme)) = self.transliterator {
            driver = driver.with_transliterator(service, scheme);
        }

        Ok(ExportPipeline {
            driver,
            out_dir: self.out_dir,
        })
    }

    fn select_executor(&self) -> ExecutorImpl {
        if self.force_sync {
            return ExecutorImpl::Sync(SyncExecutor::new());
        }
        #[cfg(feature = "rayon-executor")]
        {
            // Leave one core for the driver thread unless the caller asked
            // for an explicit count. The global pool can only be sized once
            // per process; a later builder keeps the existing pool.
            let workers = self
                .worker_count
                .unwrap_or_else(|| num_cpus::get().saturating_sub(1))
                .max(1);
            let _ = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build_global();
            ExecutorImpl::default()
        }
        #[cfg(not(feature = "rayon-executor"))]
        {
            ExecutorImpl::Sync(SyncExecutor::new())
        }
    }
}

fn select_exporters(targets: &[String]) -> Result<Vec<Box<dyn Exporter>>, PipelineError> {
    let mut exporters: Vec<Box<dyn Exporter>> = Vec::new();
    for target in targets {
        match target.as_str() {
            "anki" => exporters.push(Box::new(AnkiExporter)),
            "stardict" => exporters.push(Box::new(StarDictExporter)),
            "epub" => exporters.push(Box::new(EpubExporter)),
            other => {
                return Err(PipelineError::Config(format!(
                    "Unknown export target '{}'. Known targets: {}",
                    other,
                    ALL_TARGETS.join(", ")
                )));
            }
        }
    }
    Ok(exporters)
}

/// A configured pipeline bound to an output directory.
pub struct ExportPipeline {
    driver: PipelineDriver<ExecutorImpl>,
    out_dir: PathBuf,
}

impl ExportPipeline {
    /// Token for cooperative cancellation from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.driver.cancel_token()
    }

    pub fn state(&self) -> PipelineState {
        self.driver.state()
    }

    /// Runs the pipeline in memory without touching the filesystem.
    pub fn run(&mut self) -> RunOutcome {
        self.driver.run()
    }

    /// Runs the pipeline and writes the release archive plus `report.json`
    /// to the output directory. The report is written on failure too; the
    /// release archive only on success (a half-packaged release is never
    /// published).
    pub fn run_to_dir(&mut self) -> Result<RunReport, PipelineError> {
        let outcome = self.driver.run();

        fs::create_dir_all(&self.out_dir)?;
        let report_path = self.out_dir.join("report.json");
        fs::write(&report_path, outcome.report.to_json_pretty()?)?;
        info!("[PIPELINE] Report written to {}", report_path.display());

        match outcome.release {
            Ok(release) => {
                let release_path = self.out_dir.join(&release.name);
                fs::write(&release_path, &release.bytes)?;
                info!("[PIPELINE] Release written to {}", release_path.display());
                Ok(outcome.report)
            }
            Err(error) => Err(error),
        }
    }
}
