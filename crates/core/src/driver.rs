//! The pipeline driver.
//!
//! The only component aware of the full stage graph. Stages are strictly
//! ordered; within a stage, per-entry work fans out through the executor
//! and the stage barrier is the executor's join. All other components are
//! pure transformations over explicit inputs and outputs.

use crate::cache::{ContentHash, DerivationCache};
use crate::error::PipelineError;
use crate::report::{ArtifactSummary, FailedTarget, RunReport};
use crate::sink::WarningSink;
use kosha_deconstruct::deconstruct;
use kosha_export_core::{Artifact, Exporter, PackagingConfig};
use kosha_grammar::{RuleTable, build_forms};
use kosha_idf::RenderedEntry;
use kosha_render::{RenderContext, render_entry};
use kosha_traits::{
    Archiver, CancelToken, EntryStore, Executor, InMemoryArchiver, NamedBlob, Scheme,
    Transliterator,
};
use kosha_types::{Deconstruction, Entry, GrammarForm, Stage, Warning, WarningKind};
use kosha_xref::{HeadwordIndex, XrefGraph, resolve_references};
use log::{info, warn};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// The driver's state machine.
///
/// `Failed(stage)` is terminal and reachable from any non-terminal state
/// on a fatal error. Non-fatal per-item issues accumulate in the warning
/// sink and never change the path through these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Loading,
    Deriving,
    Resolving,
    Rendering,
    Exporting,
    Packaging,
    Done,
    Failed(Stage),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::Loading => f.write_str("loading"),
            PipelineState::Deriving => f.write_str("deriving"),
            PipelineState::Resolving => f.write_str("resolving"),
            PipelineState::Rendering => f.write_str("rendering"),
            PipelineState::Exporting => f.write_str("exporting"),
            PipelineState::Packaging => f.write_str("packaging"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Failed(stage) => write!(f, "failed({})", stage),
        }
    }
}

/// Run-level options beyond the packaging config.
#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    pub packaging: PackagingConfig,
    /// Restrict the export to entries filing under these letters. The
    /// derivation and resolution stages always see the full entry set so
    /// referential integrity is judged globally; the filter applies at
    /// the export boundary.
    pub filter_letters: Option<BTreeSet<String>>,
    /// Enable the content-hash derivation caches across runs of this
    /// driver instance.
    pub use_cache: bool,
}

/// The result of one run: the report always, the release only on success.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub release: Result<NamedBlob, PipelineError>,
}

/// Per-entry output of the Deriving stage.
struct DeriveOutcome {
    forms: Vec<GrammarForm>,
    deconstruction: Option<Deconstruction>,
    deconstruction_failed: bool,
}

type GrammarCache = DerivationCache<(Vec<GrammarForm>, Vec<Warning>)>;
type RenderCache = DerivationCache<(RenderedEntry, Vec<Warning>)>;

/// Orchestrates stage ordering, per-stage completion, and final packaging.
pub struct PipelineDriver<E: Executor> {
    store: Arc<dyn EntryStore>,
    rules: Arc<RuleTable>,
    executor: E,
    exporters: Vec<Box<dyn Exporter>>,
    archiver: Box<dyn Archiver>,
    transliterator: Option<(Arc<dyn Transliterator>, Scheme)>,
    options: DriverOptions,
    cancel: CancelToken,
    state: PipelineState,
    grammar_cache: Arc<Mutex<GrammarCache>>,
    render_cache: Arc<Mutex<RenderCache>>,
}

impl<E: Executor> PipelineDriver<E> {
    pub fn new(
        store: Arc<dyn EntryStore>,
        rules: RuleTable,
        executor: E,
        options: DriverOptions,
    ) -> Self {
        Self {
            store,
            rules: Arc::new(rules),
            executor,
            exporters: Vec::new(),
            archiver: Box::new(InMemoryArchiver),
            transliterator: None,
            options,
            cancel: CancelToken::new(),
            state: PipelineState::Idle,
            grammar_cache: Arc::new(Mutex::new(DerivationCache::new())),
            render_cache: Arc::new(Mutex::new(DerivationCache::new())),
        }
    }

    pub fn with_exporter(mut self, exporter: Box<dyn Exporter>) -> Self {
        self.exporters.push(exporter);
        self
    }

    pub fn with_archiver(mut self, archiver: Box<dyn Archiver>) -> Self {
        self.archiver = archiver;
        self
    }

    pub fn with_transliterator(
        mut self,
        transliterator: Arc<dyn Transliterator>,
        scheme: Scheme,
    ) -> Self {
        self.transliterator = Some((transliterator, scheme));
        self
    }

    /// Token for cooperative cancellation; checked between entries.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Executes the full pipeline. The report is produced on every path;
    /// the release archive only when every fatal stage succeeded.
    pub fn run(&mut self) -> RunOutcome {
        let started = Instant::now();
        let mut report = RunReport::begin();
        let sink = WarningSink::new();

        let release = self.run_stages(&mut report, &sink);

        let final_state = match &release {
            Ok(_) => {
                self.transition(PipelineState::Done);
                info!(
                    "[PIPELINE] Run complete in {:?} with {} warnings",
                    started.elapsed(),
                    sink.len()
                );
                self.state.to_string()
            }
            Err(error) => {
                self.state = PipelineState::Failed(error.stage());
                warn!("[PIPELINE] Run failed during {}: {}", error.stage(), error);
                self.state.to_string()
            }
        };

        if self.options.use_cache {
            let (grammar_hits, grammar_misses) = self
                .grammar_cache
                .lock()
                .map(|c| c.stats())
                .unwrap_or((0, 0));
            let (render_hits, render_misses) =
                self.render_cache.lock().map(|c| c.stats()).unwrap_or((0, 0));
            report.cache_hits = grammar_hits + render_hits;
            report.cache_misses = grammar_misses + render_misses;
        }

        report.finish(final_state, sink.drain());
        RunOutcome { report, release }
    }

    fn run_stages(
        &mut self,
        report: &mut RunReport,
        sink: &WarningSink,
    ) -> Result<NamedBlob, PipelineError> {
        // --- STAGE 1: Loading ---
        self.transition(PipelineState::Loading);
        let entries = self.store.fetch_all()?;
        report.entries_loaded = entries.len();
        info!(
            "[LOAD] {} entries from {}",
            entries.len(),
            self.store.name()
        );
        self.check_cancelled(Stage::Loading)?;

        // --- STAGE 2: Deriving (grammar tables + deconstructions) ---
        self.transition(PipelineState::Deriving);
        let index = Arc::new(HeadwordIndex::build(&entries));
        let outcomes = self.derive_stage(&entries, &index, sink);
        self.check_cancelled(Stage::Deriving)?;

        let outcomes: Vec<DeriveOutcome> = outcomes.into_iter().flatten().collect();
        report.grammar_forms = outcomes.iter().map(|o| o.forms.len()).sum();
        report.deconstructions = outcomes
            .iter()
            .filter(|o| o.deconstruction.is_some())
            .count();
        report.deconstruction_errors = outcomes.iter().filter(|o| o.deconstruction_failed).count();
        info!(
            "[DERIVE] {} grammar forms, {} deconstructions ({} failed)",
            report.grammar_forms, report.deconstructions, report.deconstruction_errors
        );

        // --- STAGE 3: Resolving ---
        self.transition(PipelineState::Resolving);
        let deconstructions: Vec<Deconstruction> = outcomes
            .iter()
            .filter_map(|o| o.deconstruction.clone())
            .collect();
        let (graph, xref_warnings) = resolve_references(&entries, &deconstructions, &index);
        sink.extend(xref_warnings);
        report.xref_edges = graph.len();
        info!("[RESOLVE] {} edges in the cross-reference graph", graph.len());
        self.check_cancelled(Stage::Resolving)?;

        // --- STAGE 4: Rendering ---
        self.transition(PipelineState::Rendering);
        let graph = Arc::new(graph);
        let rendered = self.render_stage(entries, outcomes, &index, &graph, sink);
        self.check_cancelled(Stage::Rendering)?;
        let mut rendered: Vec<RenderedEntry> = rendered.into_iter().flatten().collect();
        report.rendered_entries = rendered.len();

        // --- STAGE 5: Exporting ---
        self.transition(PipelineState::Exporting);
        if let Some(letters) = &self.options.filter_letters {
            rendered.retain(|entry| letters.contains(&entry.letter));
            info!(
                "[EXPORT] Letter filter keeps {} of {} entries",
                rendered.len(),
                report.rendered_entries
            );
        }
        report.exported_entries = rendered.len();

        let mut artifacts: Vec<Artifact> = Vec::new();
        for exporter in &self.exporters {
            self.check_cancelled(Stage::Exporting)?;
            let target = exporter.target();
            match exporter.export(&rendered, &self.options.packaging) {
                Ok(output) => {
                    info!(
                        "[EXPORT:{}] {} files, {} bytes",
                        target,
                        output.artifact.files.len(),
                        output.artifact.byte_size()
                    );
                    report.artifacts.push(ArtifactSummary {
                        target: target.to_string(),
                        container: output.artifact.container.clone(),
                        files: output.artifact.files.len(),
                        bytes: output.artifact.byte_size(),
                    });
                    sink.extend(output.warnings);
                    artifacts.push(output.artifact);
                }
                // One target's failure never takes the others down; its
                // partial output is dropped here, unwritten.
                Err(error) => {
                    warn!("[EXPORT:{}] Failed: {}", target, error);
                    report.failed_targets.push(FailedTarget {
                        target: target.to_string(),
                        cause: error.cause.clone(),
                    });
                }
            }
        }

        // --- STAGE 6: Packaging ---
        self.transition(PipelineState::Packaging);
        let mut release_files: Vec<NamedBlob> = Vec::new();
        for artifact in artifacts {
            match artifact.container {
                Some(container) => {
                    let blobs: Vec<NamedBlob> = artifact
                        .files
                        .into_iter()
                        .map(|f| NamedBlob::new(f.name, f.bytes))
                        .collect();
                    let packed = self.archiver.archive(&blobs)?;
                    release_files.push(NamedBlob::new(container, packed));
                }
                None => {
                    release_files.extend(
                        artifact
                            .files
                            .into_iter()
                            .map(|f| NamedBlob::new(f.name, f.bytes)),
                    );
                }
            }
        }
        self.check_cancelled(Stage::Packaging)?;

        let release_name = format!("{}-release.zip", self.options.packaging.name);
        let release_bytes = self.archiver.archive(&release_files)?;
        info!(
            "[PACKAGE] {} ({} bytes) from {} files via {}",
            release_name,
            release_bytes.len(),
            release_files.len(),
            self.archiver.name()
        );

        Ok(NamedBlob::new(release_name, release_bytes))
    }

    fn derive_stage(
        &self,
        entries: &[Entry],
        index: &Arc<HeadwordIndex>,
        sink: &WarningSink,
    ) -> Vec<Option<DeriveOutcome>> {
        let rules = Arc::clone(&self.rules);
        let index = Arc::clone(index);
        let sink = sink.clone();
        let cancel = self.cancel.clone();
        let cache = Arc::clone(&self.grammar_cache);
        let use_cache = self.options.use_cache;

        self.executor.execute_all(entries.to_vec(), move |entry| {
            if cancel.is_cancelled() {
                return None;
            }

            let forms = derive_forms(&entry, &rules, use_cache.then_some(&cache), &sink);

            let (deconstruction, deconstruction_failed) = if entry.compound {
                match deconstruct(&entry, &index) {
                    Ok((deconstruction, warnings)) => {
                        sink.extend(warnings);
                        (Some(deconstruction), false)
                    }
                    Err(error) => {
                        sink.push(Warning::new(
                            Some(error.entry_id.clone()),
                            Stage::Deriving,
                            WarningKind::DeconstructionFailed,
                            error.reason.clone(),
                        ));
                        (None, true)
                    }
                }
            } else {
                (None, false)
            };

            Some(DeriveOutcome {
                forms,
                deconstruction,
                deconstruction_failed,
            })
        })
    }

    fn render_stage(
        &self,
        entries: Vec<Entry>,
        outcomes: Vec<DeriveOutcome>,
        index: &Arc<HeadwordIndex>,
        graph: &Arc<XrefGraph>,
        sink: &WarningSink,
    ) -> Vec<Option<RenderedEntry>> {
        let items: Vec<(Entry, Vec<GrammarForm>, Option<Deconstruction>)> = entries
            .into_iter()
            .zip(outcomes)
            .map(|(entry, outcome)| (entry, outcome.forms, outcome.deconstruction))
            .collect();

        let index = Arc::clone(index);
        let graph = Arc::clone(graph);
        let sink = sink.clone();
        let cancel = self.cancel.clone();
        let cache = Arc::clone(&self.render_cache);
        let use_cache = self.options.use_cache;
        let transliterator = self.transliterator.clone();
        // Rendering depends on the rule table (through the forms) and the
        // transliteration scheme; both participate in the cache key.
        let render_version = match &self.transliterator {
            Some((_, scheme)) => format!("{}+{}", self.rules.version, scheme.as_str()),
            None => self.rules.version.clone(),
        };

        self.executor
            .execute_all(items, move |(entry, forms, deconstruction)| {
                if cancel.is_cancelled() {
                    return None;
                }

                let hash = use_cache.then(|| {
                    ContentHash::of_render_inputs(
                        &entry,
                        &render_version,
                        graph.outbound(&entry.id).map(|edge| {
                            let label = index
                                .label(&edge.target)
                                .unwrap_or_else(|| edge.target.as_str())
                                .to_string();
                            (edge.target.clone(), label)
                        }),
                    )
                });

                if let Some(hash) = &hash {
                    let cached = cache
                        .lock()
                        .ok()
                        .and_then(|mut c| c.get_verified(&entry.id, hash));
                    if let Some((rendered, warnings)) = cached {
                        sink.extend(warnings);
                        return Some(rendered);
                    }
                }

                let ctx = RenderContext {
                    index: &index,
                    graph: &graph,
                    transliterator: transliterator
                        .as_ref()
                        .map(|(service, scheme)| (service.as_ref(), *scheme)),
                };
                let (rendered, warnings) = render_entry(&entry, &forms, deconstruction.as_ref(), &ctx);
                sink.extend(warnings.clone());

                if let (Some(hash), Ok(mut cache)) = (hash, cache.lock()) {
                    cache.insert(entry.id.clone(), hash, (rendered.clone(), warnings));
                }

                Some(rendered)
            })
    }

    fn transition(&mut self, next: PipelineState) {
        info!("[PIPELINE] {} -> {}", self.state, next);
        self.state = next;
    }

    fn check_cancelled(&self, stage: Stage) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            Err(PipelineError::Cancelled(stage))
        } else {
            Ok(())
        }
    }
}

/// Grammar derivation with optional cache. Cached slots keep their
/// warnings so a cache hit re-reports exactly what the computation would.
fn derive_forms(
    entry: &Entry,
    rules: &RuleTable,
    cache: Option<&Arc<Mutex<GrammarCache>>>,
    sink: &WarningSink,
) -> Vec<GrammarForm> {
    let Some(cache) = cache else {
        let (forms, warnings) = build_forms(entry, rules);
        sink.extend(warnings);
        return forms;
    };

    let hash = ContentHash::of_entry(entry, &rules.version);
    if let Ok(mut cache) = cache.lock()
        && let Some((forms, warnings)) = cache.get_verified(&entry.id, &hash)
    {
        sink.extend(warnings);
        return forms;
    }

    let (forms, warnings) = build_forms(entry, rules);
    sink.extend(warnings.clone());
    if let Ok(mut cache) = cache.lock() {
        cache.insert(entry.id.clone(), hash, (forms.clone(), warnings));
    }
    forms
}

#[cfg(test)]
mod tests {
    use super::*;
    use kosha_traits::{InMemoryEntryStore, StoreError, SyncExecutor};
    use kosha_types::{EntryId, GrammarInfo, Sense};

    fn entry(id: &str, headword: &str) -> Entry {
        Entry {
            id: EntryId::new(id),
            headword: headword.to_string(),
            alt_spellings: Vec::new(),
            grammar: GrammarInfo {
                pos: "masc".into(),
                tags: Vec::new(),
                inflection_class: Some("a masc".into()),
                stem: Some(headword.trim_end_matches('a').to_string()),
                construction: None,
            },
            senses: vec![Sense {
                gloss: "gloss".into(),
                literal: None,
                refs: Vec::new(),
            }],
            etymology: None,
            citations: Vec::new(),
            compound: false,
        }
    }

    fn rules() -> RuleTable {
        RuleTable::from_json_str(
            r#"{"version": "t1", "classes": {"a masc": {"endings": [{"label": "nom sg", "suffix": "o"}]}}}"#,
        )
        .unwrap()
    }

    fn driver_with(
        entries: Vec<Entry>,
        options: DriverOptions,
    ) -> PipelineDriver<SyncExecutor> {
        let store = Arc::new(InMemoryEntryStore::from_entries(entries));
        PipelineDriver::new(store, rules(), SyncExecutor::new(), options)
    }

    #[test]
    fn successful_run_ends_done_with_release() {
        let mut driver = driver_with(
            vec![entry("dhamma 1", "dhamma"), entry("cakka 1", "cakka")],
            DriverOptions::default(),
        );
        let outcome = driver.run();
        assert!(outcome.release.is_ok());
        assert_eq!(driver.state(), PipelineState::Done);
        assert_eq!(outcome.report.entries_loaded, 2);
        assert_eq!(outcome.report.rendered_entries, 2);
        assert_eq!(outcome.report.grammar_forms, 2);
        assert_eq!(outcome.report.final_state, "done");
    }

    #[test]
    fn store_failure_is_fatal_at_loading() {
        #[derive(Debug)]
        struct BrokenStore;
        impl EntryStore for BrokenStore {
            fn fetch_all(&self) -> Result<Vec<Entry>, StoreError> {
                Err(StoreError::Unavailable("no such file".into()))
            }
            fn fetch_by_id(&self, _id: &EntryId) -> Result<Option<Entry>, StoreError> {
                Err(StoreError::Unavailable("no such file".into()))
            }
            fn name(&self) -> &'static str {
                "BrokenStore"
            }
        }

        let mut driver = PipelineDriver::new(
            Arc::new(BrokenStore),
            rules(),
            SyncExecutor::new(),
            DriverOptions::default(),
        );
        let outcome = driver.run();
        assert!(outcome.release.is_err());
        assert_eq!(driver.state(), PipelineState::Failed(Stage::Loading));
        assert_eq!(outcome.report.final_state, "failed(loading)");
        // The report is emitted on the failure path too.
        assert_eq!(outcome.report.entries_loaded, 0);
    }

    #[test]
    fn cancellation_stops_between_stages() {
        let mut driver = driver_with(vec![entry("dhamma 1", "dhamma")], DriverOptions::default());
        driver.cancel_token().cancel();
        let outcome = driver.run();
        assert!(matches!(
            outcome.release,
            Err(PipelineError::Cancelled(Stage::Loading))
        ));
        assert_eq!(driver.state(), PipelineState::Failed(Stage::Loading));
    }

    #[test]
    fn second_run_hits_the_derivation_caches() {
        let options = DriverOptions {
            use_cache: true,
            ..DriverOptions::default()
        };
        let mut driver = driver_with(vec![entry("dhamma 1", "dhamma")], options);

        let first = driver.run();
        assert_eq!(first.report.cache_hits, 0);
        assert!(first.report.cache_misses > 0);

        let second = driver.run();
        assert!(second.report.cache_hits >= 2, "grammar and render hits");
        assert_eq!(second.report.rendered_entries, 1);
    }

    #[test]
    fn deconstruction_failure_is_reported_not_fatal() {
        let mut compound = entry("dhammacakka", "dhammacakka");
        compound.compound = true;
        // Constituent "cakka" absent: totality demands a recorded error.
        let mut driver = driver_with(
            vec![entry("dhamma 1", "dhamma"), compound],
            DriverOptions::default(),
        );
        let outcome = driver.run();
        assert!(outcome.release.is_ok());
        assert_eq!(outcome.report.deconstruction_errors, 1);
        assert_eq!(outcome.report.deconstructions, 0);
        assert_eq!(
            outcome.report.warnings_by_kind["deconstruction_failed"], 1
        );
    }

    #[test]
    fn letter_filter_restricts_export_not_rendering() {
        let options = DriverOptions {
            filter_letters: Some(BTreeSet::from(["dh".to_string()])),
            ..DriverOptions::default()
        };
        let mut driver = driver_with(
            vec![entry("dhamma 1", "dhamma"), entry("cakka 1", "cakka")],
            options,
        );
        let outcome = driver.run();
        assert_eq!(outcome.report.rendered_entries, 2);
        assert_eq!(outcome.report.exported_entries, 1);
    }
}
