use criterion::{Criterion, criterion_group, criterion_main};
use kosha::PipelineBuilder;
use kosha::pipeline::ExportConfig;
use kosha_grammar::RuleTable;
use kosha_traits::InMemoryEntryStore;
use kosha_types::{Entry, EntryId, GrammarInfo, Sense};
use std::sync::Arc;

fn synthetic_lexicon(count: usize) -> Vec<Entry> {
    let stems = ["dhamm", "cakk", "mett", "khant", "nibb"];
    (0..count)
        .map(|i| {
            let stem = stems[i % stems.len()];
            let headword = format!("{}a{}", stem, i);
            Entry {
                id: EntryId::new(headword.clone()),
                headword,
                alt_spellings: Vec::new(),
                grammar: GrammarInfo {
                    pos: "masc".into(),
                    tags: Vec::new(),
                    inflection_class: Some("a masc".into()),
                    stem: Some(format!("{}a{}", stem, i)),
                    construction: None,
                },
                senses: vec![Sense {
                    gloss: format!("gloss {}", i),
                    literal: None,
                    refs: Vec::new(),
                }],
                etymology: None,
                citations: Vec::new(),
                compound: false,
            }
        })
        .collect()
}

fn rules() -> RuleTable {
    RuleTable::from_json_str(
        r#"{"version": "bench-1", "classes": {"a masc": {"endings": [
            {"label": "nom sg", "suffix": "o"},
            {"label": "acc sg", "suffix": "aṃ"},
            {"label": "ins pl", "suffix": "ehi"}
        ]}}}"#,
    )
    .unwrap()
}

fn bench_full_pipeline(c: &mut Criterion) {
    let entries = synthetic_lexicon(2000);

    c.bench_function("pipeline_2000_entries", |b| {
        b.iter(|| {
            let mut pipeline = PipelineBuilder::new()
                .with_store(Arc::new(InMemoryEntryStore::from_entries(entries.clone())))
                .with_rule_table(rules())
                .with_config(ExportConfig::default())
                .build()
                .unwrap();
            let outcome = pipeline.run();
            assert!(outcome.release.is_ok());
        })
    });
}

criterion_group!(benches, bench_full_pipeline);
criterion_main!(benches);
