use kosha_grammar::RuleTable;
use kosha_types::{Citation, CrossRefDecl, Entry, EntryId, GrammarInfo, RelationKind, Sense};

/// The fixture rule table: one masculine and one neuter a-stem class.
pub fn rule_table() -> RuleTable {
    RuleTable::from_json_str(
        r#"{
            "version": "fixture-1",
            "classes": {
                "a masc": {
                    "endings": [
                        {"label": "nom sg", "suffix": "o"},
                        {"label": "acc sg", "suffix": "aṃ"},
                        {"label": "nom pl", "suffix": "ā"}
                    ]
                },
                "a nt": {
                    "endings": [
                        {"label": "nom sg", "suffix": "aṃ"},
                        {"label": "nom pl", "suffix": "āni"}
                    ]
                }
            }
        }"#,
    )
    .expect("fixture rule table parses")
}

pub fn entry(id: &str, headword: &str, pos: &str, glosses: &[&str]) -> Entry {
    Entry {
        id: EntryId::new(id),
        headword: headword.to_string(),
        alt_spellings: Vec::new(),
        grammar: GrammarInfo {
            pos: pos.to_string(),
            tags: Vec::new(),
            inflection_class: None,
            stem: None,
            construction: None,
        },
        senses: glosses
            .iter()
            .map(|gloss| Sense {
                gloss: gloss.to_string(),
                literal: None,
                refs: Vec::new(),
            })
            .collect(),
        etymology: None,
        citations: Vec::new(),
        compound: false,
    }
}

pub fn inflected(mut base: Entry, class: &str, stem: &str) -> Entry {
    base.grammar.inflection_class = Some(class.to_string());
    base.grammar.stem = Some(stem.to_string());
    base
}

pub fn with_ref(mut base: Entry, sense: usize, target: &str, kind: RelationKind) -> Entry {
    base.senses[sense].refs.push(CrossRefDecl {
        target: target.to_string(),
        kind,
    });
    base
}

/// The standard fixture lexicon exercised across the integration tests:
/// a compound, homonyms sharing a spelling, cross-references (resolved,
/// ambiguous, and unresolved), inflections, and a citation.
pub fn sample_lexicon() -> Vec<Entry> {
    let dhamma = inflected(
        entry("dhamma 1", "dhamma", "masc", &["law", "teaching"]),
        "a masc",
        "dhamm",
    );

    let cakka = inflected(entry("cakka 1", "cakka", "nt", &["wheel"]), "a nt", "cakk");

    let mut dhammacakka = entry(
        "dhammacakka",
        "dhammacakka",
        "nt",
        &["wheel of the teaching"],
    );
    dhammacakka.compound = true;
    dhammacakka.grammar.construction = Some("dhamma + cakka".to_string());
    dhammacakka.citations.push(Citation {
        source: "SN 56.11".to_string(),
        sutta: "dhammacakkappavattana".to_string(),
        example: "dhammacakkaṃ pavattitaṃ".to_string(),
    });

    let nibbana_1 = with_ref(
        entry("nibbāna 1", "nibbāna", "nt", &["extinction", "quenching"]),
        0,
        "missing-word",
        RelationKind::SeeAlso,
    );
    let nibbana_2 = entry("nibbāna 2", "nibbāna", "nt", &["final liberation"]);

    // Ambiguous reference: "nibbāna" matches both homonyms.
    let metta = with_ref(
        entry("mettā", "mettā", "fem", &["loving kindness"]),
        0,
        "nibbāna",
        RelationKind::SeeAlso,
    );

    let khanti = with_ref(
        entry("khanti", "khanti", "fem", &["patience"]),
        0,
        "mettā",
        RelationKind::Synonym,
    );

    vec![
        dhamma, cakka, dhammacakka, nibbana_1, nibbana_2, metta, khanti,
    ]
}
