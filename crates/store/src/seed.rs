//! Schema creation and entry import.
//!
//! The export pipeline never writes to the store; this module is the
//! import side, used by the `kosha import` command to build a database
//! from an upstream JSON dump and by tests to seed fixtures.

use kosha_traits::StoreError;
use kosha_types::Entry;
use log::info;
use rusqlite::{Connection, params};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entries (
    id               TEXT PRIMARY KEY,
    headword         TEXT NOT NULL,
    pos              TEXT NOT NULL DEFAULT '',
    tags             TEXT NOT NULL DEFAULT '',
    inflection_class TEXT,
    stem             TEXT,
    construction     TEXT,
    etymology        TEXT,
    compound         INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS senses (
    entry_id TEXT NOT NULL REFERENCES entries(id),
    position INTEGER NOT NULL,
    gloss    TEXT NOT NULL,
    literal  TEXT,
    PRIMARY KEY (entry_id, position)
);
CREATE TABLE IF NOT EXISTS alt_spellings (
    entry_id TEXT NOT NULL REFERENCES entries(id),
    spelling TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS cross_references (
    entry_id        TEXT NOT NULL REFERENCES entries(id),
    sense_position  INTEGER,
    target_headword TEXT NOT NULL,
    kind            TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS citations (
    entry_id TEXT NOT NULL REFERENCES entries(id),
    position INTEGER NOT NULL,
    source   TEXT NOT NULL,
    sutta    TEXT NOT NULL,
    example  TEXT NOT NULL,
    PRIMARY KEY (entry_id, position)
);
";

/// Creates the dictionary schema if it does not exist.
pub fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| StoreError::Query(format!("schema creation failed: {}", e)))
}

/// Inserts entries inside one transaction. An entry that already exists
/// is replaced wholesale, matching upstream authoring semantics.
pub fn insert_entries(conn: &mut Connection, entries: &[Entry]) -> Result<(), StoreError> {
    let tx = conn
        .transaction()
        .map_err(|e| StoreError::Query(e.to_string()))?;

    for entry in entries {
        let id = entry.id.as_str();
        tx.execute("DELETE FROM senses WHERE entry_id = ?1", [id])
            .map_err(|e| StoreError::Query(e.to_string()))?;
        tx.execute("DELETE FROM alt_spellings WHERE entry_id = ?1", [id])
            .map_err(|e| StoreError::Query(e.to_string()))?;
        tx.execute("DELETE FROM cross_references WHERE entry_id = ?1", [id])
            .map_err(|e| StoreError::Query(e.to_string()))?;
        tx.execute("DELETE FROM citations WHERE entry_id = ?1", [id])
            .map_err(|e| StoreError::Query(e.to_string()))?;

        tx.execute(
            "INSERT OR REPLACE INTO entries \
             (id, headword, pos, tags, inflection_class, stem, construction, etymology, compound) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                entry.headword,
                entry.grammar.pos,
                entry.grammar.tags.join(" "),
                entry.grammar.inflection_class,
                entry.grammar.stem,
                entry.grammar.construction,
                entry.etymology,
                entry.compound as i64,
            ],
        )
        .map_err(|e| StoreError::Query(e.to_string()))?;

        for spelling in &entry.alt_spellings {
            tx.execute(
                "INSERT INTO alt_spellings (entry_id, spelling) VALUES (?1, ?2)",
                params![id, spelling],
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;
        }

        for (position, sense) in entry.senses.iter().enumerate() {
            tx.execute(
                "INSERT INTO senses (entry_id, position, gloss, literal) VALUES (?1, ?2, ?3, ?4)",
                params![id, position as i64, sense.gloss, sense.literal],
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;

            for decl in &sense.refs {
                tx.execute(
                    "INSERT INTO cross_references \
                     (entry_id, sense_position, target_headword, kind) \
                     VALUES (?1, ?2, ?3, ?4)",
                    params![id, position as i64, decl.target, decl.kind.as_str()],
                )
                .map_err(|e| StoreError::Query(e.to_string()))?;
            }
        }

        for (position, citation) in entry.citations.iter().enumerate() {
            tx.execute(
                "INSERT INTO citations (entry_id, position, source, sutta, example) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    position as i64,
                    citation.source,
                    citation.sutta,
                    citation.example
                ],
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;
        }
    }

    tx.commit().map_err(|e| StoreError::Query(e.to_string()))?;
    info!("[SEED] Imported {} entries", entries.len());
    Ok(())
}

/// Creates (or opens) a database file and imports `entries` into it.
pub fn import_to_file(
    path: impl AsRef<std::path::Path>,
    entries: &[Entry],
) -> Result<(), StoreError> {
    let mut conn = Connection::open(path.as_ref())
        .map_err(|e| StoreError::Unavailable(format!("{}: {}", path.as_ref().display(), e)))?;
    create_schema(&conn)?;
    insert_entries(&mut conn, entries)
}
