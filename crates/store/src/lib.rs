//! SQLite-backed entry store.
//!
//! The authoring system owns the schema; this crate reads it through
//! typed queries and never writes during an export run. The [`seed`]
//! module is the import side used by upstream tooling and test fixtures.

pub mod seed;

use kosha_traits::{EntryStore, StoreError};
use kosha_types::{Citation, CrossRefDecl, Entry, EntryId, GrammarInfo, RelationKind, Sense};
use log::{debug, info};
use rusqlite::{Connection, OpenFlags, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

/// Read-only SQLite entry store.
///
/// SQLite connections are not `Sync`; a mutex serializes access. The
/// pipeline fetches the full entry set once up front, so contention on
/// the lock is not a concern in practice.
#[derive(Debug)]
pub struct SqliteEntryStore {
    conn: Mutex<Connection>,
}

impl SqliteEntryStore {
    /// Opens an existing dictionary database read-only.
    ///
    /// Failure here is fatal to the whole pipeline: cross-reference
    /// resolution requires global visibility of the entry set.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!("[LOAD] Opening entry store at {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Wraps an already-open connection (used by the seeding tooling and
    /// in-memory tests).
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        f(&conn).map_err(|e| StoreError::Query(e.to_string()))
    }
}

fn entry_from_row(row: &Row<'_>) -> Result<Entry, rusqlite::Error> {
    let id: String = row.get("id")?;
    let tags: String = row.get("tags")?;
    Ok(Entry {
        id: EntryId::new(id),
        headword: row.get("headword")?,
        alt_spellings: Vec::new(),
        grammar: GrammarInfo {
            pos: row.get("pos")?,
            tags: tags.split_whitespace().map(String::from).collect(),
            inflection_class: row.get("inflection_class")?,
            stem: row.get("stem")?,
            construction: row.get("construction")?,
        },
        senses: Vec::new(),
        etymology: row.get("etymology")?,
        citations: Vec::new(),
        compound: row.get::<_, i64>("compound")? != 0,
    })
}

const ENTRY_COLUMNS: &str =
    "id, headword, pos, tags, inflection_class, stem, construction, etymology, compound";

impl EntryStore for SqliteEntryStore {
    fn fetch_all(&self) -> Result<Vec<Entry>, StoreError> {
        self.with_conn(|conn| {
            let mut by_id: BTreeMap<EntryId, Entry> = BTreeMap::new();

            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY id"
            ))?;
            for entry in stmt.query_map([], entry_from_row)? {
                let entry = entry?;
                by_id.insert(entry.id.clone(), entry);
            }

            let mut stmt = conn.prepare(
                "SELECT entry_id, spelling FROM alt_spellings ORDER BY entry_id, spelling",
            )?;
            for row in stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })? {
                let (entry_id, spelling) = row?;
                if let Some(entry) = by_id.get_mut(&EntryId::new(entry_id)) {
                    entry.alt_spellings.push(spelling);
                }
            }

            let mut stmt = conn.prepare(
                "SELECT entry_id, position, gloss, literal FROM senses ORDER BY entry_id, position",
            )?;
            for row in stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    Sense {
                        gloss: row.get(2)?,
                        literal: row.get(3)?,
                        refs: Vec::new(),
                    },
                ))
            })? {
                let (entry_id, sense) = row?;
                if let Some(entry) = by_id.get_mut(&EntryId::new(entry_id)) {
                    entry.senses.push(sense);
                }
            }

            let mut stmt = conn.prepare(
                "SELECT entry_id, sense_position, target_headword, kind \
                 FROM cross_references ORDER BY rowid",
            )?;
            for row in stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    CrossRefDecl {
                        target: row.get(2)?,
                        kind: RelationKind::parse(&row.get::<_, String>(3)?),
                    },
                ))
            })? {
                let (entry_id, sense_position, decl) = row?;
                if let Some(entry) = by_id.get_mut(&EntryId::new(entry_id)) {
                    // Entry-level references attach to the first sense so
                    // the pipeline sees one uniform declaration shape.
                    let position = sense_position.unwrap_or(0).max(0) as usize;
                    if let Some(sense) = entry.senses.get_mut(position) {
                        sense.refs.push(decl);
                    }
                }
            }

            let mut stmt = conn.prepare(
                "SELECT entry_id, source, sutta, example FROM citations ORDER BY entry_id, position",
            )?;
            for row in stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    Citation {
                        source: row.get(1)?,
                        sutta: row.get(2)?,
                        example: row.get(3)?,
                    },
                ))
            })? {
                let (entry_id, citation) = row?;
                if let Some(entry) = by_id.get_mut(&EntryId::new(entry_id)) {
                    entry.citations.push(citation);
                }
            }

            debug!("[LOAD] Fetched {} entries", by_id.len());
            Ok(by_id.into_values().collect())
        })
    }

    fn fetch_by_id(&self, id: &EntryId) -> Result<Option<Entry>, StoreError> {
        let id_str = id.as_str().to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"
            ))?;
            let mut rows = stmt.query_map([&id_str], entry_from_row)?;
            let Some(entry) = rows.next() else {
                return Ok(None);
            };
            let mut entry = entry?;

            let mut stmt = conn.prepare(
                "SELECT spelling FROM alt_spellings WHERE entry_id = ?1 ORDER BY spelling",
            )?;
            entry.alt_spellings = stmt
                .query_map([&id_str], |row| row.get::<_, String>(0))?
                .collect::<Result<_, _>>()?;

            let mut stmt = conn.prepare(
                "SELECT gloss, literal FROM senses WHERE entry_id = ?1 ORDER BY position",
            )?;
            entry.senses = stmt
                .query_map([&id_str], |row| {
                    Ok(Sense {
                        gloss: row.get(0)?,
                        literal: row.get(1)?,
                        refs: Vec::new(),
                    })
                })?
                .collect::<Result<_, _>>()?;

            let mut stmt = conn.prepare(
                "SELECT sense_position, target_headword, kind FROM cross_references \
                 WHERE entry_id = ?1 ORDER BY rowid",
            )?;
            for row in stmt.query_map([&id_str], |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?,
                    CrossRefDecl {
                        target: row.get(1)?,
                        kind: RelationKind::parse(&row.get::<_, String>(2)?),
                    },
                ))
            })? {
                let (sense_position, decl) = row?;
                let position = sense_position.unwrap_or(0).max(0) as usize;
                if let Some(sense) = entry.senses.get_mut(position) {
                    sense.refs.push(decl);
                }
            }

            let mut stmt = conn.prepare(
                "SELECT source, sutta, example FROM citations WHERE entry_id = ?1 ORDER BY position",
            )?;
            entry.citations = stmt
                .query_map([&id_str], |row| {
                    Ok(Citation {
                        source: row.get(0)?,
                        sutta: row.get(1)?,
                        example: row.get(2)?,
                    })
                })?
                .collect::<Result<_, _>>()?;

            Ok(Some(entry))
        })
    }

    fn name(&self) -> &'static str {
        "SqliteEntryStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use kosha_types::Sense;

    fn sample_entry(id: &str, headword: &str) -> Entry {
        Entry {
            id: EntryId::new(id),
            headword: headword.to_string(),
            alt_spellings: vec![format!("{headword}-alt")],
            grammar: GrammarInfo {
                pos: "masc".into(),
                tags: vec!["nt".into()],
                inflection_class: Some("a masc".into()),
                stem: Some(headword.trim_end_matches('a').to_string()),
                construction: None,
            },
            senses: vec![
                Sense {
                    gloss: "first".into(),
                    literal: Some("lit".into()),
                    refs: vec![CrossRefDecl {
                        target: "other".into(),
                        kind: RelationKind::Synonym,
                    }],
                },
                Sense {
                    gloss: "second".into(),
                    literal: None,
                    refs: Vec::new(),
                },
            ],
            etymology: Some("√dhṛ".into()),
            citations: vec![Citation {
                source: "MN 1".into(),
                sutta: "mūlapariyāya".into(),
                example: "dhammaṃ deseti".into(),
            }],
            compound: false,
        }
    }

    fn seeded_store(entries: &[Entry]) -> SqliteEntryStore {
        let mut conn = Connection::open_in_memory().unwrap();
        seed::create_schema(&conn).unwrap();
        seed::insert_entries(&mut conn, entries).unwrap();
        SqliteEntryStore::from_connection(conn)
    }

    #[test]
    fn roundtrips_full_entry() {
        let original = sample_entry("dhamma 1", "dhamma");
        let store = seeded_store(std::slice::from_ref(&original));
        let fetched = store.fetch_by_id(&EntryId::new("dhamma 1")).unwrap().unwrap();
        assert_eq!(fetched, original);
    }

    #[test]
    fn fetch_all_orders_by_id() {
        let store = seeded_store(&[
            sample_entry("cakka 1", "cakka"),
            sample_entry("aggi", "aggi"),
        ]);
        let all = store.fetch_all().unwrap();
        let ids: Vec<_> = all.iter().map(|e| e.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["aggi", "cakka 1"]);
        assert_eq!(all[0].senses.len(), 2);
    }

    #[test]
    fn fetch_by_id_miss_is_none() {
        let store = seeded_store(&[]);
        assert!(store.fetch_by_id(&EntryId::new("none")).unwrap().is_none());
    }

    #[test]
    fn open_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqliteEntryStore::open(dir.path().join("missing.db"));
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
