//! The identifier map: every id the parser sees, in registration order.
//!
//! Ids are registered as blocks finish parsing, so later references can be
//! resolved and duplicate definitions can be reported with both locations.
//! Collisions are recorded rather than rejected; the duplicate-id validator
//! decides whether they matter.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where an id was defined and what kind of block defined it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRecord {
    /// Stable node kind label, e.g. `"item"`
    pub kind: String,
    /// Physical file of the defining block
    pub file: String,
    /// 1-based line of the defining block
    pub line: u32,
}

impl IdRecord {
    pub fn new(kind: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            kind: kind.into(),
            file: file.into(),
            line,
        }
    }
}

/// One id's entry: a single definition, or the collision list (newest
/// first) once the id has been defined more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdEntry {
    Single(IdRecord),
    Collision(Vec<IdRecord>),
}

impl IdEntry {
    /// The most recently registered record.
    pub fn newest(&self) -> &IdRecord {
        match self {
            IdEntry::Single(record) => record,
            // Collision lists are non-empty by construction
            IdEntry::Collision(records) => &records[0],
        }
    }

    /// Number of registered definitions.
    pub fn definition_count(&self) -> usize {
        match self {
            IdEntry::Single(_) => 1,
            IdEntry::Collision(records) => records.len(),
        }
    }
}

/// Mapping from id to definition record(s), populated in source order
/// during parsing and read during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdMap {
    entries: IndexMap<String, IdEntry>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition of `id`.
    ///
    /// A first registration stores a single record. A repeat converts the
    /// entry to a collision list; further repeats prepend, so the newest
    /// definition is always first.
    pub fn register(&mut self, id: impl Into<String>, record: IdRecord) {
        match self.entries.entry(id.into()) {
            indexmap::map::Entry::Vacant(vacant) => {
                vacant.insert(IdEntry::Single(record));
            }
            indexmap::map::Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                match entry {
                    IdEntry::Single(existing) => {
                        let first = existing.clone();
                        *entry = IdEntry::Collision(vec![record, first]);
                    }
                    IdEntry::Collision(records) => {
                        records.insert(0, record);
                    }
                }
            }
        }
    }

    /// The full entry for `id`.
    pub fn entry(&self, id: &str) -> Option<&IdEntry> {
        self.entries.get(id)
    }

    /// The newest record for `id`.
    pub fn lookup(&self, id: &str) -> Option<&IdRecord> {
        self.entries.get(id).map(IdEntry::newest)
    }

    /// The node kind label the newest definition of `id` has.
    pub fn kind_of(&self, id: &str) -> Option<&str> {
        self.lookup(id).map(|record| record.kind.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All ids with more than one definition, in registration order.
    pub fn collisions(&self) -> impl Iterator<Item = (&str, &[IdRecord])> {
        self.entries.iter().filter_map(|(id, entry)| match entry {
            IdEntry::Single(_) => None,
            IdEntry::Collision(records) => Some((id.as_str(), records.as_slice())),
        })
    }

    /// All `(id, entry)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IdEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }
}
