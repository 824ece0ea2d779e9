//! In-memory read-only index over the movie set.
//!
//! Loaded once at process start; iteration order matches similarity-matrix
//! row order. Every operation on an empty catalog returns an empty result so
//! downstream rankers can always fall back.

use crate::error::{EngineError, Result};
use crate::types::{CatalogRow, MovieId, MovieRecord};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<MovieRecord>,
    by_id: HashMap<MovieId, usize>,
    // Lowercased title → row. First insertion wins for duplicate titles.
    by_title: HashMap<String, usize>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from normalized records. Rows with an id already present are
    /// skipped; id uniqueness is a catalog invariant.
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let mut catalog = Catalog::default();
        for record in records {
            if catalog.by_id.contains_key(&record.id) {
                warn!(movie_id = record.id, "duplicate movie id in catalog source, skipping");
                continue;
            }
            let row = catalog.records.len();
            catalog.by_id.insert(record.id, row);
            catalog
                .by_title
                .entry(record.title.to_lowercase())
                .or_insert(row);
            catalog.records.push(record);
        }
        catalog
    }

    /// Build from raw source rows, filling missing columns with the
    /// documented defaults rather than failing the load.
    pub fn from_rows(rows: Vec<CatalogRow>) -> Self {
        Self::from_records(rows.into_iter().map(CatalogRow::into_record).collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in similarity-matrix row order.
    pub fn iter(&self) -> impl Iterator<Item = &MovieRecord> {
        self.records.iter()
    }

    pub fn get(&self, row: usize) -> Option<&MovieRecord> {
        self.records.get(row)
    }

    pub fn by_id(&self, movie_id: MovieId) -> Option<&MovieRecord> {
        self.by_id.get(&movie_id).map(|&row| &self.records[row])
    }

    /// Case-insensitive title lookup; first match wins for non-unique
    /// titles.
    pub fn by_title(&self, title: &str) -> Result<&MovieRecord> {
        self.title_row(title).map(|row| &self.records[row])
    }

    /// Row position for a title, used to address the similarity matrix.
    pub fn title_row(&self, title: &str) -> Result<usize> {
        self.by_title
            .get(&title.to_lowercase())
            .copied()
            .ok_or_else(|| EngineError::not_found(format!("movie '{title}'")))
    }

    /// Row position for a movie id. Keeps content ranking safe against
    /// id/row misalignment: unknown ids fail closed.
    pub fn row_index(&self, movie_id: MovieId) -> Result<usize> {
        self.by_id
            .get(&movie_id)
            .copied()
            .ok_or_else(|| EngineError::not_found(format!("movie id {movie_id}")))
    }
}
