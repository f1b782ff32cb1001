//! Read-only table of raw move records, keyed by move id.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::error::{DataLoadError, MoveError};
use crate::model::Move;

/// A raw rule record exactly as it appears in the data file
pub type RawRecord = Map<String, Value>;

static GLOBAL: OnceLock<MoveCatalog> = OnceLock::new();

/// Move rule data, loaded once and never mutated.
///
/// Records are kept raw; they are decoded into a [`Move`] only when an
/// identifier is resolved, so one bad record cannot take down the catalog.
#[derive(Debug, Clone, Default)]
pub struct MoveCatalog {
    records: HashMap<String, RawRecord>,
}

impl MoveCatalog {
    /// Load a catalog from a JSON file mapping move ids to records
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), moves = catalog.len(), "Loaded move catalog");
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataLoadError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Build a catalog from an already parsed JSON object of records
    pub fn from_value(value: Value) -> Result<Self, DataLoadError> {
        let Value::Object(entries) = value else {
            return Err(DataLoadError::Malformed(
                "top level must be an object of move records".to_string(),
            ));
        };

        let records = entries
            .into_iter()
            .map(|(id, record)| match record {
                Value::Object(record) => Ok((id, record)),
                other => Err(DataLoadError::Malformed(format!(
                    "record for {} is not an object: {}",
                    id, other
                ))),
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self { records })
    }

    /// Install `self` as the process-wide catalog
    pub fn install(self) -> Result<&'static MoveCatalog, DataLoadError> {
        GLOBAL
            .set(self)
            .map_err(|_| DataLoadError::AlreadyInitialized)?;
        GLOBAL.get().ok_or(DataLoadError::AlreadyInitialized)
    }

    /// The process-wide catalog, if one has been installed
    pub fn global() -> Option<&'static MoveCatalog> {
        GLOBAL.get()
    }

    pub fn lookup(&self, id: &str) -> Result<&RawRecord, MoveError> {
        self.records
            .get(id)
            .ok_or_else(|| MoveError::UnknownMove(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Resolve a move name as sent by the server into its normalized model
    pub fn resolve(&self, identifier: &str) -> Result<Move, MoveError> {
        Move::resolve(self, identifier)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
