use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use crate::error::{CarrierError, Result};
use crate::models::Party;

/// Origin name to shipper record, as stored in the address file.
pub type OriginTable = BTreeMap<String, Party>;

/// Lazily loaded, read-only view of the address file.
///
/// The first successful load is cached for the lifetime of the book.
/// Concurrent first loads block on the same cell, so the file is parsed once.
#[derive(Debug)]
pub struct AddressBook {
    path: PathBuf,
    table: OnceCell<OriginTable>,
}

impl AddressBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceCell::new(),
        }
    }

    /// Book backed by an already parsed table. No file is read.
    pub fn from_table(table: OriginTable) -> Self {
        Self {
            path: PathBuf::new(),
            table: OnceCell::with_value(table),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> Result<&OriginTable> {
        self.table.get_or_try_init(|| read_table(&self.path))
    }

    /// Origin names in the table, sorted.
    pub fn origins(&self) -> Result<Vec<String>> {
        Ok(self.table()?.keys().cloned().collect())
    }

    /// Fails unless the table's key set equals `accepted`.
    pub fn ensure_origins(&self, accepted: &[String]) -> Result<()> {
        let configured: BTreeSet<&str> = self.table()?.keys().map(String::as_str).collect();
        let accepted: BTreeSet<&str> = accepted.iter().map(String::as_str).collect();

        if configured == accepted {
            return Ok(());
        }

        let unaddressed: Vec<&str> = accepted.difference(&configured).copied().collect();
        let unaccepted: Vec<&str> = configured.difference(&accepted).copied().collect();

        Err(CarrierError::Configuration(format!(
            "Origin set mismatch: accepted without address [{}], addressed but not accepted [{}]",
            unaddressed.join(", "),
            unaccepted.join(", ")
        )))
    }
}

fn read_table(path: &Path) -> Result<OriginTable> {
    let raw = fs::read_to_string(path).map_err(|e| {
        CarrierError::Configuration(format!(
            "Address config not readable at {}: {}",
            path.display(),
            e
        ))
    })?;

    let table: OriginTable = serde_json::from_str(&raw).map_err(|e| {
        CarrierError::Configuration(format!(
            "Invalid address config at {}: {}",
            path.display(),
            e
        ))
    })?;

    if table.is_empty() {
        return Err(CarrierError::Configuration(format!(
            "Address config at {} defines no origins",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), origins = table.len(), "loaded address config");
    Ok(table)
}
