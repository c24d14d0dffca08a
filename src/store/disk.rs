use super::{LedgerStore, validate_user_id};
use crate::core::error::TrackerError;
use crate::core::record::EarningsRecord;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Keeps each user's ledger in `<root>/<user_id>.csv`.
pub struct CsvLedgerStore {
    root: PathBuf,
}

impl CsvLedgerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self, user_id: &str) -> Result<PathBuf, TrackerError> {
        validate_user_id(user_id)?;
        Ok(self.root.join(format!("{user_id}.csv")))
    }

    fn read_ledger(path: &Path) -> Result<Vec<EarningsRecord>, TrackerError> {
        let load_error = |reason: String| TrackerError::LedgerLoad {
            path: path.to_path_buf(),
            reason,
        };

        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ledger at {}, starting empty", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(load_error(e.to_string())),
        };

        let mut reader = csv::Reader::from_reader(file);
        reader
            .deserialize()
            .collect::<Result<Vec<EarningsRecord>, _>>()
            .map_err(|e| load_error(e.to_string()))
    }

    /// Writes the full ledger to a temporary file beside `path`, then
    /// renames it into place.
    fn write_ledger(&self, path: &Path, ledger: &[EarningsRecord]) -> Result<(), TrackerError> {
        let write_error = |reason: String| TrackerError::LedgerWrite {
            path: path.to_path_buf(),
            reason,
        };

        fs::create_dir_all(&self.root).map_err(|e| write_error(e.to_string()))?;
        let tmp = NamedTempFile::new_in(&self.root).map_err(|e| write_error(e.to_string()))?;

        let mut writer = csv::Writer::from_writer(tmp);
        for record in ledger {
            writer
                .serialize(record)
                .map_err(|e| write_error(e.to_string()))?;
        }
        let mut tmp = writer
            .into_inner()
            .map_err(|e| write_error(e.to_string()))?;
        tmp.flush().map_err(|e| write_error(e.to_string()))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| write_error(e.to_string()))?;
        tmp.persist(path).map_err(|e| write_error(e.to_string()))?;
        Ok(())
    }
}

impl LedgerStore for CsvLedgerStore {
    fn load(&self, user_id: &str) -> Result<Vec<EarningsRecord>, TrackerError> {
        let path = self.ledger_path(user_id)?;
        Self::read_ledger(&path)
    }

    fn append(
        &self,
        user_id: &str,
        record: EarningsRecord,
    ) -> Result<Vec<EarningsRecord>, TrackerError> {
        let path = self.ledger_path(user_id)?;
        // A ledger that fails to parse aborts here, before anything is written.
        let mut ledger = Self::read_ledger(&path)?;
        ledger.push(record);
        self.write_ledger(&path, &ledger)?;
        info!(
            user = user_id,
            records = ledger.len(),
            "Saved ledger to {}",
            path.display()
        );
        Ok(ledger)
    }
}
