use super::{LedgerStore, validate_user_id};
use crate::core::error::TrackerError;
use crate::core::record::EarningsRecord;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory ledger store using HashMap and RwLock
#[derive(Default)]
pub struct MemoryLedgerStore {
    ledgers: RwLock<HashMap<String, Vec<EarningsRecord>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(user_id: &str) -> TrackerError {
    TrackerError::LedgerWrite {
        path: user_id.into(),
        reason: "ledger lock poisoned".to_string(),
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self, user_id: &str) -> Result<Vec<EarningsRecord>, TrackerError> {
        validate_user_id(user_id)?;
        let ledgers = self.ledgers.read().map_err(|_| poisoned(user_id))?;
        let ledger = ledgers.get(user_id).cloned().unwrap_or_default();
        debug!(user = user_id, records = ledger.len(), "Loaded ledger");
        Ok(ledger)
    }

    fn append(
        &self,
        user_id: &str,
        record: EarningsRecord,
    ) -> Result<Vec<EarningsRecord>, TrackerError> {
        validate_user_id(user_id)?;
        let mut ledgers = self.ledgers.write().map_err(|_| poisoned(user_id))?;
        let ledger = ledgers.entry(user_id.to_string()).or_default();
        ledger.push(record);
        debug!(user = user_id, records = ledger.len(), "Appended record");
        Ok(ledger.clone())
    }
}
