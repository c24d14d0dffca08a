pub mod disk;
pub mod memory;

use crate::core::error::TrackerError;
use crate::core::record::EarningsRecord;

pub use disk::CsvLedgerStore;
pub use memory::MemoryLedgerStore;

/// Append-only storage of one ledger per user.
pub trait LedgerStore: Send + Sync {
    /// Returns the user's records in insertion order. A user without a
    /// ledger has an empty one.
    fn load(&self, user_id: &str) -> Result<Vec<EarningsRecord>, TrackerError>;

    /// Appends `record` and returns the updated ledger in insertion order.
    fn append(
        &self,
        user_id: &str,
        record: EarningsRecord,
    ) -> Result<Vec<EarningsRecord>, TrackerError>;
}

/// Rejects IDs that cannot safely name a ledger file.
pub fn validate_user_id(user_id: &str) -> Result<(), TrackerError> {
    let invalid = user_id.trim().is_empty()
        || user_id == "."
        || user_id == ".."
        || user_id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(TrackerError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}
