//! Download statistics store trait.

use crate::error::Result;

/// Persistent per-artifact download counters.
///
/// Counters are keyed by (file name, file hash). All operations are
/// synchronous to match rusqlite's API.
pub trait StatsStore: Send + Sync {
    /// Create the statistics table if it does not exist.
    fn create_schema(&self) -> Result<()>;

    /// Insert the key with a count of 1, or increment an existing count by 1.
    ///
    /// Must be a single atomic statement so concurrent downloads of the same
    /// key never lose an update.
    fn record_download(&self, file_name: &str, file_hash: &str) -> Result<()>;

    /// Current count for a key, `None` if it was never recorded.
    fn download_count(&self, file_name: &str, file_hash: &str) -> Result<Option<i64>>;
}
