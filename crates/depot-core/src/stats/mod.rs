//! Download statistics persistence.
//!
//! One row per (artifact path, checksum) pair, counting confirmed deliveries.

mod sqlite;
mod traits;

pub use sqlite::SqliteStatsStore;
pub use traits::StatsStore;
