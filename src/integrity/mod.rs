//! Integrity checking and self-repair
//!
//! - `IntegrityChecker`: finds missing dates, corrupted files and
//!   primary/backup divergence, and rolls them up into an `IntegrityReport`
//! - `AutoRepairer`: consumes a fresh report, restores corrupted primaries
//!   from backup and resynchronizes diverged pairs from the primary

mod checker;
mod repair;

pub use checker::{snapshots_match, IntegrityChecker};
pub use repair::AutoRepairer;
