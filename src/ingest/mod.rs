//! Ingestion: where snapshots come from and when to ask for them

pub mod poller;
pub mod schedule;
pub mod source;

pub use poller::{archive_date, CursorStore, PollCursor, PollOutcome, PollResult, Poller};
pub use schedule::{Clock, FixedClock, SchedulePolicy, SystemClock};
pub use source::{parse_payload, FileSource, SnapshotSource};
