//! Domain layer: canonical records, normalization, filtering, stats and
//! the event system.
//!
//! Everything here except the event bus is pure and synchronous. The
//! service layer feeds raw backend payloads in and gets canonical,
//! filtered, sorted collections and their stats out.

pub mod event_bus;
pub mod filter;
pub mod normalize;
pub mod record;
pub mod record_event;
pub mod record_kind;
pub mod stats;
pub mod status;

pub use event_bus::EventBus;
pub use filter::{FilterState, SortDirection, SortField, SortSpec};
pub use record::Record;
pub use record_event::RecordEvent;
pub use record_kind::{RecordKind, SearchField};
pub use stats::{Bucket, RecordStats, StatsScope};
pub use status::CanonicalStatus;
