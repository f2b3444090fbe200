//! In-memory adapters - used by unit and scenario tests, and usable as
//! a zero-dependency dev backend.

mod lead_store;

pub use lead_store::{InMemoryLeadStore, RecordingNotifier, StaticAttachments};
