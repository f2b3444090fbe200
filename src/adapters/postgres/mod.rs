//! PostgreSQL adapters - database implementations of the persistence ports.

mod attachment_reader;
mod lead_store;

pub use attachment_reader::PostgresAttachmentReader;
pub use lead_store::PostgresLeadStore;
