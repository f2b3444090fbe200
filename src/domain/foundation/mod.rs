//! Shared value objects used across domain modules.

mod ids;

pub use ids::LeadId;
