//! Domain layer - conversation and billing semantics, no I/O.

pub mod foundation;
pub mod invoice;
pub mod lead;
