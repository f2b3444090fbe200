//! Adapters - concrete implementations of the ports.

pub mod ai;
pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;
