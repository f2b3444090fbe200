//! Intake Engine - Lead qualification conversation backend
//!
//! This crate implements the "Savage" intake assistant for SVG Visual:
//! a constrained dialogue controller that drives a multi-turn chat toward
//! a fixed set of qualification fields, plus a single-shot invoice-drafting
//! assistant built on the same structured-output contract.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
