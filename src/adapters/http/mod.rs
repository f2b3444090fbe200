//! HTTP adapter - REST surface for the intake engine.

mod dto;
mod handlers;
mod routes;

pub use handlers::IntakeAppState;
pub use routes::intake_router;
