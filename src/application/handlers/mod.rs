//! Command handlers - one per operation the engine exposes.

mod draft_invoice;
mod process_turn;
mod qualify_lead;

pub use draft_invoice::{DraftInvoiceCommand, DraftInvoiceError, DraftInvoiceHandler};
pub use process_turn::{
    ProcessTurnCommand, ProcessTurnError, ProcessTurnHandler, ProcessTurnResult,
};

pub use crate::domain::lead::{FALLBACK_TEXT, NOT_CONFIGURED_TEXT};
pub use qualify_lead::QualifyLeadHandler;
