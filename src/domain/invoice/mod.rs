//! Invoice-drafting assistant domain - single-shot extraction of line
//! items and an optional client guess from a free-text billing prompt.

mod draft;

pub use draft::{
    billing_instruction, ClientGuess, DraftParseError, InvoiceDraft, InvoiceDraftLine,
};
