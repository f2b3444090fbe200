//! Email adapters - outbound notification dispatch.

mod resend;

pub use resend::{ResendConfig, ResendNotifier};
