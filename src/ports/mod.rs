//! Ports - interfaces between the application core and the outside world.
//!
//! Adapters implement these traits; handlers depend only on the traits.

mod attachments;
mod completion;
mod lead_store;
mod notifier;

pub use attachments::{AttachmentError, AttachmentLink, AttachmentReader};
pub use completion::{
    ChatMessage, ChatRole, CompletionError, CompletionRequest, CompletionResponse, TextCompletion,
};
pub use lead_store::{LeadStore, LeadStoreError};
pub use notifier::{EmailMessage, Notifier, NotifyError};
