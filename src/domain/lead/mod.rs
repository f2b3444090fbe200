//! Lead qualification domain - transcript, structured output contract,
//! dialogue policy, and the executive brief template.

mod brief;
mod policy;
mod response;
mod state;
mod turn;

pub use brief::{brief_instruction, render_transcript, BRIEF_NOT_PROVIDED};
pub use policy::{
    attachment_context, policy_instruction, IntakePhase, NEXT_STEP_CHOICES, POLICY_VERSION,
    SERVICE_CHOICES,
};
pub use response::{StructuredResponse, TurnStatus, FALLBACK_TEXT, NOT_CONFIGURED_TEXT};
pub(crate) use response::{outermost_slice, strip_code_fence};
pub use state::LeadCompleteness;
pub use turn::{ConversationTurn, TurnRole};
