//! Dialogue policy - the system instruction that drives the intake flow.
//!
//! The conversation has no explicit state variable; the model is handed
//! the full transcript each turn and the policy text below tells it how
//! to progress. Phases flow one way:
//!
//! `ServiceConfirmation` -> `Qualification` -> `Discovery` -> `Close`
//!
//! The policy enforces the type-A/type-B question discipline: a turn is
//! either a bounded choice (suggestion chips populated) or an open
//! question (chips empty), never both. Templates are versioned so
//! scripted-response tests can pin exact wording.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Bump when the instruction wording changes in a way tests care about.
pub const POLICY_VERSION: &str = "intake-policy/v2";

/// Bounded service categories offered in phase 1.
pub const SERVICE_CHOICES: [&str; 4] = [
    "Web Design",
    "Branding / Logo",
    "AI Automation",
    "Request a Quote",
];

/// Bounded next steps offered on the closing turn.
pub const NEXT_STEP_CHOICES: [&str; 3] = [
    "Request Proposal",
    "Continue via Messaging",
    "Schedule Call",
];

/// The four phases of the intake flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakePhase {
    /// Pin down which service the prospect wants.
    ServiceConfirmation,
    /// Collect name, brand and contact, one per turn.
    Qualification,
    /// Up to three service-specific questions.
    Discovery,
    /// Summarize, confirm, offer next steps, declare complete.
    Close,
}

impl IntakePhase {
    /// Returns the policy directive for this phase, as written into the
    /// system instruction.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::ServiceConfirmation => PHASE_SERVICE_CONFIRMATION,
            Self::Qualification => PHASE_QUALIFICATION,
            Self::Discovery => PHASE_DISCOVERY,
            Self::Close => PHASE_CLOSE,
        }
    }

    /// True when this phase asks bounded-choice (type-A) questions.
    ///
    /// Qualification is the only purely open-ended phase; discovery
    /// mixes per-question but leads with bounded branches.
    pub fn leads_with_bounded_choice(&self) -> bool {
        !matches!(self, Self::Qualification)
    }
}

// Phase templates. Type-A templates must instruct populated suggestions
// together with a bounded question; type-B templates must instruct empty
// suggestions together with an open question. Never both in one template.

const PHASE_SERVICE_CONFIRMATION: &str = "\
PHASE 1 - SERVICE CONFIRMATION (type-A). If the requested service is \
ambiguous or unstated, ask exactly one bounded question ending with the \
service options, and populate 'suggestions' with: \"Web Design\", \
\"Branding / Logo\", \"AI Automation\", \"Request a Quote\". Once the \
service is unambiguous, move to phase 2.";

const PHASE_QUALIFICATION: &str = "\
PHASE 2 - QUALIFICATION (type-B). Collect exactly three fields, in \
order, one per turn, never combined: (1) full name, (2) brand or \
project name, (3) one contact channel (email or messaging handle). \
These are open-ended questions: 'suggestions' MUST be an empty array \
for every phase-2 turn. Move to phase 3 only when all three are \
present.";

const PHASE_DISCOVERY: &str = "\
PHASE 3 - DISCOVERY. Ask AT MOST 3 questions total in this phase, then \
stop asking and move to phase 4 even if you want more detail. Branch by \
service: Web Design starts with new-site-vs-redesign (type-A, \
suggestions \"New website\", \"Redesign\"); Branding starts with \
new-brand-vs-rebrand (type-A, suggestions \"New brand\", \"Rebrand\"); \
AI Automation and quotes start with an open scope question (type-B, \
empty suggestions). Budget, timeline and reference questions are \
type-B: empty suggestions. Each turn is strictly type-A or type-B, \
never a mix.";

const PHASE_CLOSE: &str = "\
PHASE 4 - CONVERSION CLOSE (type-A). Once you have name, brand, \
contact and at least two discovery insights: write a 3-4 sentence \
summary of the project, ask the prospect to confirm, populate \
'suggestions' with exactly: \"Request Proposal\", \"Continue via \
Messaging\", \"Schedule Call\", and set lead_status to \"complete\". \
This is the only turn allowed to set \"complete\".";

static BASE_INSTRUCTION: Lazy<String> = Lazy::new(|| {
    format!(
        "You are 'Savage', the intake specialist for SVG Visual, a digital \
design agency. [{version}]

GOAL: qualify the prospect by walking the four phases below, in order, \
inferring the current phase from the transcript so far.

OUTPUT CONTRACT: respond ONLY with a raw JSON object, no markdown \
fences, no prose outside it:
{{\"text\": string, \"suggestions\": array of strings, \"lead_status\": \
\"in_progress\" | \"complete\"}}

QUESTION DISCIPLINE: every turn is type-A XOR type-B. Type-A: 'text' \
ends in a bounded question and 'suggestions' holds the options. \
Type-B: 'text' ends in an open question and 'suggestions' is []. Never \
mix the two in one turn.

TONE: professional, direct, efficient, polite. Maximum 2 sentences of \
'text' per turn outside the phase-4 summary. One question at a time. \
No fluff.

{p1}

{p2}

{p3}

{p4}

Never invent details the prospect did not state. Keep lead_status \
\"in_progress\" on every turn except the phase-4 closing turn.",
        version = POLICY_VERSION,
        p1 = PHASE_SERVICE_CONFIRMATION,
        p2 = PHASE_QUALIFICATION,
        p3 = PHASE_DISCOVERY,
        p4 = PHASE_CLOSE,
    )
});

/// Composes the full system instruction for a turn.
///
/// `attachments` is the auxiliary context line built by
/// [`attachment_context`]; it is folded into the instruction rather than
/// added as a conversation turn.
pub fn policy_instruction(attachments: Option<&str>) -> String {
    match attachments {
        Some(context) if !context.is_empty() => {
            format!("{}\n\nCONTEXT: {}", *BASE_INSTRUCTION, context)
        }
        _ => BASE_INSTRUCTION.clone(),
    }
}

/// Renders uploaded reference files as one auxiliary context line.
///
/// Returns `None` when the lead has uploaded nothing, so the policy text
/// stays byte-identical for the common case.
pub fn attachment_context(file_names: &[String]) -> Option<String> {
    if file_names.is_empty() {
        return None;
    }
    Some(format!(
        "The prospect has already uploaded {} reference file(s): {}. \
Acknowledge them if relevant; do not ask for files they already sent.",
        file_names.len(),
        file_names.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PHASES: [IntakePhase; 4] = [
        IntakePhase::ServiceConfirmation,
        IntakePhase::Qualification,
        IntakePhase::Discovery,
        IntakePhase::Close,
    ];

    #[test]
    fn instruction_carries_policy_version() {
        assert!(policy_instruction(None).contains(POLICY_VERSION));
    }

    #[test]
    fn instruction_names_every_service_choice() {
        let instruction = policy_instruction(None);
        for choice in SERVICE_CHOICES {
            assert!(instruction.contains(choice), "missing {choice}");
        }
    }

    #[test]
    fn instruction_names_every_next_step() {
        let instruction = policy_instruction(None);
        for choice in NEXT_STEP_CHOICES {
            assert!(instruction.contains(choice), "missing {choice}");
        }
    }

    // Structural exclusivity law: no phase template instructs populated
    // suggestions together with an open-ended ask.
    #[test]
    fn templates_never_mix_question_types() {
        for phase in ALL_PHASES {
            let template = phase.directive();
            let promises_chips = template.contains("type-A");
            let forbids_chips =
                template.contains("empty suggestions") || template.contains("MUST be an empty");
            if phase == IntakePhase::Discovery {
                // Discovery branches per question and names both types,
                // but each named question is tagged with exactly one.
                assert!(template.contains("strictly type-A or type-B"));
                continue;
            }
            assert!(
                promises_chips != forbids_chips,
                "{:?} mixes cue types",
                phase
            );
        }
    }

    #[test]
    fn qualification_is_the_open_ended_phase() {
        assert!(!IntakePhase::Qualification.leads_with_bounded_choice());
        assert!(IntakePhase::ServiceConfirmation.leads_with_bounded_choice());
        assert!(IntakePhase::Close.leads_with_bounded_choice());
    }

    #[test]
    fn discovery_states_the_three_question_cap() {
        assert!(IntakePhase::Discovery.directive().contains("AT MOST 3"));
    }

    #[test]
    fn attachment_context_folds_into_instruction() {
        let files = vec!["logo.png".to_string(), "palette.pdf".to_string()];
        let context = attachment_context(&files).unwrap();
        assert!(context.contains("2 reference file(s)"));
        assert!(context.contains("logo.png"));

        let instruction = policy_instruction(Some(&context));
        assert!(instruction.contains("CONTEXT:"));
        assert!(instruction.contains("palette.pdf"));
    }

    #[test]
    fn no_attachments_means_no_context_block() {
        assert_eq!(attachment_context(&[]), None);
        assert!(!policy_instruction(None).contains("CONTEXT:"));
    }
}
