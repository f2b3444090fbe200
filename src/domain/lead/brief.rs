//! Executive brief template for qualified leads.
//!
//! Once a lead completes the flow, the full transcript is handed to the
//! model a second time with the analyst instruction below. The brief is
//! extraction, not generation: anything the prospect never said must
//! read exactly "Not provided".

use super::{ConversationTurn, TurnRole};

/// The exact sentinel for facts absent from the transcript.
pub const BRIEF_NOT_PROVIDED: &str = "Not provided";

/// Fixed field order of the executive brief.
const BRIEF_FIELDS: [&str; 14] = [
    "Client Name",
    "Brand / Project",
    "Contact Info",
    "Requested Service",
    "Objectives",
    "Scope Summary",
    "Discovery Insights",
    "Assets Provided",
    "Timeline Indicators",
    "Budget Indicators",
    "Completeness Level",
    "Opportunities",
    "Risks",
    "Lead Score (1-10)",
];

/// Renders a transcript as flat text for the analyst call.
pub fn render_transcript(turns: &[ConversationTurn]) -> String {
    let mut out = String::new();
    for turn in turns {
        let speaker = match turn.role {
            TurnRole::User => "Prospect",
            TurnRole::Assistant => "Savage",
        };
        out.push_str(speaker);
        out.push_str(": ");
        out.push_str(&turn.text);
        if !turn.suggestions.is_empty() {
            out.push_str(" [options offered: ");
            out.push_str(&turn.suggestions.join(", "));
            out.push(']');
        }
        out.push('\n');
    }
    out
}

/// Builds the analyst instruction for brief generation.
///
/// `attachment_names` lists previously uploaded reference files so the
/// "Assets Provided" field can be filled without guessing.
pub fn brief_instruction(attachment_names: &[String]) -> String {
    let fields = BRIEF_FIELDS
        .iter()
        .map(|f| format!("- {f}:"))
        .collect::<Vec<_>>()
        .join("\n");

    let assets = if attachment_names.is_empty() {
        "The prospect uploaded no files.".to_string()
    } else {
        format!(
            "The prospect uploaded these files: {}.",
            attachment_names.join(", ")
        )
    };

    format!(
        "You are a sales analyst for SVG Visual. You will receive the full \
transcript of an intake conversation. Produce an executive brief using \
EXACTLY this template, one line per field, plus a final line \
\"- Recommended Action:\" with one concrete next step:

{fields}
- Recommended Action:

STRICT RULES:
1. Extract only facts explicitly stated in the transcript.
2. Any field not explicitly present must read exactly \
\"{not_provided}\". Never guess, never fabricate, never infer numbers.
3. Plain text only, no markdown, no commentary outside the template.

{assets}",
        fields = fields,
        not_provided = BRIEF_NOT_PROVIDED,
        assets = assets,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_renders_speakers_in_order() {
        let turns = vec![
            ConversationTurn::assistant("Which service?", vec!["Web Design".into()]),
            ConversationTurn::user("Web Design"),
        ];
        let flat = render_transcript(&turns);
        let savage = flat.find("Savage: Which service?").unwrap();
        let prospect = flat.find("Prospect: Web Design").unwrap();
        assert!(savage < prospect);
        assert!(flat.contains("[options offered: Web Design]"));
    }

    #[test]
    fn instruction_bans_fabrication() {
        let instruction = brief_instruction(&[]);
        assert!(instruction.contains(BRIEF_NOT_PROVIDED));
        assert!(instruction.contains("Never guess"));
        assert!(instruction.contains("uploaded no files"));
    }

    #[test]
    fn instruction_lists_every_brief_field() {
        let instruction = brief_instruction(&[]);
        for field in BRIEF_FIELDS {
            assert!(instruction.contains(field), "missing {field}");
        }
        assert!(instruction.contains("Recommended Action"));
    }

    #[test]
    fn instruction_names_uploaded_assets() {
        let instruction = brief_instruction(&["moodboard.pdf".to_string()]);
        assert!(instruction.contains("moodboard.pdf"));
    }
}
