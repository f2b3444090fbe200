//! Invoice draft extraction.
//!
//! Unlike the conversational contract, this path has no multi-turn
//! conversation to protect: output that survives none of the recovery
//! steps is surfaced to the caller as an extraction failure asking for a
//! clearer prompt.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::lead::{outermost_slice, strip_code_fence};

/// One extracted invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraftLine {
    /// English-normalized description of the work.
    pub description: String,
    /// Units billed, must be positive.
    pub quantity: f64,
    /// Price per unit, must be non-negative.
    pub unit_price: f64,
}

/// Client identity guessed from the prompt, if any was mentioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientGuess {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
}

impl ClientGuess {
    /// True when no client detail was mentioned at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.company_name.is_none()
    }
}

/// A parsed invoice draft: the items plus an optional client guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub items: Vec<InvoiceDraftLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientGuess>,
}

/// Failure to recover a draft from model output.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DraftParseError {
    /// Output is not recoverable into the items/client shape.
    #[error("could not extract invoice items from the response; try a clearer prompt")]
    Unrecoverable,
    /// Shape parsed but a line violates the numeric constraints.
    #[error("invalid invoice line '{description}': {reason}")]
    InvalidLine {
        description: String,
        reason: String,
    },
    /// Shape parsed but carried no items.
    #[error("no invoice items found in the prompt; try a clearer prompt")]
    Empty,
}

impl InvoiceDraft {
    /// Parses raw model output into a draft.
    ///
    /// Recovery ladder: strict object parse, fence-stripped parse,
    /// outermost `{...}` slice, then outermost `[...]` slice as a bare
    /// item array (older prompts returned just the array). Anything
    /// beyond that is an extraction failure.
    pub fn parse(raw: &str) -> Result<Self, DraftParseError> {
        let trimmed = raw.trim();
        let unfenced = strip_code_fence(trimmed);

        let mut candidates: Vec<&str> = vec![trimmed];
        if unfenced != trimmed {
            candidates.push(unfenced);
        }
        if let Some(slice) = outermost_slice(trimmed, '{', '}') {
            candidates.push(slice);
        }

        for candidate in &candidates {
            if let Ok(draft) = serde_json::from_str::<InvoiceDraft>(candidate) {
                return draft.validated();
            }
        }

        // Bare array form: [{description, quantity, unit_price}, ...]
        for candidate in candidates
            .iter()
            .copied()
            .chain(outermost_slice(trimmed, '[', ']'))
        {
            if let Ok(items) = serde_json::from_str::<Vec<InvoiceDraftLine>>(candidate) {
                return InvoiceDraft {
                    items,
                    client: None,
                }
                .validated();
            }
        }

        Err(DraftParseError::Unrecoverable)
    }

    /// Enforces the numeric constraints and drops an all-null client.
    fn validated(mut self) -> Result<Self, DraftParseError> {
        if self.items.is_empty() {
            return Err(DraftParseError::Empty);
        }
        for line in &self.items {
            if line.description.trim().is_empty() {
                return Err(DraftParseError::InvalidLine {
                    description: line.description.clone(),
                    reason: "empty description".to_string(),
                });
            }
            if !(line.quantity > 0.0) {
                return Err(DraftParseError::InvalidLine {
                    description: line.description.clone(),
                    reason: format!("quantity must be positive, got {}", line.quantity),
                });
            }
            if !(line.unit_price >= 0.0) {
                return Err(DraftParseError::InvalidLine {
                    description: line.description.clone(),
                    reason: format!("unit price must be non-negative, got {}", line.unit_price),
                });
            }
        }
        if self.client.as_ref().is_some_and(ClientGuess::is_empty) {
            self.client = None;
        }
        Ok(self)
    }

    /// Sum of `quantity * unit_price` across lines.
    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|l| l.quantity * l.unit_price)
            .sum()
    }
}

/// System instruction for the billing extraction call.
pub fn billing_instruction() -> &'static str {
    "You are a professional billing assistant for SVG Visual Digital \
Design Agency. Extract invoice items and client information from the \
user's description.

CRITICAL RULES:
1. Respond ONLY with a valid JSON object, no markdown fences, no \
explanations:
{\"items\": [{\"description\": string, \"quantity\": number, \
\"unit_price\": number}], \"client\": {\"name\": string or null, \
\"email\": string or null, \"company_name\": string or null}}
2. ALL item descriptions must be in ENGLISH, even when the prompt is \
in another language.
3. Quantities must be positive, unit prices non-negative.
4. If client info is missing, leave the client fields null.

Example response:
{\"items\": [{\"description\": \"Web Development\", \"quantity\": 1, \
\"unit_price\": 500}], \"client\": {\"name\": \"Elon Musk\", \
\"email\": \"elon@tesla.com\", \"company_name\": \"Tesla\"}}"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_object() {
        let raw = r#"{"items":[{"description":"Web Design Services","quantity":1,"unit_price":500}],"client":{"name":"Jane Doe","email":"jane@x.com","company_name":null}}"#;
        let draft = InvoiceDraft::parse(raw).unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].quantity, 1.0);
        assert_eq!(draft.items[0].unit_price, 500.0);
        let client = draft.client.unwrap();
        assert_eq!(client.name.as_deref(), Some("Jane Doe"));
        assert_eq!(client.email.as_deref(), Some("jane@x.com"));
        assert_eq!(client.company_name, None);
    }

    #[test]
    fn parses_fenced_object() {
        let raw = "```json\n{\"items\":[{\"description\":\"Logo\",\"quantity\":2,\"unit_price\":150}],\"client\":null}\n```";
        let draft = InvoiceDraft::parse(raw).unwrap();
        assert_eq!(draft.items[0].description, "Logo");
        assert!(draft.client.is_none());
    }

    #[test]
    fn parses_bare_item_array() {
        let raw = r#"Sure! [{"description":"Hosting","quantity":12,"unit_price":20}]"#;
        let draft = InvoiceDraft::parse(raw).unwrap();
        assert_eq!(draft.items[0].quantity, 12.0);
        assert!(draft.client.is_none());
    }

    #[test]
    fn all_null_client_collapses_to_none() {
        let raw = r#"{"items":[{"description":"SEO","quantity":1,"unit_price":300}],"client":{"name":null,"email":null,"company_name":null}}"#;
        let draft = InvoiceDraft::parse(raw).unwrap();
        assert!(draft.client.is_none());
    }

    #[test]
    fn rejects_prose() {
        assert_eq!(
            InvoiceDraft::parse("I cannot create an invoice from that."),
            Err(DraftParseError::Unrecoverable)
        );
    }

    #[test]
    fn rejects_zero_quantity() {
        let raw = r#"{"items":[{"description":"Audit","quantity":0,"unit_price":100}]}"#;
        assert!(matches!(
            InvoiceDraft::parse(raw),
            Err(DraftParseError::InvalidLine { .. })
        ));
    }

    #[test]
    fn rejects_negative_price() {
        let raw = r#"[{"description":"Credit","quantity":1,"unit_price":-50}]"#;
        assert!(matches!(
            InvoiceDraft::parse(raw),
            Err(DraftParseError::InvalidLine { .. })
        ));
    }

    #[test]
    fn rejects_empty_items() {
        let raw = r#"{"items":[]}"#;
        assert_eq!(InvoiceDraft::parse(raw), Err(DraftParseError::Empty));
    }

    #[test]
    fn subtotal_sums_lines() {
        let raw = r#"[{"description":"A","quantity":2,"unit_price":100},{"description":"B","quantity":1,"unit_price":50}]"#;
        let draft = InvoiceDraft::parse(raw).unwrap();
        assert_eq!(draft.subtotal(), 250.0);
    }

    #[test]
    fn instruction_demands_english_and_raw_json() {
        let instruction = billing_instruction();
        assert!(instruction.contains("ENGLISH"));
        assert!(instruction.contains("ONLY with a valid JSON object"));
    }
}
