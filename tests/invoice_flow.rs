//! Scenario tests for the invoice-drafting assistant.

use std::sync::Arc;

use intake_engine::adapters::ai::{MockCompletion, ScriptedReply};
use intake_engine::application::handlers::{
    DraftInvoiceCommand, DraftInvoiceError, DraftInvoiceHandler,
};
use intake_engine::domain::invoice::DraftParseError;
use intake_engine::ports::CompletionError;

fn handler(completion: MockCompletion) -> (DraftInvoiceHandler, Arc<MockCompletion>) {
    let completion = Arc::new(completion);
    (DraftInvoiceHandler::new(completion.clone()), completion)
}

#[tokio::test]
async fn extracts_items_and_client_from_prose_reply() {
    let (h, mock) = handler(MockCompletion::new().with_reply(ScriptedReply::text(
        r#"Here is your invoice draft:
{"items":[{"description":"Web Design Services","quantity":1,"unit_price":500}],"client":{"name":"Jane Doe","email":"jane@x.com","company_name":null}}"#,
    )));

    let draft = h
        .handle(DraftInvoiceCommand {
            prompt: "Invoice Jane Doe (jane@x.com) $500 for web design".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(draft.items.len(), 1);
    assert_eq!(draft.items[0].description, "Web Design Services");
    assert_eq!(draft.items[0].quantity, 1.0);
    assert_eq!(draft.items[0].unit_price, 500.0);
    assert_eq!(draft.subtotal(), 500.0);

    let client = draft.client.unwrap();
    assert_eq!(client.name.as_deref(), Some("Jane Doe"));
    assert_eq!(client.email.as_deref(), Some("jane@x.com"));
    assert_eq!(client.company_name, None);

    // Extraction is a cold single-shot call with strict settings.
    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].json_mode);
    assert!(calls[0].history.is_empty());
    assert_eq!(calls[0].temperature, 0.1);
    assert!(calls[0].system_instruction.contains("billing assistant"));
}

#[tokio::test]
async fn ambiguous_prompt_surfaces_extraction_error() {
    let (h, _) = handler(MockCompletion::new().with_reply(ScriptedReply::text(
        "I could not find any billable work in that description.",
    )));

    let err = h
        .handle(DraftInvoiceCommand {
            prompt: "hello there".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DraftInvoiceError::Extraction(DraftParseError::Unrecoverable)
    ));
}

#[tokio::test]
async fn invalid_line_is_rejected_not_silently_fixed() {
    let (h, _) = handler(MockCompletion::new().with_reply(ScriptedReply::text(
        r#"{"items":[{"description":"Discount","quantity":1,"unit_price":-50}]}"#,
    )));

    let err = h
        .handle(DraftInvoiceCommand {
            prompt: "bill a negative discount line".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DraftInvoiceError::Extraction(DraftParseError::InvalidLine { .. })
    ));
}

#[tokio::test]
async fn provider_failure_is_distinguished_from_extraction_failure() {
    let (h, _) = handler(
        MockCompletion::new()
            .with_reply(ScriptedReply::error(CompletionError::unavailable("boom"))),
    );

    let err = h
        .handle(DraftInvoiceCommand {
            prompt: "invoice 2 hours of consulting at 120".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DraftInvoiceError::Provider(_)));
}

#[tokio::test]
async fn empty_prompt_rejected_before_any_call() {
    let (h, mock) = handler(MockCompletion::new());

    let err = h
        .handle(DraftInvoiceCommand {
            prompt: "  \n ".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DraftInvoiceError::EmptyPrompt));
    assert_eq!(mock.call_count(), 0);
}
