//! HTTP handlers connecting axum routes to the application handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{
    DraftInvoiceCommand, DraftInvoiceError, DraftInvoiceHandler, ProcessTurnCommand,
    ProcessTurnError, ProcessTurnHandler,
};
use crate::domain::foundation::LeadId;
use crate::ports::LeadStore;

use super::dto::{BillingAssistRequest, ChatRequest, CreateLeadResponse, ErrorResponse};

/// Shared application state for the intake routes.
#[derive(Clone)]
pub struct IntakeAppState {
    pub turns: Arc<ProcessTurnHandler>,
    pub invoices: Arc<DraftInvoiceHandler>,
    pub store: Arc<dyn LeadStore>,
}

impl IntakeAppState {
    pub fn new(
        turns: Arc<ProcessTurnHandler>,
        invoices: Arc<DraftInvoiceHandler>,
        store: Arc<dyn LeadStore>,
    ) -> Self {
        Self {
            turns,
            invoices,
            store,
        }
    }
}

/// Create a lead record before the first message.
///
/// POST /api/leads
pub async fn create_lead(
    State(state): State<IntakeAppState>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let lead_id = state.store.create_lead().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLeadResponse {
            lead_id: lead_id.to_string(),
        }),
    ))
}

/// Process one conversational turn.
///
/// POST /api/chat
///
/// Upstream provider failures still return 200 with a degraded body;
/// only caller mistakes (empty message, bad lead id) get error codes.
pub async fn chat(
    State(state): State<IntakeAppState>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let lead_id = LeadId::from_str(&req.lead_id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid lead_id format")),
        )
    })?;

    let cmd = ProcessTurnCommand {
        lead_id,
        message: req.message,
        history: req.history,
    };

    let result = state.turns.handle(cmd).await.map_err(|e| match e {
        ProcessTurnError::EmptyMessage => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Message is required")),
        ),
    })?;

    // Fire-and-forget: the pipeline task keeps running after we respond.
    drop(result.pipeline);

    Ok((StatusCode::OK, Json(result.response)))
}

/// Extract invoice items and a client guess from a billing prompt.
///
/// POST /api/billing/assistant
pub async fn billing_assistant(
    State(state): State<IntakeAppState>,
    Json(req): Json<BillingAssistRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let draft = state
        .invoices
        .handle(DraftInvoiceCommand { prompt: req.prompt })
        .await
        .map_err(|e| match e {
            DraftInvoiceError::EmptyPrompt => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Prompt is required")),
            ),
            DraftInvoiceError::Extraction(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new(err.to_string())),
            ),
            DraftInvoiceError::Provider(err) => (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new(err.to_string())),
            ),
        })?;

    Ok((StatusCode::OK, Json(draft)))
}

/// Liveness probe.
///
/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
