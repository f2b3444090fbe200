//! Intake Engine server binary.
//!
//! Wires configuration, the Postgres-backed stores, the selected
//! completion providers and the Resend notifier into the axum router.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use intake_engine::adapters::ai::{
    FailoverCompletion, GeminiConfig, GeminiProvider, NullCompletion, OpenAiCompatConfig,
    OpenAiCompatProvider,
};
use intake_engine::adapters::email::{ResendConfig, ResendNotifier};
use intake_engine::adapters::http::{intake_router, IntakeAppState};
use intake_engine::adapters::postgres::{PostgresAttachmentReader, PostgresLeadStore};
use intake_engine::application::handlers::{
    DraftInvoiceHandler, ProcessTurnHandler, QualifyLeadHandler,
};
use intake_engine::config::{AiConfig, AiProvider, AppConfig};
use intake_engine::ports::TextCompletion;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let store = Arc::new(PostgresLeadStore::new(pool.clone()));
    let attachments = Arc::new(PostgresAttachmentReader::new(pool));

    let chat_provider = build_chat_provider(&config.ai)?;
    let billing_provider = build_provider(&config.ai, config.ai.billing_provider)?;

    let notifier = Arc::new(ResendNotifier::new(ResendConfig::new(
        config.email.resend_api_key.clone(),
        config.email.from_header(),
    ))?);

    let pipeline = QualifyLeadHandler::new(
        chat_provider.clone(),
        store.clone(),
        attachments.clone(),
        notifier,
        config.email.notify_to.clone(),
    );
    let turns = Arc::new(ProcessTurnHandler::new(
        chat_provider,
        store.clone(),
        attachments,
        pipeline,
    ));
    let invoices = Arc::new(DraftInvoiceHandler::new(billing_provider));

    let app = intake_router(IntakeAppState::new(turns, invoices, store)).layer(
        TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)),
    );

    let addr = config.server.socket_addr()?;
    info!(%addr, environment = ?config.server.environment, "intake engine listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the conversational provider, chaining the configured fallback
/// behind the primary for transient failures.
fn build_chat_provider(
    ai: &AiConfig,
) -> Result<Arc<dyn TextCompletion>, Box<dyn std::error::Error>> {
    if !ai.has_any_provider() {
        warn!("no AI provider configured; assistant will answer with the unconfigured notice");
        return Ok(Arc::new(NullCompletion));
    }

    let primary = build_provider(ai, ai.chat_provider)?;
    let Some(fallback) = ai.fallback_provider else {
        return Ok(primary);
    };

    let fallback = build_provider(ai, fallback)?;
    Ok(Arc::new(
        FailoverCompletion::new(primary).with_fallback(fallback),
    ))
}

/// Builds one provider from its configured key.
fn build_provider(
    ai: &AiConfig,
    provider: AiProvider,
) -> Result<Arc<dyn TextCompletion>, Box<dyn std::error::Error>> {
    let Some(key) = ai.key_for(provider) else {
        return Ok(Arc::new(NullCompletion));
    };

    let provider: Arc<dyn TextCompletion> = match provider {
        AiProvider::Gemini => Arc::new(GeminiProvider::new(
            GeminiConfig::new(key).with_timeout(ai.timeout()),
        )?),
        AiProvider::Deepseek => Arc::new(OpenAiCompatProvider::new(
            OpenAiCompatConfig::deepseek(key).with_timeout(ai.timeout()),
        )?),
        AiProvider::Groq => Arc::new(OpenAiCompatProvider::new(
            OpenAiCompatConfig::groq(key).with_timeout(ai.timeout()),
        )?),
    };
    Ok(provider)
}
