//! Clinical Sim API server.
//!
//! Startup order:
//! 1. Load and validate configuration.
//! 2. Initialise logging.
//! 3. Connect to PostgreSQL and apply migrations.
//! 4. Build the model client once and inject it into every handler.
//! 5. Serve the router until Ctrl+C.

use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clinical_sim::adapters::ai::{GeminiConfig, GeminiProvider, ResilientAIProvider, RetryPolicy};
use clinical_sim::adapters::http::{api_router, AssessmentHandlers, EncounterHandlers};
use clinical_sim::adapters::postgres::{
    run_migrations, PostgresCaseCatalog, PostgresEncounterRepository, PostgresProfileReader,
};
use clinical_sim::application::handlers::assessment::{
    EncounterEvaluator, GenerateAssessmentHandler,
};
use clinical_sim::application::handlers::encounter::{
    GetEncounterHandler, ListEncounterHistoryHandler, StartEncounterHandler, SubmitActionHandler,
    SubmitMessageHandler,
};
use clinical_sim::config::{AppConfig, ServerConfig};
use clinical_sim::ports::{AIProvider, CaseCatalog, EncounterRepository, LearnerProfileReader};

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(server: &ServerConfig) -> anyhow::Result<CorsLayer> {
    let origins = server.cors_origins_list();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {}", o)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(layer.allow_origin(origins))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.server);
    info!(environment = ?config.server.environment, "Configuration loaded");

    // Database
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    if config.database.run_migrations {
        run_migrations(&pool).await.context("Failed to run migrations")?;
        info!("Database migrations are up-to-date");
    }

    let repository: Arc<dyn EncounterRepository> =
        Arc::new(PostgresEncounterRepository::new(pool.clone()));
    let catalog: Arc<dyn CaseCatalog> = Arc::new(PostgresCaseCatalog::new(pool.clone()));
    let profiles: Arc<dyn LearnerProfileReader> = Arc::new(PostgresProfileReader::new(pool));

    // Model client
    let gemini = GeminiProvider::new(GeminiConfig::from_ai_config(&config.ai))
        .context("Failed to build Gemini client")?;
    let ai: Arc<dyn AIProvider> = Arc::new(ResilientAIProvider::new(
        gemini,
        RetryPolicy::from_config(&config.ai),
    ));

    // Handlers
    let evaluator = Arc::new(EncounterEvaluator::new(ai.clone()));
    let encounters = EncounterHandlers::new(
        Arc::new(StartEncounterHandler::new(repository.clone(), catalog.clone())),
        Arc::new(SubmitMessageHandler::new(
            repository.clone(),
            catalog.clone(),
            ai.clone(),
        )),
        Arc::new(SubmitActionHandler::new(
            repository.clone(),
            catalog.clone(),
            evaluator,
        )),
        Arc::new(GetEncounterHandler::new(repository.clone(), catalog.clone())),
        Arc::new(ListEncounterHistoryHandler::new(repository, catalog)),
    );
    let assessments = AssessmentHandlers::new(Arc::new(GenerateAssessmentHandler::new(profiles, ai)));

    let app = api_router(encounters, assessments)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server)?)
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    info!(
        bind_address = %addr,
        model = %config.ai.model,
        "Starting server"
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
