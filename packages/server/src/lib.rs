#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the Polaris danger-zone cycle.
//!
//! Exposes start/stop control for the background cycle and read-only
//! getters for the published danger zones, predictions and AI advice.
//! Handlers only read the shared [`CycleState`] and toggle control flags;
//! they never wait on the loop.

pub mod config;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use polaris_ai::AiError;
use polaris_ai::extract::LlmExtractor;
use polaris_cycle::pipeline::Collaborators;
use polaris_cycle::{CycleError, CycleState, Orchestrator};
use polaris_geocoder::nominatim::NominatimResolver;
use polaris_source::StandardAcquisition;
use polaris_source::newsapi::NewsApiClient;

use crate::config::AppConfig;

/// How long shutdown waits for the in-flight iteration before aborting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Errors starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The LLM provider could not be configured.
    #[error(transparent)]
    Ai(#[from] AiError),

    /// The cycle could not be configured.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The HTTP server failed to bind or run.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Published cycle data and control flags.
    pub cycle: Arc<CycleState>,
    /// Owner of the background loop.
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    #[must_use]
    pub fn new(orchestrator: Orchestrator) -> Self {
        let orchestrator = Arc::new(orchestrator);
        Self {
            cycle: Arc::clone(orchestrator.state()),
            orchestrator,
        }
    }
}

/// Builds the production orchestrator: `NewsAPI` plus the embedded feeds,
/// the configured LLM provider and Nominatim.
///
/// Must be called on the main runtime: the cycle loop is spawned there,
/// not on the HTTP worker that handles `start-cycle`.
///
/// # Errors
///
/// Returns [`ServerError`] if the LLM provider, HTTP client, or cycle
/// config is invalid.
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator, ServerError> {
    let service = config.geocoder.service();
    let client = reqwest::Client::builder()
        .user_agent(service.user_agent.clone())
        .build()?;

    let news = NewsApiClient::from_env(client.clone(), config.news.clone());
    let provider = polaris_ai::providers::create_provider(
        config.ai.provider.as_deref(),
        config.ai.model.as_deref(),
    )?;

    let collaborators = Collaborators {
        acquisition: Arc::new(StandardAcquisition::with_embedded_feeds(news)),
        extractor: Arc::new(LlmExtractor::new(provider)),
        resolver: Arc::new(NominatimResolver::new(client, service)),
    };

    Ok(Orchestrator::new(
        Arc::new(CycleState::new()),
        collaborators,
        config.cycle.clone(),
    )?)
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/start-cycle", web::post().to(handlers::start_cycle))
            .route("/stop-cycle", web::post().to(handlers::stop_cycle))
            .route("/dangerzones", web::get().to(handlers::dangerzones))
            .route("/dangerzones", web::post().to(handlers::dangerzones))
            .route("/predictions", web::get().to(handlers::predictions))
            .route("/predictions", web::post().to(handlers::predictions))
            .route("/ai-advice", web::get().to(handlers::ai_advice))
            .route("/ai-advice", web::post().to(handlers::ai_advice)),
    );
}

/// Starts the API server and blocks until it exits, then stops the
/// cycle.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the orchestrator cannot be built or the
/// HTTP server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: AppConfig) -> Result<(), ServerError> {
    let state = web::Data::new(AppState::new(build_orchestrator(&config)?));
    let orchestrator = Arc::clone(&state.orchestrator);

    let bind_addr = config.server.bind_addr.clone();
    let port = config.server.port;
    log::info!("Starting server on {bind_addr}:{port}");

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await;

    log::info!("Server stopped; shutting down the cycle");
    orchestrator.shutdown(SHUTDOWN_GRACE).await;

    Ok(result?)
}
