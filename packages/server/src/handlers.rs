//! HTTP handler functions for the danger-zone API.

use actix_web::{HttpResponse, web};
use polaris_cycle::{CycleError, CycleSnapshot, StateView};
use polaris_server_models::{ApiHealth, ApiMessage, ApiStatus};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let cycle = &state.cycle;
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        phase: cycle.phase().to_string(),
        running: cycle.is_running(),
        active: cycle.is_active(),
        last_cycle: cycle.last_cycle(),
    })
}

/// `POST /api/start-cycle`
pub async fn start_cycle(state: web::Data<AppState>) -> HttpResponse {
    match state.orchestrator.start() {
        Ok(_) => message(ApiStatus::Started, "Danger-zone cycle started"),
        Err(CycleError::AlreadyRunning) => {
            message(ApiStatus::AlreadyRunning, "Danger-zone cycle is already running")
        }
        Err(e) => {
            log::error!("Failed to start cycle: {e}");
            HttpResponse::InternalServerError()
                .json(ApiMessage::new(ApiStatus::Error, e.to_string()))
        }
    }
}

/// `POST /api/stop-cycle`
pub async fn stop_cycle(state: web::Data<AppState>) -> HttpResponse {
    match state.orchestrator.stop() {
        Ok(()) => message(
            ApiStatus::Stopping,
            "Danger-zone cycle stopping after the current iteration",
        ),
        Err(CycleError::NotRunning) => {
            message(ApiStatus::NotRunning, "Danger-zone cycle is not running")
        }
        Err(e) => {
            log::error!("Failed to stop cycle: {e}");
            HttpResponse::InternalServerError()
                .json(ApiMessage::new(ApiStatus::Error, e.to_string()))
        }
    }
}

/// `GET|POST /api/dangerzones`
///
/// Returns the current simplified danger zones.
pub async fn dangerzones(state: web::Data<AppState>) -> HttpResponse {
    snapshot_response(&state, |s| HttpResponse::Ok().json(&s.polygons))
}

/// `GET|POST /api/predictions`
///
/// Returns the predicted danger zones.
pub async fn predictions(state: web::Data<AppState>) -> HttpResponse {
    snapshot_response(&state, |s| HttpResponse::Ok().json(&s.predictions))
}

/// `GET|POST /api/ai-advice`
pub async fn ai_advice(state: web::Data<AppState>) -> HttpResponse {
    snapshot_response(&state, |s| HttpResponse::Ok().json(&s.advice))
}

fn snapshot_response(
    state: &AppState,
    respond: impl FnOnce(&CycleSnapshot) -> HttpResponse,
) -> HttpResponse {
    match state.cycle.view() {
        StateView::NotRunning => message(
            ApiStatus::NotRunning,
            "Danger-zone cycle is not running; start it first",
        ),
        StateView::Pending => message(
            ApiStatus::Pending,
            "Please wait: the first cycle has not finished yet",
        ),
        StateView::Ready(snapshot) => respond(&snapshot),
    }
}

fn message(status: ApiStatus, text: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiMessage::new(status, text))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{App, test};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use polaris_ai::AiError;
    use polaris_ai::extract::Extractor;
    use polaris_ai::records::{Advice, DangerRecord, LocationStatus, Prediction};
    use polaris_cycle::pipeline::Collaborators;
    use polaris_cycle::{CycleConfig, CycleState, Orchestrator};
    use polaris_geocoder::{GeoResolver, GeocodeError};
    use polaris_source::{DataAcquisition, SourceError};
    use polaris_source_models::{NewsArticle, SocialPost};
    use polaris_zones_models::{GeometricFeature, LocationRecord};
    use serde_json::Value;

    use super::*;

    struct NoSources;

    #[async_trait]
    impl DataAcquisition for NoSources {
        async fn fetch_news_candidates(&self) -> Result<Vec<NewsArticle>, SourceError> {
            Ok(Vec::new())
        }

        async fn fetch_social_posts(&self) -> Result<Vec<SocialPost>, SourceError> {
            Ok(Vec::new())
        }

        fn government_locations(&self) -> Vec<String> {
            vec!["Nowhere".to_string()]
        }
    }

    struct StaticExtractor;

    #[async_trait]
    impl Extractor for StaticExtractor {
        async fn extract_danger_record(&self, _: &NewsArticle) -> Result<DangerRecord, AiError> {
            Err(AiError::Schema {
                message: "no articles expected".to_string(),
            })
        }

        async fn extract_location_status(
            &self,
            _: &[String],
            _: &[SocialPost],
        ) -> Result<Vec<LocationStatus>, AiError> {
            Ok(Vec::new())
        }

        async fn extract_advice(&self, _: &str, _: &str) -> Result<Advice, AiError> {
            Ok(Advice {
                vehicle_advice: "large 4WD".to_string(),
                clothing_advice: "fire-resistant".to_string(),
                general_advice: "Leave early.".to_string(),
            })
        }

        async fn extract_prediction(
            &self,
            _: &str,
            _: &str,
            _: DateTime<Utc>,
            _: &str,
        ) -> Result<Vec<Prediction>, AiError> {
            Ok(Vec::new())
        }
    }

    struct NothingResolves;

    #[async_trait]
    impl GeoResolver for NothingResolves {
        async fn resolve(&self, record: &LocationRecord) -> Result<GeometricFeature, GeocodeError> {
            Err(GeocodeError::NotFound {
                query: record.name().to_string(),
            })
        }
    }

    fn app_state() -> web::Data<AppState> {
        let collaborators = Collaborators {
            acquisition: Arc::new(NoSources),
            extractor: Arc::new(StaticExtractor),
            resolver: Arc::new(NothingResolves),
        };
        let orchestrator = Orchestrator::new(
            Arc::new(CycleState::new()),
            collaborators,
            CycleConfig::default(),
        )
        .unwrap();
        web::Data::new(AppState::new(orchestrator))
    }

    async fn wait_for_first_cycle(state: &AppState) {
        for _ in 0..200 {
            if state.cycle.is_active() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("first cycle did not complete");
    }

    #[actix_web::test]
    async fn getters_before_start_ask_to_start() {
        let app = test::init_service(
            App::new()
                .app_data(app_state())
                .configure(crate::configure),
        )
        .await;

        for uri in ["/api/dangerzones", "/api/predictions", "/api/ai-advice"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["status"], "not_running", "{uri}");
        }
    }

    #[actix_web::test]
    async fn start_then_read_then_stop() {
        let state = app_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/start-cycle").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "started");

        let req = test::TestRequest::post().uri("/api/start-cycle").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "already_running");

        wait_for_first_cycle(&state).await;

        let req = test::TestRequest::post().uri("/api/dangerzones").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "no_danger");

        let req = test::TestRequest::get().uri("/api/ai-advice").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["vehicleAdvice"], "large 4WD");

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["phase"], "running");
        assert_eq!(body["lastCycle"], 1);

        let req = test::TestRequest::post().uri("/api/stop-cycle").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "stopping");

        let req = test::TestRequest::post().uri("/api/stop-cycle").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "not_running");

        let req = test::TestRequest::get().uri("/api/predictions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "not_running");
    }

    #[actix_web::test]
    async fn health_before_start_is_idle() {
        let app = test::init_service(
            App::new()
                .app_data(app_state())
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["phase"], "idle");
        assert_eq!(body["lastCycle"], 0);
    }
}
