// src/routes.rs

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers};

pub fn build_router(app_state: AppState) -> Router {
    let audit_routes = Router::new()
        .route("/", axum::routing::delete(handlers::audits::reset_audits))
        .route("/current", get(handlers::audits::get_current_audit))
        .route("/history", get(handlers::audits::get_history))
        .route(
            "/current/pending-locations",
            get(handlers::audits::get_pending_locations),
        )
        .route(
            "/current/locations/{location_id}",
            get(handlers::audits::get_location_audit),
        )
        .route(
            "/current/locations/{location_id}/start",
            post(handlers::audits::start_location_audit),
        )
        .route(
            "/current/locations/{location_id}/score",
            get(handlers::audits::get_location_score),
        )
        .route(
            "/current/locations/{location_id}/evaluations/{pillar_id}",
            put(handlers::audits::record_evaluation),
        )
        .route(
            "/current/locations/{location_id}/complete",
            post(handlers::audits::complete_location_audit),
        );

    let action_routes = Router::new()
        .route("/", get(handlers::actions::list_corrective_actions))
        .route(
            "/{action_id}/complete",
            post(handlers::actions::complete_corrective_action),
        );

    let suggestion_routes = Router::new()
        .route("/", get(handlers::actions::list_improvement_suggestions))
        .route(
            "/{suggestion_id}/implement",
            post(handlers::actions::implement_suggestion),
        );

    let report_routes = Router::new()
        .route("/monthly", get(handlers::reports::get_monthly_summary))
        .route("/annual", get(handlers::reports::get_annual_report))
        .route("/history", get(handlers::reports::get_historical_trend))
        .route("/auditors", get(handlers::reports::get_auditor_report));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(handlers::catalog::health))
        .route("/api/catalog", get(handlers::catalog::get_catalog))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/audits", audit_routes)
        .nest("/api/corrective-actions", action_routes)
        .nest("/api/improvement-suggestions", suggestion_routes)
        .nest("/api/reports", report_routes)
        .with_state(app_state)
}
