// src/handlers/catalog.rs

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{config::AppState, models::catalog::Catalog};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    // "connected", "unreachable" ou "disabled" (sem DATABASE_URL)
    #[schema(example = "disabled")]
    pub remote_store: String,
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "System",
    responses(
        (status = 200, description = "Serviço no ar", body = HealthResponse)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let remote_store = match &app_state.db_pool {
        Some(pool) => match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Banco remoto não respondeu ao health check");
                "unreachable"
            }
        },
        None => "disabled",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        remote_store: remote_store.to_string(),
    })
}

// GET /api/catalog
#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "Catalog",
    responses(
        (status = 200, description = "Grupos, locais e pilares com as perguntas", body = Catalog)
    )
)]
pub async fn get_catalog(State(app_state): State<AppState>) -> Json<Catalog> {
    Json(app_state.catalog.as_ref().clone())
}
