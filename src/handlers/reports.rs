// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Datelike;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::report::{AnnualReport, AuditorReport, HistoricalTrend, MonthlySummary},
};

#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct AnnualReportQuery {
    /// Ano do relatório; o ano corrente quando omitido
    #[validate(range(min = 2000, max = 2100, message = "The year must be between 2000 and 2100."))]
    pub year: Option<i32>,
}

// GET /api/reports/monthly
#[utoipa::path(
    get,
    path = "/api/reports/monthly",
    tag = "Reports",
    responses(
        (status = 200, description = "Resumo do mês corrente", body = MonthlySummary)
    )
)]
pub async fn get_monthly_summary(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<MonthlySummary>, ApiError> {
    let history = app_state
        .audit_service
        .snapshot()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(
        app_state
            .report_service
            .monthly_summary(&history, app_state.audit_service.now()),
    ))
}

// GET /api/reports/annual?year=YYYY
#[utoipa::path(
    get,
    path = "/api/reports/annual",
    tag = "Reports",
    params(AnnualReportQuery),
    responses(
        (status = 200, description = "Indicadores anuais", body = AnnualReport),
        (status = 400, description = "Ano fora do intervalo aceito")
    )
)]
pub async fn get_annual_report(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<AnnualReportQuery>,
) -> Result<Json<AnnualReport>, ApiError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let history = app_state
        .audit_service
        .snapshot()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let year = query
        .year
        .unwrap_or_else(|| app_state.audit_service.now().year());

    Ok(Json(app_state.report_service.annual_report(&history, year)))
}

// GET /api/reports/history
#[utoipa::path(
    get,
    path = "/api/reports/history",
    tag = "Reports",
    responses(
        (status = 200, description = "Notas por local nos últimos 6 meses concluídos", body = HistoricalTrend)
    )
)]
pub async fn get_historical_trend(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<HistoricalTrend>, ApiError> {
    let history = app_state
        .audit_service
        .snapshot()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(app_state.report_service.historical_trend(&history)))
}

// GET /api/reports/auditors
#[utoipa::path(
    get,
    path = "/api/reports/auditors",
    tag = "Reports",
    responses(
        (status = 200, description = "Auditorias concluídas por visto", body = AuditorReport)
    )
)]
pub async fn get_auditor_report(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<AuditorReport>, ApiError> {
    let history = app_state
        .audit_service
        .snapshot()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(
        app_state
            .report_service
            .auditor_report(&history, app_state.audit_service.now()),
    ))
}
