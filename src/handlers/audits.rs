// src/handlers/audits.rs

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auditor::AuditorVisa, i18n::Locale},
    models::{
        audit::{AuditHistory, LocationAudit, MonthlyAudit, PillarEvaluation},
        catalog::Location,
    },
    services::ledger::EvaluationInput,
};

const MAX_DESCRIPTION_LEN: usize = 500;

// ---
// Validações customizadas
// ---
fn validate_answers(answers: &BTreeMap<String, bool>) -> Result<(), ValidationError> {
    if answers.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("At least one answer is required.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_descriptions(descriptions: &Vec<String>) -> Result<(), ValidationError> {
    if descriptions.iter().any(|d| d.trim().chars().count() > MAX_DESCRIPTION_LEN) {
        let mut err = ValidationError::new("length");
        err.add_param("max".into(), &MAX_DESCRIPTION_LEN);
        err.message = Some("Each description must have at most 500 characters.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: RecordEvaluation
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordEvaluationPayload {
    // questionId -> resposta ("sim" = true)
    #[validate(custom(function = "validate_answers"))]
    pub answers: BTreeMap<String, bool>,

    #[serde(default)]
    #[validate(length(max = 2000, message = "The comment must have at most 2000 characters."))]
    pub comment: String,

    #[serde(default)]
    #[validate(custom(function = "validate_descriptions"))]
    pub new_corrective_actions: Vec<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_descriptions"))]
    pub new_improvement_suggestions: Vec<String>,
}

impl From<RecordEvaluationPayload> for EvaluationInput {
    fn from(payload: RecordEvaluationPayload) -> Self {
        EvaluationInput {
            answers: payload.answers,
            comment: payload.comment,
            new_corrective_actions: payload.new_corrective_actions,
            new_improvement_suggestions: payload.new_improvement_suggestions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationScoreResponse {
    pub location_id: String,
    // Média dos pilares avaliados até agora
    #[schema(value_type = Option<f64>)]
    pub score: Option<Decimal>,
    pub evaluated_pillars: usize,
    pub total_pillars: usize,
}

// GET /api/audits/current
#[utoipa::path(
    get,
    path = "/api/audits/current",
    tag = "Audits",
    responses(
        (status = 200, description = "Auditoria do mês corrente (criada se ainda não existir)", body = MonthlyAudit)
    )
)]
pub async fn get_current_audit(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<MonthlyAudit>, ApiError> {
    let audit = app_state
        .audit_service
        .current_month_audit()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(audit))
}

// GET /api/audits/history
#[utoipa::path(
    get,
    path = "/api/audits/history",
    tag = "Audits",
    responses(
        (status = 200, description = "Todos os meses, em ordem cronológica", body = AuditHistory)
    )
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<AuditHistory>, ApiError> {
    let history = app_state
        .audit_service
        .snapshot()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(history))
}

// DELETE /api/audits
#[utoipa::path(
    delete,
    path = "/api/audits",
    tag = "Audits",
    responses(
        (status = 200, description = "Histórico apagado; devolve o novo mês corrente", body = MonthlyAudit)
    )
)]
pub async fn reset_audits(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<MonthlyAudit>, ApiError> {
    let current = app_state
        .audit_service
        .reset_all_audits()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(current))
}

// GET /api/audits/current/pending-locations
#[utoipa::path(
    get,
    path = "/api/audits/current/pending-locations",
    tag = "Audits",
    responses(
        (status = 200, description = "Locais ainda sem auditoria concluída no mês", body = Vec<Location>)
    )
)]
pub async fn get_pending_locations(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<Location>>, ApiError> {
    let pending = app_state
        .audit_service
        .pending_locations()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let locations = app_state
        .catalog
        .locations
        .iter()
        .filter(|l| pending.contains(&l.id))
        .cloned()
        .collect();

    Ok(Json(locations))
}

// POST /api/audits/current/locations/{location_id}/start
#[utoipa::path(
    post,
    path = "/api/audits/current/locations/{location_id}/start",
    tag = "Audits",
    responses(
        (status = 200, description = "Auditoria do local aberta (ou a já existente)", body = LocationAudit),
        (status = 404, description = "Local desconhecido")
    ),
    params(
        ("location_id" = String, Path, description = "ID do local")
    )
)]
pub async fn start_location_audit(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(location_id): Path<String>,
) -> Result<Json<LocationAudit>, ApiError> {
    let audit = app_state
        .audit_service
        .start_location_audit(&location_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(audit))
}

// GET /api/audits/current/locations/{location_id}
#[utoipa::path(
    get,
    path = "/api/audits/current/locations/{location_id}",
    tag = "Audits",
    responses(
        (status = 200, description = "Auditoria do local no mês corrente", body = LocationAudit),
        (status = 404, description = "Local desconhecido ou auditoria não iniciada")
    ),
    params(
        ("location_id" = String, Path, description = "ID do local")
    )
)]
pub async fn get_location_audit(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(location_id): Path<String>,
) -> Result<Json<LocationAudit>, ApiError> {
    let audit = app_state
        .audit_service
        .get_location_audit(&location_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(audit))
}

// GET /api/audits/current/locations/{location_id}/score
#[utoipa::path(
    get,
    path = "/api/audits/current/locations/{location_id}/score",
    tag = "Audits",
    responses(
        (status = 200, description = "Nota provisória do local", body = LocationScoreResponse)
    ),
    params(
        ("location_id" = String, Path, description = "ID do local")
    )
)]
pub async fn get_location_score(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(location_id): Path<String>,
) -> Result<Json<LocationScoreResponse>, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let score = app_state
        .audit_service
        .preview_score(&location_id)
        .await
        .map_err(to_api)?;
    let audit = app_state
        .audit_service
        .get_location_audit(&location_id)
        .await
        .map_err(to_api)?;

    Ok(Json(LocationScoreResponse {
        location_id,
        score,
        evaluated_pillars: audit.evaluations.len(),
        total_pillars: app_state.catalog.pillars.len(),
    }))
}

// PUT /api/audits/current/locations/{location_id}/evaluations/{pillar_id}
#[utoipa::path(
    put,
    path = "/api/audits/current/locations/{location_id}/evaluations/{pillar_id}",
    tag = "Audits",
    request_body = RecordEvaluationPayload,
    responses(
        (status = 200, description = "Avaliação do pilar registada", body = PillarEvaluation),
        (status = 400, description = "Respostas incompletas ou comentário em falta"),
        (status = 409, description = "Auditoria do local já concluída")
    ),
    params(
        ("location_id" = String, Path, description = "ID do local"),
        ("pillar_id" = String, Path, description = "ID do pilar")
    )
)]
pub async fn record_evaluation(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((location_id, pillar_id)): Path<(String, String)>,
    Json(payload): Json<RecordEvaluationPayload>,
) -> Result<Json<PillarEvaluation>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let evaluation = app_state
        .audit_service
        .record_evaluation(&location_id, &pillar_id, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(evaluation))
}

// POST /api/audits/current/locations/{location_id}/complete
#[utoipa::path(
    post,
    path = "/api/audits/current/locations/{location_id}/complete",
    tag = "Audits",
    responses(
        (status = 200, description = "Auditoria do local concluída", body = LocationAudit),
        (status = 400, description = "Visto do auditor ausente ou inválido"),
        (status = 409, description = "Pilares em falta ou auditoria já concluída")
    ),
    params(
        ("location_id" = String, Path, description = "ID do local")
    ),
    security(("auditor_visa" = []))
)]
pub async fn complete_location_audit(
    State(app_state): State<AppState>,
    locale: Locale,
    visa: AuditorVisa,
    Path(location_id): Path<String>,
) -> Result<Json<LocationAudit>, ApiError> {
    let audit = app_state
        .audit_service
        .complete_location_audit(&location_id, &visa.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(audit))
}
