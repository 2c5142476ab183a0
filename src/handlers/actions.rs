// src/handlers/actions.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        audit::{CorrectiveAction, ImprovementSuggestion},
        report::{CorrectiveActionBoard, SuggestionBoard},
    },
};

// GET /api/corrective-actions
#[utoipa::path(
    get,
    path = "/api/corrective-actions",
    tag = "Corrective actions",
    responses(
        (status = 200, description = "Ações do mês corrente com o prazo de 30 dias", body = CorrectiveActionBoard)
    )
)]
pub async fn list_corrective_actions(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<CorrectiveActionBoard>, ApiError> {
    let history = app_state
        .audit_service
        .snapshot()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let board = app_state
        .report_service
        .action_board(&history, app_state.audit_service.now());

    Ok(Json(board))
}

// POST /api/corrective-actions/{action_id}/complete
#[utoipa::path(
    post,
    path = "/api/corrective-actions/{action_id}/complete",
    tag = "Corrective actions",
    responses(
        (status = 200, description = "Ação marcada como concluída", body = CorrectiveAction),
        (status = 404, description = "Ação inexistente"),
        (status = 409, description = "Ação já concluída")
    ),
    params(
        ("action_id" = Uuid, Path, description = "ID da ação corretiva")
    )
)]
pub async fn complete_corrective_action(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(action_id): Path<Uuid>,
) -> Result<Json<CorrectiveAction>, ApiError> {
    let action = app_state
        .audit_service
        .complete_corrective_action(action_id)
        .await
        .map_err(|e: AppError| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(action))
}

// GET /api/improvement-suggestions
#[utoipa::path(
    get,
    path = "/api/improvement-suggestions",
    tag = "Improvement suggestions",
    responses(
        (status = 200, description = "Sugestões do mês corrente", body = SuggestionBoard)
    )
)]
pub async fn list_improvement_suggestions(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<SuggestionBoard>, ApiError> {
    let history = app_state
        .audit_service
        .snapshot()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let board = app_state
        .report_service
        .suggestion_board(&history, app_state.audit_service.now());

    Ok(Json(board))
}

// POST /api/improvement-suggestions/{suggestion_id}/implement
#[utoipa::path(
    post,
    path = "/api/improvement-suggestions/{suggestion_id}/implement",
    tag = "Improvement suggestions",
    responses(
        (status = 200, description = "Sugestão marcada como implementada", body = ImprovementSuggestion),
        (status = 404, description = "Sugestão inexistente"),
        (status = 409, description = "Sugestão já implementada")
    ),
    params(
        ("suggestion_id" = Uuid, Path, description = "ID da sugestão")
    )
)]
pub async fn implement_suggestion(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(suggestion_id): Path<Uuid>,
) -> Result<Json<ImprovementSuggestion>, ApiError> {
    let suggestion = app_state
        .audit_service
        .implement_suggestion(suggestion_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(suggestion))
}
