use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros de domínio e de infraestrutura da aplicação.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Local não encontrado: {0}")]
    LocationNotFound(String),

    #[error("Pilar não encontrado: {0}")]
    PillarNotFound(String),

    #[error("Pergunta {question_id} não pertence ao pilar {pillar_id}")]
    UnknownQuestion { pillar_id: String, question_id: String },

    #[error("Pilar {pillar_id} com {missing} pergunta(s) sem resposta")]
    UnansweredQuestions { pillar_id: String, missing: usize },

    #[error("Comentário obrigatório para respostas negativas (pilar {0})")]
    CommentRequired(String),

    #[error("Auditoria do local {0} não iniciada")]
    LocationAuditNotStarted(String),

    #[error("Auditoria do local {0} já concluída")]
    LocationAuditCompleted(String),

    #[error("Auditoria do local {location_id} incompleta, faltam: {missing_pillars:?}")]
    LocationAuditIncomplete {
        location_id: String,
        missing_pillars: Vec<String>,
    },

    #[error("Ação corretiva não encontrada: {0}")]
    CorrectiveActionNotFound(Uuid),

    #[error("Ação corretiva já concluída: {0}")]
    CorrectiveActionAlreadyCompleted(Uuid),

    #[error("Sugestão não encontrada: {0}")]
    SuggestionNotFound(Uuid),

    #[error("Sugestão já implementada: {0}")]
    SuggestionAlreadyImplemented(Uuid),

    #[error("Visto do auditor ausente")]
    AuditorVisaMissing,

    #[error("Visto do auditor com mais de {0} caracteres")]
    AuditorVisaTooLong(usize),

    #[error("Visto do auditor com caracteres inválidos")]
    AuditorVisaInvalid,

    #[error("Catálogo inválido: {0}")]
    InvalidCatalog(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de armazenamento local: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::UnknownQuestion { .. }
            | AppError::UnansweredQuestions { .. }
            | AppError::CommentRequired(_)
            | AppError::AuditorVisaMissing
            | AppError::AuditorVisaTooLong(_)
            | AppError::AuditorVisaInvalid => StatusCode::BAD_REQUEST,

            AppError::LocationNotFound(_)
            | AppError::PillarNotFound(_)
            | AppError::LocationAuditNotStarted(_)
            | AppError::CorrectiveActionNotFound(_)
            | AppError::SuggestionNotFound(_) => StatusCode::NOT_FOUND,

            AppError::LocationAuditCompleted(_)
            | AppError::LocationAuditIncomplete { .. }
            | AppError::CorrectiveActionAlreadyCompleted(_)
            | AppError::SuggestionAlreadyImplemented(_) => StatusCode::CONFLICT,

            AppError::InvalidCatalog(_)
            | AppError::DatabaseError(_)
            | AppError::StorageError(_)
            | AppError::SerializationError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Chave no I18nStore + argumentos da mensagem.
    fn message_key(&self) -> (&'static str, Vec<String>) {
        match self {
            AppError::ValidationError(_) => ("validation", vec![]),
            AppError::LocationNotFound(id) => ("location_not_found", vec![id.clone()]),
            AppError::PillarNotFound(id) => ("pillar_not_found", vec![id.clone()]),
            AppError::UnknownQuestion { pillar_id, question_id } => {
                ("unknown_question", vec![pillar_id.clone(), question_id.clone()])
            }
            AppError::UnansweredQuestions { pillar_id, missing } => {
                ("unanswered_questions", vec![pillar_id.clone(), missing.to_string()])
            }
            AppError::CommentRequired(id) => ("comment_required", vec![id.clone()]),
            AppError::LocationAuditNotStarted(id) => ("location_audit_not_started", vec![id.clone()]),
            AppError::LocationAuditCompleted(id) => ("location_audit_completed", vec![id.clone()]),
            AppError::LocationAuditIncomplete { location_id, missing_pillars } => (
                "location_audit_incomplete",
                vec![location_id.clone(), missing_pillars.join(", ")],
            ),
            AppError::CorrectiveActionNotFound(id) => ("corrective_action_not_found", vec![id.to_string()]),
            AppError::CorrectiveActionAlreadyCompleted(id) => ("corrective_action_closed", vec![id.to_string()]),
            AppError::SuggestionNotFound(id) => ("suggestion_not_found", vec![id.to_string()]),
            AppError::SuggestionAlreadyImplemented(id) => ("suggestion_closed", vec![id.to_string()]),
            AppError::AuditorVisaMissing => ("visa_missing", vec![]),
            AppError::AuditorVisaTooLong(max) => ("visa_too_long", vec![max.to_string()]),
            AppError::AuditorVisaInvalid => ("visa_invalid", vec![]),
            AppError::InvalidCatalog(reason) => ("invalid_catalog", vec![reason.clone()]),
            _ => ("internal", vec![]),
        }
    }

    /// Converte o erro de domínio em resposta HTTP traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n_store: &I18nStore) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O `tracing` loga a mensagem detalhada; o cliente só recebe a genérica.
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let (key, args) = self.message_key();
        let message = i18n_store.translate(&locale.0, key, &args);

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(details)
            }
            _ => None,
        };

        ApiError {
            status,
            message,
            details,
        }
    }
}

// O erro que efetivamente vira resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => Json(json!({
                "error": self.message,
                "details": details,
            })),
            None => Json(json!({ "error": self.message })),
        };

        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn test_domain_errors_map_to_http_status() {
        assert_eq!(AppError::LocationNotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::CommentRequired("seiri".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::CorrectiveActionAlreadyCompleted(Uuid::nil()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_is_translated() {
        let store = I18nStore::new();
        let err = AppError::LocationAuditIncomplete {
            location_id: "136".into(),
            missing_pillars: vec!["seiso".into(), "quality".into()],
        };

        let api = err.to_api_error(&locale("fr"), &store);
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.message, "Il manque des piliers à l'audit du local '136' : seiso, quality.");
        assert!(api.details.is_none());
    }

    #[test]
    fn test_visa_errors_are_translated() {
        let store = I18nStore::new();

        let api = AppError::AuditorVisaTooLong(10).to_api_error(&locale("fr"), &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "Le visa de l'auditeur doit avoir au plus 10 caractères.");

        let api = AppError::AuditorVisaMissing.to_api_error(&locale("en"), &store);
        assert_eq!(api.message, "The x-auditor-visa header is required.");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let store = I18nStore::new();
        let err = AppError::StorageError(std::io::Error::other("disk full"));
        let api = err.to_api_error(&locale("en"), &store);
        assert_eq!(api.message, "An unexpected error occurred.");
    }
}
