// src/middleware/auditor.rs

use axum::{extract::FromRequestParts, http::{header, request::Parts}};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// Cabeçalho HTTP com o visto (iniciais) do auditor
pub const AUDITOR_VISA_HEADER: &str = "x-auditor-visa";

const MAX_VISA_LEN: usize = 10;

// Extrator do visto do auditor, exigido para concluir a auditoria de um local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditorVisa(pub String);

impl AuditorVisa {
    /// Normaliza o visto: sem espaços nas pontas, em maiúsculas, alfanumérico.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let visa = raw.trim().to_uppercase();

        if visa.is_empty() {
            return Err(AppError::AuditorVisaMissing);
        }
        if visa.chars().count() > MAX_VISA_LEN {
            return Err(AppError::AuditorVisaTooLong(MAX_VISA_LEN));
        }
        if !visa.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '-') {
            return Err(AppError::AuditorVisaInvalid);
        }

        Ok(AuditorVisa(visa))
    }
}

// A rejeição é traduzida como os demais erros, por isso o extrator precisa do I18nStore.
impl FromRequestParts<AppState> for AuditorVisa {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_header(
            parts
                .headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok()),
        );

        let result = match parts.headers.get(AUDITOR_VISA_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| AppError::AuditorVisaInvalid)
                .and_then(AuditorVisa::parse),
            None => Err(AppError::AuditorVisaMissing),
        };

        result.map_err(|e| e.to_api_error(&locale, &state.i18n_store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visa_is_normalised() {
        assert_eq!(AuditorVisa::parse("  jdu ").unwrap(), AuditorVisa("JDU".to_string()));
        assert_eq!(AuditorVisa::parse("j.-d").unwrap().0, "J.-D");
    }

    #[test]
    fn test_invalid_visas_are_rejected() {
        assert!(matches!(AuditorVisa::parse("   "), Err(AppError::AuditorVisaMissing)));
        assert!(matches!(
            AuditorVisa::parse("ABCDEFGHIJK"),
            Err(AppError::AuditorVisaTooLong(MAX_VISA_LEN))
        ));
        assert!(matches!(AuditorVisa::parse("A B"), Err(AppError::AuditorVisaInvalid)));
    }
}
