// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Idiomas com catálogo de mensagens no I18nStore
const SUPPORTED: &[&str] = &["en", "fr"];

// Extrator de idioma (Accept-Language)
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    pub fn from_header(value: Option<&str>) -> Self {
        // "fr-FR" -> "fr"; o primeiro idioma suportado (por ordem de preferência) vence
        let lang = value
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .into_iter()
                    .map(|tag| tag.split('-').next().unwrap_or(&tag).to_lowercase())
                    .find(|primary| SUPPORTED.contains(&primary.as_str()))
            })
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok());

        Ok(Locale::from_header(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_first_supported_language() {
        assert_eq!(Locale::from_header(Some("fr-FR,fr;q=0.9,en;q=0.8")).0, "fr");
        assert_eq!(Locale::from_header(Some("de-DE,en;q=0.5")).0, "en");
    }

    #[test]
    fn test_defaults_to_english() {
        assert_eq!(Locale::from_header(None).0, "en");
        assert_eq!(Locale::from_header(Some("pt-BR")).0, "en");
    }
}
