// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

// Catálogo de mensagens por idioma. As chaves são as mesmas devolvidas por
// `AppError::message_key`; `{0}`, `{1}` são substituídos pelos argumentos.
const EN: &[(&str, &str)] = &[
    ("validation", "One or more fields are invalid."),
    ("location_not_found", "Location '{0}' does not exist."),
    ("pillar_not_found", "Pillar '{0}' does not exist."),
    ("unknown_question", "Question '{1}' does not belong to pillar '{0}'."),
    ("unanswered_questions", "Pillar '{0}' still has {1} unanswered question(s)."),
    ("comment_required", "A comment is required for negative answers (pillar '{0}')."),
    ("location_audit_not_started", "The audit of location '{0}' has not been started this month."),
    ("location_audit_completed", "The audit of location '{0}' is already completed."),
    ("location_audit_incomplete", "The audit of location '{0}' is missing pillars: {1}."),
    ("corrective_action_not_found", "Corrective action '{0}' not found."),
    ("corrective_action_closed", "Corrective action '{0}' is already completed."),
    ("suggestion_not_found", "Improvement suggestion '{0}' not found."),
    ("suggestion_closed", "Improvement suggestion '{0}' is already implemented."),
    ("visa_missing", "The x-auditor-visa header is required."),
    ("visa_too_long", "The auditor visa must have at most {0} characters."),
    ("visa_invalid", "The auditor visa may only contain letters, digits, '.' or '-'."),
    ("invalid_catalog", "Invalid audit catalog: {0}"),
    ("internal", "An unexpected error occurred."),
];

const FR: &[(&str, &str)] = &[
    ("validation", "Un ou plusieurs champs sont invalides."),
    ("location_not_found", "Le local '{0}' n'existe pas."),
    ("pillar_not_found", "Le pilier '{0}' n'existe pas."),
    ("unknown_question", "La question '{1}' n'appartient pas au pilier '{0}'."),
    ("unanswered_questions", "Le pilier '{0}' a encore {1} question(s) sans réponse."),
    ("comment_required", "Un commentaire est requis pour les réponses négatives (pilier '{0}')."),
    ("location_audit_not_started", "L'audit du local '{0}' n'a pas été démarré ce mois-ci."),
    ("location_audit_completed", "L'audit du local '{0}' est déjà terminé."),
    ("location_audit_incomplete", "Il manque des piliers à l'audit du local '{0}' : {1}."),
    ("corrective_action_not_found", "Action corrective '{0}' introuvable."),
    ("corrective_action_closed", "L'action corrective '{0}' est déjà terminée."),
    ("suggestion_not_found", "Suggestion d'amélioration '{0}' introuvable."),
    ("suggestion_closed", "La suggestion d'amélioration '{0}' est déjà implémentée."),
    ("visa_missing", "L'en-tête x-auditor-visa est obligatoire."),
    ("visa_too_long", "Le visa de l'auditeur doit avoir au plus {0} caractères."),
    ("visa_invalid", "Le visa de l'auditeur ne peut contenir que des lettres, des chiffres, '.' ou '-'."),
    ("invalid_catalog", "Catalogue d'audit invalide : {0}"),
    ("internal", "Une erreur inattendue s'est produite."),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let messages = [("en", EN), ("fr", FR)]
            .into_iter()
            .map(|(lang, table)| (lang, table.iter().copied().collect()))
            .collect();

        Self { messages }
    }

    /// Traduz `key` para `lang`, caindo para inglês e, em último caso, para a própria chave.
    pub fn translate(&self, lang: &str, key: &str, args: &[String]) -> String {
        let template = self
            .messages
            .get(lang)
            .and_then(|table| table.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|table| table.get(key)))
            .copied()
            .unwrap_or(key);

        args.iter()
            .enumerate()
            .fold(template.to_string(), |message, (i, arg)| {
                message.replace(&format!("{{{i}}}"), arg)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_with_arguments() {
        let store = I18nStore::new();
        let msg = store.translate("fr", "location_not_found", &["136".to_string()]);
        assert_eq!(msg, "Le local '136' n'existe pas.");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        let msg = store.translate("de", "internal", &[]);
        assert_eq!(msg, "An unexpected error occurred.");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "nope", &[]), "nope");
    }

    #[test]
    fn test_every_english_key_has_french_translation() {
        let store = I18nStore::new();
        for (key, _) in EN {
            assert!(store.messages["fr"].contains_key(key), "falta tradução fr para {key}");
        }
    }
}
