// src/models/catalog.rs

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;

// ---
// 1. Pilares e perguntas (dados de referência imutáveis)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[schema(example = "seiri_1")]
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pillar {
    #[schema(example = "seiri")]
    pub id: String,
    #[schema(example = "Seiri (Trier)")]
    pub name: String,
    pub description: String,
    pub questions: Vec<Question>,
}

impl Pillar {
    pub fn has_question(&self, question_id: &str) -> bool {
        self.questions.iter().any(|q| q.id == question_id)
    }

    /// Nome curto usado nos relatórios ("Seiri (Trier)" -> "Seiri").
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

// ---
// 2. Grupos de locais e locais físicos
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationGroup {
    #[schema(example = "bulk")]
    pub id: String,
    #[schema(example = "Bulk")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[schema(example = "136")]
    pub id: String,
    #[schema(example = "Local 136")]
    pub name: String,
    #[schema(example = "bulk")]
    pub group_id: String,
}

// ---
// 3. O catálogo completo
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub groups: Vec<LocationGroup>,
    pub locations: Vec<Location>,
    pub pillars: Vec<Pillar>,
}

impl Catalog {
    pub fn location(&self, location_id: &str) -> Result<&Location, AppError> {
        self.locations
            .iter()
            .find(|l| l.id == location_id)
            .ok_or_else(|| AppError::LocationNotFound(location_id.to_string()))
    }

    pub fn pillar(&self, pillar_id: &str) -> Result<&Pillar, AppError> {
        self.pillars
            .iter()
            .find(|p| p.id == pillar_id)
            .ok_or_else(|| AppError::PillarNotFound(pillar_id.to_string()))
    }

    pub fn locations_in_group<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a Location> + 'a {
        self.locations.iter().filter(move |l| l.group_id == group_id)
    }

    pub fn location_name(&self, location_id: &str) -> String {
        self.locations
            .iter()
            .find(|l| l.id == location_id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| location_id.to_string())
    }

    pub fn pillar_name(&self, pillar_id: &str) -> String {
        self.pillars
            .iter()
            .find(|p| p.id == pillar_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| pillar_id.to_string())
    }

    /// Verifica a coerência de um catálogo carregado de arquivo.
    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |reason: String| -> Result<(), AppError> { Err(AppError::InvalidCatalog(reason)) };

        if self.locations.is_empty() {
            return invalid("no locations defined".into());
        }
        if self.pillars.is_empty() {
            return invalid("no pillars defined".into());
        }

        let mut group_ids = HashSet::new();
        for group in &self.groups {
            if !group_ids.insert(group.id.as_str()) {
                return invalid(format!("duplicate group '{}'", group.id));
            }
        }

        let mut location_ids = HashSet::new();
        for location in &self.locations {
            if !location_ids.insert(location.id.as_str()) {
                return invalid(format!("duplicate location '{}'", location.id));
            }
            if !group_ids.contains(location.group_id.as_str()) {
                return invalid(format!(
                    "location '{}' references unknown group '{}'",
                    location.id, location.group_id
                ));
            }
        }

        let mut pillar_ids = HashSet::new();
        let mut question_ids = HashSet::new();
        for pillar in &self.pillars {
            if !pillar_ids.insert(pillar.id.as_str()) {
                return invalid(format!("duplicate pillar '{}'", pillar.id));
            }
            if pillar.questions.is_empty() {
                return invalid(format!("pillar '{}' has no questions", pillar.id));
            }
            for question in &pillar.questions {
                if !question_ids.insert(question.id.as_str()) {
                    return invalid(format!("duplicate question '{}'", question.id));
                }
            }
        }

        Ok(())
    }
}

fn question(id: &str, text: &str) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
    }
}

fn pillar(id: &str, name: &str, description: &str, questions: Vec<Question>) -> Pillar {
    Pillar {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        questions,
    }
}

fn location(id: &str, name: &str, group_id: &str) -> Location {
    Location {
        id: id.to_string(),
        name: name.to_string(),
        group_id: group_id.to_string(),
    }
}

impl Default for Catalog {
    // Catálogo embutido: 2 grupos, 6 locais, 7 pilares.
    fn default() -> Self {
        let groups = vec![
            LocationGroup { id: "bulk".into(), name: "Bulk".into() },
            LocationGroup { id: "laverie".into(), name: "Laverie".into() },
        ];

        let locations = vec![
            location("134-138", "Locaux 134-138", "bulk"),
            location("136", "Local 136", "bulk"),
            location("139", "Local 139", "bulk"),
            location("140", "Local 140", "bulk"),
            location("laverie-b1", "Laverie B1", "laverie"),
            location("laverie-b2", "Laverie B2", "laverie"),
        ];

        let pillars = vec![
            pillar(
                "seiri",
                "Seiri (Trier)",
                "Séparer l'inutile de l'utile et éliminer le superflu",
                vec![
                    question("seiri_1", "Les zones de travail sont-elles exemptes d'objets non nécessaires ?"),
                    question("seiri_2", "Les postes de travail sont-ils encombrés d'outils, de pièces ou de matériaux superflus ?"),
                    question("seiri_3", "Y a-t-il des équipements ou des outils dans votre zone de travail qui ne sont plus utilisés ou nécessaires pour les tâches actuelles?"),
                    question("seiri_4", "Existe-t-il des stocks de matériaux ou de produits finis qui sont périmés, obsolètes ou en excès ?"),
                    question("seiri_5", "Les zones de stockage sont-elles encombrées d'articles non essentiels ou de déchets ?"),
                ],
            ),
            pillar(
                "seiton",
                "Seiton (Ranger)",
                "Organiser les outils et les matériaux pour faciliter leur utilisation",
                vec![
                    question("seiton_1", "Les zones de stockage sont-elles clairement identifiées et étiquetées?"),
                    question("seiton_2", "Les outils et équipements ont-ils des emplacements désignés clairement marqués?"),
                    question("seiton_3", "Les circuits de déplacement ou les flux de travail sont-ils optimisés pour réduire les mouvements inutiles ?"),
                ],
            ),
            pillar(
                "seiso",
                "Seiso (Nettoyer)",
                "Maintenir la propreté de l'environnement de travail",
                vec![
                    question("seiso_1", "Les équipements sont-ils régulièrement nettoyés ?"),
                    question("seiso_2", "Le nettoyage est-il effectué avant et après chaque production ?"),
                    question("seiso_3", "Les zones de production et de stockage sont-elles systématiquement nettoyées ?"),
                    question("seiso_4", "Les déchets et résidus sont-ils correctement éliminés ?"),
                    question("seiso_5", "Les surfaces de travail sont-elles nettoyées après chaque utilisation ?"),
                    question("seiso_6", "Le nettoyage est-il correctement documenté pour garantir la traçabilité ?"),
                ],
            ),
            pillar(
                "seiketsu",
                "Seiketsu (Standardiser)",
                "Définir des normes et des procédures de travail",
                vec![
                    question("seiketsu_1", "Les différentes zones sont marquées où identifier ? (Une place pour chaque chose et chaque chose a sa place)"),
                    question("seiketsu_2", "Le système de Kanban est respecté ?"),
                    question("seiketsu_3", "Le FiFo est-t 'il respecté ?"),
                ],
            ),
            pillar(
                "shitsuke",
                "Shitsuke (Respecter)",
                "Maintenir et respecter les normes établies",
                vec![
                    question("shitsuke_1", "Les suggestions d'améliorations de cette zone sont discutées et implémentées ?"),
                    question("shitsuke_2", "Les actions en cours sont-ils terminées ?"),
                ],
            ),
            pillar(
                "safety",
                "Safety (Sécurité)",
                "Assurer un environnement de travail sécuritaire",
                vec![
                    question("safety_1", "Les EPI utilisé lors des activités sont-ils adaptés?"),
                    question("safety_2", "Les stocks et péremptions des EPI sont-ils a jours ?"),
                    question("safety_3", "Est-ce-que le port des charges sont-il adaptés à votre environnement de travail ?"),
                    question("safety_4", "Les dangers mécaniques sont-ils sécurisés?"),
                ],
            ),
            pillar(
                "quality",
                "Quality (Qualité)",
                "Assurer la qualité des processus et des produits",
                vec![
                    question("quality_1", "Aucun consommable périmée ? (ETH 70%, solutions, matériels stériles ….)"),
                    question("quality_2", "Les logbook papiers sont-ils documentés et revues dans les temps ?"),
                    question("quality_3", "Pas de documents pirates présents dans les locaux ?"),
                ],
            ),
        ];

        Self {
            groups,
            locations,
            pillars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = Catalog::default();
        catalog.validate().unwrap();
        assert_eq!(catalog.groups.len(), 2);
        assert_eq!(catalog.locations.len(), 6);
        assert_eq!(catalog.pillars.len(), 7);

        let questions: usize = catalog.pillars.iter().map(|p| p.questions.len()).sum();
        assert_eq!(questions, 26);
    }

    #[test]
    fn test_lookups() {
        let catalog = Catalog::default();
        assert_eq!(catalog.location("136").unwrap().group_id, "bulk");
        assert!(matches!(catalog.location("999"), Err(AppError::LocationNotFound(_))));
        assert!(catalog.pillar("seiso").unwrap().has_question("seiso_6"));
        assert!(matches!(catalog.pillar("people"), Err(AppError::PillarNotFound(_))));
        assert_eq!(catalog.locations_in_group("laverie").count(), 2);
        assert_eq!(catalog.pillar("seiketsu").unwrap().short_name(), "Seiketsu");
    }

    #[test]
    fn test_validate_rejects_dangling_group() {
        let mut catalog = Catalog::default();
        catalog.locations.push(location("x", "X", "nowhere"));
        assert!(matches!(catalog.validate(), Err(AppError::InvalidCatalog(_))));
    }

    #[test]
    fn test_validate_rejects_empty_pillar() {
        let mut catalog = Catalog::default();
        catalog.pillars.push(pillar("people", "People", "qualitative", vec![]));
        assert!(matches!(catalog.validate(), Err(AppError::InvalidCatalog(_))));
    }

    #[test]
    fn test_catalog_json_roundtrip_uses_camel_case() {
        let json = serde_json::to_value(Catalog::default()).unwrap();
        assert_eq!(json["locations"][0]["groupId"], "bulk");
    }
}
