// src/models/audit.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::month::MonthKey;

// --- Enums de status (transição única: pendente -> terminal) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Completed,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ActionStatus::Pending),
            "completed" => Some(ActionStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Implemented,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Implemented => "implemented",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SuggestionStatus::Pending),
            "implemented" => Some(SuggestionStatus::Implemented),
            _ => None,
        }
    }
}

// --- Ações corretivas e sugestões de melhoria ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectiveAction {
    pub id: Uuid,
    #[schema(example = "Retirer les cartons vides du local")]
    pub description: String,
    pub location_id: String,
    pub pillar_id: String,
    pub created_at: DateTime<Utc>,
    pub status: ActionStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CorrectiveAction {
    pub fn new(description: &str, location_id: &str, pillar_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.trim().to_string(),
            location_id: location_id.to_string(),
            pillar_id: pillar_id.to_string(),
            created_at: now,
            status: ActionStatus::Pending,
            completed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ActionStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementSuggestion {
    pub id: Uuid,
    #[schema(example = "Installer un tableau d'ombres pour les outils")]
    pub description: String,
    pub location_id: String,
    pub pillar_id: String,
    pub created_at: DateTime<Utc>,
    pub status: SuggestionStatus,
    pub implemented_at: Option<DateTime<Utc>>,
}

impl ImprovementSuggestion {
    pub fn new(description: &str, location_id: &str, pillar_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.trim().to_string(),
            location_id: location_id.to_string(),
            pillar_id: pillar_id.to_string(),
            created_at: now,
            status: SuggestionStatus::Pending,
            implemented_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SuggestionStatus::Pending
    }
}

// --- Avaliação de um pilar num local ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PillarEvaluation {
    pub pillar_id: String,
    #[schema(value_type = f64, example = 6.7)]
    pub score: Decimal,
    pub comment: String,
    pub question_answers: BTreeMap<String, bool>,
    #[serde(default)]
    pub corrective_actions: Vec<CorrectiveAction>,
    #[serde(default)]
    pub improvement_suggestions: Vec<ImprovementSuggestion>,
    pub evaluated_at: DateTime<Utc>,
}

// --- Auditoria de um local num mês ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationAudit {
    pub location_id: String,
    pub group_id: String,
    pub date: DateTime<Utc>,
    pub year: i32,
    pub evaluations: Vec<PillarEvaluation>,
    pub completed: bool,
    #[schema(value_type = Option<f64>)]
    pub overall_score: Option<Decimal>,
    #[schema(example = "JDU")]
    pub auditor_visa: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LocationAudit {
    pub fn evaluation(&self, pillar_id: &str) -> Option<&PillarEvaluation> {
        self.evaluations.iter().find(|e| e.pillar_id == pillar_id)
    }
}

// --- Nota por grupo de locais ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupScore {
    pub group_id: String,
    // Ausente enquanto nenhum local do grupo estiver concluído
    #[schema(value_type = Option<f64>)]
    pub score: Option<Decimal>,
}

// --- Auditoria mensal ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAudit {
    #[schema(value_type = String, example = "2026-10")]
    pub month: MonthKey,
    pub year: i32,
    pub location_audits: Vec<LocationAudit>,
    pub completed: bool,
    #[schema(value_type = Option<f64>)]
    pub overall_score: Option<Decimal>,
    pub group_scores: Vec<GroupScore>,
}

impl MonthlyAudit {
    pub fn new(month: MonthKey) -> Self {
        Self {
            month,
            year: month.year(),
            location_audits: Vec::new(),
            completed: false,
            overall_score: None,
            group_scores: Vec::new(),
        }
    }

    pub fn location_audit(&self, location_id: &str) -> Option<&LocationAudit> {
        self.location_audits.iter().find(|a| a.location_id == location_id)
    }

    pub fn completed_location_audits(&self) -> impl Iterator<Item = &LocationAudit> {
        self.location_audits.iter().filter(|a| a.completed)
    }
}

// --- Histórico completo (inclui o mês corrente) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditHistory {
    pub audits: Vec<MonthlyAudit>,
}

impl AuditHistory {
    pub fn month(&self, month: MonthKey) -> Option<&MonthlyAudit> {
        self.audits.iter().find(|a| a.month == month)
    }

    pub fn months_of_year(&self, year: i32) -> impl Iterator<Item = &MonthlyAudit> {
        self.audits.iter().filter(move |a| a.year == year)
    }
}
