// src/models/report.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::month::MonthKey,
    models::audit::{CorrectiveAction, ImprovementSuggestion},
};

// 1. Quadro de ações corretivas (prazo de 30 dias)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineStatus {
    Normal,
    Warning,
    Overdue,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectiveActionEntry {
    #[serde(flatten)]
    pub action: CorrectiveAction,
    pub location_name: String,
    pub pillar_name: String,
    pub days_since_creation: i64,
    // Só para ações pendentes
    pub days_remaining: Option<i64>,
    pub deadline: Option<DeadlineStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectiveActionBoard {
    #[schema(value_type = String)]
    pub month: MonthKey,
    pub pending: Vec<CorrectiveActionEntry>,
    pub completed: Vec<CorrectiveActionEntry>,
    pub overdue_count: usize,
    pub warning_count: usize,
}

// 2. Quadro de sugestões de melhoria
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEntry {
    #[serde(flatten)]
    pub suggestion: ImprovementSuggestion,
    pub location_name: String,
    pub pillar_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionBoard {
    #[schema(value_type = String)]
    pub month: MonthKey,
    pub pending: Vec<SuggestionEntry>,
    pub implemented: Vec<SuggestionEntry>,
}

// 3. Resumo do mês
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PillarAverage {
    pub pillar_id: String,
    pub pillar_name: String,
    #[schema(value_type = Option<f64>)]
    pub average: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupScoreEntry {
    pub group_id: String,
    pub group_name: String,
    #[schema(value_type = Option<f64>)]
    pub score: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationScoreEntry {
    pub location_id: String,
    pub location_name: String,
    pub group_id: String,
    #[schema(value_type = Option<f64>)]
    pub score: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[schema(value_type = String)]
    pub month: MonthKey,
    pub completed: bool,
    #[schema(value_type = Option<f64>)]
    pub overall_score: Option<Decimal>,
    pub completed_locations: usize,
    pub total_locations: usize,
    pub group_scores: Vec<GroupScoreEntry>,
    pub location_scores: Vec<LocationScoreEntry>,
    pub pillar_averages: Vec<PillarAverage>,
    pub open_actions: usize,
}

// 4. Relatório anual
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendEntry {
    #[schema(value_type = String)]
    pub month: MonthKey,
    #[schema(value_type = Option<f64>)]
    pub overall_score: Option<Decimal>,
    pub pillar_scores: Vec<PillarAverage>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnualReport {
    pub year: i32,
    #[schema(value_type = Option<f64>)]
    pub annual_score: Option<Decimal>,
    pub total_actions: usize,
    pub completed_actions: usize,
    #[schema(value_type = f64)]
    pub action_completion_rate: Decimal,
    pub total_suggestions: usize,
    pub implemented_suggestions: usize,
    #[schema(value_type = f64)]
    pub suggestion_implementation_rate: Decimal,
    #[schema(value_type = Option<f64>)]
    pub average_action_days: Option<Decimal>,
    pub monthly_trend: Vec<MonthlyTrendEntry>,
    pub pillar_averages: Vec<PillarAverage>,
    pub location_averages: Vec<LocationScoreEntry>,
}

// 5. Tendência histórica (últimos meses concluídos)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationSeries {
    pub location_id: String,
    pub location_name: String,
    #[schema(value_type = Vec<Option<f64>>)]
    pub scores: Vec<Option<Decimal>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalTrend {
    #[schema(value_type = Vec<String>)]
    pub months: Vec<MonthKey>,
    // Nota global de cada mês, alinhada com `months`
    #[schema(value_type = Vec<Option<f64>>)]
    pub overall_scores: Vec<Option<Decimal>>,
    pub series: Vec<LocationSeries>,
}

// 6. Indicadores por auditor (visto)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditorStats {
    #[schema(example = "JDU")]
    pub visa: String,
    pub monthly: usize,
    pub yearly: usize,
    pub total: usize,
    // Parte (%) das auditorias do ano feitas por este auditor
    #[schema(value_type = f64)]
    pub yearly_share: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditorReport {
    pub auditors: Vec<AuditorStats>,
    pub total_monthly: usize,
    pub total_yearly: usize,
    pub total: usize,
}
