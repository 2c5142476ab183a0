// src/services/report_service.rs

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

use crate::{
    common::{month::MonthKey, scoring},
    models::{
        audit::{AuditHistory, LocationAudit, MonthlyAudit},
        catalog::Catalog,
        report::{
            AnnualReport, AuditorReport, AuditorStats, CorrectiveActionBoard, CorrectiveActionEntry,
            DeadlineStatus, GroupScoreEntry, HistoricalTrend, LocationScoreEntry, LocationSeries,
            MonthlySummary, MonthlyTrendEntry, PillarAverage, SuggestionBoard, SuggestionEntry,
        },
    },
};

/// Prazo para fechar uma ação corretiva, em dias.
pub const ACTION_DEADLINE_DAYS: i64 = 30;
/// Abaixo (ou igual) deste número de dias restantes a ação entra em alerta.
pub const WARNING_THRESHOLD_DAYS: i64 = 15;
/// Quantidade de meses concluídos na tendência histórica.
pub const HISTORY_MONTHS: usize = 6;

pub fn deadline_status(days_remaining: i64) -> DeadlineStatus {
    if days_remaining < 0 {
        DeadlineStatus::Overdue
    } else if days_remaining <= WARNING_THRESHOLD_DAYS {
        DeadlineStatus::Warning
    } else {
        DeadlineStatus::Normal
    }
}

// Relatórios são funções puras sobre uma cópia do histórico.
#[derive(Clone)]
pub struct ReportService {
    catalog: Arc<Catalog>,
}

impl ReportService {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn month_of<'h>(history: &'h AuditHistory, now: DateTime<Utc>) -> (MonthKey, Option<&'h MonthlyAudit>) {
        let key = MonthKey::of(now);
        (key, history.month(key))
    }

    // =========================================================================
    //  QUADROS DO MÊS CORRENTE
    // =========================================================================

    pub fn action_board(&self, history: &AuditHistory, now: DateTime<Utc>) -> CorrectiveActionBoard {
        let (month, audit) = Self::month_of(history, now);

        let mut pending = Vec::new();
        let mut completed = Vec::new();

        let actions = audit
            .into_iter()
            .flat_map(|m| &m.location_audits)
            .flat_map(|la| &la.evaluations)
            .flat_map(|e| &e.corrective_actions);

        for action in actions {
            let days_since_creation = (now - action.created_at).num_days();
            let mut entry = CorrectiveActionEntry {
                action: action.clone(),
                location_name: self.catalog.location_name(&action.location_id),
                pillar_name: self.catalog.pillar_name(&action.pillar_id),
                days_since_creation,
                days_remaining: None,
                deadline: None,
            };

            if action.is_pending() {
                let days_remaining = ACTION_DEADLINE_DAYS - days_since_creation;
                entry.days_remaining = Some(days_remaining);
                entry.deadline = Some(deadline_status(days_remaining));
                pending.push(entry);
            } else {
                completed.push(entry);
            }
        }

        // Mais urgentes primeiro; as concluídas mais recentes primeiro
        pending.sort_by_key(|e| e.days_remaining);
        completed.sort_by(|a, b| b.action.completed_at.cmp(&a.action.completed_at));

        let overdue_count = pending
            .iter()
            .filter(|e| e.deadline == Some(DeadlineStatus::Overdue))
            .count();
        let warning_count = pending
            .iter()
            .filter(|e| e.deadline == Some(DeadlineStatus::Warning))
            .count();

        CorrectiveActionBoard {
            month,
            pending,
            completed,
            overdue_count,
            warning_count,
        }
    }

    pub fn suggestion_board(&self, history: &AuditHistory, now: DateTime<Utc>) -> SuggestionBoard {
        let (month, audit) = Self::month_of(history, now);

        let (pending, mut implemented): (Vec<_>, Vec<_>) = audit
            .into_iter()
            .flat_map(|m| &m.location_audits)
            .flat_map(|la| &la.evaluations)
            .flat_map(|e| &e.improvement_suggestions)
            .map(|s| SuggestionEntry {
                suggestion: s.clone(),
                location_name: self.catalog.location_name(&s.location_id),
                pillar_name: self.catalog.pillar_name(&s.pillar_id),
            })
            .partition(|e| e.suggestion.is_pending());

        implemented.sort_by(|a, b| b.suggestion.implemented_at.cmp(&a.suggestion.implemented_at));

        SuggestionBoard {
            month,
            pending,
            implemented,
        }
    }

    // =========================================================================
    //  RESUMO MENSAL
    // =========================================================================

    pub fn monthly_summary(&self, history: &AuditHistory, now: DateTime<Utc>) -> MonthlySummary {
        let (month, audit) = Self::month_of(history, now);
        let empty = MonthlyAudit::new(month);
        let audit = audit.unwrap_or(&empty);

        let completed_audits: Vec<&LocationAudit> = audit.completed_location_audits().collect();

        let group_scores = self
            .catalog
            .groups
            .iter()
            .map(|group| GroupScoreEntry {
                group_id: group.id.clone(),
                group_name: group.name.clone(),
                score: audit
                    .group_scores
                    .iter()
                    .find(|g| g.group_id == group.id)
                    .and_then(|g| g.score)
                    .map(scoring::round1),
            })
            .collect();

        let location_scores = self
            .catalog
            .locations
            .iter()
            .map(|location| LocationScoreEntry {
                location_id: location.id.clone(),
                location_name: location.name.clone(),
                group_id: location.group_id.clone(),
                score: audit
                    .location_audit(&location.id)
                    .filter(|la| la.completed)
                    .and_then(|la| la.overall_score)
                    .map(scoring::round1),
            })
            .collect();

        let open_actions = audit
            .location_audits
            .iter()
            .flat_map(|la| &la.evaluations)
            .flat_map(|e| &e.corrective_actions)
            .filter(|a| a.is_pending())
            .count();

        MonthlySummary {
            month,
            completed: audit.completed,
            overall_score: audit.overall_score.map(scoring::round1),
            completed_locations: completed_audits.len(),
            total_locations: self.catalog.locations.len(),
            group_scores,
            location_scores,
            pillar_averages: self.pillar_averages(&completed_audits),
            open_actions,
        }
    }

    // Média por pilar sobre as auditorias de local informadas.
    fn pillar_averages(&self, audits: &[&LocationAudit]) -> Vec<PillarAverage> {
        self.catalog
            .pillars
            .iter()
            .map(|pillar| PillarAverage {
                pillar_id: pillar.id.clone(),
                pillar_name: pillar.short_name().to_string(),
                average: scoring::mean(
                    audits
                        .iter()
                        .filter_map(|la| la.evaluation(&pillar.id))
                        .map(|e| e.score),
                )
                .map(scoring::round1),
            })
            .collect()
    }

    // =========================================================================
    //  RELATÓRIO ANUAL
    // =========================================================================

    pub fn annual_report(&self, history: &AuditHistory, year: i32) -> AnnualReport {
        let mut months: Vec<&MonthlyAudit> = history.months_of_year(year).collect();
        months.sort_by_key(|m| m.month);

        let location_audits: Vec<&LocationAudit> = months.iter().flat_map(|m| &m.location_audits).collect();
        let completed_audits: Vec<&LocationAudit> =
            location_audits.iter().copied().filter(|la| la.completed).collect();

        let actions: Vec<_> = location_audits
            .iter()
            .flat_map(|la| &la.evaluations)
            .flat_map(|e| &e.corrective_actions)
            .collect();
        let completed_actions = actions.iter().filter(|a| !a.is_pending()).count();

        // Dias inteiros por ação (arredondados para baixo), depois a média
        let average_action_days = scoring::mean(
            actions
                .iter()
                .filter_map(|a| a.completed_at.map(|done| (done - a.created_at).num_days()))
                .map(Decimal::from),
        )
        .map(scoring::round1);

        let suggestions: Vec<_> = location_audits
            .iter()
            .flat_map(|la| &la.evaluations)
            .flat_map(|e| &e.improvement_suggestions)
            .collect();
        let implemented_suggestions = suggestions.iter().filter(|s| !s.is_pending()).count();

        let monthly_trend = months
            .iter()
            .filter_map(|month| {
                let completed: Vec<&LocationAudit> = month.completed_location_audits().collect();
                if completed.is_empty() {
                    return None;
                }
                Some(MonthlyTrendEntry {
                    month: month.month,
                    overall_score: scoring::mean(completed.iter().filter_map(|la| la.overall_score))
                        .map(scoring::round1),
                    pillar_scores: self.pillar_averages(&completed),
                })
            })
            .collect();

        let location_averages = self
            .catalog
            .locations
            .iter()
            .map(|location| LocationScoreEntry {
                location_id: location.id.clone(),
                location_name: location.name.clone(),
                group_id: location.group_id.clone(),
                score: scoring::mean(
                    completed_audits
                        .iter()
                        .filter(|la| la.location_id == location.id)
                        .filter_map(|la| la.overall_score),
                )
                .map(scoring::round1),
            })
            .collect();

        AnnualReport {
            year,
            annual_score: scoring::mean(completed_audits.iter().filter_map(|la| la.overall_score))
                .map(scoring::round1),
            total_actions: actions.len(),
            completed_actions,
            action_completion_rate: scoring::rate(completed_actions, actions.len()),
            total_suggestions: suggestions.len(),
            implemented_suggestions,
            suggestion_implementation_rate: scoring::rate(implemented_suggestions, suggestions.len()),
            average_action_days,
            monthly_trend,
            pillar_averages: self.pillar_averages(&completed_audits),
            location_averages,
        }
    }

    // =========================================================================
    //  TENDÊNCIA HISTÓRICA E AUDITORES
    // =========================================================================

    pub fn historical_trend(&self, history: &AuditHistory) -> HistoricalTrend {
        let mut completed: Vec<&MonthlyAudit> = history.audits.iter().filter(|m| m.completed).collect();
        completed.sort_by_key(|m| m.month);
        let recent = &completed[completed.len().saturating_sub(HISTORY_MONTHS)..];

        let series = self
            .catalog
            .locations
            .iter()
            .map(|location| LocationSeries {
                location_id: location.id.clone(),
                location_name: location.name.clone(),
                scores: recent
                    .iter()
                    .map(|month| {
                        month
                            .location_audit(&location.id)
                            .filter(|la| la.completed)
                            .and_then(|la| la.overall_score)
                            .map(scoring::round1)
                    })
                    .collect(),
            })
            .collect();

        HistoricalTrend {
            months: recent.iter().map(|m| m.month).collect(),
            overall_scores: recent.iter().map(|m| m.overall_score.map(scoring::round1)).collect(),
            series,
        }
    }

    pub fn auditor_report(&self, history: &AuditHistory, now: DateTime<Utc>) -> AuditorReport {
        let current_month = MonthKey::of(now);
        let current_year = now.year();

        let mut stats: BTreeMap<&str, AuditorStats> = BTreeMap::new();

        for month in &history.audits {
            for audit in month.completed_location_audits() {
                let Some(visa) = audit.auditor_visa.as_deref() else {
                    continue;
                };

                let entry = stats.entry(visa).or_insert_with(|| AuditorStats {
                    visa: visa.to_string(),
                    monthly: 0,
                    yearly: 0,
                    total: 0,
                    yearly_share: Decimal::ZERO,
                });

                if month.month == current_month {
                    entry.monthly += 1;
                }
                if month.year == current_year {
                    entry.yearly += 1;
                }
                entry.total += 1;
            }
        }

        let mut auditors: Vec<AuditorStats> = stats.into_values().collect();
        let total_yearly: usize = auditors.iter().map(|a| a.yearly).sum();
        for auditor in &mut auditors {
            auditor.yearly_share = scoring::rate(auditor.yearly, total_yearly);
        }

        AuditorReport {
            total_monthly: auditors.iter().map(|a| a.monthly).sum(),
            total_yearly,
            total: auditors.iter().map(|a| a.total).sum(),
            auditors,
        }
    }
}
