// src/services/ledger.rs

//! Regras do ciclo de vida das auditorias, aplicadas sobre um `AuditHistory`.
//!
//! O ledger é síncrono e puro: recebe o instante corrente de fora, o que
//! permite testar a virada de mês sem relógio real. Persistência e
//! concorrência ficam a cargo do `AuditService`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, month::MonthKey, scoring},
    models::{
        audit::{
            ActionStatus, AuditHistory, CorrectiveAction, GroupScore, ImprovementSuggestion,
            LocationAudit, MonthlyAudit, PillarEvaluation, SuggestionStatus,
        },
        catalog::Catalog,
    },
};

// Dados de uma avaliação, já desserializados e validados quanto ao formato.
#[derive(Debug, Clone, Default)]
pub struct EvaluationInput {
    pub answers: BTreeMap<String, bool>,
    pub comment: String,
    pub new_corrective_actions: Vec<String>,
    pub new_improvement_suggestions: Vec<String>,
}

pub struct AuditLedger<'a> {
    history: &'a mut AuditHistory,
    catalog: &'a Catalog,
    now: DateTime<Utc>,
}

impl<'a> AuditLedger<'a> {
    pub fn new(history: &'a mut AuditHistory, catalog: &'a Catalog, now: DateTime<Utc>) -> Self {
        // A busca do mês corrente assume o histórico ordenado
        history.audits.sort_by_key(|a| a.month);

        Self {
            history,
            catalog,
            now,
        }
    }

    pub fn current_month(&self) -> MonthKey {
        MonthKey::of(self.now)
    }

    /// Garante que o mês corrente existe. O mês anterior continua no histórico.
    /// Retorna `true` quando um novo mês foi criado.
    pub fn ensure_current_month(&mut self) -> bool {
        self.current_index().1
    }

    pub fn current(&mut self) -> &mut MonthlyAudit {
        let (index, _) = self.current_index();
        &mut self.history.audits[index]
    }

    // Posição do mês corrente no histórico, criando-o se preciso.
    fn current_index(&mut self) -> (usize, bool) {
        let month = self.current_month();

        match self.history.audits.binary_search_by_key(&month, |a| a.month) {
            Ok(index) => (index, false),
            Err(index) => {
                let mut audit = MonthlyAudit::new(month);
                refresh_derived(&mut audit, self.catalog);
                self.history.audits.insert(index, audit);

                tracing::info!(month = %month, "Nova auditoria mensal criada");
                (index, true)
            }
        }
    }

    // --- AUDITORIA DE LOCAL ---

    /// Abre a auditoria do local no mês corrente; idempotente.
    pub fn start_location_audit(&mut self, location_id: &str) -> Result<LocationAudit, AppError> {
        let location = self.catalog.location(location_id)?.clone();
        let now = self.now;
        let current = self.current();

        if let Some(existing) = current.location_audit(location_id) {
            return Ok(existing.clone());
        }

        let audit = LocationAudit {
            location_id: location.id.clone(),
            group_id: location.group_id.clone(),
            date: now,
            year: current.year,
            evaluations: Vec::new(),
            completed: false,
            overall_score: None,
            auditor_visa: None,
            completed_at: None,
        };
        current.location_audits.push(audit.clone());

        tracing::info!(location = %location.id, "Auditoria de local iniciada");
        Ok(audit)
    }

    pub fn record_evaluation(
        &mut self,
        location_id: &str,
        pillar_id: &str,
        input: EvaluationInput,
    ) -> Result<PillarEvaluation, AppError> {
        self.catalog.location(location_id)?;
        let pillar = self.catalog.pillar(pillar_id)?.clone();

        // Todas as respostas precisam existir e pertencer ao pilar
        if let Some(unknown) = input.answers.keys().find(|q| !pillar.has_question(q)) {
            return Err(AppError::UnknownQuestion {
                pillar_id: pillar.id.clone(),
                question_id: unknown.clone(),
            });
        }
        let missing = pillar
            .questions
            .iter()
            .filter(|q| !input.answers.contains_key(&q.id))
            .count();
        if missing > 0 {
            return Err(AppError::UnansweredQuestions {
                pillar_id: pillar.id.clone(),
                missing,
            });
        }

        let comment = input.comment.trim().to_string();
        if input.answers.values().any(|answer| !answer) && comment.is_empty() {
            return Err(AppError::CommentRequired(pillar.id.clone()));
        }

        let positive = input.answers.values().filter(|answer| **answer).count();
        let score = scoring::pillar_score(positive, pillar.questions.len());

        let now = self.now;
        let catalog = self.catalog;
        let current = self.current();
        let audit = current
            .location_audits
            .iter_mut()
            .find(|a| a.location_id == location_id)
            .ok_or_else(|| AppError::LocationAuditNotStarted(location_id.to_string()))?;

        if audit.completed {
            return Err(AppError::LocationAuditCompleted(location_id.to_string()));
        }

        // Ações e sugestões já registadas nunca são perdidas nem reabertas
        let (mut corrective_actions, mut improvement_suggestions) = audit
            .evaluations
            .iter()
            .find(|e| e.pillar_id == pillar.id)
            .map(|e| (e.corrective_actions.clone(), e.improvement_suggestions.clone()))
            .unwrap_or_default();

        corrective_actions.extend(
            input
                .new_corrective_actions
                .iter()
                .filter(|d| !d.trim().is_empty())
                .map(|d| CorrectiveAction::new(d, location_id, &pillar.id, now)),
        );
        improvement_suggestions.extend(
            input
                .new_improvement_suggestions
                .iter()
                .filter(|d| !d.trim().is_empty())
                .map(|d| ImprovementSuggestion::new(d, location_id, &pillar.id, now)),
        );

        let evaluation = PillarEvaluation {
            pillar_id: pillar.id.clone(),
            score,
            comment,
            question_answers: input.answers,
            corrective_actions,
            improvement_suggestions,
            evaluated_at: now,
        };

        match audit.evaluations.iter_mut().find(|e| e.pillar_id == pillar.id) {
            Some(slot) => *slot = evaluation.clone(),
            None => audit.evaluations.push(evaluation.clone()),
        }

        refresh_derived(current, catalog);

        tracing::debug!(location = location_id, pillar = %pillar.id, %score, "Avaliação registada");
        Ok(evaluation)
    }

    /// Fecha a auditoria do local: exige todos os pilares avaliados.
    pub fn complete_location_audit(
        &mut self,
        location_id: &str,
        auditor_visa: &str,
    ) -> Result<LocationAudit, AppError> {
        self.catalog.location(location_id)?;

        let now = self.now;
        let catalog = self.catalog;
        let current = self.current();
        let audit = current
            .location_audits
            .iter_mut()
            .find(|a| a.location_id == location_id)
            .ok_or_else(|| AppError::LocationAuditNotStarted(location_id.to_string()))?;

        if audit.completed {
            return Err(AppError::LocationAuditCompleted(location_id.to_string()));
        }

        let missing_pillars: Vec<String> = catalog
            .pillars
            .iter()
            .filter(|p| audit.evaluation(&p.id).is_none())
            .map(|p| p.id.clone())
            .collect();
        if !missing_pillars.is_empty() {
            return Err(AppError::LocationAuditIncomplete {
                location_id: location_id.to_string(),
                missing_pillars,
            });
        }

        audit.overall_score = location_score(audit, catalog);
        audit.completed = true;
        audit.completed_at = Some(now);
        audit.auditor_visa = Some(auditor_visa.to_string());
        let completed = audit.clone();

        refresh_derived(current, catalog);

        tracing::info!(
            location = location_id,
            visa = auditor_visa,
            score = ?completed.overall_score,
            month_completed = current.completed,
            "Auditoria de local concluída"
        );
        Ok(completed)
    }

    /// Nota provisória: média dos pilares já avaliados.
    pub fn preview_score(&mut self, location_id: &str) -> Result<Option<Decimal>, AppError> {
        self.catalog.location(location_id)?;
        let catalog = self.catalog;
        let current = self.current();
        let audit = current
            .location_audit(location_id)
            .ok_or_else(|| AppError::LocationAuditNotStarted(location_id.to_string()))?;

        Ok(location_score(audit, catalog))
    }

    // --- AÇÕES E SUGESTÕES ---

    pub fn complete_corrective_action(&mut self, action_id: Uuid) -> Result<CorrectiveAction, AppError> {
        let now = self.now;

        let action = self
            .history
            .audits
            .iter_mut()
            .flat_map(|m| m.location_audits.iter_mut())
            .flat_map(|a| a.evaluations.iter_mut())
            .flat_map(|e| e.corrective_actions.iter_mut())
            .find(|a| a.id == action_id)
            .ok_or(AppError::CorrectiveActionNotFound(action_id))?;

        if action.status != ActionStatus::Pending {
            return Err(AppError::CorrectiveActionAlreadyCompleted(action_id));
        }

        action.status = ActionStatus::Completed;
        action.completed_at = Some(now);

        tracing::info!(action = %action_id, "Ação corretiva concluída");
        Ok(action.clone())
    }

    pub fn implement_suggestion(&mut self, suggestion_id: Uuid) -> Result<ImprovementSuggestion, AppError> {
        let now = self.now;

        let suggestion = self
            .history
            .audits
            .iter_mut()
            .flat_map(|m| m.location_audits.iter_mut())
            .flat_map(|a| a.evaluations.iter_mut())
            .flat_map(|e| e.improvement_suggestions.iter_mut())
            .find(|s| s.id == suggestion_id)
            .ok_or(AppError::SuggestionNotFound(suggestion_id))?;

        if suggestion.status != SuggestionStatus::Pending {
            return Err(AppError::SuggestionAlreadyImplemented(suggestion_id));
        }

        suggestion.status = SuggestionStatus::Implemented;
        suggestion.implemented_at = Some(now);

        tracing::info!(suggestion = %suggestion_id, "Sugestão de melhoria implementada");
        Ok(suggestion.clone())
    }

    /// Apaga todo o histórico e recomeça com um mês corrente vazio.
    pub fn reset(&mut self) {
        self.history.audits.clear();
        self.ensure_current_month();
        tracing::warn!("Histórico de auditorias reiniciado");
    }
}

// Média das notas dos pilares do catálogo já avaliados no local.
fn location_score(audit: &LocationAudit, catalog: &Catalog) -> Option<Decimal> {
    scoring::mean(
        audit
            .evaluations
            .iter()
            .filter(|e| catalog.pillars.iter().any(|p| p.id == e.pillar_id))
            .map(|e| e.score),
    )
}

/// Recalcula os campos derivados do mês: notas por grupo, conclusão e média global.
pub fn refresh_derived(month: &mut MonthlyAudit, catalog: &Catalog) {
    month.group_scores = catalog
        .groups
        .iter()
        .map(|group| GroupScore {
            group_id: group.id.clone(),
            score: scoring::mean(
                month
                    .completed_location_audits()
                    .filter(|a| catalog.locations_in_group(&group.id).any(|l| l.id == a.location_id))
                    .filter_map(|a| a.overall_score),
            ),
        })
        .collect();

    month.completed = catalog.locations.iter().all(|location| {
        month
            .location_audit(&location.id)
            .is_some_and(|a| a.completed)
    });

    month.overall_score = if month.completed {
        scoring::mean(month.completed_location_audits().filter_map(|a| a.overall_score))
    } else {
        None
    };
}

/// Locais do catálogo ainda sem auditoria concluída no mês.
pub fn pending_locations(month: &MonthlyAudit, catalog: &Catalog) -> Vec<String> {
    catalog
        .locations
        .iter()
        .filter(|location| {
            !month
                .location_audit(&location.id)
                .is_some_and(|a| a.completed)
        })
        .map(|location| location.id.clone())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    pub(crate) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Respostas para um pilar: as primeiras `yes` perguntas "sim", o resto "não".
    pub(crate) fn answers(catalog: &Catalog, pillar_id: &str, yes: usize) -> EvaluationInput {
        let pillar = catalog.pillar(pillar_id).unwrap();
        let answers = pillar
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id.clone(), i < yes))
            .collect();
        let comment = if yes < pillar.questions.len() { "à corriger" } else { "" };

        EvaluationInput {
            answers,
            comment: comment.to_string(),
            ..Default::default()
        }
    }

    /// Avalia todos os pilares com nota máxima e conclui o local.
    pub(crate) fn complete_location_fully(
        history: &mut AuditHistory,
        catalog: &Catalog,
        now: DateTime<Utc>,
        location_id: &str,
    ) {
        complete_location_with(history, catalog, now, location_id, &[]);
    }

    /// Como `complete_location_fully`, mas `yes_per_pillar` fixa o número de "sim" de alguns pilares.
    pub(crate) fn complete_location_with(
        history: &mut AuditHistory,
        catalog: &Catalog,
        now: DateTime<Utc>,
        location_id: &str,
        yes_per_pillar: &[(&str, usize)],
    ) {
        let mut ledger = AuditLedger::new(history, catalog, now);
        ledger.start_location_audit(location_id).unwrap();
        for pillar in &catalog.pillars {
            let yes = yes_per_pillar
                .iter()
                .find(|(id, _)| *id == pillar.id)
                .map_or(pillar.questions.len(), |(_, yes)| *yes);
            ledger
                .record_evaluation(location_id, &pillar.id, answers(catalog, &pillar.id, yes))
                .unwrap();
        }
        ledger.complete_location_audit(location_id, "JDU").unwrap();
    }

    #[test]
    fn test_current_month_is_created_lazily() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 19));

        assert!(ledger.ensure_current_month());
        assert!(!ledger.ensure_current_month());

        let current = ledger.current();
        assert_eq!(current.month.to_string(), "2026-10");
        assert_eq!(current.year, 2026);
        assert!(!current.completed);
        assert_eq!(current.group_scores.len(), 2);
        assert!(current.group_scores.iter().all(|g| g.score.is_none()));
    }

    #[test]
    fn test_month_rollover_keeps_previous_month_in_history() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();

        AuditLedger::new(&mut history, &catalog, at(2026, 9, 30))
            .start_location_audit("136")
            .unwrap();

        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 1));
        assert!(ledger.current().location_audits.is_empty());

        assert_eq!(history.audits.len(), 2);
        assert_eq!(history.audits[0].month.to_string(), "2026-09");
        assert_eq!(history.audits[0].location_audits.len(), 1);
        assert_eq!(history.audits[1].month.to_string(), "2026-10");
    }

    #[test]
    fn test_start_location_audit_is_idempotent() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let now = at(2026, 10, 19);
        let mut ledger = AuditLedger::new(&mut history, &catalog, now);

        let first = ledger.start_location_audit("laverie-b1").unwrap();
        assert_eq!(first.group_id, "laverie");
        assert_eq!(first.date, now);

        let again = ledger.start_location_audit("laverie-b1").unwrap();
        assert_eq!(first, again);
        assert_eq!(ledger.current().location_audits.len(), 1);
    }

    #[test]
    fn test_start_unknown_location_is_rejected() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 19));

        assert!(matches!(
            ledger.start_location_audit("999"),
            Err(AppError::LocationNotFound(_))
        ));
    }

    #[test]
    fn test_record_evaluation_computes_score() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 19));
        ledger.start_location_audit("136").unwrap();

        // seiton tem 3 perguntas: 2 "sim" -> 6.7
        let evaluation = ledger
            .record_evaluation("136", "seiton", answers(&catalog, "seiton", 2))
            .unwrap();
        assert_eq!(evaluation.score, dec("6.7"));
        assert_eq!(evaluation.question_answers.len(), 3);
    }

    #[test]
    fn test_record_evaluation_requires_started_audit() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 19));

        let result = ledger.record_evaluation("136", "seiri", answers(&catalog, "seiri", 5));
        assert!(matches!(result, Err(AppError::LocationAuditNotStarted(_))));
    }

    #[test]
    fn test_negative_answer_requires_comment() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 19));
        ledger.start_location_audit("136").unwrap();

        let mut input = answers(&catalog, "seiri", 4);
        input.comment = "   ".to_string();

        assert!(matches!(
            ledger.record_evaluation("136", "seiri", input),
            Err(AppError::CommentRequired(_))
        ));
    }

    #[test]
    fn test_answers_must_match_pillar_questions() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 19));
        ledger.start_location_audit("136").unwrap();

        let mut partial = answers(&catalog, "seiri", 5);
        partial.answers.remove("seiri_5");
        assert!(matches!(
            ledger.record_evaluation("136", "seiri", partial),
            Err(AppError::UnansweredQuestions { missing: 1, .. })
        ));

        let mut foreign = answers(&catalog, "seiri", 5);
        foreign.answers.insert("seiso_1".to_string(), true);
        assert!(matches!(
            ledger.record_evaluation("136", "seiri", foreign),
            Err(AppError::UnknownQuestion { .. })
        ));

        assert!(matches!(
            ledger.record_evaluation("136", "people", EvaluationInput::default()),
            Err(AppError::PillarNotFound(_))
        ));
    }

    #[test]
    fn test_re_recording_keeps_actions_and_suggestions() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 19));
        ledger.start_location_audit("136").unwrap();

        let mut input = answers(&catalog, "seiso", 3);
        input.new_corrective_actions = vec!["Nettoyer la hotte".into(), "  ".into()];
        input.new_improvement_suggestions = vec!["Planning de nettoyage affiché".into()];
        let first = ledger.record_evaluation("136", "seiso", input).unwrap();
        assert_eq!(first.corrective_actions.len(), 1);
        assert_eq!(first.improvement_suggestions.len(), 1);

        let action_id = first.corrective_actions[0].id;
        ledger.complete_corrective_action(action_id).unwrap();

        let mut again = answers(&catalog, "seiso", 6);
        again.new_corrective_actions = vec!["Documenter le nettoyage".into()];
        let second = ledger.record_evaluation("136", "seiso", again).unwrap();

        assert_eq!(second.score, Decimal::TEN);
        assert_eq!(second.corrective_actions.len(), 2);
        assert_eq!(second.corrective_actions[0].id, action_id);
        assert_eq!(second.corrective_actions[0].status, ActionStatus::Completed);
        assert_eq!(second.corrective_actions[1].status, ActionStatus::Pending);
        assert_eq!(second.improvement_suggestions.len(), 1);

        let audit = ledger.current().location_audit("136").unwrap().clone();
        assert_eq!(audit.evaluations.len(), 1);
    }

    #[test]
    fn test_complete_location_requires_every_pillar() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 19));
        ledger.start_location_audit("136").unwrap();
        ledger
            .record_evaluation("136", "seiri", answers(&catalog, "seiri", 5))
            .unwrap();

        match ledger.complete_location_audit("136", "JDU") {
            Err(AppError::LocationAuditIncomplete { missing_pillars, .. }) => {
                assert_eq!(missing_pillars.len(), 6);
                assert!(!missing_pillars.contains(&"seiri".to_string()));
            }
            other => panic!("esperava LocationAuditIncomplete, veio {other:?}"),
        }
    }

    #[test]
    fn test_complete_location_computes_mean_and_locks_audit() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let now = at(2026, 10, 19);
        let mut ledger = AuditLedger::new(&mut history, &catalog, now);
        ledger.start_location_audit("136").unwrap();

        // seiri 0/5 -> 0; os outros 6 pilares com nota 10 -> média 60/7
        ledger
            .record_evaluation("136", "seiri", answers(&catalog, "seiri", 0))
            .unwrap();
        for pillar in catalog.pillars.iter().skip(1) {
            let full = pillar.questions.len();
            ledger
                .record_evaluation("136", &pillar.id, answers(&catalog, &pillar.id, full))
                .unwrap();
        }

        let preview = ledger.preview_score("136").unwrap();
        let completed = ledger.complete_location_audit("136", "JDU").unwrap();

        assert!(completed.completed);
        assert_eq!(completed.overall_score, preview);
        assert_eq!(completed.overall_score, Some(dec("60") / dec("7")));
        assert_eq!(completed.auditor_visa.as_deref(), Some("JDU"));
        assert_eq!(completed.completed_at, Some(now));

        assert!(matches!(
            ledger.complete_location_audit("136", "JDU"),
            Err(AppError::LocationAuditCompleted(_))
        ));
        assert!(matches!(
            ledger.record_evaluation("136", "seiri", answers(&catalog, "seiri", 5)),
            Err(AppError::LocationAuditCompleted(_))
        ));

        // Iniciar de novo devolve a auditoria concluída, sem recriar
        let restarted = ledger.start_location_audit("136").unwrap();
        assert!(restarted.completed);
    }

    #[test]
    fn test_preview_score_without_evaluations() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 19));
        ledger.start_location_audit("140").unwrap();

        assert_eq!(ledger.preview_score("140").unwrap(), None);
        assert!(matches!(
            ledger.preview_score("139"),
            Err(AppError::LocationAuditNotStarted(_))
        ));
    }

    #[test]
    fn test_group_scores_and_month_completion() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let now = at(2026, 10, 19);

        complete_location_fully(&mut history, &catalog, now, "laverie-b1");
        {
            let month = history.month(MonthKey::of(now)).unwrap();
            let laverie = month.group_scores.iter().find(|g| g.group_id == "laverie").unwrap();
            let bulk = month.group_scores.iter().find(|g| g.group_id == "bulk").unwrap();
            assert_eq!(laverie.score, Some(Decimal::TEN));
            assert_eq!(bulk.score, None);
            assert!(!month.completed);
            assert_eq!(month.overall_score, None);
            assert_eq!(pending_locations(month, &catalog).len(), 5);
        }

        for location in ["134-138", "136", "139", "140", "laverie-b2"] {
            complete_location_fully(&mut history, &catalog, now, location);
        }

        let month = history.month(MonthKey::of(now)).unwrap();
        assert!(month.completed);
        assert_eq!(month.overall_score, Some(Decimal::TEN));
        assert!(pending_locations(month, &catalog).is_empty());
    }

    #[test]
    fn test_month_overall_is_mean_of_location_scores() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let now = at(2026, 10, 19);

        // seiri 4/5 = 8.0 e shitsuke 1/2 = 5.0: (50 + 8 + 5) / 7 = 9.0
        complete_location_with(&mut history, &catalog, now, "134-138", &[("seiri", 4), ("shitsuke", 1)]);
        // seiri 3/5 = 6.0 e shitsuke 0/2 = 0.0: (50 + 6 + 0) / 7 = 8.0
        complete_location_with(&mut history, &catalog, now, "136", &[("seiri", 3), ("shitsuke", 0)]);
        for location in ["139", "140", "laverie-b1", "laverie-b2"] {
            complete_location_fully(&mut history, &catalog, now, location);
        }

        let month = history.month(MonthKey::of(now)).unwrap();
        assert_eq!(month.location_audit("134-138").unwrap().overall_score, Some(dec("9")));
        assert_eq!(month.location_audit("136").unwrap().overall_score, Some(dec("8")));

        let bulk = month.group_scores.iter().find(|g| g.group_id == "bulk").unwrap();
        let laverie = month.group_scores.iter().find(|g| g.group_id == "laverie").unwrap();
        assert_eq!(bulk.score, Some(dec("9.25")));
        assert_eq!(laverie.score, Some(Decimal::TEN));

        // (9 + 8 + 10 × 4) / 6
        assert!(month.completed);
        assert_eq!(month.overall_score, Some(dec("9.5")));
    }

    #[test]
    fn test_actions_and_suggestions_only_move_forward() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let created = at(2026, 10, 1);
        let mut ledger = AuditLedger::new(&mut history, &catalog, created);
        ledger.start_location_audit("139").unwrap();

        let mut input = answers(&catalog, "safety", 3);
        input.new_corrective_actions = vec!["Remplacer les gants".into()];
        input.new_improvement_suggestions = vec!["Armoire EPI".into()];
        let evaluation = ledger.record_evaluation("139", "safety", input).unwrap();
        let action_id = evaluation.corrective_actions[0].id;
        let suggestion_id = evaluation.improvement_suggestions[0].id;

        let closed_at = at(2026, 10, 12);
        let mut ledger = AuditLedger::new(&mut history, &catalog, closed_at);
        let action = ledger.complete_corrective_action(action_id).unwrap();
        assert_eq!(action.status, ActionStatus::Completed);
        assert_eq!(action.completed_at, Some(closed_at));
        assert!(matches!(
            ledger.complete_corrective_action(action_id),
            Err(AppError::CorrectiveActionAlreadyCompleted(_))
        ));

        let suggestion = ledger.implement_suggestion(suggestion_id).unwrap();
        assert_eq!(suggestion.status, SuggestionStatus::Implemented);
        assert!(matches!(
            ledger.implement_suggestion(suggestion_id),
            Err(AppError::SuggestionAlreadyImplemented(_))
        ));

        assert!(matches!(
            ledger.complete_corrective_action(Uuid::new_v4()),
            Err(AppError::CorrectiveActionNotFound(_))
        ));
        assert!(matches!(
            ledger.implement_suggestion(Uuid::new_v4()),
            Err(AppError::SuggestionNotFound(_))
        ));
    }

    #[test]
    fn test_actions_from_previous_months_can_be_closed() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 9, 20));
        ledger.start_location_audit("139").unwrap();
        let mut input = answers(&catalog, "quality", 2);
        input.new_corrective_actions = vec!["Retirer les documents pirates".into()];
        let action_id = ledger
            .record_evaluation("139", "quality", input)
            .unwrap()
            .corrective_actions[0]
            .id;

        let mut ledger = AuditLedger::new(&mut history, &catalog, at(2026, 10, 3));
        ledger.ensure_current_month();
        assert!(ledger.complete_corrective_action(action_id).is_ok());
    }

    #[test]
    fn test_reset_clears_history() {
        let catalog = Catalog::default();
        let mut history = AuditHistory::default();
        AuditLedger::new(&mut history, &catalog, at(2026, 8, 2))
            .start_location_audit("136")
            .unwrap();
        AuditLedger::new(&mut history, &catalog, at(2026, 10, 2))
            .start_location_audit("136")
            .unwrap();
        assert_eq!(history.audits.len(), 2);

        AuditLedger::new(&mut history, &catalog, at(2026, 10, 19)).reset();
        assert_eq!(history.audits.len(), 1);
        assert!(history.audits[0].location_audits.is_empty());
    }
}
