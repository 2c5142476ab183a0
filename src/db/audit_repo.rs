// src/db/audit_repo.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, month::MonthKey},
    models::{
        audit::{
            ActionStatus, AuditHistory, CorrectiveAction, GroupScore, ImprovementSuggestion,
            LocationAudit, MonthlyAudit, PillarEvaluation, SuggestionStatus,
        },
        catalog::Catalog,
    },
};

// --- Linhas das tabelas (formato do banco) ---

#[derive(Debug, FromRow)]
struct MonthlyAuditRow {
    id: Uuid,
    month: String,
    year: i32,
    completed: bool,
    overall_score: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct GroupScoreRow {
    monthly_audit_id: Uuid,
    group_id: String,
    score: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct LocationAuditRow {
    id: Uuid,
    monthly_audit_id: Uuid,
    location_id: String,
    group_id: String,
    date: DateTime<Utc>,
    completed: bool,
    overall_score: Option<Decimal>,
    auditor_visa: Option<String>,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct PillarEvaluationRow {
    id: Uuid,
    location_audit_id: Uuid,
    pillar_id: String,
    score: Decimal,
    comment: String,
    question_answers: Json<BTreeMap<String, bool>>,
    evaluated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CorrectiveActionRow {
    id: Uuid,
    pillar_evaluation_id: Uuid,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct ImprovementSuggestionRow {
    id: Uuid,
    pillar_evaluation_id: Uuid,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    implemented_at: Option<DateTime<Utc>>,
}

// O repositório do espelho remoto: catálogo e histórico de auditorias no Postgres
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATÁLOGO
    // =========================================================================

    /// Insere/atualiza os dados de referência (grupos, locais, pilares, perguntas).
    pub async fn seed_catalog(&self, catalog: &Catalog) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for group in &catalog.groups {
            sqlx::query(
                "INSERT INTO location_groups (id, name) VALUES ($1, $2)
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            )
            .bind(&group.id)
            .bind(&group.name)
            .execute(&mut *tx)
            .await?;
        }

        for location in &catalog.locations {
            sqlx::query(
                "INSERT INTO locations (id, name, group_id) VALUES ($1, $2, $3)
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, group_id = EXCLUDED.group_id",
            )
            .bind(&location.id)
            .bind(&location.name)
            .bind(&location.group_id)
            .execute(&mut *tx)
            .await?;
        }

        for pillar in &catalog.pillars {
            sqlx::query(
                "INSERT INTO pillars (id, name, description) VALUES ($1, $2, $3)
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, description = EXCLUDED.description",
            )
            .bind(&pillar.id)
            .bind(&pillar.name)
            .bind(&pillar.description)
            .execute(&mut *tx)
            .await?;

            for (index, question) in pillar.questions.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO pillar_questions (id, pillar_id, text, order_index) VALUES ($1, $2, $3, $4)
                     ON CONFLICT (id) DO UPDATE SET
                        pillar_id = EXCLUDED.pillar_id,
                        text = EXCLUDED.text,
                        order_index = EXCLUDED.order_index",
                )
                .bind(&question.id)
                .bind(&pillar.id)
                .bind(&question.text)
                .bind(index as i32 + 1)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            groups = catalog.groups.len(),
            locations = catalog.locations.len(),
            pillars = catalog.pillars.len(),
            "✅ Catálogo sincronizado com o banco de dados"
        );
        Ok(())
    }

    // =========================================================================
    //  GRAVAÇÃO (UPSERT DE UM MÊS INTEIRO)
    // =========================================================================

    pub async fn save_monthly_audit(&self, audit: &MonthlyAudit) -> Result<(), AppError> {
        // Um mês é gravado atomicamente: ou tudo, ou nada
        let mut tx = self.pool.begin().await?;

        let monthly_audit_id = self.upsert_monthly_audit(&mut *tx, audit).await?;

        for group_score in &audit.group_scores {
            sqlx::query(
                "INSERT INTO group_scores (monthly_audit_id, group_id, score) VALUES ($1, $2, $3)
                 ON CONFLICT (monthly_audit_id, group_id) DO UPDATE SET score = EXCLUDED.score",
            )
            .bind(monthly_audit_id)
            .bind(&group_score.group_id)
            .bind(group_score.score)
            .execute(&mut *tx)
            .await?;
        }

        for location_audit in &audit.location_audits {
            let location_audit_id = self
                .upsert_location_audit(&mut *tx, monthly_audit_id, location_audit)
                .await?;

            for evaluation in &location_audit.evaluations {
                let evaluation_id = self
                    .upsert_pillar_evaluation(&mut *tx, location_audit_id, evaluation)
                    .await?;

                for action in &evaluation.corrective_actions {
                    sqlx::query(
                        r#"
                        INSERT INTO corrective_actions
                            (id, pillar_evaluation_id, description, status, created_at, completed_at)
                        VALUES ($1, $2, $3, $4, $5, $6)
                        ON CONFLICT (id) DO UPDATE SET
                            description = EXCLUDED.description,
                            status = EXCLUDED.status,
                            completed_at = EXCLUDED.completed_at
                        "#,
                    )
                    .bind(action.id)
                    .bind(evaluation_id)
                    .bind(&action.description)
                    .bind(action.status.as_str())
                    .bind(action.created_at)
                    .bind(action.completed_at)
                    .execute(&mut *tx)
                    .await?;
                }

                for suggestion in &evaluation.improvement_suggestions {
                    sqlx::query(
                        r#"
                        INSERT INTO improvement_suggestions
                            (id, pillar_evaluation_id, description, status, created_at, implemented_at)
                        VALUES ($1, $2, $3, $4, $5, $6)
                        ON CONFLICT (id) DO UPDATE SET
                            description = EXCLUDED.description,
                            status = EXCLUDED.status,
                            implemented_at = EXCLUDED.implemented_at
                        "#,
                    )
                    .bind(suggestion.id)
                    .bind(evaluation_id)
                    .bind(&suggestion.description)
                    .bind(suggestion.status.as_str())
                    .bind(suggestion.created_at)
                    .bind(suggestion.implemented_at)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn upsert_monthly_audit<'e, E>(&self, executor: E, audit: &MonthlyAudit) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO monthly_audits (month, year, completed, overall_score)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (month) DO UPDATE SET
                year = EXCLUDED.year,
                completed = EXCLUDED.completed,
                overall_score = EXCLUDED.overall_score,
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(audit.month.to_string())
        .bind(audit.year)
        .bind(audit.completed)
        .bind(audit.overall_score)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    async fn upsert_location_audit<'e, E>(
        &self,
        executor: E,
        monthly_audit_id: Uuid,
        audit: &LocationAudit,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO location_audits
                (monthly_audit_id, location_id, group_id, date, completed, overall_score, auditor_visa, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (monthly_audit_id, location_id) DO UPDATE SET
                group_id = EXCLUDED.group_id,
                date = EXCLUDED.date,
                completed = EXCLUDED.completed,
                overall_score = EXCLUDED.overall_score,
                auditor_visa = EXCLUDED.auditor_visa,
                completed_at = EXCLUDED.completed_at
            RETURNING id
            "#,
        )
        .bind(monthly_audit_id)
        .bind(&audit.location_id)
        .bind(&audit.group_id)
        .bind(audit.date)
        .bind(audit.completed)
        .bind(audit.overall_score)
        .bind(audit.auditor_visa.as_deref())
        .bind(audit.completed_at)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    async fn upsert_pillar_evaluation<'e, E>(
        &self,
        executor: E,
        location_audit_id: Uuid,
        evaluation: &PillarEvaluation,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO pillar_evaluations
                (location_audit_id, pillar_id, score, comment, question_answers, evaluated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (location_audit_id, pillar_id) DO UPDATE SET
                score = EXCLUDED.score,
                comment = EXCLUDED.comment,
                question_answers = EXCLUDED.question_answers,
                evaluated_at = EXCLUDED.evaluated_at
            RETURNING id
            "#,
        )
        .bind(location_audit_id)
        .bind(&evaluation.pillar_id)
        .bind(evaluation.score)
        .bind(&evaluation.comment)
        .bind(Json(&evaluation.question_answers))
        .bind(evaluation.evaluated_at)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    // =========================================================================
    //  LEITURA (RECONSTRÓI O HISTÓRICO)
    // =========================================================================

    pub async fn load_history(&self) -> Result<AuditHistory, AppError> {
        // Snapshot consistente das seis tabelas
        let mut tx = self.pool.begin().await?;

        let months = sqlx::query_as::<_, MonthlyAuditRow>(
            "SELECT id, month, year, completed, overall_score FROM monthly_audits ORDER BY month ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let group_scores = sqlx::query_as::<_, GroupScoreRow>(
            "SELECT monthly_audit_id, group_id, score FROM group_scores ORDER BY group_id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let location_audits = sqlx::query_as::<_, LocationAuditRow>(
            r#"
            SELECT id, monthly_audit_id, location_id, group_id, date, completed,
                   overall_score, auditor_visa, completed_at
            FROM location_audits
            ORDER BY date ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let evaluations = sqlx::query_as::<_, PillarEvaluationRow>(
            r#"
            SELECT id, location_audit_id, pillar_id, score, comment, question_answers, evaluated_at
            FROM pillar_evaluations
            ORDER BY evaluated_at ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let actions = sqlx::query_as::<_, CorrectiveActionRow>(
            r#"
            SELECT id, pillar_evaluation_id, description, status, created_at, completed_at
            FROM corrective_actions
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let suggestions = sqlx::query_as::<_, ImprovementSuggestionRow>(
            r#"
            SELECT id, pillar_evaluation_id, description, status, created_at, implemented_at
            FROM improvement_suggestions
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        assemble_history(months, group_scores, location_audits, evaluations, actions, suggestions)
    }

    pub async fn clear_history(&self) -> Result<(), AppError> {
        // As tabelas filhas caem em cascata
        sqlx::query("DELETE FROM monthly_audits")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn group_by<K, V>(rows: Vec<V>, key: impl Fn(&V) -> K) -> HashMap<K, Vec<V>>
where
    K: std::hash::Hash + Eq,
{
    let mut map: HashMap<K, Vec<V>> = HashMap::new();
    for row in rows {
        map.entry(key(&row)).or_default().push(row);
    }
    map
}

// Monta a árvore mês -> local -> pilar -> ações/sugestões a partir das linhas planas.
fn assemble_history(
    months: Vec<MonthlyAuditRow>,
    group_scores: Vec<GroupScoreRow>,
    location_audits: Vec<LocationAuditRow>,
    evaluations: Vec<PillarEvaluationRow>,
    actions: Vec<CorrectiveActionRow>,
    suggestions: Vec<ImprovementSuggestionRow>,
) -> Result<AuditHistory, AppError> {
    let mut group_scores = group_by(group_scores, |r| r.monthly_audit_id);
    let mut location_audits = group_by(location_audits, |r| r.monthly_audit_id);
    let mut evaluations = group_by(evaluations, |r| r.location_audit_id);
    let mut actions = group_by(actions, |r| r.pillar_evaluation_id);
    let mut suggestions = group_by(suggestions, |r| r.pillar_evaluation_id);

    let mut audits = Vec::with_capacity(months.len());

    for month_row in months {
        let month: MonthKey = month_row
            .month
            .parse()
            .map_err(|e: String| anyhow::anyhow!("monthly_audits.month inválido: {e}"))?;

        let mut location_audits_out = Vec::new();
        for la in location_audits.remove(&month_row.id).unwrap_or_default() {
            let mut evaluations_out = Vec::new();

            for ev in evaluations.remove(&la.id).unwrap_or_default() {
                let corrective_actions = actions
                    .remove(&ev.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|a| {
                        let status = ActionStatus::parse(&a.status)
                            .ok_or_else(|| anyhow::anyhow!("status de ação inválido: {}", a.status))?;
                        Ok(CorrectiveAction {
                            id: a.id,
                            description: a.description,
                            location_id: la.location_id.clone(),
                            pillar_id: ev.pillar_id.clone(),
                            created_at: a.created_at,
                            status,
                            completed_at: a.completed_at,
                        })
                    })
                    .collect::<Result<Vec<_>, anyhow::Error>>()?;

                let improvement_suggestions = suggestions
                    .remove(&ev.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|s| {
                        let status = SuggestionStatus::parse(&s.status)
                            .ok_or_else(|| anyhow::anyhow!("status de sugestão inválido: {}", s.status))?;
                        Ok(ImprovementSuggestion {
                            id: s.id,
                            description: s.description,
                            location_id: la.location_id.clone(),
                            pillar_id: ev.pillar_id.clone(),
                            created_at: s.created_at,
                            status,
                            implemented_at: s.implemented_at,
                        })
                    })
                    .collect::<Result<Vec<_>, anyhow::Error>>()?;

                evaluations_out.push(PillarEvaluation {
                    pillar_id: ev.pillar_id,
                    score: ev.score,
                    comment: ev.comment,
                    question_answers: ev.question_answers.0,
                    corrective_actions,
                    improvement_suggestions,
                    evaluated_at: ev.evaluated_at,
                });
            }

            location_audits_out.push(LocationAudit {
                location_id: la.location_id,
                group_id: la.group_id,
                date: la.date,
                year: month_row.year,
                evaluations: evaluations_out,
                completed: la.completed,
                overall_score: la.overall_score,
                auditor_visa: la.auditor_visa,
                completed_at: la.completed_at,
            });
        }

        let group_scores_out = group_scores
            .remove(&month_row.id)
            .unwrap_or_default()
            .into_iter()
            .map(|g| GroupScore {
                group_id: g.group_id,
                score: g.score,
            })
            .collect();

        audits.push(MonthlyAudit {
            month,
            year: month_row.year,
            location_audits: location_audits_out,
            completed: month_row.completed,
            overall_score: month_row.overall_score,
            group_scores: group_scores_out,
        });
    }

    Ok(AuditHistory { audits })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ledger::tests::at;

    #[test]
    fn test_assemble_history_rebuilds_tree() {
        let month_id = Uuid::new_v4();
        let location_audit_id = Uuid::new_v4();
        let evaluation_id = Uuid::new_v4();
        let action_id = Uuid::new_v4();
        let created = at(2026, 10, 2);

        let history = assemble_history(
            vec![MonthlyAuditRow {
                id: month_id,
                month: "2026-10".into(),
                year: 2026,
                completed: false,
                overall_score: None,
            }],
            vec![GroupScoreRow {
                monthly_audit_id: month_id,
                group_id: "bulk".into(),
                score: None,
            }],
            vec![LocationAuditRow {
                id: location_audit_id,
                monthly_audit_id: month_id,
                location_id: "136".into(),
                group_id: "bulk".into(),
                date: created,
                completed: false,
                overall_score: None,
                auditor_visa: None,
                completed_at: None,
            }],
            vec![PillarEvaluationRow {
                id: evaluation_id,
                location_audit_id,
                pillar_id: "seiri".into(),
                score: Decimal::new(80, 1),
                comment: "carton".into(),
                question_answers: Json(BTreeMap::from([("seiri_1".to_string(), false)])),
                evaluated_at: created,
            }],
            vec![CorrectiveActionRow {
                id: action_id,
                pillar_evaluation_id: evaluation_id,
                description: "Évacuer les cartons".into(),
                status: "completed".into(),
                created_at: created,
                completed_at: Some(at(2026, 10, 9)),
            }],
            vec![],
        )
        .unwrap();

        assert_eq!(history.audits.len(), 1);
        let month = &history.audits[0];
        assert_eq!(month.month.to_string(), "2026-10");
        assert_eq!(month.group_scores.len(), 1);

        let location = month.location_audit("136").unwrap();
        let evaluation = location.evaluation("seiri").unwrap();
        assert_eq!(evaluation.score, Decimal::new(8, 0));
        assert_eq!(evaluation.corrective_actions.len(), 1);

        let action = &evaluation.corrective_actions[0];
        assert_eq!(action.location_id, "136");
        assert_eq!(action.pillar_id, "seiri");
        assert_eq!(action.status, ActionStatus::Completed);
    }

    #[test]
    fn test_assemble_history_rejects_unknown_status() {
        let month_id = Uuid::new_v4();
        let location_audit_id = Uuid::new_v4();
        let evaluation_id = Uuid::new_v4();

        let result = assemble_history(
            vec![MonthlyAuditRow {
                id: month_id,
                month: "2026-10".into(),
                year: 2026,
                completed: false,
                overall_score: None,
            }],
            vec![],
            vec![LocationAuditRow {
                id: location_audit_id,
                monthly_audit_id: month_id,
                location_id: "136".into(),
                group_id: "bulk".into(),
                date: at(2026, 10, 2),
                completed: false,
                overall_score: None,
                auditor_visa: None,
                completed_at: None,
            }],
            vec![PillarEvaluationRow {
                id: evaluation_id,
                location_audit_id,
                pillar_id: "seiri".into(),
                score: Decimal::TEN,
                comment: String::new(),
                question_answers: Json(BTreeMap::new()),
                evaluated_at: at(2026, 10, 2),
            }],
            vec![],
            vec![ImprovementSuggestionRow {
                id: Uuid::new_v4(),
                pillar_evaluation_id: evaluation_id,
                description: "x".into(),
                status: "cancelled".into(),
                created_at: at(2026, 10, 2),
                implemented_at: None,
            }],
        );

        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }

    #[test]
    fn test_derived_scores_are_stored_without_precision_loss() {
        let schema = include_str!("../../migrations/20250101000000_audit_schema.sql");

        // Médias derivadas (ex.: 60/7) precisam voltar do espelho sem truncamento
        for column in ["overall_score  NUMERIC,", "score             NUMERIC,", "overall_score     NUMERIC,"] {
            assert!(schema.contains(column), "coluna sem NUMERIC livre: {column}");
        }
        assert!(!schema.contains("NUMERIC(6, 3)"));
    }
}
