// src/services/audit_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LocalStore, RemoteMirror, RemoteStore},
    models::{
        audit::{AuditHistory, CorrectiveAction, ImprovementSuggestion, LocationAudit, MonthlyAudit, PillarEvaluation},
        catalog::Catalog,
    },
    services::ledger::{self, AuditLedger, EvaluationInput},
};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// Estado compartilhado do histórico. Toda mutação segue o mesmo caminho:
// rascunho -> regra de negócio -> gravação local -> commit em memória -> espelho remoto.
#[derive(Clone)]
pub struct AuditService {
    state: Arc<RwLock<AuditHistory>>,
    catalog: Arc<Catalog>,
    local: LocalStore,
    mirror: Option<RemoteMirror>,
    clock: Clock,
}

impl AuditService {
    /// Carrega o histórico local; se estiver vazio, tenta hidratar a partir do remoto.
    pub async fn load(
        catalog: Arc<Catalog>,
        local: LocalStore,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> Result<Self, AppError> {
        Self::load_with_clock(catalog, local, remote, Arc::new(Utc::now)).await
    }

    pub async fn load_with_clock(
        catalog: Arc<Catalog>,
        local: LocalStore,
        remote: Option<Arc<dyn RemoteStore>>,
        clock: Clock,
    ) -> Result<Self, AppError> {
        let mut history = local.load().await?;

        if history.audits.is_empty() {
            if let Some(remote) = &remote {
                match remote.load_history().await {
                    Ok(remote_history) if !remote_history.audits.is_empty() => {
                        tracing::info!(
                            months = remote_history.audits.len(),
                            "Histórico hidratado a partir do banco remoto"
                        );
                        local.save(&remote_history).await?;
                        history = remote_history;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "⚠️ Não foi possível ler o histórico remoto, seguindo só com o local");
                    }
                }
            }
        }

        let mirror = remote.map(RemoteMirror::spawn);

        Ok(Self {
            state: Arc::new(RwLock::new(history)),
            catalog,
            local,
            mirror,
            clock,
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // Aplica `op` sobre um rascunho; só publica se a gravação local der certo.
    async fn mutate<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut AuditLedger<'_>) -> Result<T, AppError>,
    {
        let now = self.now();
        let mut guard = self.state.write().await;
        let mut draft = guard.clone();

        let value = {
            let mut ledger = AuditLedger::new(&mut draft, &self.catalog, now);
            ledger.ensure_current_month();
            op(&mut ledger)?
        };

        if draft == *guard {
            return Ok(value);
        }

        self.local.save(&draft).await?;

        let changed: Vec<MonthlyAudit> = draft
            .audits
            .iter()
            .filter(|month| guard.month(month.month) != Some(*month))
            .cloned()
            .collect();

        *guard = draft;

        // Publicado ainda sob o lock para manter a ordem entre mutações
        if let Some(mirror) = &self.mirror {
            for month in changed {
                mirror.publish(month);
            }
        }

        Ok(value)
    }

    // --- CONSULTAS ---

    pub async fn current_month_audit(&self) -> Result<MonthlyAudit, AppError> {
        self.mutate(|ledger| Ok(ledger.current().clone())).await
    }

    /// Cópia do histórico completo, em ordem cronológica.
    pub async fn snapshot(&self) -> Result<AuditHistory, AppError> {
        // Garante o mês corrente antes de devolver
        self.current_month_audit().await?;
        Ok(self.state.read().await.clone())
    }

    pub async fn get_location_audit(&self, location_id: &str) -> Result<LocationAudit, AppError> {
        let catalog = self.catalog.clone();
        self.mutate(|ledger| {
            catalog.location(location_id)?;
            ledger
                .current()
                .location_audit(location_id)
                .cloned()
                .ok_or_else(|| AppError::LocationAuditNotStarted(location_id.to_string()))
        })
        .await
    }

    pub async fn pending_locations(&self) -> Result<Vec<String>, AppError> {
        let catalog = self.catalog.clone();
        self.mutate(|draft| Ok(ledger::pending_locations(draft.current(), &catalog)))
            .await
    }

    pub async fn preview_score(&self, location_id: &str) -> Result<Option<Decimal>, AppError> {
        self.mutate(|ledger| ledger.preview_score(location_id)).await
    }

    // --- MUTAÇÕES ---

    pub async fn start_location_audit(&self, location_id: &str) -> Result<LocationAudit, AppError> {
        self.mutate(|ledger| ledger.start_location_audit(location_id))
            .await
    }

    pub async fn record_evaluation(
        &self,
        location_id: &str,
        pillar_id: &str,
        input: EvaluationInput,
    ) -> Result<PillarEvaluation, AppError> {
        self.mutate(|ledger| ledger.record_evaluation(location_id, pillar_id, input))
            .await
    }

    pub async fn complete_location_audit(
        &self,
        location_id: &str,
        auditor_visa: &str,
    ) -> Result<LocationAudit, AppError> {
        self.mutate(|ledger| ledger.complete_location_audit(location_id, auditor_visa))
            .await
    }

    pub async fn complete_corrective_action(&self, action_id: Uuid) -> Result<CorrectiveAction, AppError> {
        self.mutate(|ledger| ledger.complete_corrective_action(action_id))
            .await
    }

    pub async fn implement_suggestion(&self, suggestion_id: Uuid) -> Result<ImprovementSuggestion, AppError> {
        self.mutate(|ledger| ledger.implement_suggestion(suggestion_id))
            .await
    }

    /// Apaga todo o histórico (local e remoto) e devolve o novo mês corrente, vazio.
    pub async fn reset_all_audits(&self) -> Result<MonthlyAudit, AppError> {
        let now = self.now();
        let mut guard = self.state.write().await;

        let mut fresh = AuditHistory::default();
        let current = {
            let mut ledger = AuditLedger::new(&mut fresh, &self.catalog, now);
            ledger.reset();
            ledger.current().clone()
        };

        self.local.save(&fresh).await?;
        *guard = fresh;

        if let Some(mirror) = &self.mirror {
            mirror.clear();
            mirror.publish(current.clone());
        }

        Ok(current)
    }

    /// Espera o espelho remoto esvaziar a fila (encerramento e testes).
    pub async fn flush(&self) {
        if let Some(mirror) = &self.mirror {
            mirror.flush().await;
        }
    }
}
