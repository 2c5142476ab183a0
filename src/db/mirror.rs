// src/db/mirror.rs

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::{
    common::error::AppError,
    db::audit_repo::AuditRepository,
    models::audit::{AuditHistory, MonthlyAudit},
};

/// Destino remoto do histórico. O Postgres em produção; falsos nos testes.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn load_history(&self) -> Result<AuditHistory, AppError>;
    async fn save_monthly_audit(&self, audit: &MonthlyAudit) -> Result<(), AppError>;
    async fn clear_history(&self) -> Result<(), AppError>;
}

#[async_trait]
impl RemoteStore for AuditRepository {
    async fn load_history(&self) -> Result<AuditHistory, AppError> {
        AuditRepository::load_history(self).await
    }

    async fn save_monthly_audit(&self, audit: &MonthlyAudit) -> Result<(), AppError> {
        AuditRepository::save_monthly_audit(self, audit).await
    }

    async fn clear_history(&self) -> Result<(), AppError> {
        AuditRepository::clear_history(self).await
    }
}

#[derive(Debug)]
enum MirrorCommand {
    Save(Box<MonthlyAudit>),
    Clear,
    Flush(oneshot::Sender<()>),
}

// Fila de sincronização em segundo plano. A ordem dos comandos é preservada
// e uma falha remota nunca chega ao cliente HTTP: só é registada no log.
#[derive(Clone)]
pub struct RemoteMirror {
    sender: mpsc::UnboundedSender<MirrorCommand>,
}

impl RemoteMirror {
    pub fn spawn(store: Arc<dyn RemoteStore>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<MirrorCommand>();

        tokio::spawn(async move {
            while let Some(command) = receiver.recv().await {
                match command {
                    MirrorCommand::Save(audit) => {
                        if let Err(e) = store.save_monthly_audit(&audit).await {
                            tracing::warn!(month = %audit.month, error = %e, "⚠️ Falha ao espelhar mês no banco remoto");
                        } else {
                            tracing::debug!(month = %audit.month, "Mês espelhado no banco remoto");
                        }
                    }
                    MirrorCommand::Clear => {
                        if let Err(e) = store.clear_history().await {
                            tracing::warn!(error = %e, "⚠️ Falha ao limpar histórico remoto");
                        }
                    }
                    MirrorCommand::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            tracing::debug!("Fila do espelho remoto encerrada");
        });

        Self { sender }
    }

    pub fn publish(&self, audit: MonthlyAudit) {
        self.send(MirrorCommand::Save(Box::new(audit)));
    }

    pub fn clear(&self) {
        self.send(MirrorCommand::Clear);
    }

    /// Espera até que todos os comandos anteriores tenham sido processados.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.send(MirrorCommand::Flush(done));
        let _ = wait.await;
    }

    fn send(&self, command: MirrorCommand) {
        if self.sender.send(command).is_err() {
            tracing::warn!("Fila do espelho remoto indisponível, comando descartado");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::common::month::MonthKey;
    use tokio::sync::Mutex;

    // Guarda os comandos recebidos; opcionalmente falha em todos.
    #[derive(Default)]
    pub(crate) struct RecordingStore {
        pub saved: Mutex<Vec<MonthlyAudit>>,
        pub clears: Mutex<usize>,
        pub history: AuditHistory,
        pub failing: bool,
    }

    impl RecordingStore {
        pub(crate) fn failing() -> Self {
            Self {
                failing: true,
                ..Default::default()
            }
        }

        fn outcome(&self) -> Result<(), AppError> {
            if self.failing {
                Err(AppError::InternalServerError(anyhow::anyhow!("banco indisponível")))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RemoteStore for RecordingStore {
        async fn load_history(&self) -> Result<AuditHistory, AppError> {
            self.outcome()?;
            Ok(self.history.clone())
        }

        async fn save_monthly_audit(&self, audit: &MonthlyAudit) -> Result<(), AppError> {
            self.outcome()?;
            self.saved.lock().await.push(audit.clone());
            Ok(())
        }

        async fn clear_history(&self) -> Result<(), AppError> {
            self.outcome()?;
            *self.clears.lock().await += 1;
            Ok(())
        }
    }

    fn month(key: &str) -> MonthlyAudit {
        MonthlyAudit::new(key.parse::<MonthKey>().unwrap())
    }

    #[tokio::test]
    async fn test_commands_are_applied_in_order() {
        let store = Arc::new(RecordingStore::default());
        let mirror = RemoteMirror::spawn(store.clone());

        mirror.publish(month("2026-09"));
        mirror.publish(month("2026-10"));
        mirror.clear();
        mirror.flush().await;

        let saved = store.saved.lock().await;
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].month.to_string(), "2026-09");
        assert_eq!(saved[1].month.to_string(), "2026-10");
        assert_eq!(*store.clears.lock().await, 1);
    }

    #[tokio::test]
    async fn test_remote_failures_are_swallowed() {
        let store = Arc::new(RecordingStore::failing());
        let mirror = RemoteMirror::spawn(store.clone());

        mirror.publish(month("2026-10"));
        mirror.clear();
        mirror.flush().await;

        assert!(store.saved.lock().await.is_empty());
        assert_eq!(*store.clears.lock().await, 0);
    }
}
