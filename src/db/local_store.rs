// src/db/local_store.rs

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{common::error::AppError, models::audit::AuditHistory};

// Snapshot local do histórico (JSON em disco). É a fonte primária; o Postgres é só espelho.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lê o histórico. Arquivo ausente equivale a histórico vazio.
    pub async fn load(&self) -> Result<AuditHistory, AppError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let history: AuditHistory = serde_json::from_slice(&bytes)?;
                tracing::info!(
                    path = %self.path.display(),
                    months = history.audits.len(),
                    "Histórico local carregado"
                );
                Ok(history)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Nenhum histórico local, começando vazio");
                Ok(AuditHistory::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Grava o histórico de forma atómica (arquivo temporário + rename).
    pub async fn save(&self, history: &AuditHistory) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(history)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Histórico local gravado");
        Ok(())
    }
}
