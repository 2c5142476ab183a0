// src/config.rs

use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{AuditRepository, LocalStore, RemoteStore},
    models::catalog::Catalog,
    services::{AuditService, ReportService},
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STORE_PATH: &str = "data/audit_history.json";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

// Configuração lida do ambiente (e do .env, se existir)
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    // Sem DATABASE_URL a aplicação roda só com o arquivo local
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub audit_store_path: PathBuf,
    pub audit_catalog_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca (testável sem mexer no ambiente).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Variável vazia conta como ausente
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{raw}'"))?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: get("DATABASE_URL"),
            db_max_connections,
            audit_store_path: get("AUDIT_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            audit_catalog_path: get("AUDIT_CATALOG_PATH").map(PathBuf::from),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub audit_service: AuditService,
    pub report_service: ReportService,
    pub i18n_store: Arc<I18nStore>,
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let catalog = Arc::new(load_catalog(settings.audit_catalog_path.as_deref()).await?);

        let db_pool = match &settings.database_url {
            Some(url) => match connect_remote(url, settings.db_max_connections, &catalog).await {
                Ok(pool) => Some(pool),
                Err(e) => {
                    // O banco é só espelho: sem ele a aplicação segue com o arquivo local
                    tracing::warn!(error = ?e, "⚠️ Banco remoto indisponível, seguindo só com o histórico local");
                    None
                }
            },
            None => {
                tracing::info!("DATABASE_URL não definida, espelho remoto desativado");
                None
            }
        };

        let remote = db_pool
            .clone()
            .map(|pool| Arc::new(AuditRepository::new(pool)) as Arc<dyn RemoteStore>);

        let local = LocalStore::new(settings.audit_store_path.clone());
        tracing::info!(path = %local.path().display(), "Histórico local de auditorias");

        let audit_service = AuditService::load(catalog.clone(), local, remote)
        .await
        .context("Falha ao carregar o histórico de auditorias")?;

        Ok(Self::from_parts(catalog, audit_service, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(catalog: Arc<Catalog>, audit_service: AuditService, db_pool: Option<PgPool>) -> Self {
        Self {
            report_service: ReportService::new(catalog.clone()),
            catalog,
            audit_service,
            i18n_store: Arc::new(I18nStore::new()),
            db_pool,
        }
    }
}

async fn connect_remote(url: &str, max_connections: u32, catalog: &Catalog) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(url)
        .await?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    AuditRepository::new(pool.clone()).seed_catalog(catalog).await?;

    Ok(pool)
}

/// Catálogo embutido, ou o de um arquivo JSON quando configurado.
pub async fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::default());
    };

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Falha ao ler o catálogo em {}", path.display()))?;
    let catalog: Catalog = serde_json::from_slice(&bytes)
        .with_context(|| format!("Catálogo mal formado em {}", path.display()))?;
    catalog.validate()?;

    tracing::info!(
        path = %path.display(),
        locations = catalog.locations.len(),
        pillars = catalog.pillars.len(),
        "Catálogo carregado de arquivo"
    );
    Ok(catalog)
}
