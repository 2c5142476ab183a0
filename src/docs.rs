// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::middleware::auditor::AUDITOR_VISA_HEADER;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- System / Catalog ---
        handlers::catalog::health,
        handlers::catalog::get_catalog,

        // --- Audits ---
        handlers::audits::get_current_audit,
        handlers::audits::get_history,
        handlers::audits::reset_audits,
        handlers::audits::get_pending_locations,
        handlers::audits::start_location_audit,
        handlers::audits::get_location_audit,
        handlers::audits::get_location_score,
        handlers::audits::record_evaluation,
        handlers::audits::complete_location_audit,

        // --- Corrective actions / Suggestions ---
        handlers::actions::list_corrective_actions,
        handlers::actions::complete_corrective_action,
        handlers::actions::list_improvement_suggestions,
        handlers::actions::implement_suggestion,

        // --- Reports ---
        handlers::reports::get_monthly_summary,
        handlers::reports::get_annual_report,
        handlers::reports::get_historical_trend,
        handlers::reports::get_auditor_report,
    ),
    components(
        schemas(
            // --- Catalog ---
            models::catalog::Catalog,
            models::catalog::LocationGroup,
            models::catalog::Location,
            models::catalog::Pillar,
            models::catalog::Question,

            // --- Audits ---
            models::audit::ActionStatus,
            models::audit::SuggestionStatus,
            models::audit::CorrectiveAction,
            models::audit::ImprovementSuggestion,
            models::audit::PillarEvaluation,
            models::audit::LocationAudit,
            models::audit::GroupScore,
            models::audit::MonthlyAudit,
            models::audit::AuditHistory,

            // --- Reports ---
            models::report::DeadlineStatus,
            models::report::CorrectiveActionEntry,
            models::report::CorrectiveActionBoard,
            models::report::SuggestionEntry,
            models::report::SuggestionBoard,
            models::report::PillarAverage,
            models::report::GroupScoreEntry,
            models::report::LocationScoreEntry,
            models::report::MonthlySummary,
            models::report::MonthlyTrendEntry,
            models::report::AnnualReport,
            models::report::LocationSeries,
            models::report::HistoricalTrend,
            models::report::AuditorStats,
            models::report::AuditorReport,

            // --- Payloads / Responses ---
            handlers::audits::RecordEvaluationPayload,
            handlers::audits::LocationScoreResponse,
            handlers::catalog::HealthResponse,
        )
    ),
    tags(
        (name = "System", description = "Estado do serviço"),
        (name = "Catalog", description = "Locais, grupos e pilares 6S"),
        (name = "Audits", description = "Ciclo de vida das auditorias mensais"),
        (name = "Corrective actions", description = "Ações corretivas e prazo de 30 dias"),
        (name = "Improvement suggestions", description = "Sugestões de melhoria"),
        (name = "Reports", description = "Indicadores mensais, anuais e por auditor")
    ),
    modifiers(&AuditorVisaAddon)
)]
pub struct ApiDoc;

struct AuditorVisaAddon;

impl utoipa::Modify for AuditorVisaAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "auditor_visa",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(AUDITOR_VISA_HEADER))),
        );
    }
}
