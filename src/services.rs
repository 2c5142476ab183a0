pub mod audit_service;
pub use audit_service::AuditService;
pub mod ledger;
pub mod report_service;
pub use report_service::ReportService;
