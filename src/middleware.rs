pub mod auditor;
pub mod i18n;
