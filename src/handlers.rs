pub mod actions;
pub mod audits;
pub mod catalog;
pub mod reports;
