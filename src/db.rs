pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod local_store;
pub use local_store::LocalStore;
pub mod mirror;
pub use mirror::{RemoteMirror, RemoteStore};
