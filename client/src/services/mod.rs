//! Workflow services over the remote tracking API

pub mod auth;
pub mod batch;
pub mod reconciliation;

pub use auth::AuthService;
pub use batch::BatchService;
pub use reconciliation::ReconciliationService;
