//! Admin read model: credit ledger, users and render job statistics
//!
//! Backed by sample data; nothing here is persisted.

pub mod dashboard;
pub mod ledger;

pub use dashboard::{
    low_balance, mock_jobs, mock_users, DashboardStats, RenderJob, RenderStatus, Role, User,
};
pub use ledger::{CreditLedger, CreditLedgerEntry, LedgerTotals};
