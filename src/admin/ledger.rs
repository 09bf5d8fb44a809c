//! Credit ledger
//!
//! Every render costs one credit; top-ups, refunds and manual adjustments
//! are recorded as entries. A user's balance is the sum of their credits
//! minus their debits.

use serde::Serialize;

/// One ledger row; exactly one of `debit` / `credit` is normally non-zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditLedgerEntry {
    pub id: String,
    pub user_id: String,
    /// Render job or payment this entry belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub reason: String,
    pub debit: i64,
    pub credit: i64,
}

impl CreditLedgerEntry {
    pub fn new(id: &str, user_id: &str, reason: &str, debit: i64, credit: i64) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            correlation_id: None,
            reason: reason.into(),
            debit,
            credit,
        }
    }

    pub fn with_correlation(mut self, correlation_id: &str) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Signed effect on the balance
    pub fn net(&self) -> i64 {
        self.credit - self.debit
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerTotals {
    pub debit: i64,
    pub credit: i64,
}

impl LedgerTotals {
    pub fn net(&self) -> i64 {
        self.credit - self.debit
    }
}

/// Append-only list of ledger entries
#[derive(Debug, Clone, Default)]
pub struct CreditLedger {
    entries: Vec<CreditLedgerEntry>,
}

const FIRST_ENTRY_NUMBER: usize = 1001;

impl CreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<CreditLedgerEntry>) -> Self {
        Self { entries }
    }

    /// Sample ledger shown on the credits page
    pub fn mock() -> Self {
        Self::from_entries(vec![
            CreditLedgerEntry::new("TXN1001", "user1", "Initial Top-up", 0, 500),
            CreditLedgerEntry::new("TXN1002", "user1", "Render Job #RND-8219", 1, 0)
                .with_correlation("RND-8219"),
            CreditLedgerEntry::new("TXN1003", "user2", "Initial Top-up", 0, 100),
            CreditLedgerEntry::new("TXN1004", "user1", "Refund for failed Job #RND-8210", 0, 1)
                .with_correlation("RND-8210"),
            CreditLedgerEntry::new("TXN1005", "user2", "Render Job #RND-8220", 1, 0)
                .with_correlation("RND-8220"),
        ])
    }

    pub fn entries(&self) -> &[CreditLedgerEntry] {
        &self.entries
    }

    pub fn entries_for<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a CreditLedgerEntry> {
        self.entries.iter().filter(move |e| e.user_id == user_id)
    }

    pub fn balance_for(&self, user_id: &str) -> i64 {
        self.entries_for(user_id).map(CreditLedgerEntry::net).sum()
    }

    pub fn totals(&self) -> LedgerTotals {
        self.entries.iter().fold(LedgerTotals::default(), |acc, e| LedgerTotals {
            debit: acc.debit + e.debit,
            credit: acc.credit + e.credit,
        })
    }

    /// Record a manual adjustment; negative amounts debit the user
    pub fn adjust(&mut self, user_id: &str, amount: i64, reason: &str) -> &CreditLedgerEntry {
        let id = format!("TXN{}", FIRST_ENTRY_NUMBER + self.entries.len());
        let (debit, credit) = if amount < 0 { (-amount, 0) } else { (0, amount) };
        tracing::info!(%id, user = user_id, amount, "credit adjustment");
        self.entries
            .push(CreditLedgerEntry::new(&id, user_id, reason, debit, credit));
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
