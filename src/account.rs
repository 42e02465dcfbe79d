//! Persisted account row model.

use serde::Serialize;

/// A row of the account table as held by an account store.
///
/// # Invariants
///
/// - `account_id` is unique within a store
/// - `name` is always present; `phone` may be absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Unique account identifier.
    pub account_id: String,

    /// Account holder name.
    pub name: String,

    /// Contact phone number, if known.
    pub phone: Option<String>,
}

impl Account {
    /// Creates a new account row.
    pub fn new(account_id: impl Into<String>, name: impl Into<String>, phone: Option<String>) -> Self {
        Account {
            account_id: account_id.into(),
            name: name.into(),
            phone,
        }
    }
}
