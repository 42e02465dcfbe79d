//! Feed record models for CSV parsing and internal representation.

use crate::error::{FeedError, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Raw feed row as read from CSV.
///
/// Every column is read as text; `name` and `phone` are only meaningful for
/// some operations and may be absent.
#[derive(Debug, Deserialize)]
pub struct FeedRow {
    /// Operation tag: insert, update_phone, update_name, delete
    pub operation: String,

    /// Account identifier
    pub account_id: String,

    /// Account holder name
    #[serde(default)]
    pub name: Option<String>,

    /// Contact phone number
    #[serde(default)]
    pub phone: Option<String>,
}

impl FeedRow {
    /// Converts the raw row into a [`FeedRecord`].
    ///
    /// The operation tag is carried verbatim; an unrecognised tag is only
    /// rejected when the record is dispatched. Fails if `account_id` is empty.
    pub fn into_record(self, row: usize) -> Result<FeedRecord> {
        let account_id = self.account_id.trim();
        if account_id.is_empty() {
            return Err(FeedError::InvalidRecord {
                row,
                message: "account_id is empty".to_string(),
            });
        }

        Ok(FeedRecord::new(
            account_id,
            non_empty(self.name),
            non_empty(self.phone),
            self.operation.trim(),
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The closed set of operations a feed record may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Create the account if it does not exist yet.
    Insert,

    /// Overwrite the phone of an existing account.
    UpdatePhone,

    /// Overwrite the name of an existing account.
    UpdateName,

    /// Remove an existing account.
    Delete,
}

impl OperationKind {
    /// Canonical tag written to feeds and logs.
    pub fn as_tag(&self) -> &'static str {
        match self {
            OperationKind::Insert => "INSERT",
            OperationKind::UpdatePhone => "UPDATE_PHONE",
            OperationKind::UpdateName => "UPDATE_NAME",
            OperationKind::Delete => "DELETE",
        }
    }

    /// Human-readable action name used in missing-target events.
    pub fn action_name(&self) -> &'static str {
        match self {
            OperationKind::Insert => "Insert",
            OperationKind::UpdatePhone => "Phone Update",
            OperationKind::UpdateName => "Name Update",
            OperationKind::Delete => "Delete",
        }
    }
}

impl FromStr for OperationKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insert" => Ok(OperationKind::Insert),
            "update_phone" => Ok(OperationKind::UpdatePhone),
            "update_name" => Ok(OperationKind::UpdateName),
            "delete" => Ok(OperationKind::Delete),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One immutable entry of the ordered feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    account_id: String,
    name: Option<String>,
    phone: Option<String>,
    tag: String,
}

impl FeedRecord {
    /// Creates a record from its raw parts.
    ///
    /// Neither `tag` nor `account_id` is validated here; dispatch rejects an
    /// unknown tag or an empty account id as fatal.
    pub fn new(
        account_id: impl Into<String>,
        name: Option<String>,
        phone: Option<String>,
        tag: impl Into<String>,
    ) -> Self {
        FeedRecord {
            account_id: account_id.into(),
            name,
            phone,
            tag: tag.into(),
        }
    }

    pub fn insert(account_id: &str, name: &str, phone: &str) -> Self {
        Self::new(
            account_id,
            Some(name.to_string()),
            Some(phone.to_string()),
            OperationKind::Insert.as_tag(),
        )
    }

    pub fn update_phone(account_id: &str, phone: &str) -> Self {
        Self::new(
            account_id,
            None,
            Some(phone.to_string()),
            OperationKind::UpdatePhone.as_tag(),
        )
    }

    pub fn update_name(account_id: &str, name: &str) -> Self {
        Self::new(
            account_id,
            Some(name.to_string()),
            None,
            OperationKind::UpdateName.as_tag(),
        )
    }

    pub fn delete(account_id: &str) -> Self {
        Self::new(account_id, None, None, OperationKind::Delete.as_tag())
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// The operation tag exactly as it appeared in the feed.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Resolves the operation tag.
    ///
    /// Fails with [`FeedError::UnknownOperation`] when the tag is outside
    /// the supported set.
    pub fn operation(&self) -> Result<OperationKind> {
        self.tag
            .parse()
            .map_err(|_| FeedError::UnknownOperation {
                account_id: self.account_id.clone(),
                tag: self.tag.clone(),
            })
    }
}

impl fmt::Display for FeedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} account={} name={} phone={}",
            self.tag,
            self.account_id,
            self.name.as_deref().unwrap_or("-"),
            self.phone.as_deref().unwrap_or("-"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(operation: &str, account_id: &str, name: Option<&str>, phone: Option<&str>) -> FeedRow {
        FeedRow {
            operation: operation.to_string(),
            account_id: account_id.to_string(),
            name: name.map(str::to_string),
            phone: phone.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_insert_row() {
        let record = row("insert", "A1", Some("Alice"), Some("111"))
            .into_record(2)
            .unwrap();

        assert_eq!(record.account_id(), "A1");
        assert_eq!(record.name(), Some("Alice"));
        assert_eq!(record.phone(), Some("111"));
        assert_eq!(record.operation().unwrap(), OperationKind::Insert);
    }

    #[test]
    fn test_parse_handles_whitespace_and_case() {
        let record = row("  Update_Phone ", "  A1 ", None, Some(" 222 "))
            .into_record(2)
            .unwrap();

        assert_eq!(record.account_id(), "A1");
        assert_eq!(record.phone(), Some("222"));
        assert_eq!(record.operation().unwrap(), OperationKind::UpdatePhone);
    }

    #[test]
    fn test_empty_cells_become_none() {
        let record = row("delete", "A1", Some(""), Some("   "))
            .into_record(2)
            .unwrap();

        assert_eq!(record.name(), None);
        assert_eq!(record.phone(), None);
    }

    #[test]
    fn test_rejects_empty_account_id() {
        let err = row("insert", "  ", Some("Alice"), None)
            .into_record(7)
            .unwrap_err();

        assert!(matches!(err, FeedError::InvalidRecord { row: 7, .. }));
    }

    #[test]
    fn test_unknown_tag_is_kept_until_resolved() {
        let record = row("upsert", "A1", Some("Alice"), None)
            .into_record(2)
            .unwrap();

        assert_eq!(record.tag(), "upsert");
        match record.operation() {
            Err(FeedError::UnknownOperation { account_id, tag }) => {
                assert_eq!(account_id, "A1");
                assert_eq!(tag, "upsert");
            }
            other => panic!("Expected UnknownOperation, got {:?}", other),
        }
    }

    #[test]
    fn test_action_names() {
        assert_eq!(OperationKind::UpdatePhone.action_name(), "Phone Update");
        assert_eq!(OperationKind::UpdateName.action_name(), "Name Update");
        assert_eq!(OperationKind::Delete.action_name(), "Delete");
    }

    #[test]
    fn test_display_format() {
        let record = FeedRecord::update_phone("A1", "222");
        assert_eq!(record.to_string(), "UPDATE_PHONE account=A1 name=- phone=222");
    }
}
