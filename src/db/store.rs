use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of a withdrawal. `Pending` is the only non-terminal state;
/// once a row is `Approved` or `Rejected` it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown withdrawal status: {0}")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    pub user_name: String,
    pub user_email: String,
    pub amount: Decimal,
    pub phone_number: String,
    pub card_number: Option<String>,
    pub bank_name: String,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields captured at intake; everything else is store-assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWithdrawal {
    pub user_name: String,
    pub user_email: String,
    pub amount: Decimal,
    pub phone_number: String,
    pub bank_name: String,
}

/// Listing filter: everything, or rows in exactly one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(WithdrawalStatus),
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

/// Result of a conditional `pending -> terminal` status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The row was pending and is now in the requested state.
    Applied,
    /// The row was already in a terminal state; nothing changed.
    AlreadyResolved(WithdrawalStatus),
    /// No row with that id.
    NotFound,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WithdrawalStore: Send + Sync {
    /// Inserts a new pending withdrawal and returns its id.
    async fn create(&self, new: NewWithdrawal) -> Result<i64, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Withdrawal>, StoreError>;

    /// Moves a pending row to `to` and bumps `updated_at`. Terminal rows are
    /// left untouched and reported as `AlreadyResolved`.
    async fn transition(&self, id: i64, to: WithdrawalStatus) -> Result<Transition, StoreError>;

    /// Rows matching the filter, most recently created first.
    async fn list(&self, filter: StatusFilter) -> Result<Vec<Withdrawal>, StoreError>;
}
