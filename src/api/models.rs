use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::{Withdrawal, WithdrawalStatus};

/// Admin-panel view of a withdrawal row, camelCase with RFC 3339 timestamps.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalView {
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

impl From<Withdrawal> for WithdrawalView {
    fn from(w: Withdrawal) -> Self {
        Self {
            id: w.id,
            user_name: w.user_name,
            user_email: w.user_email,
            amount: w.amount,
            phone_number: w.phone_number,
            card_number: w.card_number,
            bank_name: w.bank_name,
            status: w.status,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalResponse {
    pub success: bool,
    pub withdrawal_id: i64,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ListWithdrawalsResponse {
    pub success: bool,
    pub withdrawals: Vec<WithdrawalView>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}
