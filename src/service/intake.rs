use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::ServiceError;
use crate::db::{NewWithdrawal, WithdrawalStore};
use crate::notifier::{Notifier, ParseMode};

/// End-user submission payload. Every field is optional at the serde level so
/// a missing field becomes a 400 with a named field, not a deserialization
/// rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub amount: Option<Decimal>,
    pub phone_number: Option<String>,
    pub bank_name: Option<String>,
}

/// Creates withdrawal records and announces them to the admin chat.
pub struct IntakeService {
    store: Arc<dyn WithdrawalStore>,
    notifier: Arc<dyn Notifier>,
    admin_chat_id: i64,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn WithdrawalStore>,
        notifier: Arc<dyn Notifier>,
        admin_chat_id: i64,
    ) -> Self {
        Self {
            store,
            notifier,
            admin_chat_id,
        }
    }

    /// Validates and persists a withdrawal, then notifies the admin.
    /// Notification is best-effort: the id is returned even if delivery fails.
    pub async fn submit(&self, request: IntakeRequest) -> Result<i64, ServiceError> {
        let new = validate(request)?;

        let id = self.store.create(new.clone()).await?;
        info!(id, user = %new.user_name, "withdrawal request created");

        let text = request_notification_text(id, &new);
        if let Err(e) = self
            .notifier
            .send(self.admin_chat_id, &text, ParseMode::Html)
            .await
        {
            warn!(error = %e, id, "admin notification failed");
        }

        Ok(id)
    }
}

fn validate(request: IntakeRequest) -> Result<NewWithdrawal, ServiceError> {
    let user_name = required(request.user_name, "userName")?;
    let user_email = required(request.user_email, "userEmail")?;
    let amount = request
        .amount
        .ok_or(ServiceError::MissingField("amount"))?;
    let phone_number = required(request.phone_number, "phoneNumber")?;
    let bank_name = required(request.bank_name, "bankName")?;

    if amount <= Decimal::ZERO {
        return Err(ServiceError::Validation(
            "amount must be positive".to_string(),
        ));
    }

    Ok(NewWithdrawal {
        user_name,
        user_email,
        amount,
        phone_number,
        bank_name,
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ServiceError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ServiceError::MissingField(field)),
    }
}

fn request_notification_text(id: i64, new: &NewWithdrawal) -> String {
    format!(
        "\u{1F514} <b>New withdrawal request #{id}</b>\n\n\
         \u{1F464} User: {user}\n\
         \u{1F4E7} Email: {email}\n\
         \u{1F4B0} Amount: {amount}\n\
         \u{1F4F1} Phone: {phone}\n\
         \u{1F3E6} Bank: {bank}\n\n\
         Reply with one of:\n\
         /approve_{id} - approve\n\
         /reject_{id} - reject",
        user = new.user_name,
        email = new.user_email,
        amount = new.amount,
        phone = new.phone_number,
        bank = new.bank_name,
    )
}
