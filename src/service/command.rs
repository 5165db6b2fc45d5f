use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::ServiceError;
use crate::db::{Transition, Withdrawal, WithdrawalStatus, WithdrawalStore};
use crate::notifier::{Notifier, ParseMode};

/// Inbound Telegram update envelope. Everything is optional; anything that
/// does not carry a text message from a chat is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramUpdate {
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramMessage {
    pub text: Option<String>,
    pub chat: Option<TelegramChat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Approve(i64),
    Reject(i64),
}

impl AdminCommand {
    fn withdrawal_id(&self) -> i64 {
        match self {
            AdminCommand::Approve(id) | AdminCommand::Reject(id) => *id,
        }
    }

    fn target_status(&self) -> WithdrawalStatus {
        match self {
            AdminCommand::Approve(_) => WithdrawalStatus::Approved,
            AdminCommand::Reject(_) => WithdrawalStatus::Rejected,
        }
    }
}

/// What an inbound update amounted to. The silent branches are first-class
/// variants so tests assert on the outcome instead of on missing side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied { id: i64, status: WithdrawalStatus },
    AlreadyResolved { id: i64, status: WithdrawalStatus },
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Update carried no text message or no chat.
    MalformedUpdate,
    /// Sender is not the configured admin chat. Stays silent on purpose.
    UnauthorizedSender,
    /// Text is not an approve/reject command; conversational noise.
    UnrecognizedText,
    /// Command named an id with no matching row. Stays silent on purpose.
    UnknownWithdrawal,
}

/// Applies admin approve/reject commands arriving over the bot webhook.
pub struct CommandProcessor {
    store: Arc<dyn WithdrawalStore>,
    notifier: Arc<dyn Notifier>,
    admin_chat_id: i64,
}

impl CommandProcessor {
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

    pub async fn handle_update(
        &self,
        update: TelegramUpdate,
    ) -> Result<CommandOutcome, ServiceError> {
        let Some(message) = update.message else {
            return Ok(CommandOutcome::Ignored(IgnoreReason::MalformedUpdate));
        };
        let (Some(text), Some(chat)) = (message.text, message.chat) else {
            return Ok(CommandOutcome::Ignored(IgnoreReason::MalformedUpdate));
        };

        if chat.id != self.admin_chat_id {
            return Ok(CommandOutcome::Ignored(IgnoreReason::UnauthorizedSender));
        }

        let Some(command) = parse_command(&text) else {
            return Ok(CommandOutcome::Ignored(IgnoreReason::UnrecognizedText));
        };

        let id = command.withdrawal_id();
        let Some(withdrawal) = self.store.get(id).await? else {
            return Ok(CommandOutcome::Ignored(IgnoreReason::UnknownWithdrawal));
        };

        let target = command.target_status();
        match self.store.transition(id, target).await? {
            Transition::Applied => {
                info!(id, status = %target, "withdrawal transitioned");
                self.notify(confirmation_text(id, target, &withdrawal)).await;
                Ok(CommandOutcome::Applied { id, status: target })
            }
            Transition::AlreadyResolved(current) => {
                self.notify(already_resolved_text(id, current)).await;
                Ok(CommandOutcome::AlreadyResolved { id, status: current })
            }
            Transition::NotFound => Ok(CommandOutcome::Ignored(IgnoreReason::UnknownWithdrawal)),
        }
    }

    async fn notify(&self, text: String) {
        if let Err(e) = self
            .notifier
            .send(self.admin_chat_id, &text, ParseMode::Html)
            .await
        {
            warn!(error = %e, "admin confirmation failed");
        }
    }
}

/// Recognizes `/approve_<id>` and `/reject_<id>` (leading slash optional).
/// The id is the token after the first underscore; trailing tokens are
/// tolerated, a non-numeric id is not.
pub fn parse_command(text: &str) -> Option<AdminCommand> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);
    let (verb, rest) = text.split_once('_')?;
    let id_token = rest.split('_').next().unwrap_or(rest);
    let id: i64 = id_token.parse().ok()?;

    match verb {
        "approve" => Some(AdminCommand::Approve(id)),
        "reject" => Some(AdminCommand::Reject(id)),
        _ => None,
    }
}

/// Keeps only the last four characters of a payout identifier visible.
fn mask_identifier(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    if chars.len() <= 4 {
        return identifier.to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

fn confirmation_text(id: i64, status: WithdrawalStatus, withdrawal: &Withdrawal) -> String {
    let (marker, verdict) = match status {
        WithdrawalStatus::Approved => ("\u{2705}", "approved"),
        _ => ("\u{274C}", "rejected"),
    };
    let payout_id = withdrawal
        .card_number
        .as_deref()
        .unwrap_or(&withdrawal.phone_number);

    format!(
        "{marker} <b>Withdrawal #{id} {verdict}</b>\n\n\
         \u{1F464} {user}\n\
         \u{1F4B0} {amount} \u{2192} {masked} ({bank})",
        user = withdrawal.user_name,
        amount = withdrawal.amount,
        masked = mask_identifier(payout_id),
        bank = withdrawal.bank_name,
    )
}

fn already_resolved_text(id: i64, current: WithdrawalStatus) -> String {
    format!("\u{2139} Withdrawal #{id} was already {current}, nothing changed")
}
