pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;

pub use telegram::TelegramNotifier;

/// Message formatting requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
    Plain,
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider rejected message ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Delivers a text message to one external recipient. Callers treat delivery
/// as best-effort: a failed send is logged, never propagated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str, mode: ParseMode) -> Result<(), NotifierError>;
}
