use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;
use tracing::{debug, error};

use super::error::ApiError;
use super::models::{
    CreateWithdrawalResponse, ListQuery, ListWithdrawalsResponse, WebhookAck, WithdrawalView,
};
use super::routes::AppState;
use crate::service::command::TelegramUpdate;
use crate::service::intake::IntakeRequest;

pub async fn create_withdrawal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IntakeRequest>,
) -> Result<Json<CreateWithdrawalResponse>, ApiError> {
    let withdrawal_id = state.intake.submit(payload).await?;

    Ok(Json(CreateWithdrawalResponse {
        success: true,
        withdrawal_id,
        message: "Withdrawal request created",
    }))
}

pub async fn list_withdrawals(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListWithdrawalsResponse>, ApiError> {
    let presented_key = headers
        .get("x-admin-key")
        .and_then(|value| value.to_str().ok());

    let rows = state
        .listing
        .list(presented_key, query.status.as_deref())
        .await?;

    let withdrawals: Vec<WithdrawalView> = rows.into_iter().map(Into::into).collect();
    let total = withdrawals.len();

    Ok(Json(ListWithdrawalsResponse {
        success: true,
        withdrawals,
        total,
    }))
}

/// Webhook contract: the provider must get a fast 200 no matter what happened
/// inside, so internal errors are logged and absorbed here.
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Json<WebhookAck> {
    // Parsed by hand so an unreadable body still gets the 200.
    match serde_json::from_slice::<TelegramUpdate>(&body) {
        Ok(update) => match state.commands.handle_update(update).await {
            Ok(outcome) => debug!(?outcome, "webhook update handled"),
            Err(e) => error!(error = %e, "webhook update failed"),
        },
        Err(e) => debug!(error = %e, "webhook body did not parse, acknowledging anyway"),
    }

    Json(WebhookAck { ok: true })
}

/// Plain ack for non-POST verbs on the webhook path.
pub async fn webhook_ack() -> Json<WebhookAck> {
    Json(WebhookAck { ok: true })
}
