use async_trait::async_trait;
use sqlx::PgPool;

use super::store::{
    NewWithdrawal, StatusFilter, StoreError, Transition, Withdrawal, WithdrawalStatus,
    WithdrawalStore,
};

const LIST_COLUMNS: &str = "id, user_name, user_email, amount, phone_number, card_number, \
                            bank_name, status, created_at, updated_at";

/// Postgres-backed withdrawal store. Every operation is a single statement,
/// so row-level atomicity from the engine is all the isolation needed.
#[derive(Clone)]
pub struct PgWithdrawalStore {
    pool: PgPool,
}

impl PgWithdrawalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WithdrawalStore for PgWithdrawalStore {
    async fn create(&self, new: NewWithdrawal) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO withdrawals (user_name, user_email, amount, phone_number, bank_name, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING id
            "#,
        )
        .bind(&new.user_name)
        .bind(&new.user_email)
        .bind(new.amount)
        .bind(&new.phone_number)
        .bind(&new.bank_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Withdrawal>, StoreError> {
        let row = sqlx::query_as::<_, Withdrawal>(&format!(
            "SELECT {LIST_COLUMNS} FROM withdrawals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn transition(&self, id: i64, to: WithdrawalStatus) -> Result<Transition, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE withdrawals
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = 'pending'
            "#,
        )
        .bind(to)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 1 {
            return Ok(Transition::Applied);
        }

        // Nothing updated: either the row is already terminal or it is gone.
        let current = sqlx::query_scalar::<_, WithdrawalStatus>(
            "SELECT status FROM withdrawals WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match current {
            Some(status) => Ok(Transition::AlreadyResolved(status)),
            None => Ok(Transition::NotFound),
        }
    }

    async fn list(&self, filter: StatusFilter) -> Result<Vec<Withdrawal>, StoreError> {
        let rows = match filter {
            StatusFilter::All => {
                sqlx::query_as::<_, Withdrawal>(&format!(
                    "SELECT {LIST_COLUMNS} FROM withdrawals ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            StatusFilter::Only(status) => {
                sqlx::query_as::<_, Withdrawal>(&format!(
                    "SELECT {LIST_COLUMNS} FROM withdrawals WHERE status = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }
}
