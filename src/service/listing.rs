use std::sync::Arc;

use super::ServiceError;
use crate::config::AdminKey;
use crate::db::{StatusFilter, Withdrawal, WithdrawalStore};

/// Authenticated read API backing the admin panel.
pub struct ListingService {
    store: Arc<dyn WithdrawalStore>,
    admin_key: AdminKey,
}

impl ListingService {
    pub fn new(store: Arc<dyn WithdrawalStore>, admin_key: AdminKey) -> Self {
        Self { store, admin_key }
    }

    /// Returns withdrawals newest-first. `status` of `None` or `"all"` means
    /// no filter; an unknown status name is a validation error.
    pub async fn list(
        &self,
        presented_key: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<Withdrawal>, ServiceError> {
        let key = presented_key.ok_or(ServiceError::Unauthorized)?;
        if !self.admin_key.matches(key) {
            return Err(ServiceError::Unauthorized);
        }

        let filter = match status {
            None => StatusFilter::All,
            Some(s) => s.parse().map_err(|_| {
                ServiceError::Validation(format!("unknown status filter: {s}"))
            })?,
        };

        Ok(self.store.list(filter).await?)
    }
}
