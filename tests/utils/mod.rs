#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use withdrawal_gateway::api::{app_router, AppState};
use withdrawal_gateway::config::AdminKey;
use withdrawal_gateway::db::{
    NewWithdrawal, StatusFilter, StoreError, Transition, Withdrawal, WithdrawalStatus,
    WithdrawalStore,
};
use withdrawal_gateway::notifier::{Notifier, NotifierError, ParseMode};
use withdrawal_gateway::service::command::CommandProcessor;
use withdrawal_gateway::service::intake::IntakeService;
use withdrawal_gateway::service::listing::ListingService;

pub const ADMIN_CHAT_ID: i64 = 999;
pub const ADMIN_KEY: &str = "admin123";

/// In-memory stand-in for the Postgres store, enough for router tests.
/// Creation timestamps are spaced one second apart so ordering is stable.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<Withdrawal>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn snapshot(&self) -> Vec<Withdrawal> {
        self.rows.lock().unwrap().clone()
    }

    pub fn row(&self, id: i64) -> Option<Withdrawal> {
        self.rows.lock().unwrap().iter().find(|w| w.id == id).cloned()
    }
}

#[async_trait]
impl WithdrawalStore for InMemoryStore {
    async fn create(&self, new: NewWithdrawal) -> Result<i64, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created_at =
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(id);

        self.rows.lock().unwrap().push(Withdrawal {
            id,
            user_name: new.user_name,
            user_email: new.user_email,
            amount: new.amount,
            phone_number: new.phone_number,
            card_number: None,
            bank_name: new.bank_name,
            status: WithdrawalStatus::Pending,
            created_at,
            updated_at: created_at,
        });

        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Withdrawal>, StoreError> {
        Ok(self.row(id))
    }

    async fn transition(&self, id: i64, to: WithdrawalStatus) -> Result<Transition, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|w| w.id == id) {
            None => Ok(Transition::NotFound),
            Some(row) if row.status != WithdrawalStatus::Pending => {
                Ok(Transition::AlreadyResolved(row.status))
            }
            Some(row) => {
                row.status = to;
                row.updated_at = Utc::now();
                Ok(Transition::Applied)
            }
        }
    }

    async fn list(&self, filter: StatusFilter) -> Result<Vec<Withdrawal>, StoreError> {
        let mut rows: Vec<Withdrawal> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|w| match filter {
                StatusFilter::All => true,
                StatusFilter::Only(status) => w.status == status,
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

/// Store whose every operation fails, for exercising error absorption.
pub struct FailingStore;

#[async_trait]
impl WithdrawalStore for FailingStore {
    async fn create(&self, _new: NewWithdrawal) -> Result<i64, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn get(&self, _id: i64) -> Result<Option<Withdrawal>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn transition(&self, _id: i64, _to: WithdrawalStatus) -> Result<Transition, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn list(&self, _filter: StatusFilter) -> Result<Vec<Withdrawal>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }
}

/// Captures outbound messages instead of calling Telegram.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: i64, text: &str, _mode: ParseMode) -> Result<(), NotifierError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Router wired to a store that always errors; returns the notifier so tests
/// can assert nothing was sent.
pub fn create_failing_app() -> (Router, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());

    let store_dyn: Arc<dyn WithdrawalStore> = Arc::new(FailingStore);
    let notifier_dyn: Arc<dyn Notifier> = notifier.clone();

    let state = Arc::new(AppState {
        intake: IntakeService::new(store_dyn.clone(), notifier_dyn.clone(), ADMIN_CHAT_ID),
        commands: CommandProcessor::new(store_dyn.clone(), notifier_dyn, ADMIN_CHAT_ID),
        listing: ListingService::new(store_dyn, AdminKey::new(ADMIN_KEY.to_string())),
    });

    (app_router(state), notifier)
}

pub fn create_test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let store_dyn: Arc<dyn WithdrawalStore> = store.clone();
    let notifier_dyn: Arc<dyn Notifier> = notifier.clone();

    let state = Arc::new(AppState {
        intake: IntakeService::new(store_dyn.clone(), notifier_dyn.clone(), ADMIN_CHAT_ID),
        commands: CommandProcessor::new(store_dyn.clone(), notifier_dyn.clone(), ADMIN_CHAT_ID),
        listing: ListingService::new(store_dyn, AdminKey::new(ADMIN_KEY.to_string())),
    });

    TestApp {
        router: app_router(state),
        store,
        notifier,
    }
}
