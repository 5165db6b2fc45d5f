pub mod postgres;
pub mod store;

pub use postgres::PgWithdrawalStore;
pub use store::{
    NewWithdrawal, StatusFilter, StoreError, Transition, Withdrawal, WithdrawalStatus,
    WithdrawalStore,
};
