pub(crate) mod transactions_constants;
pub(crate) mod transactions_errors;
pub(crate) mod transactions_model;
pub(crate) mod transactions_repository;

pub use transactions_constants::*;
pub use transactions_errors::TransactionError;
pub use transactions_model::{
    NewTransaction, Transaction, TransactionDB, TransactionStatus, TransactionType,
    TransactionValues, TransactionValuesChangeset,
};
pub use transactions_repository::TransactionRepository;
