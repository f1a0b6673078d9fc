pub(crate) mod accounts_errors;
pub(crate) mod accounts_model;
pub(crate) mod accounts_repository;

pub use accounts_errors::AccountError;
pub use accounts_model::{Account, AccountCategory, AccountDB, NewAccount};
pub use accounts_repository::AccountRepository;
