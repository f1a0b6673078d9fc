pub mod db;

pub mod accounts;
pub mod ledger;
pub mod plans;
pub mod recurring;
pub mod transactions;

pub mod constants;
pub mod errors;
pub mod schema;

pub use errors::{Error, Result};
pub use ledger::*;
pub use recurring::*;
