pub(crate) mod ledger_calculator;
pub(crate) mod ledger_model;


pub use ledger_calculator::build_ledger;
pub use ledger_model::{
    AccountDayState, CategoryPolicy, LedgerRow, TransactionDetail, POLICY_CREDIT,
    POLICY_INVESTMENT, POLICY_LOAN, POLICY_STANDARD,
};
