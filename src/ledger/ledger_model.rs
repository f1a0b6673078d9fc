use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::accounts::AccountCategory;

/// Accrual labels for the synthetic month-end entries
pub const ACCRUAL_LABEL_INTEREST_EARNED: &str = "Interest Earned";
pub const ACCRUAL_LABEL_INTEREST_CHARGED: &str = "Interest Charged";
pub const ACCRUAL_LABEL_INVESTMENT_GROWTH: &str = "Investment Growth";

/// How a category folds transactions into its balances: the sign applied to
/// incoming (to_account) and outgoing (from_account) amounts, the label its
/// month-end accrual entry carries, and whether the category counts as a
/// liability in the grand total.
///
/// Note the loan/credit asymmetry: a payment "to" a credit account reduces
/// the amount owed, while money flowing "to" a loan is treated as new
/// principal and increases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPolicy {
    pub category: AccountCategory,
    pub incoming_sign: i8,
    pub outgoing_sign: i8,
    pub accrual_label: &'static str,
    pub liability: bool,
}

pub const POLICY_STANDARD: CategoryPolicy = CategoryPolicy {
    category: AccountCategory::Standard,
    incoming_sign: 1,
    outgoing_sign: -1,
    accrual_label: ACCRUAL_LABEL_INTEREST_EARNED,
    liability: false,
};

pub const POLICY_CREDIT: CategoryPolicy = CategoryPolicy {
    category: AccountCategory::Credit,
    incoming_sign: -1,
    outgoing_sign: 1,
    accrual_label: ACCRUAL_LABEL_INTEREST_CHARGED,
    liability: true,
};

pub const POLICY_LOAN: CategoryPolicy = CategoryPolicy {
    category: AccountCategory::Loan,
    incoming_sign: 1,
    outgoing_sign: 1,
    accrual_label: ACCRUAL_LABEL_INTEREST_CHARGED,
    liability: true,
};

pub const POLICY_INVESTMENT: CategoryPolicy = CategoryPolicy {
    category: AccountCategory::Investment,
    incoming_sign: 1,
    outgoing_sign: -1,
    accrual_label: ACCRUAL_LABEL_INVESTMENT_GROWTH,
    liability: false,
};

/// One itemized entry in an account's day detail. Month-end accrual entries
/// are synthetic and carry no transaction id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub transaction_id: Option<String>,
    pub label: String,
    /// Signed delta this entry applied to the balance
    pub amount: Decimal,
}

/// One account's state on one ledger day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDayState {
    pub account_id: String,
    pub balance: Decimal,
    /// Signed sum of the day's applied deltas; None when exactly zero so
    /// displays can leave quiet days blank
    pub net_change: Option<Decimal>,
    /// Itemized entries behind net_change; None when the day had none
    pub details: Option<Vec<TransactionDetail>>,
}

/// One calendar day of a plan's projected ledger. Derived on demand, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub accounts: HashMap<String, AccountDayState>,
    pub standard_balance: Decimal,
    pub credit_balance: Decimal,
    pub loan_balance: Decimal,
    pub investment_balance: Decimal,
    /// Assets minus liabilities across every linked account
    pub total: Decimal,
    /// Equal to `total` through today, linearly grown for future days
    pub projected_total: Decimal,
}

impl LedgerRow {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            accounts: HashMap::new(),
            standard_balance: Decimal::ZERO,
            credit_balance: Decimal::ZERO,
            loan_balance: Decimal::ZERO,
            investment_balance: Decimal::ZERO,
            total: Decimal::ZERO,
            projected_total: Decimal::ZERO,
        }
    }
}
