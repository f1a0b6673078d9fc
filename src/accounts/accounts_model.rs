use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::accounts::AccountError;
use crate::errors::Result;

pub const ACCOUNT_CATEGORY_STANDARD: &str = "STANDARD";
pub const ACCOUNT_CATEGORY_CREDIT: &str = "CREDIT";
pub const ACCOUNT_CATEGORY_LOAN: &str = "LOAN";
pub const ACCOUNT_CATEGORY_INVESTMENT: &str = "INVESTMENT";

/// The four account categories the planner tracks.
///
/// Sign convention: a positive balance is an asset for standard/investment
/// accounts and an amount owed for credit/loan accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountCategory {
    Standard,
    Credit,
    Loan,
    Investment,
}

impl AccountCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountCategory::Standard => ACCOUNT_CATEGORY_STANDARD,
            AccountCategory::Credit => ACCOUNT_CATEGORY_CREDIT,
            AccountCategory::Loan => ACCOUNT_CATEGORY_LOAN,
            AccountCategory::Investment => ACCOUNT_CATEGORY_INVESTMENT,
        }
    }
}

impl FromStr for AccountCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            ACCOUNT_CATEGORY_STANDARD => Ok(AccountCategory::Standard),
            ACCOUNT_CATEGORY_CREDIT => Ok(AccountCategory::Credit),
            ACCOUNT_CATEGORY_LOAN => Ok(AccountCategory::Loan),
            ACCOUNT_CATEGORY_INVESTMENT => Ok(AccountCategory::Investment),
            _ => Err(format!("Unknown account category: {}", s)),
        }
    }
}

/// Domain model representing an account in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub category: AccountCategory,
    /// Sub-type within the category (e.g. checking/savings, ira/brokerage)
    pub account_type: Option<String>,
    pub balance: Decimal,
    pub apr: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub term_months: Option<i32>,
    pub expected_return: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Annual accrual rate (percent) for this account's category, if any.
    /// Standard accounts accrue at their APR, credit and loan accounts at
    /// their interest rate, investment accounts at their expected return.
    pub fn annual_rate(&self) -> Option<Decimal> {
        match self.category {
            AccountCategory::Standard => self.apr,
            AccountCategory::Credit | AccountCategory::Loan => self.interest_rate,
            AccountCategory::Investment => self.expected_return,
        }
    }
}

/// Database model for accounts
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct AccountDB {
    pub id: String,
    pub name: String,
    pub category: String,
    pub account_type: Option<String>,
    pub balance: f64,
    pub apr: Option<f64>,
    pub credit_limit: Option<f64>,
    pub interest_rate: Option<f64>,
    pub term_months: Option<i32>,
    pub expected_return: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub category: AccountCategory,
    pub account_type: Option<String>,
    pub balance: Decimal,
    pub apr: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub term_months: Option<i32>,
    pub expected_return: Option<Decimal>,
}

impl NewAccount {
    /// Validates the new account data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AccountError::InvalidData("Account name cannot be empty".to_string()).into());
        }
        for (field, rate) in [
            ("apr", self.apr),
            ("interestRate", self.interest_rate),
            ("expectedReturn", self.expected_return),
        ] {
            if let Some(r) = rate {
                if r < Decimal::ZERO {
                    return Err(AccountError::InvalidData(format!(
                        "Field '{}' cannot be negative",
                        field
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }
}

// Conversion implementations
impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            category: AccountCategory::from_str(&db.category)
                .unwrap_or(AccountCategory::Standard),
            account_type: db.account_type,
            balance: Decimal::from_f64(db.balance).unwrap_or_default(),
            apr: db.apr.and_then(Decimal::from_f64),
            credit_limit: db.credit_limit.and_then(Decimal::from_f64),
            interest_rate: db.interest_rate.and_then(Decimal::from_f64),
            term_months: db.term_months,
            expected_return: db.expected_return.and_then(Decimal::from_f64),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewAccount> for AccountDB {
    fn from(domain: NewAccount) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            category: domain.category.as_str().to_string(),
            account_type: domain.account_type,
            balance: domain.balance.to_f64().unwrap_or_default(),
            apr: domain.apr.and_then(|d| d.to_f64()),
            credit_limit: domain.credit_limit.and_then(|d| d.to_f64()),
            interest_rate: domain.interest_rate.and_then(|d| d.to_f64()),
            term_months: domain.term_months,
            expected_return: domain.expected_return.and_then(|d| d.to_f64()),
            created_at: now,
            updated_at: now,
        }
    }
}
