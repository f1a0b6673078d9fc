use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::{Account, AccountCategory};
use crate::errors::Result;
use crate::plans::PlanError;

/// Domain model representing a financial plan: a goal with a date range,
/// an optional target amount, and a set of linked accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_amount: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for plans
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::plans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct PlanDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_amount: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_amount: Option<Decimal>,
}

impl NewPlan {
    /// Validates the new plan data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlanError::InvalidData("Plan name cannot be empty".to_string()).into());
        }
        if self.end_date <= self.start_date {
            return Err(PlanError::InvalidData(
                "Plan end date must be after start date".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Database model for the plan/account link table
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::plan_accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlanAccountLink {
    pub id: String,
    pub plan_id: String,
    pub account_id: String,
}

/// A plan's linked accounts, grouped by category (the input shape the
/// ledger projector consumes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAccounts {
    pub standard: Vec<Account>,
    pub credit: Vec<Account>,
    pub loan: Vec<Account>,
    pub investment: Vec<Account>,
}

impl PlanAccounts {
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        let mut groups = PlanAccounts::default();
        for account in accounts {
            match account.category {
                AccountCategory::Standard => groups.standard.push(account),
                AccountCategory::Credit => groups.credit.push(account),
                AccountCategory::Loan => groups.loan.push(account),
                AccountCategory::Investment => groups.investment.push(account),
            }
        }
        groups
    }

    pub fn is_empty(&self) -> bool {
        self.standard.is_empty()
            && self.credit.is_empty()
            && self.loan.is_empty()
            && self.investment.is_empty()
    }
}

// Conversion implementations
impl From<PlanDB> for Plan {
    fn from(db: PlanDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            start_date: db.start_date,
            end_date: db.end_date,
            target_amount: db.target_amount.and_then(Decimal::from_f64),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewPlan> for PlanDB {
    fn from(domain: NewPlan) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            description: domain.description,
            start_date: domain.start_date,
            end_date: domain.end_date,
            target_amount: domain.target_amount.and_then(|d| d.to_f64()),
            created_at: now,
            updated_at: now,
        }
    }
}
