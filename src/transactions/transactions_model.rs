use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::Result;
use crate::transactions::transactions_constants::*;
use crate::transactions::TransactionError;

/// Enum representing the supported transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Transfer,
    LoanPayment,
    InterestPaid,
    InterestEarned,
    CreditCardSpending,
    CreditCardPayment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => TRANSACTION_TYPE_DEPOSIT,
            TransactionType::Withdraw => TRANSACTION_TYPE_WITHDRAW,
            TransactionType::Transfer => TRANSACTION_TYPE_TRANSFER,
            TransactionType::LoanPayment => TRANSACTION_TYPE_LOAN_PAYMENT,
            TransactionType::InterestPaid => TRANSACTION_TYPE_INTEREST_PAID,
            TransactionType::InterestEarned => TRANSACTION_TYPE_INTEREST_EARNED,
            TransactionType::CreditCardSpending => TRANSACTION_TYPE_CREDIT_CARD_SPENDING,
            TransactionType::CreditCardPayment => TRANSACTION_TYPE_CREDIT_CARD_PAYMENT,
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            TRANSACTION_TYPE_DEPOSIT => Ok(TransactionType::Deposit),
            TRANSACTION_TYPE_WITHDRAW => Ok(TransactionType::Withdraw),
            TRANSACTION_TYPE_TRANSFER => Ok(TransactionType::Transfer),
            TRANSACTION_TYPE_LOAN_PAYMENT => Ok(TransactionType::LoanPayment),
            TRANSACTION_TYPE_INTEREST_PAID => Ok(TransactionType::InterestPaid),
            TRANSACTION_TYPE_INTEREST_EARNED => Ok(TransactionType::InterestEarned),
            TRANSACTION_TYPE_CREDIT_CARD_SPENDING => Ok(TransactionType::CreditCardSpending),
            TRANSACTION_TYPE_CREDIT_CARD_PAYMENT => Ok(TransactionType::CreditCardPayment),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// Enum representing the transaction lifecycle states. The engine assigns
/// Created/Scheduled/Posted at write time; later transitions are manual
/// status updates only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    Created,
    Scheduled,
    Posted,
    Pending,
    Canceled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Created => TRANSACTION_STATUS_CREATED,
            TransactionStatus::Scheduled => TRANSACTION_STATUS_SCHEDULED,
            TransactionStatus::Posted => TRANSACTION_STATUS_POSTED,
            TransactionStatus::Pending => TRANSACTION_STATUS_PENDING,
            TransactionStatus::Canceled => TRANSACTION_STATUS_CANCELED,
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            TRANSACTION_STATUS_CREATED => Ok(TransactionStatus::Created),
            TRANSACTION_STATUS_SCHEDULED => Ok(TransactionStatus::Scheduled),
            TRANSACTION_STATUS_POSTED => Ok(TransactionStatus::Posted),
            TRANSACTION_STATUS_PENDING => Ok(TransactionStatus::Pending),
            TRANSACTION_STATUS_CANCELED => Ok(TransactionStatus::Canceled),
            _ => Err(format!("Unknown transaction status: {}", s)),
        }
    }
}

/// The value fields shared between a recurring template and the instances
/// generated from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionValues {
    pub transaction_type: TransactionType,
    pub from_account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl TransactionValues {
    /// Validates the amount and the account references required by the
    /// transaction type:
    ///
    /// - deposit, interest_earned, loan_payment, credit_card_spending,
    ///   credit_card_payment require a to_account
    /// - withdraw, interest_paid require a from_account
    /// - transfer requires at least one of the two
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(
                TransactionError::InvalidData("Amount must be positive".to_string()).into(),
            );
        }

        let has_from = self.from_account_id.is_some();
        let has_to = self.to_account_id.is_some();

        let ok = match self.transaction_type {
            TransactionType::Deposit
            | TransactionType::InterestEarned
            | TransactionType::LoanPayment
            | TransactionType::CreditCardSpending
            | TransactionType::CreditCardPayment => has_to,
            TransactionType::Withdraw | TransactionType::InterestPaid => has_from,
            TransactionType::Transfer => has_from || has_to,
        };

        if !ok {
            return Err(TransactionError::InvalidData(format!(
                "Transaction type {} is missing its required account reference",
                self.transaction_type.as_str()
            ))
            .into());
        }
        Ok(())
    }
}

/// Domain model representing a transaction in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub transaction_type: TransactionType,
    pub from_account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    pub status: TransactionStatus,
    pub description: Option<String>,
    /// Weak back-reference to the recurring series this row belongs to
    pub recurring_series_id: Option<String>,
    /// Marks the single template row of a series, never a scheduled occurrence
    pub is_recurring_template: bool,
    /// When a generated instance was synthesized, for idempotence checks
    pub generation_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// The value fields shared with the series template
    pub fn values(&self) -> TransactionValues {
        TransactionValues {
            transaction_type: self.transaction_type,
            from_account_id: self.from_account_id.clone(),
            to_account_id: self.to_account_id.clone(),
            amount: self.amount,
            description: self.description.clone(),
        }
    }

    /// True when the given account is either endpoint of this transaction
    pub fn touches_account(&self, account_id: &str) -> bool {
        self.from_account_id.as_deref() == Some(account_id)
            || self.to_account_id.as_deref() == Some(account_id)
    }
}

/// Changeset applying shared value fields to template or instance rows
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(treat_none_as_null = true)]
pub struct TransactionValuesChangeset {
    pub transaction_type: String,
    pub from_account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub amount: f64,
    pub description: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl From<&TransactionValues> for TransactionValuesChangeset {
    fn from(values: &TransactionValues) -> Self {
        Self {
            transaction_type: values.transaction_type.as_str().to_string(),
            from_account_id: values.from_account_id.clone(),
            to_account_id: values.to_account_id.clone(),
            amount: values.amount.to_f64().unwrap_or_default(),
            description: values.description.clone(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Database model for transactions
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct TransactionDB {
    pub id: String,
    pub transaction_type: String,
    pub from_account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub amount: f64,
    pub transaction_date: NaiveDate,
    pub status: String,
    pub description: Option<String>,
    pub recurring_series_id: Option<String>,
    pub is_recurring_template: bool,
    pub generation_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub transaction_type: TransactionType,
    pub from_account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    pub status: TransactionStatus,
    pub description: Option<String>,
    pub recurring_series_id: Option<String>,
    pub is_recurring_template: bool,
    pub generation_date: Option<NaiveDateTime>,
}

impl NewTransaction {
    /// Builds an input row from shared template values
    pub fn from_values(
        values: &TransactionValues,
        transaction_date: NaiveDate,
        status: TransactionStatus,
    ) -> Self {
        Self {
            id: None,
            transaction_type: values.transaction_type,
            from_account_id: values.from_account_id.clone(),
            to_account_id: values.to_account_id.clone(),
            amount: values.amount,
            transaction_date,
            status,
            description: values.description.clone(),
            recurring_series_id: None,
            is_recurring_template: false,
            generation_date: None,
        }
    }

    /// Validates the new transaction data
    pub fn validate(&self) -> Result<()> {
        self.values().validate()
    }

    pub fn values(&self) -> TransactionValues {
        TransactionValues {
            transaction_type: self.transaction_type,
            from_account_id: self.from_account_id.clone(),
            to_account_id: self.to_account_id.clone(),
            amount: self.amount,
            description: self.description.clone(),
        }
    }
}

// Conversion implementations
impl TryFrom<TransactionDB> for Transaction {
    type Error = TransactionError;

    fn try_from(db: TransactionDB) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: db.id,
            transaction_type: TransactionType::from_str(&db.transaction_type)
                .map_err(TransactionError::InvalidData)?,
            from_account_id: db.from_account_id,
            to_account_id: db.to_account_id,
            amount: Decimal::from_f64(db.amount).unwrap_or_default(),
            transaction_date: db.transaction_date,
            status: TransactionStatus::from_str(&db.status)
                .map_err(TransactionError::InvalidData)?,
            description: db.description,
            recurring_series_id: db.recurring_series_id,
            is_recurring_template: db.is_recurring_template,
            generation_date: db.generation_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<NewTransaction> for TransactionDB {
    fn from(domain: NewTransaction) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            transaction_type: domain.transaction_type.as_str().to_string(),
            from_account_id: domain.from_account_id,
            to_account_id: domain.to_account_id,
            amount: domain.amount.to_f64().unwrap_or_default(),
            transaction_date: domain.transaction_date,
            status: domain.status.as_str().to_string(),
            description: domain.description,
            recurring_series_id: domain.recurring_series_id,
            is_recurring_template: domain.is_recurring_template,
            generation_date: domain.generation_date,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stored_row(transaction_type: &str, status: &str) -> TransactionDB {
        let now = chrono::Utc::now().naive_utc();
        TransactionDB {
            id: "t-1".to_string(),
            transaction_type: transaction_type.to_string(),
            from_account_id: None,
            to_account_id: Some("acct-1".to_string()),
            amount: 100.0,
            transaction_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            status: status.to_string(),
            description: None,
            recurring_series_id: None,
            is_recurring_template: false,
            generation_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn stored_row_converts_with_known_enums() {
        let transaction = Transaction::try_from(stored_row("DEPOSIT", "POSTED")).unwrap();
        assert_eq!(transaction.transaction_type, TransactionType::Deposit);
        assert_eq!(transaction.status, TransactionStatus::Posted);
    }

    #[test]
    fn unknown_stored_type_is_rejected() {
        let result = Transaction::try_from(stored_row("DIVIDEND", "POSTED"));
        assert!(matches!(result, Err(TransactionError::InvalidData(_))));
    }

    #[test]
    fn unknown_stored_status_is_rejected() {
        let result = Transaction::try_from(stored_row("DEPOSIT", "ARCHIVED"));
        assert!(matches!(result, Err(TransactionError::InvalidData(_))));
    }
}
