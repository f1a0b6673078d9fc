use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::Result;
use crate::recurring::schedule::Schedule;
use crate::recurring::RecurringError;
use crate::transactions::{Transaction, TransactionValues};

pub const RECURRENCE_TYPE_DAILY: &str = "DAILY";
pub const RECURRENCE_TYPE_WEEKLY: &str = "WEEKLY";
pub const RECURRENCE_TYPE_MONTHLY: &str = "MONTHLY";
pub const RECURRENCE_TYPE_YEARLY: &str = "YEARLY";

/// Enum representing the supported recurrence units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::Daily => RECURRENCE_TYPE_DAILY,
            RecurrenceType::Weekly => RECURRENCE_TYPE_WEEKLY,
            RecurrenceType::Monthly => RECURRENCE_TYPE_MONTHLY,
            RecurrenceType::Yearly => RECURRENCE_TYPE_YEARLY,
        }
    }
}

impl FromStr for RecurrenceType {
    type Err = RecurringError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            RECURRENCE_TYPE_DAILY => Ok(RecurrenceType::Daily),
            RECURRENCE_TYPE_WEEKLY => Ok(RecurrenceType::Weekly),
            RECURRENCE_TYPE_MONTHLY => Ok(RecurrenceType::Monthly),
            RECURRENCE_TYPE_YEARLY => Ok(RecurrenceType::Yearly),
            _ => Err(RecurringError::UnknownRecurrenceType(s.to_string())),
        }
    }
}

/// Domain model representing a recurring transaction series
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSeries {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub recurrence_type: RecurrenceType,
    pub recurrence_interval: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl RecurringSeries {
    /// The series' recurrence shape, the input to occurrence calculation
    pub fn schedule(&self) -> Schedule {
        Schedule {
            recurrence_type: self.recurrence_type,
            interval: self.recurrence_interval,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Database model for recurring series
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::recurring_series)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct RecurringSeriesDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub recurrence_type: String,
    pub recurrence_interval: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new recurring series
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringSeries {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub recurrence_type: RecurrenceType,
    #[serde(default = "default_interval")]
    pub recurrence_interval: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

fn default_interval() -> u32 {
    1
}

impl NewRecurringSeries {
    /// Validates the new series data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(
                RecurringError::InvalidData("Series name cannot be empty".to_string()).into(),
            );
        }
        if self.recurrence_interval == 0 {
            return Err(RecurringError::InvalidData(
                "Recurrence interval must be a positive number".to_string(),
            )
            .into());
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(RecurringError::InvalidData(
                    "End date cannot be before start date".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            recurrence_type: self.recurrence_type,
            interval: self.recurrence_interval,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Input model for the template transaction created with a series. The date
/// defaults to the series start date when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub transaction_type: crate::transactions::TransactionType,
    pub from_account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub amount: rust_decimal::Decimal,
    pub description: Option<String>,
    pub transaction_date: Option<NaiveDate>,
}

impl NewTemplate {
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

/// Partial update for series metadata. Absent fields keep their prior value;
/// end_date is the exception and is always overwritten, so clearing it is
/// expressible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub recurrence_type: Option<RecurrenceType>,
    pub recurrence_interval: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Which generated instances an update propagates template fields to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateScope {
    None,
    Future,
    All,
}

/// Instance range a change set's value propagation applies to, resolved
/// from an UpdateScope against "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceValueScope {
    All,
    From(NaiveDate),
}

/// A series together with its template and generated instances
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSeriesBundle {
    pub series: RecurringSeries,
    pub template: Transaction,
    pub instances: Vec<Transaction>,
}

/// The full set of writes one series update performs. The repository applies
/// a change set as a single atomic unit.
#[derive(Debug, Clone)]
pub struct SeriesChangeSet {
    /// Merged series row to store
    pub series: RecurringSeries,
    /// New template value fields, propagated to instances per the scope
    pub template_values: Option<TransactionValues>,
    /// Which surviving instances receive the template values
    pub instance_value_scope: Option<InstanceValueScope>,
    /// Delete instances dated on/after this before inserting new ones
    pub regenerate_from: Option<NaiveDate>,
    /// Replacement instances inserted after the deletion
    pub new_instances: Vec<crate::transactions::NewTransaction>,
}

// Conversion implementations
impl TryFrom<RecurringSeriesDB> for RecurringSeries {
    type Error = RecurringError;

    fn try_from(db: RecurringSeriesDB) -> std::result::Result<Self, Self::Error> {
        let recurrence_interval = u32::try_from(db.recurrence_interval)
            .ok()
            .filter(|interval| *interval > 0)
            .ok_or_else(|| {
                RecurringError::InvalidData(format!(
                    "Invalid recurrence interval: {}",
                    db.recurrence_interval
                ))
            })?;

        Ok(Self {
            id: db.id,
            name: db.name,
            description: db.description,
            recurrence_type: RecurrenceType::from_str(&db.recurrence_type)?,
            recurrence_interval,
            start_date: db.start_date,
            end_date: db.end_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<NewRecurringSeries> for RecurringSeriesDB {
    fn from(domain: NewRecurringSeries) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            description: domain.description,
            recurrence_type: domain.recurrence_type.as_str().to_string(),
            recurrence_interval: domain.recurrence_interval as i32,
            start_date: domain.start_date,
            end_date: domain.end_date,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&RecurringSeries> for RecurringSeriesDB {
    fn from(domain: &RecurringSeries) -> Self {
        Self {
            id: domain.id.clone(),
            name: domain.name.clone(),
            description: domain.description.clone(),
            recurrence_type: domain.recurrence_type.as_str().to_string(),
            recurrence_interval: domain.recurrence_interval as i32,
            start_date: domain.start_date,
            end_date: domain.end_date,
            created_at: domain.created_at,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_row(recurrence_type: &str, recurrence_interval: i32) -> RecurringSeriesDB {
        let now = chrono::Utc::now().naive_utc();
        RecurringSeriesDB {
            id: "s-1".to_string(),
            name: "Rent".to_string(),
            description: None,
            recurrence_type: recurrence_type.to_string(),
            recurrence_interval,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn stored_row_converts_with_known_recurrence() {
        let series = RecurringSeries::try_from(stored_row("MONTHLY", 2)).unwrap();
        assert_eq!(series.recurrence_type, RecurrenceType::Monthly);
        assert_eq!(series.recurrence_interval, 2);
    }

    #[test]
    fn unknown_stored_recurrence_type_is_rejected() {
        let result = RecurringSeries::try_from(stored_row("FORTNIGHTLY", 1));
        assert!(matches!(
            result,
            Err(RecurringError::UnknownRecurrenceType(_))
        ));
    }

    #[test]
    fn non_positive_stored_interval_is_rejected() {
        for interval in [0, -3] {
            let result = RecurringSeries::try_from(stored_row("DAILY", interval));
            assert!(matches!(result, Err(RecurringError::InvalidData(_))));
        }
    }
}
