use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{get_connection, DbPool};
use crate::errors::{Error, Result};
use crate::recurring::recurring_model::{
    InstanceValueScope, NewRecurringSeries, RecurringSeries, RecurringSeriesBundle,
    RecurringSeriesDB, SeriesChangeSet,
};
use crate::recurring::{RecurringError, RecurringRepositoryTrait};
use crate::schema::{recurring_series, transactions};
use crate::transactions::{NewTransaction, Transaction, TransactionDB, TransactionValuesChangeset};

/// Repository for recurring series persistence. Every mutating method runs
/// its writes inside one database transaction, so a failure partway rolls
/// back the whole operation.
pub struct RecurringRepository {
    pool: Arc<DbPool>,
}

impl RecurringRepository {
    /// Creates a new RecurringRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn insert_transaction(
        conn: &mut SqliteConnection,
        series_id: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        let mut row: TransactionDB = new_transaction.into();
        if row.id.is_empty() {
            row.id = Uuid::new_v4().to_string();
        }
        row.recurring_series_id = Some(series_id.to_string());

        let inserted = diesel::insert_into(transactions::table)
            .values(&row)
            .get_result::<TransactionDB>(conn)?;
        Transaction::try_from(inserted).map_err(Error::from)
    }

}

impl RecurringRepositoryTrait for RecurringRepository {
    fn get_series(&self, series_id: &str) -> Result<RecurringSeries> {
        let mut conn = get_connection(&self.pool)?;

        let row = recurring_series::table
            .find(series_id)
            .first::<RecurringSeriesDB>(&mut conn)
            .optional()
            .map_err(RecurringError::from)?
            .ok_or_else(|| RecurringError::NotFound(series_id.to_string()))?;

        RecurringSeries::try_from(row).map_err(Into::into)
    }

    fn list_series(&self) -> Result<Vec<RecurringSeries>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = recurring_series::table
            .order(recurring_series::start_date.asc())
            .load::<RecurringSeriesDB>(&mut conn)
            .map_err(RecurringError::from)?;

        rows.into_iter()
            .map(|row| RecurringSeries::try_from(row).map_err(Into::into))
            .collect()
    }

    fn get_template(&self, series_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;

        let row = transactions::table
            .filter(transactions::recurring_series_id.eq(series_id))
            .filter(transactions::is_recurring_template.eq(true))
            .first::<TransactionDB>(&mut conn)
            .optional()
            .map_err(RecurringError::from)?
            .ok_or_else(|| RecurringError::TemplateNotFound(series_id.to_string()))?;
        Transaction::try_from(row).map_err(Into::into)
    }

    fn list_instances(&self, series_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        transactions::table
            .filter(transactions::recurring_series_id.eq(series_id))
            .filter(transactions::is_recurring_template.eq(false))
            .order(transactions::transaction_date.asc())
            .load::<TransactionDB>(&mut conn)
            .map_err(RecurringError::from)?
            .into_iter()
            .map(|row| Transaction::try_from(row).map_err(Into::into))
            .collect()
    }

    fn create_series_with_transactions(
        &self,
        new_series: NewRecurringSeries,
        template: NewTransaction,
        instances: Vec<NewTransaction>,
    ) -> Result<RecurringSeriesBundle> {
        let mut conn = get_connection(&self.pool)?;

        conn.transaction::<_, Error, _>(|conn| {
            let mut series_db: RecurringSeriesDB = new_series.into();
            if series_db.id.is_empty() {
                series_db.id = Uuid::new_v4().to_string();
            }

            let series_db = diesel::insert_into(recurring_series::table)
                .values(&series_db)
                .get_result::<RecurringSeriesDB>(conn)?;
            let series_id = series_db.id.clone();

            let template = Self::insert_transaction(conn, &series_id, template)?;

            let mut inserted = Vec::with_capacity(instances.len());
            for instance in instances {
                inserted.push(Self::insert_transaction(conn, &series_id, instance)?);
            }

            Ok(RecurringSeriesBundle {
                series: RecurringSeries::try_from(series_db)?,
                template,
                instances: inserted,
            })
        })
    }

    fn apply_change_set(&self, change_set: SeriesChangeSet) -> Result<RecurringSeries> {
        let mut conn = get_connection(&self.pool)?;

        conn.transaction::<_, Error, _>(|conn| {
            let series_id = change_set.series.id.clone();
            let series_db = RecurringSeriesDB::from(&change_set.series);

            let affected = diesel::update(recurring_series::table.find(&series_id))
                .set(&series_db)
                .execute(conn)?;
            if affected == 0 {
                return Err(RecurringError::NotFound(series_id).into());
            }

            if let Some(values) = &change_set.template_values {
                diesel::update(
                    transactions::table
                        .filter(transactions::recurring_series_id.eq(&series_id))
                        .filter(transactions::is_recurring_template.eq(true)),
                )
                .set(TransactionValuesChangeset::from(values))
                .execute(conn)?;

                match change_set.instance_value_scope {
                    Some(InstanceValueScope::All) => {
                        diesel::update(
                            transactions::table
                                .filter(transactions::recurring_series_id.eq(&series_id))
                                .filter(transactions::is_recurring_template.eq(false)),
                        )
                        .set(TransactionValuesChangeset::from(values))
                        .execute(conn)?;
                    }
                    Some(InstanceValueScope::From(date_from)) => {
                        diesel::update(
                            transactions::table
                                .filter(transactions::recurring_series_id.eq(&series_id))
                                .filter(transactions::is_recurring_template.eq(false))
                                .filter(transactions::transaction_date.ge(date_from)),
                        )
                        .set(TransactionValuesChangeset::from(values))
                        .execute(conn)?;
                    }
                    None => {}
                }
            }

            if let Some(regenerate_from) = change_set.regenerate_from {
                diesel::delete(
                    transactions::table
                        .filter(transactions::recurring_series_id.eq(&series_id))
                        .filter(transactions::is_recurring_template.eq(false))
                        .filter(transactions::transaction_date.ge(regenerate_from)),
                )
                .execute(conn)?;

                for instance in change_set.new_instances {
                    Self::insert_transaction(conn, &series_id, instance)?;
                }
            }

            let row = recurring_series::table
                .find(&series_id)
                .first::<RecurringSeriesDB>(conn)?;
            RecurringSeries::try_from(row).map_err(Into::into)
        })
    }

    fn regenerate_instances(
        &self,
        series_id: &str,
        delete_from: Option<NaiveDate>,
        instances: Vec<NewTransaction>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        conn.transaction::<_, Error, _>(|conn| {
            if let Some(date_from) = delete_from {
                diesel::delete(
                    transactions::table
                        .filter(transactions::recurring_series_id.eq(series_id))
                        .filter(transactions::is_recurring_template.eq(false))
                        .filter(transactions::transaction_date.ge(date_from)),
                )
                .execute(conn)?;
            }

            let mut inserted = Vec::with_capacity(instances.len());
            for instance in instances {
                inserted.push(Self::insert_transaction(conn, series_id, instance)?);
            }
            Ok(inserted)
        })
    }

    fn delete_series(&self, series_id: &str, keep_instances: bool) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        conn.transaction::<_, Error, _>(|conn| {
            let exists = recurring_series::table
                .find(series_id)
                .first::<RecurringSeriesDB>(conn)
                .optional()?;
            if exists.is_none() {
                return Err(RecurringError::NotFound(series_id.to_string()).into());
            }

            if keep_instances {
                // Drop the template, keep the instances as ordinary transactions
                diesel::delete(
                    transactions::table
                        .filter(transactions::recurring_series_id.eq(series_id))
                        .filter(transactions::is_recurring_template.eq(true)),
                )
                .execute(conn)?;

                diesel::update(
                    transactions::table.filter(transactions::recurring_series_id.eq(series_id)),
                )
                .set(transactions::recurring_series_id.eq(None::<String>))
                .execute(conn)?;
            } else {
                diesel::delete(
                    transactions::table.filter(transactions::recurring_series_id.eq(series_id)),
                )
                .execute(conn)?;
            }

            diesel::delete(recurring_series::table.find(series_id)).execute(conn)?;
            Ok(())
        })
    }
}
