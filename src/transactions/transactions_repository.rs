use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::transactions;
use crate::transactions::transactions_model::{
    NewTransaction, Transaction, TransactionDB, TransactionStatus,
};
use crate::transactions::TransactionError;

/// Repository for managing standalone transaction data in the database.
/// Series-scoped bulk mutations live in the recurring repository where they
/// run inside the engine's atomic units.
pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Creates a new transaction
    pub fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;

        let mut conn = get_connection(&self.pool)?;

        let mut transaction_db: TransactionDB = new_transaction.into();
        if transaction_db.id.is_empty() {
            transaction_db.id = Uuid::new_v4().to_string();
        }

        let row = diesel::insert_into(transactions::table)
            .values(&transaction_db)
            .get_result::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)?;
        Transaction::try_from(row).map_err(Into::into)
    }

    /// Retrieves a transaction by its ID
    pub fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;

        let row = transactions::table
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)?;
        Transaction::try_from(row).map_err(Into::into)
    }

    /// Lists non-template transactions dated within [start_date, end_date]
    /// inclusive, ordered by date; this is the ledger projector's input
    pub fn list_in_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        transactions::table
            .filter(transactions::is_recurring_template.eq(false))
            .filter(transactions::transaction_date.ge(start_date))
            .filter(transactions::transaction_date.le(end_date))
            .order((
                transactions::transaction_date.asc(),
                transactions::created_at.asc(),
            ))
            .load::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)?
            .into_iter()
            .map(|row| Transaction::try_from(row).map_err(Into::into))
            .collect()
    }

    /// Lists every transaction referencing a series, template included
    pub fn list_for_series(&self, series_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        transactions::table
            .filter(transactions::recurring_series_id.eq(series_id))
            .order(transactions::transaction_date.asc())
            .load::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)?
            .into_iter()
            .map(|row| Transaction::try_from(row).map_err(Into::into))
            .collect()
    }

    /// Sets a transaction's status. This is the only path by which a
    /// generated instance moves between states after generation.
    pub fn update_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;

        let row = diesel::update(transactions::table.find(transaction_id))
            .set((
                transactions::status.eq(status.as_str()),
                transactions::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)?;
        Transaction::try_from(row).map_err(Into::into)
    }

    /// Deletes a transaction by its ID
    pub fn delete(&self, transaction_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::delete(transactions::table.find(transaction_id))
            .execute(&mut conn)
            .map_err(TransactionError::from)?;

        if affected == 0 {
            return Err(TransactionError::NotFound(transaction_id.to_string()).into());
        }
        Ok(())
    }
}
