use diesel::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::accounts::accounts_model::{Account, AccountCategory, AccountDB, NewAccount};
use crate::accounts::AccountError;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::accounts;

/// Repository for managing account data in the database
pub struct AccountRepository {
    pool: Arc<DbPool>,
}

impl AccountRepository {
    /// Creates a new AccountRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Creates a new account
    pub fn create(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;

        let mut conn = get_connection(&self.pool)?;

        let mut account_db: AccountDB = new_account.into();
        if account_db.id.is_empty() {
            account_db.id = Uuid::new_v4().to_string();
        }

        diesel::insert_into(accounts::table)
            .values(&account_db)
            .get_result::<AccountDB>(&mut conn)
            .map(Account::from)
            .map_err(|e| AccountError::from(e).into())
    }

    /// Retrieves an account by its ID
    pub fn get_by_id(&self, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;

        accounts::table
            .find(account_id)
            .first::<AccountDB>(&mut conn)
            .map(Account::from)
            .map_err(|e| AccountError::from(e).into())
    }

    /// Lists accounts, optionally filtered by category
    pub fn list(&self, category: Option<AccountCategory>) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = accounts::table.order(accounts::name.asc()).into_boxed();
        if let Some(cat) = category {
            query = query.filter(accounts::category.eq(cat.as_str()));
        }

        query
            .load::<AccountDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Account::from).collect())
            .map_err(|e| AccountError::from(e).into())
    }

    /// Overwrites an account's stored balance
    pub fn update_balance(&self, account_id: &str, balance: Decimal) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(accounts::table.find(account_id))
            .set((
                accounts::balance.eq(balance.to_f64().unwrap_or_default()),
                accounts::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<AccountDB>(&mut conn)
            .map(Account::from)
            .map_err(|e| AccountError::from(e).into())
    }

    /// Deletes an account by its ID
    pub fn delete(&self, account_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::delete(accounts::table.find(account_id))
            .execute(&mut conn)
            .map_err(AccountError::from)?;

        if affected == 0 {
            return Err(AccountError::NotFound(account_id.to_string()).into());
        }
        Ok(())
    }
}
