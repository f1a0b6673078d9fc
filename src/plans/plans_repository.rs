use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::accounts::{Account, AccountDB};
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::plans::plans_model::{NewPlan, Plan, PlanAccountLink, PlanAccounts, PlanDB};
use crate::plans::PlanError;
use crate::schema::{accounts, plan_accounts, plans};

/// Repository for managing plan data in the database
pub struct PlanRepository {
    pool: Arc<DbPool>,
}

impl PlanRepository {
    /// Creates a new PlanRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Creates a new plan
    pub fn create(&self, new_plan: NewPlan) -> Result<Plan> {
        new_plan.validate()?;

        let mut conn = get_connection(&self.pool)?;

        let mut plan_db: PlanDB = new_plan.into();
        if plan_db.id.is_empty() {
            plan_db.id = Uuid::new_v4().to_string();
        }

        diesel::insert_into(plans::table)
            .values(&plan_db)
            .get_result::<PlanDB>(&mut conn)
            .map(Plan::from)
            .map_err(|e| PlanError::from(e).into())
    }

    /// Retrieves a plan by its ID
    pub fn get_by_id(&self, plan_id: &str) -> Result<Plan> {
        let mut conn = get_connection(&self.pool)?;

        plans::table
            .find(plan_id)
            .first::<PlanDB>(&mut conn)
            .map(Plan::from)
            .map_err(|e| PlanError::from(e).into())
    }

    /// Lists all plans ordered by start date
    pub fn list(&self) -> Result<Vec<Plan>> {
        let mut conn = get_connection(&self.pool)?;

        plans::table
            .order(plans::start_date.asc())
            .load::<PlanDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Plan::from).collect())
            .map_err(|e| PlanError::from(e).into())
    }

    /// Deletes a plan; links are removed by the cascade
    pub fn delete(&self, plan_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::delete(plans::table.find(plan_id))
            .execute(&mut conn)
            .map_err(PlanError::from)?;

        if affected == 0 {
            return Err(PlanError::NotFound(plan_id.to_string()).into());
        }
        Ok(())
    }

    /// Links an account to a plan; linking twice is a no-op
    pub fn link_account(&self, plan_id: &str, account_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        let link = PlanAccountLink {
            id: Uuid::new_v4().to_string(),
            plan_id: plan_id.to_string(),
            account_id: account_id.to_string(),
        };

        diesel::insert_into(plan_accounts::table)
            .values(&link)
            .on_conflict((plan_accounts::plan_id, plan_accounts::account_id))
            .do_nothing()
            .execute(&mut conn)
            .map_err(PlanError::from)?;
        Ok(())
    }

    /// Unlinks an account from a plan
    pub fn unlink_account(&self, plan_id: &str, account_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        diesel::delete(
            plan_accounts::table
                .filter(plan_accounts::plan_id.eq(plan_id))
                .filter(plan_accounts::account_id.eq(account_id)),
        )
        .execute(&mut conn)
        .map_err(PlanError::from)?;
        Ok(())
    }

    /// Retrieves a plan's linked accounts grouped by category, the shape the
    /// ledger projector takes as input
    pub fn accounts_for_plan(&self, plan_id: &str) -> Result<PlanAccounts> {
        let mut conn = get_connection(&self.pool)?;

        let linked: Vec<Account> = plan_accounts::table
            .inner_join(accounts::table.on(accounts::id.eq(plan_accounts::account_id)))
            .filter(plan_accounts::plan_id.eq(plan_id))
            .select(AccountDB::as_select())
            .order(accounts::name.asc())
            .load::<AccountDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Account::from).collect())
            .map_err(PlanError::from)?;

        Ok(PlanAccounts::from_accounts(linked))
    }

    /// Latest end date across all plans, used as the generation horizon hint
    /// when creating a recurring series
    pub fn max_end_date(&self) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;

        plans::table
            .select(diesel::dsl::max(plans::end_date))
            .first::<Option<NaiveDate>>(&mut conn)
            .map_err(|e| PlanError::from(e).into())
    }
}
