use chrono::NaiveDate;

use crate::errors::Result;
use crate::recurring::recurring_model::{
    NewRecurringSeries, NewTemplate, RecurringSeries, RecurringSeriesBundle, SeriesChangeSet,
    SeriesUpdate, UpdateScope,
};
use crate::transactions::{NewTransaction, Transaction, TransactionValues};

/// Trait defining the contract for recurring series persistence. Every
/// mutating method is a single atomic unit: all writes it performs succeed
/// or none do.
pub trait RecurringRepositoryTrait: Send + Sync {
    fn get_series(&self, series_id: &str) -> Result<RecurringSeries>;
    fn list_series(&self) -> Result<Vec<RecurringSeries>>;
    fn get_template(&self, series_id: &str) -> Result<Transaction>;
    fn list_instances(&self, series_id: &str) -> Result<Vec<Transaction>>;
    /// Persists the series, its single template and the initial instances
    fn create_series_with_transactions(
        &self,
        new_series: NewRecurringSeries,
        template: NewTransaction,
        instances: Vec<NewTransaction>,
    ) -> Result<RecurringSeriesBundle>;
    /// Applies one update operation's full set of writes
    fn apply_change_set(&self, change_set: SeriesChangeSet) -> Result<RecurringSeries>;
    /// Optionally deletes instances dated on/after `delete_from`, then
    /// inserts the given replacement instances
    fn regenerate_instances(
        &self,
        series_id: &str,
        delete_from: Option<NaiveDate>,
        instances: Vec<NewTransaction>,
    ) -> Result<Vec<Transaction>>;
    /// Deletes the series, cascading to its transactions or unlinking the
    /// generated instances per `keep_instances`
    fn delete_series(&self, series_id: &str, keep_instances: bool) -> Result<()>;
}

/// Trait defining the contract for recurring series operations
#[async_trait::async_trait]
pub trait RecurringServiceTrait: Send + Sync {
    fn get_series(&self, series_id: &str) -> Result<RecurringSeries>;
    fn list_series(&self) -> Result<Vec<RecurringSeries>>;
    fn get_series_transactions(&self, series_id: &str) -> Result<RecurringSeriesBundle>;
    async fn create_series(
        &self,
        new_series: NewRecurringSeries,
        new_template: NewTemplate,
        horizon_hint: Option<NaiveDate>,
    ) -> Result<RecurringSeriesBundle>;
    async fn update_series(
        &self,
        series_id: &str,
        series_update: SeriesUpdate,
        template_update: Option<TransactionValues>,
        scope: UpdateScope,
    ) -> Result<RecurringSeriesBundle>;
    async fn generate_transactions(
        &self,
        series_id: &str,
        start_from: Option<NaiveDate>,
        regenerate_all: bool,
    ) -> Result<Vec<Transaction>>;
    async fn delete_series(&self, series_id: &str, keep_instances: bool) -> Result<()>;
}
