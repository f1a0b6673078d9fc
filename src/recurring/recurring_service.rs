use chrono::{NaiveDate, Utc};
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::INCREMENTAL_GENERATION_COUNT;
use crate::errors::Result;
use crate::recurring::recurring_model::{
    InstanceValueScope, NewRecurringSeries, NewTemplate, RecurringSeries, RecurringSeriesBundle,
    SeriesChangeSet, SeriesUpdate, UpdateScope,
};
use crate::recurring::schedule::{
    calculate_occurrences, estimate_occurrence_count, widen_for_horizon, Schedule,
};
use crate::recurring::{RecurringError, RecurringRepositoryTrait, RecurringServiceTrait};
use crate::transactions::{NewTransaction, Transaction, TransactionStatus, TransactionValues};

/// Service implementing the recurring-transaction engine: expanding a
/// series' recurrence rule into concrete instances and keeping those
/// instances synchronized as the rule or template changes.
pub struct RecurringService {
    repository: Arc<dyn RecurringRepositoryTrait>,
}

impl RecurringService {
    /// Creates a new RecurringService instance with an injected repository
    pub fn new(repository: Arc<dyn RecurringRepositoryTrait>) -> Self {
        Self { repository }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Status assigned to an instance at generation time. It is fixed here;
    /// the only later transition is a manual status update.
    fn status_for(date: NaiveDate, today: NaiveDate) -> TransactionStatus {
        if date <= today {
            TransactionStatus::Posted
        } else {
            TransactionStatus::Scheduled
        }
    }

    fn build_instances(
        series_id: Option<&str>,
        values: &TransactionValues,
        dates: &[NaiveDate],
        today: NaiveDate,
    ) -> Vec<NewTransaction> {
        let generated_at = Utc::now().naive_utc();
        dates
            .iter()
            .map(|&date| {
                let mut instance =
                    NewTransaction::from_values(values, date, Self::status_for(date, today));
                instance.recurring_series_id = series_id.map(String::from);
                instance.generation_date = Some(generated_at);
                instance
            })
            .collect()
    }

    fn merge_update(series: &RecurringSeries, update: &SeriesUpdate) -> Result<RecurringSeries> {
        let mut merged = series.clone();
        if let Some(name) = &update.name {
            merged.name = name.clone();
        }
        if let Some(description) = &update.description {
            merged.description = Some(description.clone());
        }
        if let Some(recurrence_type) = update.recurrence_type {
            merged.recurrence_type = recurrence_type;
        }
        if let Some(interval) = update.recurrence_interval {
            merged.recurrence_interval = interval;
        }
        if let Some(start_date) = update.start_date {
            merged.start_date = start_date;
        }
        // end_date is always overwritten so that clearing it is expressible
        merged.end_date = update.end_date;

        if merged.name.trim().is_empty() {
            return Err(
                RecurringError::InvalidData("Series name cannot be empty".to_string()).into(),
            );
        }
        if merged.recurrence_interval == 0 {
            return Err(RecurringError::InvalidData(
                "Recurrence interval must be a positive number".to_string(),
            )
            .into());
        }
        if let Some(end) = merged.end_date {
            if end < merged.start_date {
                return Err(RecurringError::InvalidData(
                    "End date cannot be before start date".to_string(),
                )
                .into());
            }
        }
        Ok(merged)
    }

    fn shape_changed(before: &RecurringSeries, after: &RecurringSeries) -> bool {
        before.recurrence_type != after.recurrence_type
            || before.recurrence_interval != after.recurrence_interval
            || before.start_date != after.start_date
            || before.end_date != after.end_date
    }

    fn regeneration_dates(
        schedule: &Schedule,
        start_from: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let count = estimate_occurrence_count(schedule);
        calculate_occurrences(schedule, start_from, count)
    }
}

#[async_trait::async_trait]
impl RecurringServiceTrait for RecurringService {
    fn get_series(&self, series_id: &str) -> Result<RecurringSeries> {
        self.repository.get_series(series_id)
    }

    fn list_series(&self) -> Result<Vec<RecurringSeries>> {
        self.repository.list_series()
    }

    /// Retrieves a series with its template and generated instances
    fn get_series_transactions(&self, series_id: &str) -> Result<RecurringSeriesBundle> {
        Ok(RecurringSeriesBundle {
            series: self.repository.get_series(series_id)?,
            template: self.repository.get_template(series_id)?,
            instances: self.repository.list_instances(series_id)?,
        })
    }

    /// Creates a series with its template transaction and the initial batch
    /// of generated instances, atomically.
    ///
    /// `horizon_hint` is the latest relevant planning date known to the
    /// caller (typically the latest plan end date); when it reaches past the
    /// naive generation horizon the occurrence count is widened so the
    /// instances are likely to cover it.
    async fn create_series(
        &self,
        new_series: NewRecurringSeries,
        new_template: NewTemplate,
        horizon_hint: Option<NaiveDate>,
    ) -> Result<RecurringSeriesBundle> {
        new_series.validate()?;
        let values = new_template.values();
        values.validate()?;

        let schedule = new_series.schedule();
        let count = widen_for_horizon(
            &schedule,
            estimate_occurrence_count(&schedule),
            horizon_hint,
        )?;
        let dates = calculate_occurrences(&schedule, schedule.start_date, count)?;

        debug!(
            "Creating recurring series '{}' with {} occurrences",
            new_series.name,
            dates.len()
        );

        let today = Self::today();
        let template_date = new_template
            .transaction_date
            .unwrap_or(new_series.start_date);
        let mut template =
            NewTransaction::from_values(&values, template_date, TransactionStatus::Created);
        template.is_recurring_template = true;

        let instances = Self::build_instances(None, &values, &dates, today);

        self.repository
            .create_series_with_transactions(new_series, template, instances)
    }

    /// Updates series metadata and optionally the template, propagating
    /// template fields to instances per `scope`. A change to the recurrence
    /// shape (type, interval, start or end date) invalidates previously
    /// scheduled dates, so future instances are deleted and regenerated
    /// regardless of scope. All writes apply atomically.
    async fn update_series(
        &self,
        series_id: &str,
        series_update: SeriesUpdate,
        template_update: Option<TransactionValues>,
        scope: UpdateScope,
    ) -> Result<RecurringSeriesBundle> {
        let series = self.repository.get_series(series_id)?;
        let template = self.repository.get_template(series_id)?;

        let merged = Self::merge_update(&series, &series_update)?;
        if let Some(values) = &template_update {
            values.validate()?;
        }

        let today = Self::today();
        let instance_value_scope = match (&template_update, scope) {
            (None, _) | (_, UpdateScope::None) => None,
            (Some(_), UpdateScope::Future) => Some(InstanceValueScope::From(today)),
            (Some(_), UpdateScope::All) => Some(InstanceValueScope::All),
        };

        let mut change_set = SeriesChangeSet {
            series: merged.clone(),
            template_values: template_update.clone(),
            instance_value_scope,
            regenerate_from: None,
            new_instances: Vec::new(),
        };

        if Self::shape_changed(&series, &merged) {
            debug!(
                "Recurrence shape changed for series {}; regenerating future instances",
                series_id
            );
            let effective_values = template_update.unwrap_or_else(|| template.values());
            let dates = Self::regeneration_dates(&merged.schedule(), today)?;
            change_set.regenerate_from = Some(today);
            change_set.new_instances =
                Self::build_instances(Some(series_id), &effective_values, &dates, today);
        }

        let updated = self.repository.apply_change_set(change_set)?;

        Ok(RecurringSeriesBundle {
            template: self.repository.get_template(&updated.id)?,
            instances: self.repository.list_instances(&updated.id)?,
            series: updated,
        })
    }

    /// Generates instance transactions for a series.
    ///
    /// With `regenerate_all`, instances dated on/after `start_from` are
    /// deleted and rebuilt from the schedule. Otherwise generation is
    /// incremental: the occurrence grid continues from the day after the
    /// latest existing instance, skipping any date that already has one, so
    /// repeated refreshes extend an open-ended series without duplicating a
    /// date and a bounded series stops at its end date.
    async fn generate_transactions(
        &self,
        series_id: &str,
        start_from: Option<NaiveDate>,
        regenerate_all: bool,
    ) -> Result<Vec<Transaction>> {
        let series = self.repository.get_series(series_id)?;
        let template = self.repository.get_template(series_id)?;

        let values = template.values();
        let schedule = series.schedule();
        let today = Self::today();

        if regenerate_all {
            let from = start_from.unwrap_or(today);
            let dates = Self::regeneration_dates(&schedule, from)?;
            debug!(
                "Regenerating {} instances for series {} from {}",
                dates.len(),
                series_id,
                from
            );
            let instances = Self::build_instances(Some(series_id), &values, &dates, today);
            return self
                .repository
                .regenerate_instances(series_id, Some(from), instances);
        }

        let existing = self.repository.list_instances(series_id)?;
        let existing_dates: HashSet<NaiveDate> =
            existing.iter().map(|t| t.transaction_date).collect();
        let start_from = match existing_dates.iter().max() {
            Some(latest) => match latest.succ_opt() {
                Some(next) => next,
                None => return Ok(Vec::new()),
            },
            None => series.start_date,
        };

        let candidates =
            calculate_occurrences(&schedule, start_from, INCREMENTAL_GENERATION_COUNT)?;
        let new_dates: Vec<NaiveDate> = candidates
            .into_iter()
            .filter(|date| !existing_dates.contains(date))
            .collect();

        if new_dates.is_empty() {
            debug!("No new occurrences to generate for series {}", series_id);
            return Ok(Vec::new());
        }

        let instances = Self::build_instances(Some(series_id), &values, &new_dates, today);
        self.repository
            .regenerate_instances(series_id, None, instances)
    }

    /// Deletes a series. With `keep_instances` the generated instances are
    /// unlinked and survive as ordinary transactions; otherwise the template
    /// and every instance are removed with the series.
    async fn delete_series(&self, series_id: &str, keep_instances: bool) -> Result<()> {
        debug!(
            "Deleting series {} (keep_instances: {})",
            series_id, keep_instances
        );
        self.repository.delete_series(series_id, keep_instances)
    }
}
