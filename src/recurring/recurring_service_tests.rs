use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::recurring::recurring_model::{
    InstanceValueScope, NewRecurringSeries, NewTemplate, RecurrenceType, RecurringSeries,
    RecurringSeriesBundle, SeriesChangeSet, SeriesUpdate, UpdateScope,
};
use crate::recurring::{
    RecurringError, RecurringRepositoryTrait, RecurringService, RecurringServiceTrait,
};
use crate::transactions::{
    NewTransaction, Transaction, TransactionStatus, TransactionType, TransactionValues,
};

// ---------- Mock repository ----------

#[derive(Default)]
struct MockState {
    series: HashMap<String, RecurringSeries>,
    transactions: Vec<Transaction>,
}

struct MockRecurringRepository {
    state: RwLock<MockState>,
    fail_creates: bool,
}

impl MockRecurringRepository {
    fn new() -> Self {
        Self {
            state: RwLock::new(MockState::default()),
            fail_creates: false,
        }
    }

    fn failing_on_create() -> Self {
        Self {
            state: RwLock::new(MockState::default()),
            fail_creates: true,
        }
    }

    fn seed_series(&self, series: RecurringSeries) {
        let mut state = self.state.write().unwrap();
        state.series.insert(series.id.clone(), series);
    }

    fn seed_transaction(&self, transaction: Transaction) {
        let mut state = self.state.write().unwrap();
        state.transactions.push(transaction);
    }

    fn series_count(&self) -> usize {
        self.state.read().unwrap().series.len()
    }

    fn transaction_count(&self) -> usize {
        self.state.read().unwrap().transactions.len()
    }

    fn instances_of(&self, series_id: &str) -> Vec<Transaction> {
        let state = self.state.read().unwrap();
        let mut instances: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| {
                t.recurring_series_id.as_deref() == Some(series_id) && !t.is_recurring_template
            })
            .cloned()
            .collect();
        instances.sort_by_key(|t| t.transaction_date);
        instances
    }

    fn materialize(new: NewTransaction, series_id: Option<&str>) -> Transaction {
        let now = Utc::now().naive_utc();
        Transaction {
            id: new.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            transaction_type: new.transaction_type,
            from_account_id: new.from_account_id,
            to_account_id: new.to_account_id,
            amount: new.amount,
            transaction_date: new.transaction_date,
            status: new.status,
            description: new.description,
            recurring_series_id: series_id
                .map(String::from)
                .or(new.recurring_series_id),
            is_recurring_template: new.is_recurring_template,
            generation_date: new.generation_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_values(transaction: &mut Transaction, values: &TransactionValues) {
        transaction.transaction_type = values.transaction_type;
        transaction.from_account_id = values.from_account_id.clone();
        transaction.to_account_id = values.to_account_id.clone();
        transaction.amount = values.amount;
        transaction.description = values.description.clone();
    }
}

impl RecurringRepositoryTrait for MockRecurringRepository {
    fn get_series(&self, series_id: &str) -> Result<RecurringSeries> {
        self.state
            .read()
            .unwrap()
            .series
            .get(series_id)
            .cloned()
            .ok_or_else(|| RecurringError::NotFound(series_id.to_string()).into())
    }

    fn list_series(&self) -> Result<Vec<RecurringSeries>> {
        let mut all: Vec<RecurringSeries> =
            self.state.read().unwrap().series.values().cloned().collect();
        all.sort_by_key(|s| s.start_date);
        Ok(all)
    }

    fn get_template(&self, series_id: &str) -> Result<Transaction> {
        self.state
            .read()
            .unwrap()
            .transactions
            .iter()
            .find(|t| {
                t.recurring_series_id.as_deref() == Some(series_id) && t.is_recurring_template
            })
            .cloned()
            .ok_or_else(|| RecurringError::TemplateNotFound(series_id.to_string()).into())
    }

    fn list_instances(&self, series_id: &str) -> Result<Vec<Transaction>> {
        Ok(self.instances_of(series_id))
    }

    fn create_series_with_transactions(
        &self,
        new_series: NewRecurringSeries,
        template: NewTransaction,
        instances: Vec<NewTransaction>,
    ) -> Result<RecurringSeriesBundle> {
        if self.fail_creates {
            // Simulated storage failure: nothing written, like a rolled-back
            // transaction
            return Err(RecurringError::DatabaseError("insert failed".to_string()).into());
        }

        let now = Utc::now().naive_utc();
        let series = RecurringSeries {
            id: new_series
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_series.name,
            description: new_series.description,
            recurrence_type: new_series.recurrence_type,
            recurrence_interval: new_series.recurrence_interval,
            start_date: new_series.start_date,
            end_date: new_series.end_date,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().unwrap();
        state.series.insert(series.id.clone(), series.clone());

        let template = Self::materialize(template, Some(&series.id));
        state.transactions.push(template.clone());

        let mut inserted = Vec::with_capacity(instances.len());
        for instance in instances {
            let row = Self::materialize(instance, Some(&series.id));
            state.transactions.push(row.clone());
            inserted.push(row);
        }

        Ok(RecurringSeriesBundle {
            series,
            template,
            instances: inserted,
        })
    }

    fn apply_change_set(&self, change_set: SeriesChangeSet) -> Result<RecurringSeries> {
        let mut state = self.state.write().unwrap();
        let series_id = change_set.series.id.clone();
        if !state.series.contains_key(&series_id) {
            return Err(RecurringError::NotFound(series_id).into());
        }
        state
            .series
            .insert(series_id.clone(), change_set.series.clone());

        if let Some(values) = &change_set.template_values {
            for transaction in state.transactions.iter_mut() {
                if transaction.recurring_series_id.as_deref() != Some(series_id.as_str()) {
                    continue;
                }
                let in_scope = if transaction.is_recurring_template {
                    true
                } else {
                    match change_set.instance_value_scope {
                        Some(InstanceValueScope::All) => true,
                        Some(InstanceValueScope::From(from)) => {
                            transaction.transaction_date >= from
                        }
                        None => false,
                    }
                };
                if in_scope {
                    Self::apply_values(transaction, values);
                }
            }
        }

        if let Some(regenerate_from) = change_set.regenerate_from {
            state.transactions.retain(|t| {
                t.recurring_series_id.as_deref() != Some(series_id.as_str())
                    || t.is_recurring_template
                    || t.transaction_date < regenerate_from
            });
            for instance in change_set.new_instances {
                let row = Self::materialize(instance, Some(&series_id));
                state.transactions.push(row);
            }
        }

        Ok(change_set.series)
    }

    fn regenerate_instances(
        &self,
        series_id: &str,
        delete_from: Option<NaiveDate>,
        instances: Vec<NewTransaction>,
    ) -> Result<Vec<Transaction>> {
        let mut state = self.state.write().unwrap();
        if let Some(from) = delete_from {
            state.transactions.retain(|t| {
                t.recurring_series_id.as_deref() != Some(series_id)
                    || t.is_recurring_template
                    || t.transaction_date < from
            });
        }
        let mut inserted = Vec::with_capacity(instances.len());
        for instance in instances {
            let row = Self::materialize(instance, Some(series_id));
            state.transactions.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    fn delete_series(&self, series_id: &str, keep_instances: bool) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.series.remove(series_id).is_none() {
            return Err(RecurringError::NotFound(series_id.to_string()).into());
        }
        if keep_instances {
            state.transactions.retain(|t| {
                t.recurring_series_id.as_deref() != Some(series_id) || !t.is_recurring_template
            });
            for transaction in state.transactions.iter_mut() {
                if transaction.recurring_series_id.as_deref() == Some(series_id) {
                    transaction.recurring_series_id = None;
                }
            }
        } else {
            state
                .transactions
                .retain(|t| t.recurring_series_id.as_deref() != Some(series_id));
        }
        Ok(())
    }
}

// ---------- Helpers ----------

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn days(n: i64) -> Duration {
    Duration::days(n)
}

fn new_daily_series(start: NaiveDate, end: Option<NaiveDate>) -> NewRecurringSeries {
    NewRecurringSeries {
        id: None,
        name: "Paycheck".to_string(),
        description: None,
        recurrence_type: RecurrenceType::Daily,
        recurrence_interval: 1,
        start_date: start,
        end_date: end,
    }
}

fn new_deposit_template(amount: Decimal) -> NewTemplate {
    NewTemplate {
        transaction_type: TransactionType::Deposit,
        from_account_id: None,
        to_account_id: Some("acct-1".to_string()),
        amount,
        description: Some("Salary".to_string()),
        transaction_date: None,
    }
}

fn stored_series(
    id: &str,
    recurrence_type: RecurrenceType,
    interval: u32,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> RecurringSeries {
    let now = Utc::now().naive_utc();
    RecurringSeries {
        id: id.to_string(),
        name: "Stored".to_string(),
        description: None,
        recurrence_type,
        recurrence_interval: interval,
        start_date: start,
        end_date: end,
        created_at: now,
        updated_at: now,
    }
}

fn stored_transaction(
    series_id: &str,
    transaction_date: NaiveDate,
    amount: Decimal,
    is_template: bool,
) -> Transaction {
    let now = Utc::now().naive_utc();
    Transaction {
        id: Uuid::new_v4().to_string(),
        transaction_type: TransactionType::Deposit,
        from_account_id: None,
        to_account_id: Some("acct-1".to_string()),
        amount,
        transaction_date,
        status: if is_template {
            TransactionStatus::Created
        } else {
            TransactionStatus::Scheduled
        },
        description: None,
        recurring_series_id: Some(series_id.to_string()),
        is_recurring_template: is_template,
        generation_date: None,
        created_at: now,
        updated_at: now,
    }
}

fn service_with(repository: Arc<MockRecurringRepository>) -> RecurringService {
    RecurringService::new(repository)
}

fn assert_not_found(result: Result<impl std::fmt::Debug>) {
    match result {
        Err(Error::Recurring(RecurringError::NotFound(_))) => {}
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

// ---------- create_series ----------

#[tokio::test]
async fn test_create_series_builds_template_and_instances() {
    let repository = Arc::new(MockRecurringRepository::new());
    let service = service_with(repository.clone());

    let start = today() - days(2);
    let end = today() + days(2);
    let bundle = service
        .create_series(
            new_daily_series(start, Some(end)),
            new_deposit_template(dec!(100)),
            None,
        )
        .await
        .unwrap();

    assert!(bundle.template.is_recurring_template);
    assert_eq!(bundle.template.status, TransactionStatus::Created);
    assert_eq!(bundle.template.transaction_date, start);

    // One instance per day of the bounded range
    assert_eq!(bundle.instances.len(), 5);
    for (offset, instance) in bundle.instances.iter().enumerate() {
        assert_eq!(instance.transaction_date, start + days(offset as i64));
        assert_eq!(instance.amount, dec!(100));
        assert!(!instance.is_recurring_template);
        assert!(instance.generation_date.is_some());
        let expected = if instance.transaction_date <= today() {
            TransactionStatus::Posted
        } else {
            TransactionStatus::Scheduled
        };
        assert_eq!(instance.status, expected);
    }
    assert_eq!(repository.series_count(), 1);
}

#[tokio::test]
async fn test_create_series_rejects_invalid_input_before_writing() {
    let repository = Arc::new(MockRecurringRepository::new());
    let service = service_with(repository.clone());

    let mut zero_interval = new_daily_series(today(), None);
    zero_interval.recurrence_interval = 0;
    assert!(service
        .create_series(zero_interval, new_deposit_template(dec!(100)), None)
        .await
        .is_err());

    let mut missing_account = new_deposit_template(dec!(100));
    missing_account.to_account_id = None;
    assert!(service
        .create_series(new_daily_series(today(), None), missing_account, None)
        .await
        .is_err());

    let negative_amount = new_deposit_template(dec!(-5));
    assert!(service
        .create_series(new_daily_series(today(), None), negative_amount, None)
        .await
        .is_err());

    let mut inverted_dates = new_daily_series(today(), Some(today() - days(1)));
    inverted_dates.recurrence_interval = 1;
    assert!(service
        .create_series(inverted_dates, new_deposit_template(dec!(100)), None)
        .await
        .is_err());

    assert_eq!(repository.series_count(), 0);
    assert_eq!(repository.transaction_count(), 0);
}

#[tokio::test]
async fn test_failed_create_leaves_no_partial_state() {
    let repository = Arc::new(MockRecurringRepository::failing_on_create());
    let service = service_with(repository.clone());

    let result = service
        .create_series(
            new_daily_series(today() - days(2), Some(today() + days(2))),
            new_deposit_template(dec!(100)),
            None,
        )
        .await;

    assert!(result.is_err());
    assert_eq!(repository.series_count(), 0);
    assert_eq!(repository.transaction_count(), 0);
}

// ---------- generate_transactions ----------

#[tokio::test]
async fn test_incremental_generation_converges_for_bounded_series() {
    let repository = Arc::new(MockRecurringRepository::new());
    let start = today() - days(5);
    let end = start + days(11);
    repository.seed_series(stored_series(
        "s-1",
        RecurrenceType::Daily,
        1,
        start,
        Some(end),
    ));
    repository.seed_transaction(stored_transaction("s-1", start, dec!(50), true));
    let service = service_with(repository.clone());

    let first = service
        .generate_transactions("s-1", None, false)
        .await
        .unwrap();
    assert_eq!(first.len(), 12);
    assert_eq!(repository.instances_of("s-1").len(), 12);

    // The grid is exhausted up to the end date, so a refresh adds nothing
    let second = service
        .generate_transactions("s-1", None, false)
        .await
        .unwrap();
    assert!(second.is_empty());
    assert_eq!(repository.instances_of("s-1").len(), 12);

    // No duplicate dates either way
    let mut dates: Vec<NaiveDate> = repository
        .instances_of("s-1")
        .iter()
        .map(|t| t.transaction_date)
        .collect();
    dates.dedup();
    assert_eq!(dates.len(), 12);
}

#[tokio::test]
async fn test_incremental_generation_continues_after_latest_instance() {
    let repository = Arc::new(MockRecurringRepository::new());
    let start = today() - days(5);
    repository.seed_series(stored_series("s-1", RecurrenceType::Daily, 1, start, None));
    repository.seed_transaction(stored_transaction("s-1", start, dec!(50), true));
    // Two instances already exist on the grid
    repository.seed_transaction(stored_transaction("s-1", start, dec!(50), false));
    repository.seed_transaction(stored_transaction("s-1", start + days(2), dec!(50), false));
    let service = service_with(repository.clone());

    let generated = service
        .generate_transactions("s-1", None, false)
        .await
        .unwrap();

    let generated_dates: Vec<NaiveDate> =
        generated.iter().map(|t| t.transaction_date).collect();
    assert_eq!(generated_dates.len(), 12);
    assert_eq!(generated_dates[0], start + days(3));
    assert!(!generated_dates.contains(&start));
    assert!(!generated_dates.contains(&(start + days(2))));
}

#[tokio::test]
async fn test_incremental_generation_extends_past_the_first_window() {
    // The latest instance sits far beyond the first twelve grid steps;
    // a refresh must still move the series forward
    let repository = Arc::new(MockRecurringRepository::new());
    let start = today() - days(40);
    repository.seed_series(stored_series("s-1", RecurrenceType::Daily, 1, start, None));
    repository.seed_transaction(stored_transaction("s-1", start, dec!(50), true));
    repository.seed_transaction(stored_transaction("s-1", today() - days(5), dec!(50), false));
    let service = service_with(repository.clone());

    let generated = service
        .generate_transactions("s-1", None, false)
        .await
        .unwrap();

    let expected: Vec<NaiveDate> = (0..12).map(|i| today() - days(4) + days(i)).collect();
    let generated_dates: Vec<NaiveDate> =
        generated.iter().map(|t| t.transaction_date).collect();
    assert_eq!(generated_dates, expected);
    assert_eq!(repository.instances_of("s-1").len(), 13);
}

#[tokio::test]
async fn test_regenerate_all_rebuilds_from_date() {
    let repository = Arc::new(MockRecurringRepository::new());
    let start = today() - days(3);
    repository.seed_series(stored_series("s-1", RecurrenceType::Daily, 1, start, None));
    repository.seed_transaction(stored_transaction("s-1", start, dec!(50), true));
    repository.seed_transaction(stored_transaction("s-1", start, dec!(50), false));
    repository.seed_transaction(stored_transaction("s-1", today() + days(1), dec!(999), false));
    let service = service_with(repository.clone());

    let regenerated = service
        .generate_transactions("s-1", Some(today()), true)
        .await
        .unwrap();

    assert!(!regenerated.is_empty());
    assert!(regenerated.iter().all(|t| t.transaction_date >= today()));

    let instances = repository.instances_of("s-1");
    // The pre-existing past instance survives
    assert!(instances.iter().any(|t| t.transaction_date == start));
    // The stale future instance was replaced, not duplicated
    let on_tomorrow: Vec<&Transaction> = instances
        .iter()
        .filter(|t| t.transaction_date == today() + days(1))
        .collect();
    assert_eq!(on_tomorrow.len(), 1);
    assert_eq!(on_tomorrow[0].amount, dec!(50));
}

#[tokio::test]
async fn test_generate_requires_series_and_template() {
    let repository = Arc::new(MockRecurringRepository::new());
    let service = service_with(repository.clone());

    assert_not_found(service.generate_transactions("missing", None, false).await);

    // Series without a template row
    repository.seed_series(stored_series(
        "s-bare",
        RecurrenceType::Daily,
        1,
        today(),
        None,
    ));
    let result = service.generate_transactions("s-bare", None, false).await;
    match result {
        Err(Error::Recurring(RecurringError::TemplateNotFound(_))) => {}
        other => panic!("Expected TemplateNotFound, got {:?}", other),
    }
}

// ---------- update_series ----------

fn seed_updatable_series(repository: &MockRecurringRepository) -> (NaiveDate, NaiveDate) {
    let past_date = today() - days(10);
    let future_date = today() + days(10);
    repository.seed_series(stored_series(
        "s-1",
        RecurrenceType::Monthly,
        1,
        today() - days(40),
        None,
    ));
    repository.seed_transaction(stored_transaction(
        "s-1",
        today() - days(40),
        dec!(100),
        true,
    ));
    repository.seed_transaction(stored_transaction("s-1", past_date, dec!(100), false));
    repository.seed_transaction(stored_transaction("s-1", future_date, dec!(100), false));
    (past_date, future_date)
}

#[tokio::test]
async fn test_update_scope_none_touches_no_instances() {
    let repository = Arc::new(MockRecurringRepository::new());
    seed_updatable_series(&repository);
    let service = service_with(repository.clone());

    let new_values = TransactionValues {
        transaction_type: TransactionType::Deposit,
        from_account_id: None,
        to_account_id: Some("acct-1".to_string()),
        amount: dec!(250),
        description: None,
    };
    let bundle = service
        .update_series("s-1", SeriesUpdate::default(), Some(new_values), UpdateScope::None)
        .await
        .unwrap();

    assert_eq!(bundle.template.amount, dec!(250));
    assert!(bundle.instances.iter().all(|t| t.amount == dec!(100)));
}

#[tokio::test]
async fn test_update_scope_future_leaves_past_instances() {
    let repository = Arc::new(MockRecurringRepository::new());
    let (past_date, future_date) = seed_updatable_series(&repository);
    let service = service_with(repository.clone());

    let new_values = TransactionValues {
        transaction_type: TransactionType::Deposit,
        from_account_id: None,
        to_account_id: Some("acct-1".to_string()),
        amount: dec!(250),
        description: None,
    };
    let bundle = service
        .update_series(
            "s-1",
            SeriesUpdate::default(),
            Some(new_values),
            UpdateScope::Future,
        )
        .await
        .unwrap();

    let amount_on = |date: NaiveDate| {
        bundle
            .instances
            .iter()
            .find(|t| t.transaction_date == date)
            .map(|t| t.amount)
    };
    assert_eq!(amount_on(past_date), Some(dec!(100)));
    assert_eq!(amount_on(future_date), Some(dec!(250)));
}

#[tokio::test]
async fn test_update_scope_all_rewrites_every_instance() {
    let repository = Arc::new(MockRecurringRepository::new());
    seed_updatable_series(&repository);
    let service = service_with(repository.clone());

    let new_values = TransactionValues {
        transaction_type: TransactionType::Deposit,
        from_account_id: None,
        to_account_id: Some("acct-1".to_string()),
        amount: dec!(250),
        description: None,
    };
    let bundle = service
        .update_series(
            "s-1",
            SeriesUpdate::default(),
            Some(new_values),
            UpdateScope::All,
        )
        .await
        .unwrap();

    assert!(bundle.instances.iter().all(|t| t.amount == dec!(250)));
}

#[tokio::test]
async fn test_shape_change_regenerates_future_instances() {
    let repository = Arc::new(MockRecurringRepository::new());
    let start = today() - days(4);
    let end = today() + days(3);
    repository.seed_series(stored_series(
        "s-1",
        RecurrenceType::Daily,
        1,
        start,
        Some(end),
    ));
    repository.seed_transaction(stored_transaction("s-1", start, dec!(50), true));
    repository.seed_transaction(stored_transaction("s-1", today() - days(1), dec!(50), false));
    repository.seed_transaction(stored_transaction("s-1", today() + days(1), dec!(50), false));
    let service = service_with(repository.clone());

    // Switching to every-2-days invalidates the scheduled dates
    let update = SeriesUpdate {
        recurrence_interval: Some(2),
        end_date: Some(end),
        ..Default::default()
    };
    let bundle = service
        .update_series("s-1", update, None, UpdateScope::None)
        .await
        .unwrap();

    assert_eq!(bundle.series.recurrence_interval, 2);
    let dates: Vec<NaiveDate> = bundle
        .instances
        .iter()
        .map(|t| t.transaction_date)
        .collect();
    // Past instance untouched, future rebuilt on the every-2-days grid
    assert_eq!(
        dates,
        vec![today() - days(1), today(), today() + days(2)]
    );
}

#[tokio::test]
async fn test_shape_change_regenerates_for_long_running_series() {
    // The series anchor lies hundreds of intervals in the past; deleting
    // future instances must still be followed by fresh ones from today
    let repository = Arc::new(MockRecurringRepository::new());
    let start = today() - days(400);
    repository.seed_series(stored_series("s-1", RecurrenceType::Daily, 1, start, None));
    repository.seed_transaction(stored_transaction("s-1", start, dec!(50), true));
    repository.seed_transaction(stored_transaction("s-1", today() - days(1), dec!(50), false));
    repository.seed_transaction(stored_transaction("s-1", today() + days(1), dec!(50), false));
    let service = service_with(repository.clone());

    let update = SeriesUpdate {
        recurrence_interval: Some(2),
        ..Default::default()
    };
    let bundle = service
        .update_series("s-1", update, None, UpdateScope::None)
        .await
        .unwrap();

    let dates: Vec<NaiveDate> = bundle
        .instances
        .iter()
        .map(|t| t.transaction_date)
        .collect();
    assert_eq!(dates[0], today() - days(1));
    assert!(!dates.contains(&(today() + days(1))));
    let future: Vec<NaiveDate> = dates.into_iter().filter(|d| *d >= today()).collect();
    // 400 days is an even number of two-day steps, so today is on the grid
    assert_eq!(future[0], today());
    assert_eq!(future[1], today() + days(2));
    assert_eq!(future.len(), 30);
}

#[tokio::test]
async fn test_update_clears_end_date_when_absent() {
    let repository = Arc::new(MockRecurringRepository::new());
    let start = today() - days(4);
    repository.seed_series(stored_series(
        "s-1",
        RecurrenceType::Daily,
        1,
        start,
        Some(today() + days(3)),
    ));
    repository.seed_transaction(stored_transaction("s-1", start, dec!(50), true));
    let service = service_with(repository.clone());

    let bundle = service
        .update_series("s-1", SeriesUpdate::default(), None, UpdateScope::None)
        .await
        .unwrap();

    // end_date is always overwritten; an absent value clears it, which also
    // counts as a shape change
    assert_eq!(bundle.series.end_date, None);
}

#[tokio::test]
async fn test_update_rejects_invalid_merge() {
    let repository = Arc::new(MockRecurringRepository::new());
    seed_updatable_series(&repository);
    let service = service_with(repository.clone());

    let update = SeriesUpdate {
        recurrence_interval: Some(0),
        ..Default::default()
    };
    assert!(service
        .update_series("s-1", update, None, UpdateScope::None)
        .await
        .is_err());

    let inverted = SeriesUpdate {
        start_date: Some(today()),
        end_date: Some(today() - days(1)),
        ..Default::default()
    };
    assert!(service
        .update_series("s-1", inverted, None, UpdateScope::None)
        .await
        .is_err());
}

#[tokio::test]
async fn test_update_missing_series_is_not_found() {
    let repository = Arc::new(MockRecurringRepository::new());
    let service = service_with(repository);

    assert_not_found(
        service
            .update_series(
                "missing",
                SeriesUpdate::default(),
                None,
                UpdateScope::None,
            )
            .await,
    );
}

// ---------- delete_series ----------

#[tokio::test]
async fn test_delete_series_removes_all_transactions() {
    let repository = Arc::new(MockRecurringRepository::new());
    seed_updatable_series(&repository);
    let service = service_with(repository.clone());

    service.delete_series("s-1", false).await.unwrap();

    assert_eq!(repository.series_count(), 0);
    assert_eq!(repository.transaction_count(), 0);
}

#[tokio::test]
async fn test_delete_series_keeping_instances_unlinks_them() {
    let repository = Arc::new(MockRecurringRepository::new());
    seed_updatable_series(&repository);
    let service = service_with(repository.clone());

    service.delete_series("s-1", true).await.unwrap();

    assert_eq!(repository.series_count(), 0);
    // Template gone, the two instances survive as standalone transactions
    assert_eq!(repository.transaction_count(), 2);
    let state = repository.state.read().unwrap();
    assert!(state
        .transactions
        .iter()
        .all(|t| t.recurring_series_id.is_none() && !t.is_recurring_template));
}

#[tokio::test]
async fn test_delete_missing_series_is_not_found() {
    let repository = Arc::new(MockRecurringRepository::new());
    let service = service_with(repository);

    assert_not_found(service.delete_series("missing", false).await);
}

// ---------- reads ----------

#[tokio::test]
async fn test_get_series_transactions_bundles_everything() {
    let repository = Arc::new(MockRecurringRepository::new());
    let (past_date, future_date) = seed_updatable_series(&repository);
    let service = service_with(repository);

    let bundle = service.get_series_transactions("s-1").unwrap();

    assert_eq!(bundle.series.id, "s-1");
    assert!(bundle.template.is_recurring_template);
    let dates: Vec<NaiveDate> = bundle
        .instances
        .iter()
        .map(|t| t.transaction_date)
        .collect();
    assert_eq!(dates, vec![past_date, future_date]);
}
