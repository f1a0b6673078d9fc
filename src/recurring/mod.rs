pub(crate) mod recurring_errors;
pub(crate) mod recurring_model;
pub(crate) mod recurring_repository;
pub(crate) mod recurring_service;
pub(crate) mod recurring_traits;
pub(crate) mod schedule;

#[cfg(test)]
mod recurring_service_tests;

pub use recurring_errors::RecurringError;
pub use recurring_model::{
    InstanceValueScope, NewRecurringSeries, NewTemplate, RecurrenceType, RecurringSeries,
    RecurringSeriesBundle, RecurringSeriesDB, SeriesChangeSet, SeriesUpdate, UpdateScope,
    RECURRENCE_TYPE_DAILY, RECURRENCE_TYPE_MONTHLY, RECURRENCE_TYPE_WEEKLY, RECURRENCE_TYPE_YEARLY,
};
pub use recurring_repository::RecurringRepository;
pub use recurring_service::RecurringService;
pub use recurring_traits::{RecurringRepositoryTrait, RecurringServiceTrait};
pub use schedule::{
    calculate_occurrences, estimate_occurrence_count, occurrence_at_step, occurrence_cap,
    widen_for_horizon, Schedule,
};
