use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::constants::{
    DAILY_OCCURRENCE_CAP, MAX_GENERATED_OCCURRENCES, MONTHLY_OCCURRENCE_CAP, WEEKLY_OCCURRENCE_CAP,
    YEARLY_OCCURRENCE_CAP,
};
use crate::errors::Result;
use crate::recurring::recurring_model::RecurrenceType;
use crate::recurring::RecurringError;

/// The recurrence shape of a series, detached from its identity so occurrence
/// calculation can run against unsaved input as well as stored series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub recurrence_type: RecurrenceType,
    pub interval: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Computes the bounded, ordered occurrence dates of a schedule.
///
/// The date grid is anchored at `start_date`: occurrence k lies k * interval
/// units past the anchor, so repeated calls over the same schedule always
/// see the same grid, which incremental regeneration relies on. `start_from`
/// (clamped forward to the anchor) selects where on the grid the sequence
/// begins, and up to `count` grid dates are returned from that point, no
/// matter how far past the anchor it lies. Monthly advances clamp to the
/// last valid day of the target month, computed from the anchor's
/// day-of-month each step, so a series started on the 31st returns to the
/// 31st after passing through a shorter month instead of drifting.
///
/// Generation stops early once a grid date passes `end_date`.
pub fn calculate_occurrences(
    schedule: &Schedule,
    start_from: NaiveDate,
    count: usize,
) -> Result<Vec<NaiveDate>> {
    if schedule.interval == 0 {
        return Err(RecurringError::InvalidData(
            "Recurrence interval must be a positive number".to_string(),
        )
        .into());
    }

    let start_from = start_from.max(schedule.start_date);
    let mut step = first_step_at_or_after(schedule, start_from)?;
    let mut occurrences = Vec::with_capacity(count);

    while occurrences.len() < count {
        let date = occurrence_at_step(schedule, step)?;
        if let Some(end) = schedule.end_date {
            if date > end {
                break;
            }
        }
        occurrences.push(date);
        step += 1;
    }

    Ok(occurrences)
}

/// Index of the first grid date on or after `target`. Starts from an
/// arithmetic lower bound (a month never exceeds 31 days, a year 366) and
/// walks the few remaining steps forward.
fn first_step_at_or_after(schedule: &Schedule, target: NaiveDate) -> Result<usize> {
    let interval = schedule.interval as i64;
    let gap_days = (target - schedule.start_date).num_days().max(0);
    let mut step = (match schedule.recurrence_type {
        RecurrenceType::Daily => gap_days / interval,
        RecurrenceType::Weekly => gap_days / (7 * interval),
        RecurrenceType::Monthly => gap_days / (31 * interval),
        RecurrenceType::Yearly => gap_days / (366 * interval),
    }) as usize;

    while occurrence_at_step(schedule, step)? < target {
        step += 1;
    }
    Ok(step)
}

/// Grid date `step` recurrence units past the schedule anchor
pub fn occurrence_at_step(schedule: &Schedule, step: usize) -> Result<NaiveDate> {
    let units = schedule.interval as i64 * step as i64;
    let date = match schedule.recurrence_type {
        RecurrenceType::Daily => schedule.start_date.checked_add_signed(Duration::days(units)),
        RecurrenceType::Weekly => schedule
            .start_date
            .checked_add_signed(Duration::days(units * 7)),
        RecurrenceType::Monthly => add_months_clamped(schedule.start_date, units),
        RecurrenceType::Yearly => add_months_clamped(schedule.start_date, units * 12),
    };

    date.ok_or_else(|| {
        RecurringError::InvalidData(format!(
            "Occurrence date out of range at step {} from {}",
            step, schedule.start_date
        ))
        .into()
    })
}

fn add_months_clamped(anchor: NaiveDate, months: i64) -> Option<NaiveDate> {
    u32::try_from(months)
        .ok()
        .and_then(|m| anchor.checked_add_months(Months::new(m)))
}

/// Open-ended occurrence cap for a recurrence unit
pub fn occurrence_cap(recurrence_type: RecurrenceType) -> usize {
    match recurrence_type {
        RecurrenceType::Daily => DAILY_OCCURRENCE_CAP,
        RecurrenceType::Weekly => WEEKLY_OCCURRENCE_CAP,
        RecurrenceType::Monthly => MONTHLY_OCCURRENCE_CAP,
        RecurrenceType::Yearly => YEARLY_OCCURRENCE_CAP,
    }
}

/// Occurrence count heuristic used when a series is created: the unit's cap
/// for open-ended series, otherwise the smaller of a date-span estimate and
/// that cap.
pub fn estimate_occurrence_count(schedule: &Schedule) -> usize {
    let cap = occurrence_cap(schedule.recurrence_type);
    let end = match schedule.end_date {
        Some(end) => end,
        None => return cap,
    };

    let interval = schedule.interval.max(1) as i64;
    let span_days = (end - schedule.start_date).num_days().max(0);
    let span_months = (end.year() as i64 - schedule.start_date.year() as i64) * 12
        + (end.month() as i64 - schedule.start_date.month() as i64);

    let estimate = match schedule.recurrence_type {
        RecurrenceType::Daily => span_days / interval + 1,
        RecurrenceType::Weekly => span_days / (7 * interval) + 1,
        RecurrenceType::Monthly => span_months.max(0) / interval + 1,
        RecurrenceType::Yearly => span_months.max(0) / (12 * interval) + 1,
    };

    (estimate as usize).min(cap)
}

/// Widens an occurrence count when the caller's horizon hint (typically the
/// latest plan end date on the books) reaches past the naive generation
/// horizon. Best effort: doubles the count, capped, so generated instances
/// are likely to cover the longest plan.
pub fn widen_for_horizon(
    schedule: &Schedule,
    count: usize,
    horizon_hint: Option<NaiveDate>,
) -> Result<usize> {
    let hint = match horizon_hint {
        Some(hint) => hint,
        None => return Ok(count),
    };
    if count == 0 {
        return Ok(count);
    }

    let naive_horizon = occurrence_at_step(schedule, count - 1)?;
    if hint > naive_horizon {
        return Ok((count * 2).min(MAX_GENERATED_OCCURRENCES));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(start: NaiveDate) -> Schedule {
        Schedule {
            recurrence_type: RecurrenceType::Monthly,
            interval: 1,
            start_date: start,
            end_date: None,
        }
    }

    #[test]
    fn daily_interval_advances_by_days() {
        let schedule = Schedule {
            recurrence_type: RecurrenceType::Daily,
            interval: 3,
            start_date: date(2025, 1, 1),
            end_date: None,
        };
        let dates = calculate_occurrences(&schedule, date(2025, 1, 1), 4).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2025, 1, 1),
                date(2025, 1, 4),
                date(2025, 1, 7),
                date(2025, 1, 10)
            ]
        );
    }

    #[test]
    fn weekly_interval_scales_by_seven_days() {
        let schedule = Schedule {
            recurrence_type: RecurrenceType::Weekly,
            interval: 2,
            start_date: date(2025, 1, 6),
            end_date: None,
        };
        let dates = calculate_occurrences(&schedule, date(2025, 1, 6), 3).unwrap();
        assert_eq!(
            dates,
            vec![date(2025, 1, 6), date(2025, 1, 20), date(2025, 2, 3)]
        );
    }

    #[test]
    fn monthly_clamps_to_month_end_without_drift() {
        let dates = calculate_occurrences(&monthly(date(2025, 1, 31)), date(2025, 1, 31), 4)
            .unwrap();
        // Feb has no 31st; March does, so the day must come back, not stick at 28
        assert_eq!(
            dates,
            vec![
                date(2025, 1, 31),
                date(2025, 2, 28),
                date(2025, 3, 31),
                date(2025, 4, 30)
            ]
        );
    }

    #[test]
    fn monthly_clamp_respects_leap_years() {
        let dates = calculate_occurrences(&monthly(date(2024, 1, 31)), date(2024, 1, 31), 2)
            .unwrap();
        assert_eq!(dates[1], date(2024, 2, 29));
    }

    #[test]
    fn yearly_advances_whole_years() {
        let schedule = Schedule {
            recurrence_type: RecurrenceType::Yearly,
            interval: 1,
            start_date: date(2024, 2, 29),
            end_date: None,
        };
        let dates = calculate_occurrences(&schedule, date(2024, 2, 29), 2).unwrap();
        // Feb 29 anchors clamp to Feb 28 in non-leap years
        assert_eq!(dates, vec![date(2024, 2, 29), date(2025, 2, 28)]);
    }

    #[test]
    fn stops_at_end_date() {
        let schedule = Schedule {
            recurrence_type: RecurrenceType::Weekly,
            interval: 1,
            start_date: date(2025, 1, 1),
            end_date: Some(date(2025, 1, 20)),
        };
        let dates = calculate_occurrences(&schedule, date(2025, 1, 1), 12).unwrap();
        assert_eq!(
            dates,
            vec![date(2025, 1, 1), date(2025, 1, 8), date(2025, 1, 15)]
        );
    }

    #[test]
    fn honors_count_exactly_when_open_ended() {
        let dates = calculate_occurrences(&monthly(date(2025, 3, 15)), date(2025, 3, 15), 12)
            .unwrap();
        assert_eq!(dates.len(), 12);
    }

    #[test]
    fn honors_count_when_start_from_is_far_past_the_anchor() {
        let schedule = Schedule {
            recurrence_type: RecurrenceType::Daily,
            interval: 1,
            start_date: date(2025, 1, 1),
            end_date: None,
        };
        let dates = calculate_occurrences(&schedule, date(2025, 6, 1), 12).unwrap();
        assert_eq!(dates.len(), 12);
        assert_eq!(dates[0], date(2025, 6, 1));
        assert_eq!(dates[11], date(2025, 6, 12));
    }

    #[test]
    fn distant_start_from_stays_on_the_anchor_grid() {
        // Two years out, a series anchored on the 31st still lands on
        // month ends, not on whatever day the window opened
        let dates = calculate_occurrences(&monthly(date(2025, 1, 31)), date(2027, 1, 1), 3)
            .unwrap();
        assert_eq!(
            dates,
            vec![date(2027, 1, 31), date(2027, 2, 28), date(2027, 3, 31)]
        );
    }

    #[test]
    fn start_from_selects_a_position_on_the_grid() {
        let schedule = monthly(date(2025, 1, 31));
        let all = calculate_occurrences(&schedule, date(2025, 1, 1), 6).unwrap();
        let later = calculate_occurrences(&schedule, date(2025, 3, 1), 6).unwrap();
        assert_eq!(later.len(), 6);
        assert_eq!(later[..4], all[2..]);
    }

    #[test]
    fn start_from_before_start_date_is_clamped() {
        let schedule = monthly(date(2025, 5, 10));
        let dates = calculate_occurrences(&schedule, date(2024, 1, 1), 2).unwrap();
        assert_eq!(dates[0], date(2025, 5, 10));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let schedule = Schedule {
            recurrence_type: RecurrenceType::Daily,
            interval: 0,
            start_date: date(2025, 1, 1),
            end_date: None,
        };
        assert!(calculate_occurrences(&schedule, date(2025, 1, 1), 5).is_err());
    }

    #[test]
    fn open_ended_estimate_uses_unit_cap() {
        assert_eq!(estimate_occurrence_count(&monthly(date(2025, 1, 1))), 24);
        let daily = Schedule {
            recurrence_type: RecurrenceType::Daily,
            interval: 1,
            start_date: date(2025, 1, 1),
            end_date: None,
        };
        assert_eq!(estimate_occurrence_count(&daily), 30);
    }

    #[test]
    fn bounded_estimate_takes_span_when_smaller() {
        let schedule = Schedule {
            recurrence_type: RecurrenceType::Monthly,
            interval: 1,
            start_date: date(2025, 1, 15),
            end_date: Some(date(2025, 6, 15)),
        };
        assert_eq!(estimate_occurrence_count(&schedule), 6);
    }

    #[test]
    fn horizon_hint_doubles_count_up_to_cap() {
        let schedule = monthly(date(2025, 1, 1));
        // Naive horizon of 24 monthly steps is Dec 2026; a plan ending later widens
        let widened =
            widen_for_horizon(&schedule, 24, Some(date(2028, 1, 1))).unwrap();
        assert_eq!(widened, 48);
        let unchanged =
            widen_for_horizon(&schedule, 24, Some(date(2025, 6, 1))).unwrap();
        assert_eq!(unchanged, 24);
        let capped = widen_for_horizon(&schedule, 80, Some(date(2040, 1, 1))).unwrap();
        assert_eq!(capped, 100);
    }
}
