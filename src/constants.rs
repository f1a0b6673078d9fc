use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Maximum occurrences generated in one incremental generation pass
pub const INCREMENTAL_GENERATION_COUNT: usize = 12;

/// Hard cap on occurrences generated for a single series in one operation
pub const MAX_GENERATED_OCCURRENCES: usize = 100;

/// Open-ended series occurrence caps, per recurrence unit
pub const DAILY_OCCURRENCE_CAP: usize = 30;
pub const WEEKLY_OCCURRENCE_CAP: usize = 52;
pub const MONTHLY_OCCURRENCE_CAP: usize = 24;
pub const YEARLY_OCCURRENCE_CAP: usize = 5;

/// Smallest accrual amount itemized in a ledger row's detail list
pub const MIN_ITEMIZED_ACCRUAL: Decimal = dec!(0.01);

/// Linear daily growth factor applied to future projected totals
pub const DAILY_PROJECTION_RATE: Decimal = dec!(0.0001);

/// Months in a year, for converting annual rates to monthly accrual
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Percent divisor for annual rates stored as percentages
pub const PERCENT: Decimal = dec!(100);
