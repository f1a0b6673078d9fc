use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::accounts::{Account, AccountCategory};
use crate::constants::{DAILY_PROJECTION_RATE, MIN_ITEMIZED_ACCRUAL, MONTHS_PER_YEAR, PERCENT};
use crate::ledger::ledger_model::{
    AccountDayState, CategoryPolicy, LedgerRow, TransactionDetail, POLICY_CREDIT,
    POLICY_INVESTMENT, POLICY_LOAN, POLICY_STANDARD,
};
use crate::plans::{Plan, PlanAccounts};
use crate::transactions::Transaction;

/// Replays the given transactions day by day across the plan's date range and
/// returns one dense `LedgerRow` per calendar day, inclusive of both ends.
///
/// Pure derivation over its inputs: no fetching, no persistence, safe to
/// recompute on demand. Malformed input degrades to empty or zero output
/// rather than erroring, since this backs a read-only display.
pub fn build_ledger(
    plan: &Plan,
    accounts: &PlanAccounts,
    transactions: &[Transaction],
    today: NaiveDate,
) -> Vec<LedgerRow> {
    if plan.end_date <= plan.start_date {
        warn!(
            "Ledger for plan {} requested with empty date range ({} to {})",
            plan.id, plan.start_date, plan.end_date
        );
        return Vec::new();
    }

    let tracked: Vec<(&Account, CategoryPolicy)> = accounts
        .standard
        .iter()
        .map(|a| (a, POLICY_STANDARD))
        .chain(accounts.credit.iter().map(|a| (a, POLICY_CREDIT)))
        .chain(accounts.loan.iter().map(|a| (a, POLICY_LOAN)))
        .chain(accounts.investment.iter().map(|a| (a, POLICY_INVESTMENT)))
        .collect();

    // Group once by date; input order within a day is preserved and applied
    // as-is.
    let mut by_date: HashMap<NaiveDate, Vec<&Transaction>> = HashMap::new();
    for transaction in transactions {
        by_date
            .entry(transaction.transaction_date)
            .or_default()
            .push(transaction);
    }

    // Running balance per account, seeded from the stored balance on day one
    let mut balances: HashMap<String, Decimal> = tracked
        .iter()
        .map(|(account, _)| (account.id.clone(), account.balance))
        .collect();

    let day_count = (plan.end_date - plan.start_date).num_days() + 1;
    debug!(
        "Building ledger for plan {} over {} days across {} accounts",
        plan.id,
        day_count,
        tracked.len()
    );

    let mut rows = Vec::with_capacity(day_count as usize);
    let mut date = plan.start_date;
    while date <= plan.end_date {
        let day_transactions = by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);
        let mut row = LedgerRow::empty(date);

        for (account, policy) in &tracked {
            let balance = balances
                .get(&account.id)
                .copied()
                .unwrap_or(account.balance);
            let state = accumulate_day(account, *policy, balance, date, day_transactions);
            balances.insert(account.id.clone(), state.balance);

            match policy.category {
                AccountCategory::Standard => row.standard_balance += state.balance,
                AccountCategory::Credit => row.credit_balance += state.balance,
                AccountCategory::Loan => row.loan_balance += state.balance,
                AccountCategory::Investment => row.investment_balance += state.balance,
            }
            row.accounts.insert(account.id.clone(), state);
        }

        row.total = row.standard_balance + row.investment_balance
            - row.credit_balance
            - row.loan_balance;
        row.projected_total = project_total(row.total, date, today);

        rows.push(row);
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    rows
}

/// Advances one account through one calendar day: applies the day's
/// transactions under the category's sign policy, then month-end accrual.
fn accumulate_day(
    account: &Account,
    policy: CategoryPolicy,
    opening_balance: Decimal,
    date: NaiveDate,
    day_transactions: &[&Transaction],
) -> AccountDayState {
    let mut balance = opening_balance;
    let mut net_change = Decimal::ZERO;
    let mut details: Vec<TransactionDetail> = Vec::new();

    for transaction in day_transactions {
        if transaction.to_account_id.as_deref() == Some(account.id.as_str()) {
            let delta = signed(transaction.amount, policy.incoming_sign);
            balance += delta;
            net_change += delta;
            details.push(detail_for(transaction, delta));
        }
        if transaction.from_account_id.as_deref() == Some(account.id.as_str()) {
            let delta = signed(transaction.amount, policy.outgoing_sign);
            balance += delta;
            net_change += delta;
            details.push(detail_for(transaction, delta));
        }
    }

    if is_last_day_of_month(date) {
        if let Some(accrual) = monthly_accrual(account, balance) {
            balance += accrual;
            // Sub-cent accrual still compounds the balance but is not worth
            // itemizing in the day's detail
            if accrual >= MIN_ITEMIZED_ACCRUAL {
                net_change += accrual;
                details.push(TransactionDetail {
                    transaction_id: None,
                    label: policy.accrual_label.to_string(),
                    amount: accrual,
                });
            }
        }
    }

    AccountDayState {
        account_id: account.id.clone(),
        balance,
        net_change: if net_change.is_zero() {
            None
        } else {
            Some(net_change)
        },
        details: if details.is_empty() {
            None
        } else {
            Some(details)
        },
    }
}

/// One twelfth of the account's annual rate applied to a positive balance.
/// Returns None when the account has no rate, a non-positive rate, or
/// nothing to accrue on.
fn monthly_accrual(account: &Account, balance: Decimal) -> Option<Decimal> {
    let rate = account.annual_rate()?;
    if rate <= Decimal::ZERO || balance <= Decimal::ZERO {
        return None;
    }
    Some(balance * rate / (PERCENT * MONTHS_PER_YEAR))
}

/// Linear growth heuristic for future days; past and present days report the
/// computed total unchanged.
fn project_total(total: Decimal, date: NaiveDate, today: NaiveDate) -> Decimal {
    let days_from_today = (date - today).num_days();
    if days_from_today <= 0 {
        return total;
    }
    total * (Decimal::ONE + DAILY_PROJECTION_RATE * Decimal::from(days_from_today))
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    match date.succ_opt() {
        Some(next) => next.month() != date.month(),
        None => true,
    }
}

fn signed(amount: Decimal, sign: i8) -> Decimal {
    if sign < 0 {
        -amount
    } else {
        amount
    }
}

fn detail_for(transaction: &Transaction, delta: Decimal) -> TransactionDetail {
    TransactionDetail {
        transaction_id: Some(transaction.id.clone()),
        label: transaction
            .description
            .clone()
            .unwrap_or_else(|| transaction.transaction_type.as_str().to_string()),
        amount: delta,
    }
}
