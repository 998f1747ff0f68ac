//! Budget evaluation
//!
//! Compares per-category expense totals for the current period against the
//! configured limits. The reference time is injected rather than read from
//! the clock, so results are reproducible.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

use crate::models::{BudgetBook, BudgetPeriod, BudgetReport, BudgetStatus, Money, Transaction};

/// Spending below this fraction of the limit is on-track
const WARNING_RATIO: f64 = 0.8;

/// The UTC instant the current period began, relative to `now`.
///
/// Monthly periods start on the first of the month, weekly on the most
/// recent Sunday, yearly on January 1. All boundaries are at UTC midnight.
pub fn period_start(period: BudgetPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let start = match period {
        BudgetPeriod::Monthly => today.with_day(1).unwrap_or(today),
        BudgetPeriod::Weekly => {
            today - Duration::days(today.weekday().num_days_from_sunday() as i64)
        }
        BudgetPeriod::Yearly => today.with_ordinal(1).unwrap_or(today),
    };
    start.and_time(NaiveTime::MIN).and_utc()
}

/// Evaluate every configured limit against the transactions in the current
/// period.
///
/// Only well-formed expenses count toward spending; income and rows whose
/// sign disagrees with their kind are excluded. Categories with no activity
/// still get a report (zero spent, on-track).
pub fn evaluate(book: &BudgetBook, transactions: &[Transaction], now: DateTime<Utc>) -> Vec<BudgetReport> {
    let start = period_start(book.period, now);

    book.limits
        .iter()
        .map(|(category, &limit)| {
            let spent: Money = transactions
                .iter()
                .filter(|t| t.category == *category && t.timestamp >= start && t.timestamp <= now)
                .filter_map(Transaction::expense_magnitude)
                .sum();

            let ratio = if limit.is_positive() {
                spent.cents() as f64 / limit.cents() as f64
            } else if spent.is_zero() {
                0.0
            } else {
                // A zero limit with any spending is unconditionally over
                f64::INFINITY
            };

            BudgetReport {
                category: category.clone(),
                limit,
                spent,
                ratio,
                status: status_for(ratio),
            }
        })
        .collect()
}

fn status_for(ratio: f64) -> BudgetStatus {
    if ratio < WARNING_RATIO {
        BudgetStatus::OnTrack
    } else if ratio < 1.0 {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Exceeded
    }
}
