//! Multi-rule anomaly detection
//!
//! Four independent rules evaluated over one snapshot of the full history.
//! Flags are order-independent and may overlap; the final list is truncated
//! to [`MAX_REPORTED`] in insertion order across rules (duplicates, high
//! amount, unusual time, rapid succession), matching the persisted behavior
//! rather than re-ranking by severity.

use chrono::{Duration, Local, Timelike};

use crate::models::{Anomaly, AnomalyKind, Money, Severity, Transaction};

/// Detector output is capped at this many flags
pub const MAX_REPORTED: usize = 10;

/// Two transactions this close together can be the same real-world event
const DUPLICATE_WINDOW_MINUTES: i64 = 60;

/// High-amount rule fires above this multiple of the mean expense
const HIGH_AMOUNT_RATIO: f64 = 3.0;

/// Severity escalates to high above this multiple of the mean
const SEVERE_RATIO: f64 = 5.0;

/// Absolute floor for the high-amount rule, so tiny historical means don't
/// flag everyday spending
const HIGH_AMOUNT_FLOOR: Money = Money::from_cents(5_000);

/// Absolute floor for escalation to high severity
const SEVERE_FLOOR: Money = Money::from_cents(25_000);

/// Local-time window considered unusual: [02:00, 06:00)
const NIGHT_START_HOUR: u32 = 2;
const NIGHT_END_HOUR: u32 = 6;

/// Night activity below this magnitude is ignored
const NIGHT_FLOOR: Money = Money::from_cents(2_000);

/// Rapid-succession window: three consecutive expenses within this span
const RAPID_SPAN_MINUTES: i64 = 30;

/// ...whose combined magnitude exceeds this floor
const RAPID_FLOOR: Money = Money::from_cents(10_000);

/// Run all rules over a snapshot of the transaction history.
///
/// Pure; malformed rows (sign/kind disagreement) are skipped by the rules
/// that do arithmetic, and an empty snapshot yields an empty result rather
/// than an error.
pub fn detect(transactions: &[Transaction]) -> Vec<Anomaly> {
    let mut flags = Vec::new();

    detect_duplicates(transactions, &mut flags);
    detect_high_amounts(transactions, &mut flags);
    detect_unusual_times(transactions, &mut flags);
    detect_rapid_succession(transactions, &mut flags);

    flags.truncate(MAX_REPORTED);
    flags
}

/// Duplicate rule: near-identical pairs close together in time.
///
/// Quadratic in transaction count by construction (every unordered pair is
/// examined). Acceptable for personal-ledger history sizes; bucketing by
/// rounded timestamp would reduce the cost without changing the pairs found
/// if this ever becomes hot.
fn detect_duplicates(transactions: &[Transaction], flags: &mut Vec<Anomaly>) {
    let window = Duration::minutes(DUPLICATE_WINDOW_MINUTES);

    for (i, a) in transactions.iter().enumerate() {
        for b in &transactions[i + 1..] {
            let gap = (a.timestamp - b.timestamp).abs();
            if gap <= window
                && a.amount.within_one_cent(b.amount)
                && a.category == b.category
                && a.note == b.note
            {
                // Both halves of the pair are reported
                flags.push(Anomaly::new(
                    AnomalyKind::Duplicate,
                    a.id,
                    Severity::Medium,
                    format!("Possible duplicate of {} ({} apart)", b.id, human_gap(gap)),
                ));
                flags.push(Anomaly::new(
                    AnomalyKind::Duplicate,
                    b.id,
                    Severity::Medium,
                    format!("Possible duplicate of {} ({} apart)", a.id, human_gap(gap)),
                ));
            }
        }
    }
}

/// High-amount rule: expenses far above the historical mean
fn detect_high_amounts(transactions: &[Transaction], flags: &mut Vec<Anomaly>) {
    let magnitudes: Vec<(&Transaction, Money)> = transactions
        .iter()
        .filter_map(|t| t.expense_magnitude().map(|m| (t, m)))
        .collect();

    if magnitudes.is_empty() {
        return;
    }

    let total: i64 = magnitudes.iter().map(|(_, m)| m.cents()).sum();
    let mean = total as f64 / magnitudes.len() as f64;

    for (txn, magnitude) in magnitudes {
        let cents = magnitude.cents() as f64;
        if cents > HIGH_AMOUNT_RATIO * mean && magnitude >= HIGH_AMOUNT_FLOOR {
            let severity = if cents > SEVERE_RATIO * mean && magnitude >= SEVERE_FLOOR {
                Severity::High
            } else {
                Severity::Medium
            };
            flags.push(Anomaly::new(
                AnomalyKind::HighAmount,
                txn.id,
                severity,
                format!(
                    "{} is {:.1}x the average expense of {}",
                    magnitude,
                    cents / mean,
                    Money::from_cents(mean.round() as i64)
                ),
            ));
        }
    }
}

/// Unusual-time rule: sizable activity between 02:00 and 06:00 local time
fn detect_unusual_times(transactions: &[Transaction], flags: &mut Vec<Anomaly>) {
    for txn in transactions {
        let hour = txn.timestamp.with_timezone(&Local).hour();
        if (NIGHT_START_HOUR..NIGHT_END_HOUR).contains(&hour) && txn.amount.abs() >= NIGHT_FLOOR {
            flags.push(Anomaly::new(
                AnomalyKind::UnusualTime,
                txn.id,
                Severity::Low,
                format!("{} at {:02}:00 local time", txn.amount.abs(), hour),
            ));
        }
    }
}

/// Rapid-succession rule: three consecutive expenses within a short span
/// whose combined magnitude is large. Flags the first of the triple.
fn detect_rapid_succession(transactions: &[Transaction], flags: &mut Vec<Anomaly>) {
    let mut expenses: Vec<(&Transaction, Money)> = transactions
        .iter()
        .filter_map(|t| t.expense_magnitude().map(|m| (t, m)))
        .collect();
    expenses.sort_by_key(|(t, _)| t.timestamp);

    let span_limit = Duration::minutes(RAPID_SPAN_MINUTES);

    for window in expenses.windows(3) {
        let span = window[2].0.timestamp - window[0].0.timestamp;
        let sum: Money = window.iter().map(|(_, m)| *m).sum();
        if span <= span_limit && sum > RAPID_FLOOR {
            flags.push(Anomaly::new(
                AnomalyKind::RapidSuccession,
                window[0].0.id,
                Severity::Medium,
                format!(
                    "3 expenses totalling {} within {} minutes",
                    sum,
                    span.num_minutes()
                ),
            ));
        }
    }
}

fn human_gap(gap: Duration) -> String {
    format!("{}m", gap.num_minutes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(minute_offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 12, 12, 0, 0).unwrap() + Duration::minutes(minute_offset)
    }

    fn expense(cents: i64, category: &str, ts: DateTime<Utc>) -> Transaction {
        Transaction::new(Money::from_cents(-cents), category, ts)
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(detect(&[]).is_empty());
    }

    #[test]
    fn test_duplicate_pair_within_window() {
        let mut a = expense(5000, "Groceries", at(0));
        a.note = Some("weekly shop".into());
        let mut b = expense(5000, "Groceries", at(10));
        b.note = Some("weekly shop".into());

        let flags = detect(&[a.clone(), b.clone()]);
        let duplicate_ids: Vec<_> = flags
            .iter()
            .filter(|f| f.kind == AnomalyKind::Duplicate)
            .map(|f| f.transaction_id)
            .collect();

        // Both transactions are reported as involved
        assert!(duplicate_ids.contains(&a.id));
        assert!(duplicate_ids.contains(&b.id));
    }

    #[test]
    fn test_duplicate_pair_outside_window_not_flagged() {
        let a = expense(5000, "Groceries", at(0));
        let b = expense(5000, "Groceries", at(120));

        let flags = detect(&[a, b]);
        assert!(flags.iter().all(|f| f.kind != AnomalyKind::Duplicate));
    }

    #[test]
    fn test_duplicate_tolerates_one_cent_drift() {
        let a = expense(5000, "Groceries", at(0));
        let b = expense(4999, "Groceries", at(5));
        let c = expense(4997, "Groceries", at(6));

        let flags = detect(&[a.clone(), b.clone(), c.clone()]);
        let duplicate_ids: Vec<_> = flags
            .iter()
            .filter(|f| f.kind == AnomalyKind::Duplicate)
            .map(|f| f.transaction_id)
            .collect();

        assert!(duplicate_ids.contains(&a.id));
        assert!(duplicate_ids.contains(&b.id));
        // 3 cents away from a, 2 from b: not a duplicate of either
        assert!(!duplicate_ids.contains(&c.id));
    }

    #[test]
    fn test_duplicate_requires_matching_category_and_note() {
        let a = expense(5000, "Groceries", at(0));
        let b = expense(5000, "Dining", at(5));

        let flags = detect(&[a, b]);
        assert!(flags.iter().all(|f| f.kind != AnomalyKind::Duplicate));
    }

    #[test]
    fn test_high_amount_flagged_at_medium() {
        // Ten $10 expenses and one $100: mean ~ $18.2
        let mut txns: Vec<Transaction> = (0..10)
            .map(|i| expense(1000, "Misc", at(i * 60 * 24)))
            .collect();
        let outlier = expense(10_000, "Misc", at(99 * 60));
        txns.push(outlier.clone());

        let flags = detect(&txns);
        let flag = flags
            .iter()
            .find(|f| f.kind == AnomalyKind::HighAmount)
            .expect("outlier should be flagged");
        assert_eq!(flag.transaction_id, outlier.id);
        assert_eq!(flag.severity, Severity::Medium);
    }

    #[test]
    fn test_high_amount_escalates_to_high() {
        let mut txns: Vec<Transaction> = (0..10)
            .map(|i| expense(1000, "Misc", at(i * 60 * 24)))
            .collect();
        let outlier = expense(50_000, "Misc", at(99 * 60));
        txns.push(outlier.clone());

        let flags = detect(&txns);
        let flag = flags
            .iter()
            .find(|f| f.kind == AnomalyKind::HighAmount)
            .expect("outlier should be flagged");
        assert_eq!(flag.severity, Severity::High);
    }

    #[test]
    fn test_high_amount_floor_suppresses_tiny_means() {
        // Everything is pocket change; the $20 expense is over 4x the mean
        // but under the absolute floor, so it stays quiet.
        let mut txns: Vec<Transaction> = (0..4)
            .map(|i| expense(100, "Snacks", at(i * 60 * 24)))
            .collect();
        txns.push(expense(2000, "Snacks", at(99 * 60)));

        let flags = detect(&txns);
        assert!(flags.iter().all(|f| f.kind != AnomalyKind::HighAmount));
    }

    #[test]
    fn test_high_amount_ignores_income_and_inconsistent_rows() {
        let mut txns: Vec<Transaction> = (0..10)
            .map(|i| expense(1000, "Misc", at(i * 60 * 24)))
            .collect();
        // A large income entry must not trip the expense rule
        txns.push(Transaction::new(Money::from_cents(500_000), "Salary", at(10)));
        // An inconsistent row (positive amount marked expense) is skipped
        let mut broken = Transaction::new(Money::from_cents(90_000), "Misc", at(20));
        broken.kind = crate::models::TransactionKind::Expense;
        txns.push(broken);

        let flags = detect(&txns);
        assert!(flags.iter().all(|f| f.kind != AnomalyKind::HighAmount));
    }

    #[test]
    fn test_unusual_time_flagged_low() {
        let night = Local
            .with_ymd_and_hms(2025, 5, 12, 3, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let txn = expense(5_000, "Misc", night);

        let flags = detect(&[txn.clone()]);
        let flag = flags
            .iter()
            .find(|f| f.kind == AnomalyKind::UnusualTime)
            .expect("night activity should be flagged");
        assert_eq!(flag.transaction_id, txn.id);
        assert_eq!(flag.severity, Severity::Low);
    }

    #[test]
    fn test_unusual_time_respects_floor_and_window() {
        let night = Local
            .with_ymd_and_hms(2025, 5, 12, 3, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let daytime = Local
            .with_ymd_and_hms(2025, 5, 12, 14, 0, 0)
            .unwrap()
            .with_timezone(&Utc);

        let small_night = expense(500, "Snacks", night);
        let big_day = expense(50_000, "Rent", daytime);

        let flags = detect(&[small_night, big_day]);
        assert!(flags.iter().all(|f| f.kind != AnomalyKind::UnusualTime));
    }

    #[test]
    fn test_rapid_succession_flagged() {
        // Three $40 expenses at minutes 0, 10, 25: span 25m, sum $120
        let txns = vec![
            expense(4000, "Shopping", at(0)),
            expense(4000, "Shopping", at(10)),
            expense(4000, "Shopping", at(25)),
        ];

        let flags = detect(&txns);
        let flag = flags
            .iter()
            .find(|f| f.kind == AnomalyKind::RapidSuccession)
            .expect("burst should be flagged");
        // The first of the triple carries the flag
        assert_eq!(flag.transaction_id, txns[0].id);
    }

    #[test]
    fn test_rapid_succession_span_too_wide() {
        let txns = vec![
            expense(4000, "Shopping", at(0)),
            expense(4000, "Shopping", at(20)),
            expense(4000, "Shopping", at(50)),
        ];

        let flags = detect(&txns);
        assert!(flags.iter().all(|f| f.kind != AnomalyKind::RapidSuccession));
    }

    #[test]
    fn test_rapid_succession_sum_too_small() {
        let txns = vec![
            expense(1000, "Snacks", at(0)),
            expense(1000, "Snacks", at(5)),
            expense(1000, "Snacks", at(10)),
        ];

        let flags = detect(&txns);
        assert!(flags.iter().all(|f| f.kind != AnomalyKind::RapidSuccession));
    }

    #[test]
    fn test_output_truncated_in_insertion_order() {
        // Twelve identical expenses in one hour produce far more than ten
        // duplicate flags; output stays capped and duplicates (the first
        // rule) fill every slot.
        let txns: Vec<Transaction> = (0..12).map(|i| expense(5000, "Misc", at(i))).collect();

        let flags = detect(&txns);
        assert_eq!(flags.len(), MAX_REPORTED);
        assert!(flags.iter().all(|f| f.kind == AnomalyKind::Duplicate));
    }
}
