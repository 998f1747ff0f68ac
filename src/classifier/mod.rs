//! Trainable keyword classifier
//!
//! A token -> (category -> count) table trained on transaction notes.
//! Training is monotonic: counts only ever increase and the table is never
//! pruned. Stale keyword associations therefore never fade; this matches the
//! persisted format and is recorded as a known limitation in DESIGN.md.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Money;

/// Fallback category for large inflows with no recognizable note
const INCOME_CATEGORY: &str = "Income";

/// Fallback category for tiny amounts (consumables)
const SMALL_AMOUNT_CATEGORY: &str = "Snacks";

/// Fallback of last resort
const DEFAULT_CATEGORY: &str = "Other";

/// Amounts at or above this (absolute cents) default to income when nothing
/// else matches
const LARGE_AMOUNT_CENTS: i64 = 200_000;

/// Amounts at or below this (absolute cents) default to the consumable
/// category when nothing else matches
const SMALL_AMOUNT_CENTS: i64 = 500;

/// Reported confidence never drops below this floor
const MIN_CONFIDENCE: f64 = 0.2;

/// Hand-authored keyword rules, first match wins
static KEYWORD_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\b(grocer\w*|supermarket|market|aldi|costco)\b", "Groceries"),
        (r"(?i)\b(coffee|cafe|latte|restaurant|lunch|dinner|takeout|pizza)\b", "Dining"),
        (r"(?i)\b(uber|lyft|taxi|bus|train|metro|fuel|gas|parking)\b", "Transport"),
        (r"(?i)\b(rent|lease|mortgage|landlord)\b", "Housing"),
        (r"(?i)\b(electric\w*|water|internet|phone|utility|utilities)\b", "Utilities"),
        (r"(?i)\b(netflix|spotify|cinema|movie|game|subscription)\b", "Entertainment"),
        (r"(?i)\b(pharmacy|doctor|clinic|dental|hospital)\b", "Health"),
        (r"(?i)\b(salary|payroll|paycheck|invoice|refund)\b", "Income"),
    ]
    .into_iter()
    .map(|(pattern, category)| {
        let re = Regex::new(pattern).expect("keyword rule patterns are static and valid");
        (re, category)
    })
    .collect()
});

/// A classifier suggestion with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    /// Winning share of the total vote, floored at a minimum so results are
    /// never reported as near-zero confidence
    pub confidence: f64,
}

/// Token -> (category -> occurrence count) weight table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassifierTable {
    counts: HashMap<String, HashMap<String, u32>>,
}

impl ClassifierTable {
    /// Number of distinct tokens trained so far
    pub fn token_count(&self) -> usize {
        self.counts.len()
    }

    /// Trained weight for a (token, category) pair
    pub fn weight(&self, token: &str, category: &str) -> u32 {
        self.counts
            .get(token)
            .and_then(|votes| votes.get(category))
            .copied()
            .unwrap_or(0)
    }

    /// Train on a note/category pair, returning the updated table.
    ///
    /// Pure with respect to `self`; counts for every token in the note are
    /// incremented toward `category` and never decreased.
    #[must_use]
    pub fn train(&self, note: &str, category: &str) -> ClassifierTable {
        let mut updated = self.clone();
        for token in tokenize(note) {
            let votes = updated.counts.entry(token).or_default();
            let count = votes.entry(category.to_string()).or_insert(0);
            *count = count.saturating_add(1);
        }
        updated
    }

    /// Suggest a category for a note and amount.
    ///
    /// Trained token votes win when any exist; otherwise keyword rules, then
    /// amount-based defaults, then the generic fallback.
    pub fn suggest(&self, note: &str, amount: Money) -> Suggestion {
        let mut scores: HashMap<&str, u64> = HashMap::new();
        for token in tokenize(note) {
            if let Some(votes) = self.counts.get(&token) {
                for (category, count) in votes {
                    *scores.entry(category.as_str()).or_insert(0) += u64::from(*count);
                }
            }
        }

        let total: u64 = scores.values().sum();
        if total > 0 {
            // Deterministic winner: highest score, ties broken by name
            let (category, score) = scores
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
                .expect("total > 0 implies at least one score");
            let confidence = (score as f64 / total as f64).max(MIN_CONFIDENCE);
            return Suggestion {
                category: category.to_string(),
                confidence,
            };
        }

        // No trained weight: ordered keyword rules, first match wins
        for (rule, category) in KEYWORD_RULES.iter() {
            if rule.is_match(note) {
                return Suggestion {
                    category: (*category).to_string(),
                    confidence: MIN_CONFIDENCE,
                };
            }
        }

        // Amount-based defaults, then the generic fallback
        let magnitude = amount.abs().cents();
        let category = if magnitude >= LARGE_AMOUNT_CENTS {
            INCOME_CATEGORY
        } else if magnitude > 0 && magnitude <= SMALL_AMOUNT_CENTS {
            SMALL_AMOUNT_CATEGORY
        } else {
            DEFAULT_CATEGORY
        };

        Suggestion {
            category: category.to_string(),
            confidence: MIN_CONFIDENCE,
        }
    }
}

/// Normalize a note into lowercase word tokens, non-alphanumeric stripped
fn tokenize(note: &str) -> Vec<String> {
    note.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Coffee @ Blue-Bottle, 7am!"),
            vec!["coffee", "blue", "bottle", "7am"]
        );
        assert!(tokenize("--- !!! ---").is_empty());
    }

    #[test]
    fn test_train_is_pure_and_monotonic() {
        let empty = ClassifierTable::default();
        let once = empty.train("coffee beans", "Dining");
        let twice = once.train("coffee beans", "Dining");

        // Original untouched
        assert_eq!(empty.weight("coffee", "Dining"), 0);
        assert_eq!(once.weight("coffee", "Dining"), 1);
        assert_eq!(twice.weight("coffee", "Dining"), 2);
        assert!(twice.weight("coffee", "Dining") >= once.weight("coffee", "Dining"));
    }

    #[test]
    fn test_suggest_trained_token() {
        let table = ClassifierTable::default().train("espresso", "Dining");
        let suggestion = table.suggest("morning espresso", Money::from_cents(-450));
        assert_eq!(suggestion.category, "Dining");
        assert!((suggestion.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_suggest_weighs_competing_categories() {
        let table = ClassifierTable::default()
            .train("store run", "Groceries")
            .train("store run", "Groceries")
            .train("store visit", "Shopping");
        let suggestion = table.suggest("store", Money::from_cents(-2000));
        assert_eq!(suggestion.category, "Groceries");
        // 2 of 3 votes
        assert!((suggestion.confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_floor() {
        // Many categories splitting the vote evenly would report a tiny
        // share; the floor keeps it at MIN_CONFIDENCE.
        let mut table = ClassifierTable::default();
        for category in ["A", "B", "C", "D", "E", "F"] {
            table = table.train("thing", category);
        }
        let suggestion = table.suggest("thing", Money::zero());
        assert!(suggestion.confidence >= MIN_CONFIDENCE);
    }

    #[test]
    fn test_keyword_rule_fallback() {
        let table = ClassifierTable::default();
        let suggestion = table.suggest("uber to airport", Money::from_cents(-3500));
        assert_eq!(suggestion.category, "Transport");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "market lunch" matches both Groceries and Dining rules; Groceries
        // is listed first.
        let table = ClassifierTable::default();
        let suggestion = table.suggest("market lunch", Money::from_cents(-1500));
        assert_eq!(suggestion.category, "Groceries");
    }

    #[test]
    fn test_amount_fallbacks() {
        let table = ClassifierTable::default();

        let large = table.suggest("", Money::from_cents(250_000));
        assert_eq!(large.category, "Income");

        let small = table.suggest("", Money::from_cents(-300));
        assert_eq!(small.category, "Snacks");

        let middling = table.suggest("", Money::from_cents(-5_000));
        assert_eq!(middling.category, "Other");
    }

    #[test]
    fn test_trained_votes_beat_keyword_rules() {
        let table = ClassifierTable::default().train("uber eats", "Dining");
        let suggestion = table.suggest("uber eats order", Money::from_cents(-2200));
        assert_eq!(suggestion.category, "Dining");
    }

    #[test]
    fn test_serialization_is_transparent_map() {
        let table = ClassifierTable::default().train("coffee", "Dining");
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"coffee\""));
        let back: ClassifierTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.weight("coffee", "Dining"), 1);
    }
}
