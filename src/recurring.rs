//! Recurring-expense detection over parsed statement rows.
//!
//! Transactions are grouped by a normalized (description, amount) key; a
//! group counts as recurring once its members span at least two distinct
//! calendar months. One representative row is emitted per recurring group.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use chrono::Datelike;
use regex::Regex;

use crate::models::StatementRow;

/// One recurring expense, represented by the first row seen for its group.
/// `category` is the most common non-empty label among the group's members;
/// `None` stays `None` here; defaulting is the caller's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringExpense {
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
}

fn noise_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z]+").unwrap())
}

/// Normalize a statement description into a merchant key: lowercase, digits
/// and punctuation stripped, whitespace collapsed. "NETFLIX #4492" and
/// "Netflix #7731" both become "netflix".
pub fn normalize_description(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let parts: Vec<&str> = noise_pattern()
        .split(&lower)
        .filter(|s| !s.is_empty())
        .collect();
    parts.join(" ")
}

/// Quantize an amount to cents so float representation noise cannot split a
/// group.
fn amount_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

struct Group {
    description: String,
    amount: f64,
    months: HashSet<(i32, u32)>,
    categories: Vec<String>,
}

/// Detect expenses recurring across distinct calendar months.
///
/// Output order is the first-seen order of groups, so results are
/// deterministic for a given input. Empty input yields an empty result.
pub fn detect_recurring(rows: &[StatementRow]) -> Vec<RecurringExpense> {
    let mut order: Vec<Group> = Vec::new();
    let mut index: HashMap<(String, i64), usize> = HashMap::new();

    for row in rows {
        let key = (normalize_description(&row.description), amount_cents(row.amount));
        let slot = *index.entry(key).or_insert_with(|| {
            order.push(Group {
                description: row.description.clone(),
                amount: row.amount,
                months: HashSet::new(),
                categories: Vec::new(),
            });
            order.len() - 1
        });
        let group = &mut order[slot];
        group.months.insert((row.date.year(), row.date.month()));
        if let Some(cat) = row.category.as_deref() {
            if !cat.is_empty() {
                group.categories.push(cat.to_string());
            }
        }
    }

    order
        .into_iter()
        .filter(|g| g.months.len() >= 2)
        .map(|g| RecurringExpense {
            description: g.description,
            amount: g.amount,
            category: most_common(&g.categories),
        })
        .collect()
}

/// Most frequent label, first-seen winning ties.
fn most_common(labels: &[String]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for label in labels {
        let count = counts[label.as_str()];
        match best {
            Some((_, n)) if n >= count => {}
            _ => best = Some((label, count)),
        }
    }
    best.map(|(label, _)| label.to_string())
}
