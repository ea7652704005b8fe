//! Selectivity Estimator.

use super::types::{CollectionStatistics, Predicate};

pub const DEFAULT_SELECTIVITY: f64 = 0.50;

fn clamp_selectivity(s: f64) -> f64 {
    if s.is_nan() {
        return 0.5;
    }
    s.clamp(0.0, 1.0)
}

/// Size-based heuristic used whenever the predicate tree itself isn't
/// available, mapping serialised blob length to a selectivity bucket.
fn size_heuristic(blob_len: usize) -> f64 {
    match blob_len {
        0..=49 => 0.001,
        50..=99 => 0.01,
        100..=199 => 0.10,
        200..=399 => 0.30,
        _ => 0.60,
    }
}

fn frequency_of(stats: &CollectionStatistics, field: &str, value: &str) -> f64 {
    stats
        .fields
        .get(field)
        .and_then(|f| {
            let count = *f.value_frequency.get(value)?;
            if f.total_count == 0 {
                None
            } else {
                Some(count as f64 / f.total_count as f64)
            }
        })
        .unwrap_or(0.0)
}

fn inverse_cardinality(stats: &CollectionStatistics, field: &str) -> f64 {
    stats
        .fields
        .get(field)
        .map(|f| if f.cardinality == 0 { 0.0 } else { 1.0 / f.cardinality as f64 })
        .unwrap_or(0.0)
}

/// Walks a parsed predicate tree. A richer path kept available for future
/// use. AND combines by intersection (product); OR combines
/// by union under independence.
fn estimate_predicate(predicate: &Predicate, stats: &CollectionStatistics) -> f64 {
    match predicate {
        Predicate::Equals { field, .. } => inverse_cardinality(stats, field),
        Predicate::NotEquals { field, .. } => 1.0 - inverse_cardinality(stats, field),
        Predicate::In { field, values } => values
            .iter()
            .map(|v| frequency_of(stats, field, v))
            .sum::<f64>()
            .min(1.0),
        Predicate::NotIn { field, values } => {
            1.0 - values.iter().map(|v| frequency_of(stats, field, v)).sum::<f64>().min(1.0)
        }
        Predicate::Range { .. } => 0.5,
        Predicate::And(children) => children.iter().map(|c| estimate_predicate(c, stats)).product(),
        Predicate::Or(children) => {
            1.0 - children.iter().map(|c| 1.0 - estimate_predicate(c, stats)).product::<f64>()
        }
    }
}

/// Estimates the fraction of rows a predicate blob will leave after
/// filtering. `stats` is `None` when nothing has been cached yet for the
/// collection.
pub fn estimate(blob: &[u8], predicate: Option<&Predicate>, stats: Option<&CollectionStatistics>) -> f64 {
    if blob.is_empty() {
        return 1.0;
    }
    let Some(stats) = stats else {
        return DEFAULT_SELECTIVITY;
    };
    let raw = match predicate {
        Some(p) => estimate_predicate(p, stats),
        None => size_heuristic(blob.len()),
    };
    clamp_selectivity(raw)
}
