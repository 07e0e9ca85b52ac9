//! Descriptive statistics over loaded tables.

use crate::error::{MindError, Result};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::table::{BehaviorRecord, EmbeddingTable, NewsRecord};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

/// Frequency of each distinct value, most frequent first.
/// Ties keep the order in which values were first seen.
pub fn value_counts<I, S>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for v in values {
        let v = v.as_ref();
        match index.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(v.to_string(), counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }
    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Linear interpolation between closest ranks on a sorted slice.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl FiveNumberSummary {
    /// Non-finite values are skipped. Fails only when nothing is left.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Err(MindError::computation("five-number summary of an empty column"));
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        Ok(Self {
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Five-number summary for every dimension column of an embedding table.
/// A column with no values gets `None` rather than failing the table.
pub fn describe(table: &EmbeddingTable) -> Vec<(String, Option<FiveNumberSummary>)> {
    let out: Vec<(String, Option<FiveNumberSummary>)> = table
        .columns
        .iter()
        .zip(&table.values)
        .map(|(name, col)| {
            let present: Vec<f64> = col.iter().flatten().copied().collect();
            (name.clone(), FiveNumberSummary::from_values(&present).ok())
        })
        .collect();
    let empty: Vec<&str> = out.iter().filter(|(_, s)| s.is_none()).map(|(n, _)| n.as_str()).collect();
    log(
        Level::Debug,
        Domain::Stats,
        "described",
        obj(&[
            ("id_column", v_str(&table.id_column)),
            ("columns", json!(out.len())),
            ("empty_columns", json!(empty)),
        ]),
    );
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Equal-width histogram. Every bin is `[lo, hi)` except the last, which is closed.
/// A constant column yields a single bin of width 1 centred on the value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![Bin {
            lo: min - 0.5,
            hi: max + 0.5,
            count: finite.len(),
        }];
    }
    let width = (max - min) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lo: min + width * i as f64,
            hi: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Title length in characters -> number of articles, ordered by length.
pub fn title_length_distribution(news: &[NewsRecord]) -> Vec<(usize, usize)> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for n in news {
        *counts.entry(n.title.chars().count()).or_insert(0) += 1;
    }
    let mut out: Vec<(usize, usize)> = counts.into_iter().collect();
    out.sort_by_key(|(len, _)| *len);
    out
}

pub const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "being", "but", "by", "can", "could", "did", "do", "does",
    "for", "from", "had", "has", "have", "he", "her", "here", "his", "how", "i", "if", "in",
    "into", "is", "it", "its", "just", "me", "more", "most", "my", "no", "not", "of", "on",
    "one", "or", "our", "out", "over", "says", "she", "so", "some", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "to", "up", "was", "we",
    "were", "what", "when", "where", "which", "who", "why", "will", "with", "would", "you",
    "your",
];

/// Word frequencies across `texts`, lower-cased, stopwords and single letters removed.
pub fn word_frequencies<'a, I>(texts: I, stopwords: &[&str]) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let words = texts.into_iter().flat_map(|t| {
        t.split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|w| w.trim_matches('\'').to_lowercase())
            .filter(|w| w.chars().count() > 1 && !stopwords.contains(&w.as_str()))
            .collect::<Vec<_>>()
    });
    value_counts(words)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpressionStats {
    pub impressions: usize,
    pub shown: usize,
    pub clicked: usize,
    pub unlabeled: usize,
    /// clicked / labeled items shown
    pub click_through_rate: f64,
    pub mean_history_len: f64,
}

pub fn impression_stats(behaviors: &[BehaviorRecord]) -> ImpressionStats {
    let mut shown = 0;
    let mut clicked = 0;
    let mut unlabeled = 0;
    let mut history = 0;
    for b in behaviors {
        history += b.history.len();
        for imp in &b.impressions {
            shown += 1;
            match imp.clicked {
                Some(true) => clicked += 1,
                Some(false) => {}
                None => unlabeled += 1,
            }
        }
    }
    let labeled = shown - unlabeled;
    ImpressionStats {
        impressions: behaviors.len(),
        shown,
        clicked,
        unlabeled,
        click_through_rate: if labeled > 0 { clicked as f64 / labeled as f64 } else { 0.0 },
        mean_history_len: if behaviors.is_empty() { 0.0 } else { history as f64 / behaviors.len() as f64 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_counts_orders_by_frequency_then_first_seen() {
        let counts = value_counts(["b", "a", "b", "c", "a", "b"]);
        assert_eq!(counts[0], ("b".to_string(), 3));
        assert_eq!(counts[1], ("a".to_string(), 2));
        assert_eq!(counts[2], ("c".to_string(), 1));

        let ties = value_counts(["x", "y", "z"]);
        let names: Vec<_> = ties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn five_number_matches_linear_interpolation() {
        let s = FiveNumberSummary::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert!((s.q1 - 1.75).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert!((s.q3 - 3.25).abs() < 1e-12);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn five_number_is_ordered() {
        let data = [0.3, -1.2, 5.5, 2.2, 2.2, 0.0, -7.1, 3.3, 9.9];
        let s = FiveNumberSummary::from_values(&data).unwrap();
        assert!(s.min <= s.q1 && s.q1 <= s.median && s.median <= s.q3 && s.q3 <= s.max);
    }

    #[test]
    fn five_number_degenerates_on_constant_and_tiny_columns() {
        let s = FiveNumberSummary::from_values(&[4.0, 4.0, 4.0]).unwrap();
        assert_eq!((s.min, s.q1, s.median, s.q3, s.max), (4.0, 4.0, 4.0, 4.0, 4.0));
        let one = FiveNumberSummary::from_values(&[2.5]).unwrap();
        assert_eq!(one.iqr(), 0.0);
        assert!(FiveNumberSummary::from_values(&[]).is_err());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
        let bins = histogram(&values, 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins[19].hi, 9.9);

        let flat = histogram(&[1.0, 1.0], 20);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].count, 2);
    }

    #[test]
    fn word_frequencies_skip_stopwords() {
        let freq = word_frequencies(["The Bills win, the Bills lose", "Bills' season"], STOPWORDS);
        assert_eq!(freq[0], ("bills".to_string(), 3));
        assert!(freq.iter().all(|(w, _)| w != "the"));
    }

    #[test]
    fn describe_keeps_going_past_an_empty_column() {
        let table = EmbeddingTable::from_rows(
            "Relation ID",
            vec!["Dim_1".into(), "Dim_2".into(), "Dim_3".into()],
            vec![
                ("P1".into(), vec![Some(1.0), None, Some(-1.0)]),
                ("P2".into(), vec![Some(3.0), None, Some(1.0)]),
            ],
        )
        .unwrap();
        let summaries = describe(&table);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].1.map(|s| s.median), Some(2.0));
        assert!(summaries[1].1.is_none());
        assert_eq!(summaries[2].1.map(|s| s.max), Some(1.0));
    }
}
