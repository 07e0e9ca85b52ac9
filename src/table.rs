//! Typed access to the ingested CSV tables.
//!
//! Loaders check the header against the schema written by `ingest` and fail
//! fast with `MalformedInput` when it drifts.

use crate::error::{MindError, Result};
use crate::ingest::{BEHAVIOR_COLUMNS, NEWS_COLUMNS};
use crate::logging::log_table_loaded;
use chrono::NaiveDateTime;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const BEHAVIOR_TIME_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// First rows of a table, rendered as strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(MindError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    Ok(csv::Reader::from_path(path)?)
}

fn read_error(path: &Path, err: csv::Error) -> MindError {
    match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => MindError::malformed(
            path,
            pos.as_ref().map(|p| p.line()).unwrap_or(0),
            format!("expected {} fields, got {}", expected_len, len),
        ),
        _ => MindError::Csv(err),
    }
}

fn read_header(path: &Path, reader: &mut csv::Reader<std::fs::File>) -> Result<Vec<String>> {
    let header = reader.headers().map_err(|e| read_error(path, e))?;
    Ok(header.iter().map(|s| s.to_string()).collect())
}

fn expect_header(path: &Path, header: &[String], expected: &[&str]) -> Result<()> {
    if header.len() != expected.len() || header.iter().zip(expected).any(|(h, e)| h != e) {
        return Err(MindError::malformed(
            path,
            1,
            format!("schema mismatch: got {:?} expected {:?}", header, expected),
        ));
    }
    Ok(())
}

// =============================================================================
// Untyped table
// =============================================================================

#[derive(Debug, Clone)]
pub struct CsvTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = open_reader(path)?;
        let columns = read_header(path, &mut reader)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| read_error(path, e))?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }
        log_table_loaded(&path.display().to_string(), rows.len(), columns.len());
        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn head(&self, n: usize) -> Preview {
        Preview {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

// =============================================================================
// Behaviors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Impression {
    pub news_id: String,
    /// `None` for unlabeled impressions (test split)
    pub clicked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorRecord {
    pub impression_id: String,
    pub user_id: String,
    pub time: NaiveDateTime,
    pub history: Vec<String>,
    pub impressions: Vec<Impression>,
}

pub fn parse_impression(token: &str) -> std::result::Result<Impression, String> {
    match token.rsplit_once('-') {
        Some((id, "1")) => Ok(Impression {
            news_id: id.to_string(),
            clicked: Some(true),
        }),
        Some((id, "0")) => Ok(Impression {
            news_id: id.to_string(),
            clicked: Some(false),
        }),
        Some((_, flag)) => Err(format!("bad click flag {:?} in {:?}", flag, token)),
        None => Ok(Impression {
            news_id: token.to_string(),
            clicked: None,
        }),
    }
}

pub fn load_behaviors(path: &Path) -> Result<Vec<BehaviorRecord>> {
    let mut reader = open_reader(path)?;
    let header = read_header(path, &mut reader)?;
    expect_header(path, &header, &BEHAVIOR_COLUMNS)?;

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| read_error(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let time = NaiveDateTime::parse_from_str(&record[2], BEHAVIOR_TIME_FORMAT)
            .map_err(|e| MindError::malformed(path, line, format!("bad time {:?}: {}", &record[2], e)))?;
        let impressions = record[4]
            .split_whitespace()
            .map(parse_impression)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|reason| MindError::malformed(path, line, reason))?;
        out.push(BehaviorRecord {
            impression_id: record[0].to_string(),
            user_id: record[1].to_string(),
            time,
            history: record[3].split_whitespace().map(|s| s.to_string()).collect(),
            impressions,
        });
    }
    log_table_loaded(&path.display().to_string(), out.len(), header.len());
    Ok(out)
}

// =============================================================================
// News
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EntityMention {
    pub label: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub wikidata_id: String,
    pub confidence: f64,
    pub occurrence_offsets: Vec<u32>,
    pub surface_forms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsRecord {
    pub news_id: String,
    pub category: String,
    pub subcategory: String,
    pub title: String,
    pub abstract_text: Option<String>,
    pub url: String,
    pub title_entities: Vec<EntityMention>,
    pub abstract_entities: Vec<EntityMention>,
}

pub fn parse_entities(raw: &str) -> std::result::Result<Vec<EntityMention>, serde_json::Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed)
}

pub fn load_news(path: &Path) -> Result<Vec<NewsRecord>> {
    let mut reader = open_reader(path)?;
    let header = read_header(path, &mut reader)?;
    expect_header(path, &header, &NEWS_COLUMNS)?;

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| read_error(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let entities = |idx: usize| {
            parse_entities(&record[idx]).map_err(|e| {
                MindError::malformed(path, line, format!("bad {} json: {}", NEWS_COLUMNS[idx], e))
            })
        };
        let abstract_text = match &record[4] {
            "" => None,
            text => Some(text.to_string()),
        };
        out.push(NewsRecord {
            news_id: record[0].to_string(),
            category: record[1].to_string(),
            subcategory: record[2].to_string(),
            title: record[3].to_string(),
            abstract_text,
            url: record[5].to_string(),
            title_entities: entities(6)?,
            abstract_entities: entities(7)?,
        });
    }
    log_table_loaded(&path.display().to_string(), out.len(), header.len());
    Ok(out)
}

// =============================================================================
// Embeddings
// =============================================================================

/// Identifier column plus numeric dimension columns, stored column-major.
/// `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTable {
    pub id_column: String,
    pub ids: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

fn parse_cell(raw: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    s.parse::<f64>().map(Some)
}

impl EmbeddingTable {
    pub fn load(path: &Path, id_column: &str) -> Result<Self> {
        let mut reader = open_reader(path)?;
        let header = read_header(path, &mut reader)?;
        if header.first().map(|s| s.as_str()) != Some(id_column) {
            return Err(MindError::malformed(
                path,
                1,
                format!("expected first column {:?}, got {:?}", id_column, header.first()),
            ));
        }
        let columns: Vec<String> = header[1..].to_vec();
        let mut ids = Vec::new();
        let mut values = vec![Vec::new(); columns.len()];

        for record in reader.records() {
            let record = record.map_err(|e| read_error(path, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            ids.push(record[0].to_string());
            for (col, raw) in record.iter().skip(1).enumerate() {
                let cell = parse_cell(raw).map_err(|e| {
                    MindError::malformed(path, line, format!("{}: {:?} is not numeric ({})", columns[col], raw, e))
                })?;
                values[col].push(cell);
            }
        }
        log_table_loaded(&path.display().to_string(), ids.len(), header.len());
        Ok(Self {
            id_column: id_column.to_string(),
            ids,
            columns,
            values,
        })
    }

    /// Build from row-major values; used by tools and tests.
    pub fn from_rows(id_column: &str, columns: Vec<String>, rows: Vec<(String, Vec<Option<f64>>)>) -> Result<Self> {
        let mut ids = Vec::with_capacity(rows.len());
        let mut values = vec![Vec::with_capacity(rows.len()); columns.len()];
        for (i, (id, row)) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(MindError::malformed(
                    "<memory>",
                    i as u64 + 1,
                    format!("expected {} values, got {}", columns.len(), row.len()),
                ));
            }
            ids.push(id);
            for (col, v) in row.into_iter().enumerate() {
                values[col].push(v);
            }
        }
        Ok(Self {
            id_column: id_column.to_string(),
            ids,
            columns,
            values,
        })
    }

    pub fn row_count(&self) -> usize {
        self.ids.len()
    }

    pub fn dim_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column_index(name).map(|i| self.values[i].as_slice())
    }

    /// Drop columns with no value in any row. Returns the dropped names.
    pub fn drop_all_missing(&mut self) -> Vec<String> {
        let mut dropped = Vec::new();
        let mut keep_cols = Vec::new();
        let mut keep_vals = Vec::new();
        for (name, col) in self.columns.drain(..).zip(self.values.drain(..)) {
            if col.iter().all(|v| v.is_none()) {
                dropped.push(name);
            } else {
                keep_cols.push(name);
                keep_vals.push(col);
            }
        }
        self.columns = keep_cols;
        self.values = keep_vals;
        dropped
    }

    /// Fill missing cells with their column mean. Returns the number filled.
    /// All-missing columns are left untouched; drop them first.
    pub fn impute_mean(&mut self) -> usize {
        let mut filled = 0;
        for col in self.values.iter_mut() {
            let present: Vec<f64> = col.iter().flatten().copied().collect();
            if present.is_empty() || present.len() == col.len() {
                continue;
            }
            let mean = present.iter().sum::<f64>() / present.len() as f64;
            for cell in col.iter_mut().filter(|c| c.is_none()) {
                *cell = Some(mean);
                filled += 1;
            }
        }
        filled
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().map(|c| c.iter().filter(|v| v.is_none()).count()).sum()
    }

    /// Dense `N x D` matrix. Fails while any cell is still missing.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let n = self.row_count();
        let d = self.columns.len();
        let missing = self.missing_count();
        if missing > 0 {
            return Err(MindError::computation(format!(
                "{} missing values remain; impute before building a matrix",
                missing
            )));
        }
        Ok(Array2::from_shape_fn((n, d), |(r, c)| self.values[c][r].unwrap_or(0.0)))
    }

    pub fn head(&self, n: usize) -> Preview {
        let mut columns = vec![self.id_column.clone()];
        columns.extend(self.columns.iter().cloned());
        let rows = (0..self.row_count().min(n))
            .map(|r| {
                let mut row = vec![self.ids[r].clone()];
                row.extend(self.values.iter().map(|col| match col[r] {
                    Some(v) => format!("{:.6}", v),
                    None => "NaN".to_string(),
                }));
                row
            })
            .collect();
        Preview { columns, rows }
    }
}
