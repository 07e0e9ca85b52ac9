//! The four reporting views and the report model they share.
//!
//! A view never fails as a whole: each section either renders or carries a
//! user-visible error, and the remaining sections still render.

pub mod behavior_news;
pub mod entity;
pub mod overview;
pub mod relation;

use crate::charts::Artifact;
use crate::error::{MindError, Result};
use crate::logging::log_section_failure;
use crate::table::Preview;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Block {
    Text(String),
    /// Informational note, e.g. an empty selection
    Note(String),
    Table(Preview),
    Chart(Artifact),
    Error { kind: String, message: String },
}

impl Block {
    pub fn error(err: &MindError) -> Self {
        Block::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn with(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn has_error(&self) -> bool {
        self.blocks.iter().any(|b| matches!(b, Block::Error { .. }))
    }
}

/// Run one section body; a failure becomes an error block in that section.
pub fn contain<F>(view: &str, title: &str, body: F) -> Section
where
    F: FnOnce() -> Result<Vec<Block>>,
{
    match body() {
        Ok(blocks) => Section {
            title: title.to_string(),
            blocks,
        },
        Err(err) => {
            log_section_failure(view, title, err.kind(), &err.to_string());
            Section::new(title).with(Block::error(&err))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewReport {
    pub title: String,
    pub intro: String,
    pub sections: Vec<Section>,
}

impl ViewReport {
    pub fn new(title: &str, intro: &str) -> Self {
        Self {
            title: title.to_string(),
            intro: intro.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.sections.iter().flat_map(|s| &s.blocks).filter_map(|b| match b {
            Block::Chart(a) => Some(a),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections.iter().flat_map(|s| {
            s.blocks.iter().filter_map(move |b| match b {
                Block::Error { message, .. } => Some((s.title.as_str(), message.as_str())),
                _ => None,
            })
        })
    }
}

/// User-chosen parameters that survive navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewParams {
    /// Free-text dimension list for the entity histograms
    pub dimensions: String,
    /// Entity boxplot columns; `None` means the configured default
    pub boxplot_columns: Option<Vec<String>>,
    /// Relation boxplot column; `None` means the first dimension
    pub relation_column: Option<String>,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            dimensions: "1, 2, 3".to_string(),
            boxplot_columns: None,
            relation_column: None,
        }
    }
}

/// Five-number summaries as a preview table. Columns without values show `NaN`.
pub(crate) fn summary_table(summaries: &[(String, Option<crate::stats::FiveNumberSummary>)]) -> Preview {
    Preview {
        columns: ["Dimension", "min", "25%", "50%", "75%", "max"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: summaries
            .iter()
            .map(|(name, summary)| {
                let mut row = vec![name.clone()];
                match summary {
                    Some(s) => row.extend([s.min, s.q1, s.median, s.q3, s.max].iter().map(|v| format!("{:.6}", v))),
                    None => row.extend(std::iter::repeat("NaN".to_string()).take(5)),
                }
                row
            })
            .collect(),
    }
}

/// `N x k` projection as a preview table with `PCA_1..PCA_k` headers.
pub(crate) fn projection_preview(points: &ndarray::Array2<f64>, rows: usize) -> Preview {
    Preview {
        columns: (1..=points.ncols()).map(|i| format!("PCA_{}", i)).collect(),
        rows: points
            .outer_iter()
            .take(rows)
            .map(|r| r.iter().map(|v| format!("{:.6}", v)).collect())
            .collect(),
    }
}
