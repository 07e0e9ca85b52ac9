//! TSV -> CSV ingestion of the raw MIND files.
//!
//! Conversion is a pure relabel/re-delimit: field values are copied byte for
//! byte, the header comes from the supplied column list, and a row whose
//! width disagrees with that list aborts the run.

use crate::config::Config;
use crate::error::{MindError, Result};
use crate::logging::{log, log_table_converted, obj, v_str, Domain, Level, ProfileScope};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

pub const BEHAVIOR_COLUMNS: [&str; 5] = ["Impression ID", "User ID", "Time", "History", "Impressions"];

pub const NEWS_COLUMNS: [&str; 8] = [
    "News ID",
    "Category",
    "SubCategory",
    "Title",
    "Abstract",
    "URL",
    "Title Entities",
    "Abstract Entities",
];

pub const ENTITY_ID_COLUMN: &str = "Entity ID";
pub const RELATION_ID_COLUMN: &str = "Relation ID";

/// `Dim_1..Dim_n`
pub fn dim_columns(dims: usize) -> Vec<String> {
    (1..=dims).map(|i| format!("Dim_{}", i)).collect()
}

pub fn embedding_columns(id_column: &str, dims: usize) -> Vec<String> {
    let mut cols = Vec::with_capacity(dims + 1);
    cols.push(id_column.to_string());
    cols.extend(dim_columns(dims));
    cols
}

/// How a raw row's width is checked against the column list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowWidth {
    Exact,
    /// One extra empty field is dropped; `.vec` lines end with a tab
    TrailingTab,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: &'static str,
    pub input: PathBuf,
    pub output: PathBuf,
    pub columns: Vec<String>,
    pub width: RowWidth,
}

/// The four MIND sources and where their CSV renditions land.
pub fn sources(cfg: &Config) -> Vec<SourceFile> {
    let owned = |cols: &[&str]| cols.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    vec![
        SourceFile {
            name: "behaviors",
            input: cfg.raw_dir.join("behaviors.tsv"),
            output: cfg.behaviors_csv(),
            columns: owned(&BEHAVIOR_COLUMNS),
            width: RowWidth::Exact,
        },
        SourceFile {
            name: "news",
            input: cfg.raw_dir.join("news.tsv"),
            output: cfg.news_csv(),
            columns: owned(&NEWS_COLUMNS),
            width: RowWidth::Exact,
        },
        SourceFile {
            name: "entity_embedding",
            input: cfg.raw_dir.join("entity_embedding.vec"),
            output: cfg.entity_csv(),
            columns: embedding_columns(ENTITY_ID_COLUMN, cfg.embed_dims),
            width: RowWidth::TrailingTab,
        },
        SourceFile {
            name: "relation_embedding",
            input: cfg.raw_dir.join("relation_embedding.vec"),
            output: cfg.relation_csv(),
            columns: embedding_columns(RELATION_ID_COLUMN, cfg.embed_dims),
            width: RowWidth::TrailingTab,
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSummary {
    pub input: String,
    pub output: String,
    pub rows: u64,
    pub columns: usize,
    pub hash_sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestManifest {
    pub generated_at: String,
    pub tables: Vec<IngestSummary>,
}

/// Convert one header-less TSV file into a headed CSV file.
///
/// An existing `output` is overwritten. On a width mismatch the partial
/// output is removed and `MalformedInput` is returned.
pub fn convert(input: &Path, output: &Path, columns: &[String], width: RowWidth) -> Result<IngestSummary> {
    if !input.exists() {
        return Err(MindError::MissingFile {
            path: input.to_path_buf(),
        });
    }
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let _scope = ProfileScope::with_context(
        "ingest.convert",
        &[("input", v_str(&input.display().to_string()))],
    );

    let rows = match copy_rows(input, output, columns, width) {
        Ok(rows) => rows,
        Err(err) => {
            let _ = fs::remove_file(output);
            return Err(err);
        }
    };

    let summary = IngestSummary {
        input: input.display().to_string(),
        output: output.display().to_string(),
        rows,
        columns: columns.len(),
        hash_sha256: file_sha256(output)?,
    };
    log_table_converted(&summary.input, &summary.output, rows, columns.len());
    Ok(summary)
}

fn copy_rows(input: &Path, output: &Path, columns: &[String], shape: RowWidth) -> Result<u64> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_path(input)?;
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_path(output)?;

    writer.write_record(columns)?;

    let width = columns.len();
    let mut rows = 0u64;
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(rows + 1);
        let fields = record.len();
        if fields == width {
            writer.write_record(&record)?;
        } else if shape == RowWidth::TrailingTab && fields == width + 1 && record.get(width) == Some("") {
            writer.write_record(record.iter().take(width))?;
        } else {
            return Err(MindError::malformed(
                input,
                line,
                format!("expected {} fields, got {}", width, fields),
            ));
        }
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

/// Convert every source, stopping at the first failure, then write the manifest.
pub fn run_all(cfg: &Config) -> Result<IngestManifest> {
    let mut tables = Vec::new();
    for source in sources(cfg) {
        log(
            Level::Info,
            Domain::Ingest,
            "convert_start",
            obj(&[("source", v_str(source.name)), ("input", v_str(&source.input.display().to_string()))]),
        );
        tables.push(convert(&source.input, &source.output, &source.columns, source.width)?);
    }
    let manifest = IngestManifest {
        generated_at: crate::logging::ts_now(),
        tables,
    };
    fs::create_dir_all(&cfg.data_dir)?;
    fs::write(cfg.manifest_path(), serde_json::to_string_pretty(&manifest)?)?;
    Ok(manifest)
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
