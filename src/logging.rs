//! Structured logging for the ingestion and reporting pipeline.
//!
//! Every record is one JSON object per line with a run id, a monotonically
//! increasing sequence number, a level, a domain and free-form fields.
//! Records go to `<LOG_DIR>/<RUN_ID>/events.jsonl` (trace/debug records to
//! `trace.jsonl`) and are mirrored to stderr.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Ingest,     // TSV -> CSV conversion, manifests
    Table,      // Loading and schema validation
    Stats,      // Counts, summaries, histograms
    Projection, // Standardization, PCA, clustering
    View,       // Report assembly and section failures
    Nav,        // Page transitions
    System,     // Startup, shutdown
    Profile,    // Timing
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Ingest => "ingest",
            Domain::Table => "table",
            Domain::Stats => "stats",
            Domain::Projection => "projection",
            Domain::View => "view",
            Domain::Nav => "nav",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS is a comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
    trace: Option<Mutex<BufWriter<File>>>,
}

fn open_log(path: PathBuf) -> Option<Mutex<BufWriter<File>>> {
    match File::create(&path) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] failed to create {}: {}", path.display(), err);
            None
        }
    }
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let base = std::env::var("LOG_DIR").unwrap_or_else(|_| "out/runs".to_string());
        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
        }

        let _ = std::fs::write(
            run_dir.join("manifest.json"),
            json!({
                "run_id": run_id,
                "ts": ts_now(),
                "pid": process::id(),
                "log_dir": run_dir.to_string_lossy(),
            })
            .to_string(),
        );

        RunContext {
            events: open_log(run_dir.join("events.jsonl")),
            trace: open_log(run_dir.join("trace.jsonl")),
            run_id,
        }
    })
}

fn write_line(writer: &Option<Mutex<BufWriter<File>>>, line: &str) {
    if let Some(writer) = writer {
        if let Ok(mut w) = writer.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

fn emit_record(level: Level, component: &str, event: &str, mut fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));

    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    entry.insert("data".to_string(), Value::Object(fields));

    let line = Value::Object(entry).to_string();
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    eprintln!("{}", line);
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_table_converted(input: &str, output: &str, rows: u64, columns: usize) {
    log(
        Level::Info,
        Domain::Ingest,
        "converted",
        obj(&[
            ("msg", v_str(&format!("{} has been converted to {}", input, output))),
            ("input", v_str(input)),
            ("output", v_str(output)),
            ("rows", json!(rows)),
            ("columns", json!(columns)),
        ]),
    );
}

pub fn log_table_loaded(path: &str, rows: usize, columns: usize) {
    log(
        Level::Debug,
        Domain::Table,
        "loaded",
        obj(&[
            ("path", v_str(path)),
            ("rows", json!(rows)),
            ("columns", json!(columns)),
        ]),
    );
}

/// Section-level failure that the view contained and reported to the user.
pub fn log_section_failure(view: &str, section: &str, kind: &str, detail: &str) {
    log(
        Level::Warn,
        Domain::View,
        "section_failed",
        obj(&[
            ("view", v_str(view)),
            ("section", v_str(section)),
            ("kind", v_str(kind)),
            ("detail", v_str(detail)),
        ]),
    );
}

pub fn log_projection(k: usize, rows: usize, dims: usize, ratios: &[f64]) {
    log(
        Level::Debug,
        Domain::Projection,
        "pca_fit",
        obj(&[
            ("k", json!(k)),
            ("rows", json!(rows)),
            ("dims", json!(dims)),
            ("explained_variance_ratio", json!(ratios)),
        ]),
    );
}

pub fn log_transition(from: &str, to: &str, action: &str) {
    log(
        Level::Info,
        Domain::Nav,
        "transition",
        obj(&[("from", v_str(from)), ("to", v_str(to)), ("action", v_str(action))]),
    );
}

// =============================================================================
// Field helpers
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Emits a trace record with elapsed milliseconds when dropped.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self::with_context(label, &[])
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}
