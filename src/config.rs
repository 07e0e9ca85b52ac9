use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub raw_dir: PathBuf,
    pub data_dir: PathBuf,
    pub artifact_dir: PathBuf,
    pub embed_dims: usize,
    pub hist_bins: usize,
    pub top_clicked: usize,
    pub top_subcategories: usize,
    pub preview_rows: usize,
    pub wordcloud_words: usize,
    pub cluster_k: usize,
    /// Number of dims preselected for the entity boxplot
    pub boxplot_default: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            raw_dir: std::env::var("RAW_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("MINDsmall_train")),
            data_dir: std::env::var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("data")),
            artifact_dir: std::env::var("ARTIFACT_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("out/artifacts")),
            embed_dims: std::env::var("EMBED_DIMS").ok().and_then(|v| v.parse().ok()).unwrap_or(100),
            hist_bins: std::env::var("HIST_BINS").ok().and_then(|v| v.parse().ok()).unwrap_or(20),
            top_clicked: std::env::var("TOP_CLICKED").ok().and_then(|v| v.parse().ok()).unwrap_or(20),
            top_subcategories: std::env::var("TOP_SUBCATEGORIES").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            preview_rows: std::env::var("PREVIEW_ROWS").ok().and_then(|v| v.parse().ok()).unwrap_or(5),
            wordcloud_words: std::env::var("WORDCLOUD_WORDS").ok().and_then(|v| v.parse().ok()).unwrap_or(60),
            cluster_k: std::env::var("CLUSTER_K").ok().and_then(|v| v.parse().ok()).unwrap_or(4),
            boxplot_default: std::env::var("BOXPLOT_DEFAULT").ok().and_then(|v| v.parse().ok()).unwrap_or(4),
        }
    }

    /// Config rooted at `data_dir` with defaults elsewhere. Used by tests and tools.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            ..Self::from_env()
        }
    }

    pub fn behaviors_csv(&self) -> PathBuf {
        self.data_dir.join("behaviors.csv")
    }

    pub fn news_csv(&self) -> PathBuf {
        self.data_dir.join("news.csv")
    }

    pub fn entity_csv(&self) -> PathBuf {
        self.data_dir.join("entity_embedding.csv")
    }

    pub fn relation_csv(&self) -> PathBuf {
        self.data_dir.join("relation_embedding.csv")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.data_dir.join("manifest.json")
    }
}
