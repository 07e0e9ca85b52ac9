//! Dataset overview: a preview, attribute notes and row count per table.

use super::{contain, Block, ViewReport};
use crate::config::Config;
use crate::table::CsvTable;
use std::path::Path;

const VIEW: &str = "overview";

const INTRO: &str = "MIND is a large-scale news recommendation dataset collected from the \
Microsoft News platform. It pairs user impression logs with news metadata and knowledge-graph \
embeddings for the entities and relations mentioned in the articles.";

const BEHAVIOR_ATTRS: &str = "Impression ID: one session in which articles were shown to a user.\n\
User ID: anonymized user, stable across sessions.\n\
Time: when the impression was shown.\n\
History: articles the user clicked before this impression, oldest first.\n\
Impressions: articles shown in this impression, each suffixed -1 if clicked and -0 if not.";

const NEWS_ATTRS: &str = "News ID: article identifier, referenced from History and Impressions.\n\
Category / SubCategory: coarse and fine topic labels.\n\
Title / Abstract: article text.\n\
URL: article address.\n\
Title Entities / Abstract Entities: WikiData entities recognized in the title and abstract.";

const ENTITY_ATTRS: &str = "Entity ID: WikiData identifier.\n\
Dim_1..Dim_100: knowledge-graph embedding of the entity.";

const RELATION_ATTRS: &str = "Relation ID: WikiData property identifier.\n\
Dim_1..Dim_100: knowledge-graph embedding of the relation.";

fn table_section(view_title: &str, path: &Path, attrs: &str, preview_rows: usize) -> super::Section {
    contain(VIEW, view_title, || {
        let table = CsvTable::load(path)?;
        Ok(vec![
            Block::Table(table.head(preview_rows)),
            Block::Text(attrs.to_string()),
            Block::Text(format!("Total Rows: {}", table.row_count())),
        ])
    })
}

pub fn render(cfg: &Config) -> ViewReport {
    let mut report = ViewReport::new("MIND Dataset Overview", INTRO);
    report.push(table_section("Behaviors Data", &cfg.behaviors_csv(), BEHAVIOR_ATTRS, cfg.preview_rows));
    report.push(table_section("News Data", &cfg.news_csv(), NEWS_ATTRS, cfg.preview_rows));
    report.push(table_section("Entity Embeddings", &cfg.entity_csv(), ENTITY_ATTRS, cfg.preview_rows));
    report.push(table_section("Relation Embeddings", &cfg.relation_csv(), RELATION_ATTRS, cfg.preview_rows));
    report
}
