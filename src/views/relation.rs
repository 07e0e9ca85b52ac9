//! Relation embedding analysis, with k-means clusters over the embeddings.

use super::{contain, summary_table, Block, ViewParams, ViewReport};
use crate::charts::{boxplot_chart, scatter_2d};
use crate::cluster::{kmeans, prepare};
use crate::config::Config;
use crate::error::{MindError, Result};
use crate::ingest::RELATION_ID_COLUMN;
use crate::projection::project;
use crate::selection::resolve_column;
use crate::stats::describe;
use crate::table::{EmbeddingTable, Preview};

const VIEW: &str = "relation";

const INTRO: &str = "Relations are the typed edges of the knowledge graph (WikiData \
properties). Their embeddings live in the same space as the entity embeddings.";

pub fn render(cfg: &Config, params: &ViewParams) -> ViewReport {
    let mut report = ViewReport::new("Relation Embeddings Analysis", INTRO);
    let table = EmbeddingTable::load(&cfg.relation_csv(), RELATION_ID_COLUMN);
    let loaded = || table.as_ref().map_err(MindError::for_report);

    report.push(contain(VIEW, "Data Overview", || {
        let t = loaded()?;
        Ok(vec![
            Block::Table(t.head(cfg.preview_rows)),
            Block::Text(format!("Total Rows: {}", t.row_count())),
        ])
    }));

    report.push(contain(VIEW, "Five Number Summary", || {
        Ok(vec![Block::Table(summary_table(&describe(loaded()?)))])
    }));

    report.push(contain(VIEW, "Boxplot of Selected Embedding Dimension", || {
        let t = loaded()?;
        let name = match &params.relation_column {
            Some(name) => name.clone(),
            None => t
                .dim_names()
                .first()
                .cloned()
                .ok_or_else(|| MindError::computation("relation table has no dimensions"))?,
        };
        let col = resolve_column(t, &name)?;
        let values: Vec<f64> = t.values[col.index].iter().flatten().copied().collect();
        let title = format!("Boxplot of {}", col.name);
        Ok(vec![Block::Chart(boxplot_chart("boxplot", &title, &[(col.name, values)])?)])
    }));

    report.push(contain(VIEW, "Relation Clusters", || cluster_blocks(loaded()?, cfg.cluster_k)));
    report
}

fn cluster_blocks(table: &EmbeddingTable, k: usize) -> Result<Vec<Block>> {
    let prepared = prepare(table.clone());
    let data = prepared.standardized()?;
    let clusters = kmeans(&data, k)?;
    let sizes = Preview {
        columns: vec!["Cluster".to_string(), "Relations".to_string()],
        rows: clusters
            .sizes
            .iter()
            .enumerate()
            .map(|(c, n)| vec![c.to_string(), n.to_string()])
            .collect(),
    };
    let mut blocks = vec![Block::Table(sizes)];
    match project(&data, 2) {
        Ok(result) => {
            let points: Vec<(f64, f64)> = result.points.outer_iter().map(|r| (r[0], r[1])).collect();
            blocks.push(Block::Chart(scatter_2d(
                "clusters_pca_2d",
                &format!("Relation Clusters (k = {}) in 2D PCA", clusters.k),
                &points,
                Some(clusters.assignments.as_slice()),
            )?));
        }
        Err(err) => blocks.push(Block::error(&err)),
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::dim_columns;

    #[test]
    fn clusters_cover_every_relation() {
        let rows = (0..8)
            .map(|r| {
                let base = if r < 4 { 0.0 } else { 10.0 };
                (format!("P{}", r), vec![Some(base + r as f64 * 0.1), Some(base - r as f64 * 0.05), Some(base)])
            })
            .collect();
        let table = EmbeddingTable::from_rows(RELATION_ID_COLUMN, dim_columns(3), rows).unwrap();
        let blocks = cluster_blocks(&table, 2).unwrap();
        match &blocks[0] {
            Block::Table(p) => {
                let total: usize = p.rows.iter().map(|r| r[1].parse::<usize>().unwrap()).sum();
                assert_eq!(total, 8);
                assert_eq!(p.rows.len(), 2);
            }
            other => panic!("expected sizes table, got {:?}", other),
        }
        assert!(matches!(blocks[1], Block::Chart(_)));
    }
}
