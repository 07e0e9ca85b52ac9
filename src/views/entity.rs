//! Entity embedding analysis.

use super::{contain, projection_preview, summary_table, Block, Section, ViewParams, ViewReport};
use crate::charts::{boxplot_chart, histogram_chart, scatter_2d, scatter_3d};
use crate::cluster::{prepare, PreparedEmbeddings};
use crate::config::Config;
use crate::error::{MindError, Result};
use crate::ingest::ENTITY_ID_COLUMN;
use crate::logging::log_section_failure;
use crate::projection::{project, ProjectionResult};
use crate::selection::{parse_dimension_list, resolve_columns, resolve_dimensions};
use crate::stats::{describe, histogram};
use crate::table::EmbeddingTable;
use ndarray::Array2;

const VIEW: &str = "entity";

const INTRO: &str = "Each entity mentioned in the news is embedded in a 100-dimensional \
knowledge-graph space. Missing dimensions are dropped or mean-imputed before analysis.";

pub fn render(cfg: &Config, params: &ViewParams) -> ViewReport {
    let mut report = ViewReport::new("Entity Embeddings Analysis", INTRO);

    let table = match EmbeddingTable::load(&cfg.entity_csv(), ENTITY_ID_COLUMN) {
        Ok(t) => t,
        Err(err) => {
            let section = contain(VIEW, "Entity Embeddings", || Err(err));
            report.push(section);
            return report;
        }
    };
    let prepared = prepare(table);
    let standardized = prepared.standardized();

    report.push(sample_section(&prepared, cfg.preview_rows));
    report.push(histogram_section(&prepared, &params.dimensions, cfg.hist_bins));
    report.push(pca_section("2D PCA of Entity Embeddings", &standardized, 2, cfg.preview_rows));
    report.push(pca_section("3D PCA of Entity Embeddings", &standardized, 3, cfg.preview_rows));
    report.push(contain(VIEW, "Five Number Summary", || {
        Ok(vec![Block::Table(summary_table(&describe(&prepared.table)))])
    }));
    report.push(boxplot_section(&prepared, params.boxplot_columns.as_deref(), cfg.boxplot_default));
    report
}

fn sample_section(prepared: &PreparedEmbeddings, rows: usize) -> Section {
    let mut section = Section::new("Sample of Entity Embeddings").with(Block::Table(prepared.table.head(rows)));
    if !prepared.dropped_columns.is_empty() || prepared.imputed_cells > 0 {
        section.push(Block::Note(format!(
            "Dropped {} all-missing dimension(s), imputed {} missing value(s) with column means.",
            prepared.dropped_columns.len(),
            prepared.imputed_cells
        )));
    }
    section
}

fn histogram_section(prepared: &PreparedEmbeddings, dimensions: &str, bins: usize) -> Section {
    let title = "Histogram Analysis";
    let dims = parse_dimension_list(dimensions);
    let mut section = Section::new(title);
    if dims.is_empty() {
        section.push(Block::Note("Enter dimension numbers, e.g. 1, 2, 3.".to_string()));
        return section;
    }
    for (dim, resolved) in resolve_dimensions(&prepared.table, &dims) {
        let chart = resolved.and_then(|col| {
            let values: Vec<f64> = prepared.table.values[col.index].iter().flatten().copied().collect();
            histogram_chart(
                &format!("histogram_dim_{}", dim),
                &format!("Histogram of {}", col.name),
                &histogram(&values, bins),
            )
        });
        match chart {
            Ok(artifact) => section.push(Block::Chart(artifact)),
            Err(err) => {
                log_section_failure(VIEW, title, err.kind(), &err.to_string());
                section.push(Block::error(&err));
            }
        }
    }
    section
}

fn variance_text(result: &ProjectionResult) -> String {
    let parts: Vec<String> = result
        .explained_variance_ratio
        .iter()
        .enumerate()
        .map(|(i, r)| format!("PCA_{}: {:.2}%", i + 1, r * 100.0))
        .collect();
    format!("Explained variance: {}", parts.join(", "))
}

fn pca_section(title: &str, standardized: &Result<Array2<f64>>, k: usize, rows: usize) -> Section {
    contain(VIEW, title, || {
        let data = standardized.as_ref().map_err(MindError::for_report)?;
        let result = project(data, k)?;
        let p = &result.points;
        let chart = if k == 2 {
            let points: Vec<(f64, f64)> = p.outer_iter().map(|r| (r[0], r[1])).collect();
            scatter_2d("pca_2d", title, &points, None)?
        } else {
            let points: Vec<(f64, f64, f64)> = p.outer_iter().map(|r| (r[0], r[1], r[2])).collect();
            scatter_3d("pca_3d", title, &points)?
        };
        Ok(vec![
            Block::Table(projection_preview(p, rows)),
            Block::Text(variance_text(&result)),
            Block::Chart(chart),
        ])
    })
}

fn boxplot_section(prepared: &PreparedEmbeddings, selected: Option<&[String]>, default_count: usize) -> Section {
    contain(VIEW, "Box Plot for Dimensions", || {
        let names: Vec<String> = match selected {
            Some(names) => names.to_vec(),
            None => prepared.table.dim_names().iter().take(default_count).cloned().collect(),
        };
        if names.is_empty() {
            return Ok(vec![Block::Note("Select at least one dimension to view the box plot.".to_string())]);
        }
        let columns: Vec<(String, Vec<f64>)> = resolve_columns(&prepared.table, &names)?
            .into_iter()
            .map(|c| {
                let values = prepared.table.values[c.index].iter().flatten().copied().collect();
                (c.name, values)
            })
            .collect();
        Ok(vec![Block::Chart(boxplot_chart(
            "boxplot",
            "Box Plot of Selected Dimensions",
            &columns,
        )?)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::dim_columns;

    fn prepared(dims: usize) -> PreparedEmbeddings {
        let rows = (0..6)
            .map(|r| {
                let id = format!("Q{}", r);
                let vals = (0..dims).map(|d| Some((r * (d + 1)) as f64 + 0.5 * d as f64)).collect();
                (id, vals)
            })
            .collect();
        prepare(EmbeddingTable::from_rows(ENTITY_ID_COLUMN, dim_columns(dims), rows).unwrap())
    }

    #[test]
    fn bad_dimension_does_not_hide_the_others() {
        let section = histogram_section(&prepared(5), "1, 500, 3", 10);
        assert_eq!(section.blocks.len(), 3);
        assert!(matches!(section.blocks[0], Block::Chart(_)));
        assert!(matches!(section.blocks[1], Block::Error { .. }));
        assert!(matches!(section.blocks[2], Block::Chart(_)));
    }

    #[test]
    fn empty_boxplot_selection_is_a_note() {
        let empty: Vec<String> = Vec::new();
        let section = boxplot_section(&prepared(5), Some(empty.as_slice()), 4);
        assert!(matches!(section.blocks[0], Block::Note(_)));
        assert!(!section.has_error());
    }

    #[test]
    fn unknown_boxplot_column_is_an_error() {
        let names = vec!["Dim_1".to_string(), "Dim_99".to_string()];
        let section = boxplot_section(&prepared(5), Some(names.as_slice()), 4);
        assert!(section.has_error());
    }

    #[test]
    fn pca_failure_is_contained() {
        let tiny = prepared(2);
        let standardized = tiny.standardized();
        // two dims cannot give three components
        assert!(pca_section("3D", &standardized, 3, 5).has_error());
        assert!(!pca_section("2D", &standardized, 2, 5).has_error());
    }
}
