//! Preparing embedding tables for projection and clustering.

use crate::error::{MindError, Result};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::projection::standardize;
use crate::table::EmbeddingTable;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};
use serde::Serialize;
use serde_json::json;

/// An embedding table with no missing cells, plus what it took to get there.
#[derive(Debug, Clone)]
pub struct PreparedEmbeddings {
    pub table: EmbeddingTable,
    pub dropped_columns: Vec<String>,
    pub imputed_cells: usize,
}

impl PreparedEmbeddings {
    pub fn matrix(&self) -> Result<Array2<f64>> {
        self.table.to_matrix()
    }

    /// Standardized matrix, the input every projection starts from.
    pub fn standardized(&self) -> Result<Array2<f64>> {
        Ok(standardize(&self.matrix()?))
    }
}

/// Drop all-missing columns, then mean-impute what is left.
pub fn prepare(mut table: EmbeddingTable) -> PreparedEmbeddings {
    let dropped_columns = table.drop_all_missing();
    let imputed_cells = table.impute_mean();
    log(
        Level::Debug,
        Domain::Projection,
        "prepared",
        obj(&[
            ("id_column", v_str(&table.id_column)),
            ("dropped_columns", json!(dropped_columns)),
            ("imputed_cells", json!(imputed_cells)),
            ("dims", json!(table.columns.len())),
        ]),
    );
    PreparedEmbeddings {
        table,
        dropped_columns,
        imputed_cells,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub k: usize,
    pub assignments: Vec<usize>,
    /// Members per cluster, indexed by cluster id
    pub sizes: Vec<usize>,
}

/// KMeans over `data`. `k` is clamped to `[1, rows]`.
pub fn kmeans(data: &Array2<f64>, k: usize) -> Result<ClusterSummary> {
    let n = data.nrows();
    if n == 0 {
        return Err(MindError::computation("cannot cluster an empty table"));
    }
    let k = k.clamp(1, n);
    let dataset = DatasetBase::new(data.clone(), Array1::from_elem(n, ()));
    let model = KMeans::params(k)
        .max_n_iterations(300)
        .tolerance(1e-4)
        .fit(&dataset)
        .map_err(|e| MindError::computation(format!("k-means clustering failed: {}", e)))?;

    let predictions: Array1<usize> = model.predict(data);
    let assignments: Vec<usize> = predictions.iter().copied().collect();
    let mut sizes = vec![0usize; k];
    for &c in &assignments {
        if c < k {
            sizes[c] += 1;
        }
    }
    Ok(ClusterSummary { k, assignments, sizes })
}
