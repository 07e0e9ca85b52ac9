use mindscope::cluster::prepare;
use mindscope::ingest::ENTITY_ID_COLUMN;
use mindscope::projection::{project, standardize};
use mindscope::stats::describe;
use mindscope::table::EmbeddingTable;
use ndarray::Array2;
use std::fs;
use tempfile::TempDir;

fn wavy(rows: usize, dims: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, dims), |(r, d)| {
        let x = (r * 7 + d * 13) as f64;
        x.sin() * (d + 1) as f64 + (r as f64) * 0.1
    })
}

#[test]
fn end_to_end_missing_and_constant_columns() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("entity_embedding.csv");
    fs::write(
        &path,
        "Entity ID,Dim_1,Dim_2,Dim_3,Dim_4\n\
         Q1,0.1,,1.0,-0.5\n\
         Q2,0.4,,1.0,0.25\n\
         Q3,-0.2,,1.0,0.75\n",
    )
    .unwrap();

    let table = EmbeddingTable::load(&path, ENTITY_ID_COLUMN).unwrap();
    let prepared = prepare(table);
    assert_eq!(prepared.table.columns, vec!["Dim_1", "Dim_3", "Dim_4"]);
    assert_eq!(prepared.dropped_columns, vec!["Dim_2".to_string()]);
    assert_eq!(prepared.imputed_cells, 0);

    let z = prepared.standardized().unwrap();
    assert_eq!(z.column(1).to_vec(), vec![0.0, 0.0, 0.0]);

    let result = project(&z, 2).unwrap();
    assert_eq!(result.points.dim(), (3, 2));
    assert!(result.points.iter().all(|v| v.is_finite()));
}

#[test]
fn standardized_columns_have_unit_spread() {
    let z = standardize(&wavy(40, 5));
    for j in 0..5 {
        let col = z.column(j);
        let n = col.len() as f64;
        let mean = col.sum() / n;
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert!(mean.abs() < 1e-9, "column {} mean {}", j, mean);
        assert!((var.sqrt() - 1.0).abs() < 1e-9, "column {} std {}", j, var.sqrt());
    }
}

#[test]
fn explained_variance_is_descending() {
    let z = standardize(&wavy(50, 8));
    let result = project(&z, 3).unwrap();
    let ev = &result.explained_variance;
    assert_eq!(ev.len(), 3);
    assert!(ev[0] >= ev[1] && ev[1] >= ev[2]);
    let total: f64 = result.explained_variance_ratio.iter().sum();
    assert!(total > 0.0 && total <= 1.0 + 1e-9);
}

#[test]
fn five_number_summaries_are_ordered() {
    let rows = (0..25)
        .map(|r| {
            let vals = (0..4)
                .map(|d| if (r + d) % 6 == 0 { None } else { Some(((r * 3 + d * 5) as f64).cos()) })
                .collect();
            (format!("Q{}", r), vals)
        })
        .collect();
    let table = EmbeddingTable::from_rows(
        ENTITY_ID_COLUMN,
        vec!["Dim_1".into(), "Dim_2".into(), "Dim_3".into(), "Dim_4".into()],
        rows,
    )
    .unwrap();

    let summaries = describe(&table);
    assert_eq!(summaries.len(), 4);
    for (name, s) in summaries {
        let s = s.unwrap();
        assert!(
            s.min <= s.q1 && s.q1 <= s.median && s.median <= s.q3 && s.q3 <= s.max,
            "{} out of order: {:?}",
            name,
            s
        );
    }
}
