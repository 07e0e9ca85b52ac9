use mindscope::config::Config;
use mindscope::error::MindError;
use mindscope::ingest::{convert, embedding_columns, run_all, RowWidth, BEHAVIOR_COLUMNS, ENTITY_ID_COLUMN};
use mindscope::table::{load_behaviors, CsvTable, EmbeddingTable};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn write_raw(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("behaviors.tsv"),
        "1\tU13740\t11/11/2019 09:05:58 AM\tN55189 N42782\tN55689-1 N35729-0\n\
         2\tU91836\t11/12/2019 06:11:30 PM\t\tN20678-0 N39317-1\n",
    )
    .unwrap();
    fs::write(
        dir.join("news.tsv"),
        "N55189\tlifestyle\tlifestyleroyals\tThe Brands Queen Elizabeth Loves\tShop the royal pantry.\thttps://assets.msn.com/1\t[]\t[]\n\
         N42782\tsports\tbaseballmlb\t\"Outfield\" rankings, part 2\t\thttps://assets.msn.com/2\t[]\t[]\n",
    )
    .unwrap();
    fs::write(dir.join("entity_embedding.vec"), "Q1\t0.1\t0.2\t\nQ2\t-0.3\t0.4\t\n").unwrap();
    fs::write(dir.join("relation_embedding.vec"), "P31\t0.5\t-0.5\t\n").unwrap();
}

#[test]
fn behaviors_roundtrip_keeps_rows_and_cells() {
    let tmp = TempDir::new().unwrap();
    write_raw(tmp.path());
    let input = tmp.path().join("behaviors.tsv");
    let output = tmp.path().join("out").join("behaviors.csv");

    let summary = convert(&input, &output, &columns(&BEHAVIOR_COLUMNS), RowWidth::Exact).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.columns, 5);
    assert_eq!(summary.hash_sha256.len(), 64);

    let table = CsvTable::load(&output).unwrap();
    assert_eq!(table.columns, columns(&BEHAVIOR_COLUMNS));
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0][3], "N55189 N42782");
    assert_eq!(table.rows[1][3], "");

    let behaviors = load_behaviors(&output).unwrap();
    assert_eq!(behaviors[0].history.len(), 2);
    assert_eq!(behaviors[0].impressions[0].clicked, Some(true));
    assert!(behaviors[1].history.is_empty());
}

#[test]
fn embedding_lines_with_trailing_tab_are_accepted() {
    let tmp = TempDir::new().unwrap();
    write_raw(tmp.path());
    let output = tmp.path().join("entity_embedding.csv");
    convert(
        &tmp.path().join("entity_embedding.vec"),
        &output,
        &embedding_columns(ENTITY_ID_COLUMN, 2),
        RowWidth::TrailingTab,
    )
    .unwrap();

    let table = EmbeddingTable::load(&output, ENTITY_ID_COLUMN).unwrap();
    assert_eq!(table.ids, vec!["Q1", "Q2"]);
    assert_eq!(table.column("Dim_2").unwrap(), &[Some(0.2), Some(0.4)]);
}

#[test]
fn width_mismatch_aborts_and_removes_output() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("bad.tsv");
    let output = tmp.path().join("bad.csv");
    fs::write(&input, "a\tb\tc\na\tb\n").unwrap();

    let err = convert(&input, &output, &columns(&["x", "y", "z"]), RowWidth::Exact).unwrap_err();
    match err {
        MindError::MalformedInput { line, .. } => assert_eq!(line, 2),
        other => panic!("expected MalformedInput, got {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn run_all_writes_tables_and_manifest() {
    let tmp = TempDir::new().unwrap();
    let raw = tmp.path().join("raw");
    write_raw(&raw);
    let cfg = Config {
        raw_dir: raw,
        embed_dims: 2,
        ..Config::with_data_dir(&tmp.path().join("data"))
    };

    let manifest = run_all(&cfg).unwrap();
    assert_eq!(manifest.tables.len(), 4);
    for path in [cfg.behaviors_csv(), cfg.news_csv(), cfg.entity_csv(), cfg.relation_csv()] {
        assert!(path.exists(), "{} missing", path.display());
    }
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(cfg.manifest_path()).unwrap()).unwrap();
    assert_eq!(written["tables"].as_array().unwrap().len(), 4);

    // a rerun overwrites in place
    let again = run_all(&cfg).unwrap();
    assert_eq!(again.tables[0].hash_sha256, manifest.tables[0].hash_sha256);
}

#[test]
fn run_all_reports_missing_raw_file() {
    let tmp = TempDir::new().unwrap();
    let cfg = Config {
        raw_dir: tmp.path().join("absent"),
        ..Config::with_data_dir(tmp.path())
    };
    assert!(matches!(run_all(&cfg), Err(MindError::MissingFile { .. })));
}
