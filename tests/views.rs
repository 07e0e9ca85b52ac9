use mindscope::config::Config;
use mindscope::nav::{dispatch, render, Action, DashboardState, Page, Screen};
use mindscope::views::{behavior_news, entity, overview, relation, Block, ViewParams};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_embeddings(path: &Path, id_column: &str, prefix: &str, rows: usize, dims: usize) {
    let mut out = String::from(id_column);
    for d in 1..=dims {
        out.push_str(&format!(",Dim_{}", d));
    }
    out.push('\n');
    for r in 0..rows {
        out.push_str(&format!("{}{}", prefix, r));
        for d in 0..dims {
            let v = ((r * 7 + d * 13) as f64).sin() * 0.5 + (d % 3) as f64 * 0.1;
            out.push_str(&format!(",{:.6}", v));
        }
        out.push('\n');
    }
    fs::write(path, out).unwrap();
}

fn write_behavior_news(dir: &Path) {
    fs::write(
        dir.join("behaviors.csv"),
        "Impression ID,User ID,Time,History,Impressions\n\
         1,U1,11/11/2019 09:05:58 AM,N1 N2,N3-1 N4-0\n\
         2,U2,11/12/2019 06:11:30 PM,N1,N2-0 N3-1 N4-0\n\
         3,U3,11/13/2019 10:00:00 AM,,N1-1\n",
    )
    .unwrap();
    fs::write(
        dir.join("news.csv"),
        "News ID,Category,SubCategory,Title,Abstract,URL,Title Entities,Abstract Entities\n\
         N1,sports,football_nfl,Packers win a close game,The Packers held on late.,https://example.com/1,[],[]\n\
         N2,sports,baseball_mlb,World Series preview,,https://example.com/2,[],[]\n\
         N3,news,newsus,Storm moves across the Midwest tonight,Forecasters expect heavy snow.,https://example.com/3,[],[]\n\
         N4,finance,markets,Markets rally,Stocks closed higher.,https://example.com/4,[],[]\n",
    )
    .unwrap();
}

#[test]
fn overview_contains_each_missing_table() {
    let tmp = TempDir::new().unwrap();
    write_behavior_news(tmp.path());
    let report = overview::render(&Config::with_data_dir(tmp.path()));

    assert_eq!(report.sections.len(), 4);
    assert!(!report.section("Behaviors Data").unwrap().has_error());
    assert!(!report.section("News Data").unwrap().has_error());
    assert!(report.section("Entity Embeddings").unwrap().has_error());
    assert!(report.section("Relation Embeddings").unwrap().has_error());

    let behaviors = report.section("Behaviors Data").unwrap();
    assert!(behaviors
        .blocks
        .iter()
        .any(|b| matches!(b, Block::Text(t) if t == "Total Rows: 3")));
}

#[test]
fn behavior_news_renders_every_section() {
    let tmp = TempDir::new().unwrap();
    write_behavior_news(tmp.path());
    let report = behavior_news::render(&Config::with_data_dir(tmp.path()));

    let errors: Vec<_> = report.errors().collect();
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert!(report.artifacts().count() >= 6);
}

#[test]
fn behavior_news_without_data_reports_per_section() {
    let tmp = TempDir::new().unwrap();
    let report = behavior_news::render(&Config::with_data_dir(tmp.path()));
    assert!(report.sections.iter().all(|s| s.has_error()));
}

#[test]
fn entity_missing_file_is_a_single_error_section() {
    let tmp = TempDir::new().unwrap();
    let report = entity::render(&Config::with_data_dir(tmp.path()), &ViewParams::default());
    assert_eq!(report.sections.len(), 1);
    assert!(report.sections[0].has_error());
}

#[test]
fn out_of_range_dimension_is_reported_while_others_render() {
    let tmp = TempDir::new().unwrap();
    write_embeddings(&tmp.path().join("entity_embedding.csv"), "Entity ID", "Q", 12, 100);
    let params = ViewParams {
        dimensions: "1, 500, 3".to_string(),
        ..ViewParams::default()
    };
    let report = entity::render(&Config::with_data_dir(tmp.path()), &params);

    let histograms = report.section("Histogram Analysis").unwrap();
    let charts = histograms.blocks.iter().filter(|b| matches!(b, Block::Chart(_))).count();
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(charts, 2);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.contains("Dim_500"));

    for title in ["2D PCA of Entity Embeddings", "3D PCA of Entity Embeddings", "Box Plot for Dimensions"] {
        assert!(!report.section(title).unwrap().has_error(), "{} failed", title);
    }
}

#[test]
fn relation_view_clusters_and_selects_column() {
    let tmp = TempDir::new().unwrap();
    write_embeddings(&tmp.path().join("relation_embedding.csv"), "Relation ID", "P", 10, 6);
    let cfg = Config {
        cluster_k: 3,
        ..Config::with_data_dir(tmp.path())
    };

    let report = relation::render(&cfg, &ViewParams::default());
    assert_eq!(report.errors().count(), 0);

    let params = ViewParams {
        relation_column: Some("Dim_42".to_string()),
        ..ViewParams::default()
    };
    let report = relation::render(&cfg, &params);
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "Boxplot of Selected Embedding Dimension");
}

#[test]
fn relation_summary_survives_an_empty_dimension() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("relation_embedding.csv"),
        "Relation ID,Dim_1,Dim_2,Dim_3\n\
         P0,0.10,,0.30\n\
         P1,-0.20,,0.10\n\
         P2,0.40,,-0.50\n\
         P3,0.05,,0.25\n",
    )
    .unwrap();
    let report = relation::render(&Config::with_data_dir(tmp.path()), &ViewParams::default());

    let summary = report.section("Five Number Summary").unwrap();
    assert!(!summary.has_error());
    match &summary.blocks[0] {
        Block::Table(preview) => {
            assert_eq!(preview.rows.len(), 3);
            assert_eq!(preview.rows[0][0], "Dim_1");
            assert_eq!(preview.rows[1][1], "NaN");
            assert_ne!(preview.rows[2][1], "NaN");
        }
        other => panic!("expected summary table, got {:?}", other),
    }
}

#[test]
fn navigation_renders_the_open_page() {
    let tmp = TempDir::new().unwrap();
    write_behavior_news(tmp.path());
    let cfg = Config::with_data_dir(tmp.path());

    let state = dispatch(DashboardState::default(), Action::Open(Page::Overview));
    match render(&state, &cfg) {
        Screen::View(report) => assert_eq!(report.title, "MIND Dataset Overview"),
        other => panic!("expected overview, got {:?}", other),
    }
    let state = dispatch(state, Action::Back);
    assert!(matches!(render(&state, &cfg), Screen::Menu { .. }));
}
