use mindscope::config::Config;
use mindscope::error::MindError;
use mindscope::ingest::run_all;
use mindscope::logging::{log, obj, v_num, v_str, Domain, Level, ProfileScope};

fn exit_code(err: &MindError) -> i32 {
    match err {
        MindError::MissingFile { .. } => 1,
        MindError::MalformedInput { .. } => 2,
        _ => 3,
    }
}

fn main() {
    let cfg = Config::from_env();
    let _scope = ProfileScope::new("preprocess");

    match run_all(&cfg) {
        Ok(manifest) => {
            for table in &manifest.tables {
                println!("{} -> {} ({} rows, {} columns)", table.input, table.output, table.rows, table.columns);
            }
            log(
                Level::Info,
                Domain::Ingest,
                "preprocess_done",
                obj(&[
                    ("tables", v_num(manifest.tables.len() as f64)),
                    ("manifest", v_str(&cfg.manifest_path().to_string_lossy())),
                ]),
            );
        }
        Err(err) => {
            log(
                Level::Error,
                Domain::Ingest,
                "preprocess_failed",
                obj(&[("kind", v_str(err.kind())), ("detail", v_str(&err.to_string()))]),
            );
            eprintln!("preprocess failed: {}", err);
            std::process::exit(exit_code(&err));
        }
    }
}
