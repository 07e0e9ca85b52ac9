//! Terminal presentation of dashboard screens and on-disk chart artifacts.

use crate::error::Result;
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::nav::{Page, Screen};
use crate::table::Preview;
use crate::views::{Block, ViewReport};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use std::fs;
use std::path::{Path, PathBuf};

/// Wider tables are cut to this many columns on screen.
const MAX_COLUMNS: usize = 12;

pub fn table(preview: &Preview) -> Table {
    let shown = preview.columns.len().min(MAX_COLUMNS);
    let mut t = Table::new();
    t.load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            preview.columns[..shown]
                .iter()
                .map(|c| Cell::new(c).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    for row in &preview.rows {
        t.add_row(row.iter().take(shown).map(Cell::new).collect::<Vec<_>>());
    }
    t
}

fn format_report(report: &ViewReport, out: &mut String) {
    out.push_str(&format!("== {} ==\n\n{}\n", report.title, report.intro));
    for section in &report.sections {
        out.push_str(&format!("\n-- {} --\n", section.title));
        for block in &section.blocks {
            match block {
                Block::Text(text) => out.push_str(&format!("{}\n", text)),
                Block::Note(text) => out.push_str(&format!("note: {}\n", text)),
                Block::Table(preview) => {
                    out.push_str(&format!("{}\n", table(preview)));
                    if preview.columns.len() > MAX_COLUMNS {
                        out.push_str(&format!(
                            "({} of {} columns shown)\n",
                            MAX_COLUMNS,
                            preview.columns.len()
                        ));
                    }
                }
                Block::Chart(artifact) => out.push_str(&format!("[chart] {} ({}.svg)\n", artifact.title, artifact.name)),
                Block::Error { kind, message } => out.push_str(&format!("error [{}]: {}\n", kind, message)),
            }
        }
    }
}

pub fn format_screen(screen: &Screen) -> String {
    let mut out = String::new();
    match screen {
        Screen::Menu { title, entries } => {
            out.push_str(&format!("== {} ==\n", title));
            for (n, label) in entries {
                out.push_str(&format!("  {}. {}\n", n, label));
            }
            out.push_str("\nEnter a number to open a page, `back` to return, `quit` to exit.\n");
        }
        Screen::View(report) => {
            format_report(report, &mut out);
            out.push_str("\nCommands: back | dims 1,2,3 | box Dim_1,Dim_2 | rel Dim_5 | quit\n");
        }
    }
    out
}

/// Write every chart in `report` to `<root>/<page>/<name>.svg`, overwriting
/// earlier renders.
pub fn write_artifacts(report: &ViewReport, root: &Path, page: Page) -> Result<Vec<PathBuf>> {
    let dir = root.join(page.as_str());
    let mut written = Vec::new();
    for artifact in report.artifacts() {
        if written.is_empty() {
            fs::create_dir_all(&dir)?;
        }
        let path = dir.join(format!("{}.svg", artifact.name));
        fs::write(&path, &artifact.svg)?;
        written.push(path);
    }
    Ok(written)
}

/// Like [`write_artifacts`], but a failure only costs the charts: it is
/// logged and returned as a message for the screen.
pub fn save_artifacts(report: &ViewReport, root: &Path, page: Page) -> std::result::Result<usize, String> {
    write_artifacts(report, root, page).map(|paths| paths.len()).map_err(|err| {
        log(
            Level::Warn,
            Domain::View,
            "artifacts_failed",
            obj(&[
                ("page", v_str(page.as_str())),
                ("artifact_dir", v_str(&root.to_string_lossy())),
                ("detail", v_str(&err.to_string())),
            ]),
        );
        format!("charts were not saved under {}: {}", root.display(), err)
    })
}
