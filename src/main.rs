use anyhow::Result;
use mindscope::config::Config;
use mindscope::logging::{log, obj, v_num, v_str, Domain, Level};
use mindscope::nav::{dispatch, parse_command, render, DashboardState, Screen};
use mindscope::present::{format_screen, save_artifacts};
use std::io::{self, BufRead, Write};

fn show(state: &DashboardState, cfg: &Config, out: &mut impl Write) -> Result<()> {
    let screen = render(state, cfg);
    writeln!(out, "{}", format_screen(&screen))?;
    if let Screen::View(report) = &screen {
        let written = match save_artifacts(report, &cfg.artifact_dir, state.page) {
            Ok(n) => n,
            Err(message) => {
                writeln!(out, "{}", message)?;
                0
            }
        };
        log(
            Level::Info,
            Domain::View,
            "rendered",
            obj(&[
                ("page", v_str(state.page.as_str())),
                ("sections", v_num(report.sections.len() as f64)),
                ("errors", v_num(report.errors().count() as f64)),
                ("artifacts", v_num(written as f64)),
            ]),
        );
    }
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cfg = Config::from_env();
    log(
        Level::Info,
        Domain::System,
        "dashboard_start",
        obj(&[
            ("data_dir", v_str(&cfg.data_dir.to_string_lossy())),
            ("artifact_dir", v_str(&cfg.artifact_dir.to_string_lossy())),
        ]),
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut state = DashboardState::default();
    show(&state, &cfg, &mut out)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            write!(out, "> ")?;
            out.flush()?;
            continue;
        }
        if matches!(trimmed, "quit" | "exit" | "q") {
            break;
        }
        match parse_command(trimmed) {
            Some(action) => {
                state = dispatch(state, action);
                show(&state, &cfg, &mut out)?;
            }
            None => {
                writeln!(out, "unrecognized command: {}", trimmed)?;
                write!(out, "> ")?;
                out.flush()?;
            }
        }
    }

    log(Level::Info, Domain::System, "dashboard_stop", obj(&[]));
    Ok(())
}
