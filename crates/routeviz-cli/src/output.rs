//! Output formatting for run summaries and timelines.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use routeviz_lib::output::RunStep;
use routeviz_lib::{RenderMode, RunSummary, SearchStatus, Waypoint};

use crate::terminal::{
    colors, format_duration_ms, format_with_separators, supports_color, supports_unicode,
    ColorPalette,
};
use crate::OutputFormat;

/// Print the CLI banner to stderr.
///
/// Uses box-drawing characters when the locale advertises UTF-8 and falls
/// back to ASCII otherwise.
pub fn print_logo() {
    let (cyan, reset) = if supports_color() {
        (colors::CYAN, colors::RESET)
    } else {
        ("", "")
    };

    if supports_unicode() {
        eprintln!(
            "{cyan}╭──────────────────────────────────────╮{reset}
{cyan}│  ROUTEVIZ  ·  search, traced & timed │{reset}
{cyan}╰──────────────────────────────────────╯{reset}"
        );
    } else {
        eprintln!(
            "{cyan}+--------------------------------------+
|  ROUTEVIZ  >> search, traced & timed |
+--------------------------------------+{reset}"
        );
    }
}

/// Print the wall-clock time the command took.
pub fn print_footer(elapsed: std::time::Duration) {
    let (gray, reset) = if supports_color() {
        (colors::GRAY, colors::RESET)
    } else {
        ("", "")
    };
    eprintln!(
        "{gray}Completed in {}{reset}",
        format_duration_ms(elapsed.as_secs_f64() * 1000.0)
    );
}

/// Render a finished run in the requested format.
pub fn render_run(
    summary: &RunSummary,
    waypoints: &[Waypoint],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(summary, &ColorPalette::detect())),
        OutputFormat::Rich => Ok(summary.render(RenderMode::RichText)),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(summary).context("failed to serialize summary")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Timeline => {
            let mut json = serde_json::to_string_pretty(waypoints)
                .context("failed to serialize timeline")?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Tagged, colored view of a run.
pub fn render_text(summary: &RunSummary, palette: &ColorPalette) -> String {
    let p = palette;
    let mut out = String::new();

    let (status_color, status) = match summary.status {
        SearchStatus::Finished => (p.green, "finished"),
        SearchStatus::Failed => (p.red, "failed"),
        SearchStatus::Running => (p.gray, "running"),
        SearchStatus::Idle => (p.gray, "idle"),
    };
    let _ = writeln!(
        out,
        "Route from {}{}{} to {}{}{} ({} hops; algorithm: {}; {}{}{})",
        p.white_bold,
        summary.start.id,
        p.reset,
        p.white_bold,
        summary.goal.id,
        p.reset,
        summary.hops,
        summary.algorithm,
        status_color,
        status,
        p.reset
    );

    let last = summary.steps.len().saturating_sub(1);
    for step in &summary.steps {
        let (tag_color, tag) = if step.index == 0 {
            (p.tag_start, "STRT")
        } else if step.index == last {
            (p.tag_goal, "GOAL")
        } else {
            (p.tag_step, "NODE")
        };
        let _ = writeln!(out, "{}", render_step(step, tag_color, tag, p));
    }

    if let Some(distance) = summary.distance_km {
        let _ = writeln!(out, "\nPath distance: {}{distance:.2} km{}", p.cyan, p.reset);
    }
    let _ = writeln!(
        out,
        "{}Explored {} nodes in {} steps over {} frames; playback {}{}",
        p.gray,
        format_with_separators(summary.visited as u64),
        format_with_separators(summary.search_steps as u64),
        format_with_separators(summary.search_frames as u64),
        format_duration_ms(summary.max_time),
        p.reset
    );
    out
}

fn render_step(step: &RunStep, tag_color: &str, tag: &str, p: &ColorPalette) -> String {
    format!(
        " {tag_color}{tag}{} {}{}{} {}({}){}",
        p.reset, p.white_bold, step.id, p.reset, p.gray, step.coord, p.reset
    )
}
