//! Rendering of apply results.

use std::io::Write;

use anyhow::Result;
use minder_core::{ApplyAction, ApplyResult};

/// Output format for results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

const HEADERS: [&str; 5] = ["PROJECT", "ID", "NAME", "TYPE", "ACTION"];

/// Writes `results` to `out` in the requested format.
pub fn render(results: &[ApplyResult], format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Table => render_table(results, out)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(results)?)?,
        OutputFormat::Yaml => write!(out, "{}", serde_yaml::to_string(results)?)?,
    }
    Ok(())
}

fn render_table(results: &[ApplyResult], out: &mut impl Write) -> Result<()> {
    if results.is_empty() {
        return Ok(());
    }

    let rows: Vec<[String; 5]> = results
        .iter()
        .map(|r| {
            [
                r.project.clone().unwrap_or_default(),
                r.server_id.clone().unwrap_or_default(),
                r.name.clone(),
                r.kind.to_string(),
                r.action.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    write_row(out, &HEADERS.map(str::to_string), &widths, None)?;
    for (row, result) in rows.iter().zip(results) {
        let error = match result.action {
            ApplyAction::Failed => result.error.as_deref(),
            _ => None,
        };
        write_row(out, row, &widths, error)?;
    }
    Ok(())
}

fn write_row(
    out: &mut impl Write,
    cells: &[String; 5],
    widths: &[usize; 5],
    error: Option<&str>,
) -> Result<()> {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        if i == cells.len() - 1 {
            line.push_str(cell);
        } else {
            line.push_str(&format!("{cell:<width$}"));
        }
    }
    if let Some(error) = error {
        line.push_str("  ");
        line.push_str(error);
    }
    writeln!(out, "{line}")?;
    Ok(())
}
