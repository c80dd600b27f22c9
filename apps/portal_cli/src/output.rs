use anyhow::Result;
use clap::ValueEnum;
use portal_engine::Chart;
use portal_model::parse_timestamp;
use serde::Serialize;
use std::io;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
    Csv,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Left-aligned columns sized to their widest cell.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }
    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    println!("{}", line(headers.to_vec()));
    for row in rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}

pub fn emit(format: Format, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    match format {
        Format::Csv => print_csv(headers, rows),
        Format::Json => {
            let records: Vec<serde_json::Map<String, serde_json::Value>> = rows
                .iter()
                .map(|row| {
                    headers
                        .iter()
                        .zip(row)
                        .map(|(h, v)| (h.to_string(), serde_json::Value::String(v.clone())))
                        .collect()
                })
                .collect();
            print_json(&records)
        }
        Format::Text => {
            print_table(headers, rows);
            Ok(())
        }
    }
}

/// Server timestamps as `YYYY-MM-DD HH:MM` UTC; unparseable text is kept.
pub fn timestamp(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(raw) => parse_timestamp(raw)
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

pub const BAR_WIDTH: usize = 30;

/// Horizontal bars scaled to the largest value of the chart.
pub fn chart_lines(chart: &Chart) -> Vec<String> {
    let max = chart.max_value();
    let label_width = chart
        .series
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    chart
        .series
        .iter()
        .map(|(label, value)| {
            let len = if max > 0.0 {
                ((value / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!(
                "{:<width$}  {} {}",
                label,
                "█".repeat(len),
                value,
                width = label_width
            )
        })
        .collect()
}
