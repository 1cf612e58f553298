// ===== pixelforge/src/reports/mod.rs =====
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::path::Path;
use std::time::Duration;

use pixelforge::config::DetectionParams;
use pixelforge::error::PfResult;
use pixelforge::optimizer::runner::ScanReport;
use pixelforge::scorer::NoiseAudit;

pub fn print_scan_report(report: &ScanReport) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Scanned").add_attribute(Attribute::Bold),
        Cell::new("Flagged").fg(Color::Cyan),
        Cell::new("Converged").fg(Color::Green),
        Cell::new("Exhausted").fg(Color::Red),
        Cell::new("Skipped").fg(Color::DarkGrey),
        Cell::new("Committed").add_attribute(Attribute::Bold),
        Cell::new("Mean Gens"),
        Cell::new("Elapsed"),
    ]);

    table.add_row(vec![
        Cell::new(report.pixels_scanned),
        Cell::new(report.flagged).fg(Color::Cyan),
        Cell::new(report.converged).fg(Color::Green),
        Cell::new(report.exhausted).fg(Color::Red),
        Cell::new(report.skipped).fg(Color::DarkGrey),
        Cell::new(report.commits).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}", report.mean_generations())),
        Cell::new(format!("{:.2}s", report.elapsed.as_secs_f32())),
    ]);

    for i in 0..=7 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    println!("\n{}", table);

    if report.deadline_hit {
        println!("⚠️  Scan stopped early: the time budget ran out.");
    }
}

pub fn print_audit_report(audit: &NoiseAudit, params: &DetectionParams) {
    println!(
        "\nDetector: |z| > {:.2} over a {}x{} window",
        params.z_threshold, params.window_side, params.window_side
    );

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Pixels").add_attribute(Attribute::Bold),
        Cell::new("Flagged").fg(Color::Cyan),
        Cell::new("Flagged %").fg(Color::Cyan),
        Cell::new("R Hits").fg(Color::Red),
        Cell::new("G Hits").fg(Color::Green),
        Cell::new("B Hits").fg(Color::Blue),
        Cell::new("Flat Windows"),
    ]);

    table.add_row(vec![
        Cell::new(audit.pixels),
        Cell::new(audit.flagged).fg(Color::Cyan),
        Cell::new(format!("{:.2}%", audit.flagged_ratio() * 100.0)).fg(Color::Cyan),
        Cell::new(audit.channel_triggers[0]).fg(Color::Red),
        Cell::new(audit.channel_triggers[1]).fg(Color::Green),
        Cell::new(audit.channel_triggers[2]).fg(Color::Blue),
        Cell::new(audit.flat_windows),
    ]);

    for i in 0..=6 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    println!("\n{}", table);

    if let Some((row, count)) = audit
        .flagged_per_row
        .iter()
        .enumerate()
        .max_by_key(|&(_, count)| *count)
    {
        if *count > 0 {
            println!("Hottest row: {} ({} flags)", row, count);
        }
    }
}

pub fn print_timing_comparison(evolutionary: Duration, baseline: Duration) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Method").add_attribute(Attribute::Bold),
        Cell::new("Elapsed"),
        Cell::new("Slowdown"),
    ]);

    let ratio = if baseline.as_secs_f32() > 0.0 {
        evolutionary.as_secs_f32() / baseline.as_secs_f32()
    } else {
        0.0
    };

    table.add_row(vec![
        Cell::new("Evolutionary scan").fg(Color::Cyan),
        Cell::new(format!("{:.3}s", evolutionary.as_secs_f32())),
        Cell::new(format!("{:.1}x", ratio)),
    ]);
    table.add_row(vec![
        Cell::new("3x3 mean filter").fg(Color::Yellow),
        Cell::new(format!("{:.3}s", baseline.as_secs_f32())),
        Cell::new("1.0x"),
    ]);

    for i in 1..=2 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    println!("\n{}", table);
}

pub fn write_scan_csv<P: AsRef<Path>>(
    path: P,
    report: &ScanReport,
    row_marks: &[usize],
) -> PfResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["row", "flagged", "commits", "cumulative_snapshots"])?;

    for (row, mark) in row_marks.iter().enumerate() {
        let flagged = report.flagged_per_row.get(row).copied().unwrap_or(0);
        let commits = report.commits_per_row.get(row).copied().unwrap_or(0);
        writer.write_record([
            row.to_string(),
            flagged.to_string(),
            commits.to_string(),
            mark.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_audit_csv<P: AsRef<Path>>(path: P, audit: &NoiseAudit) -> PfResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["row", "flagged"])?;

    for (row, flagged) in audit.flagged_per_row.iter().enumerate() {
        writer.write_record([row.to_string(), flagged.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}
