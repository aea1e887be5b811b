use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::holes::HoleAggregate;
use crate::report::AnalysisReport;
use crate::root_cause::{HeroCard, RootCauseCategory, RootCauseRecord, TrendData, detail_table};
use crate::tiger5::RoundTiger5;

pub struct ExportSummary {
    pub holes: usize,
    pub root_causes: usize,
    pub trend_rounds: usize,
}

pub fn export_workbook(path: &Path, report: &AnalysisReport) -> Result<ExportSummary> {
    let mut holes_rows = vec![header(&[
        "Round", "Date", "Hole", "Par", "Score", "Vs Par", "Shots", "Putts", "Penalties", "SG",
    ])];
    holes_rows.extend(report.holes.iter().map(hole_row));

    let mut cause_rows = vec![header(&[
        "Section",
        "Root Cause",
        "Round",
        "Date",
        "Hole",
        "Shot",
        "Shot Type",
        "Distance",
        "SG",
        "Penalty",
        "Ending Location",
        "Score",
        "Par",
    ])];
    let details = detail_table(&report.scoring.analysis);
    cause_rows.extend(details.iter().map(root_cause_row));

    let mut hero_rows = vec![header(&[
        "Category",
        "Count",
        "Total SG",
        "Double Bogey+",
        "Bogey",
        "Underperformance",
    ])];
    hero_rows.extend(report.scoring.hero_cards.iter().map(hero_row));

    let trend_rows = trend_rows(&report.scoring.trend);
    let tiger_rows = tiger5_rows(&report.tiger5_trend);

    let mut workbook = Workbook::new();
    for (name, rows) in [
        ("Holes", &holes_rows),
        ("RootCauses", &cause_rows),
        ("HeroCards", &hero_rows),
        ("Trend", &trend_rows),
        ("Tiger5", &tiger_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_rows(sheet, rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        holes: holes_rows.len().saturating_sub(1),
        root_causes: cause_rows.len().saturating_sub(1),
        trend_rounds: trend_rows.len().saturating_sub(1),
    })
}

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn hole_row(hole: &HoleAggregate) -> Vec<String> {
    vec![
        hole.round_id.clone(),
        opt_to_string(hole.date),
        hole.hole.to_string(),
        hole.par.to_string(),
        hole.hole_score.to_string(),
        format!("{:+}", hole.score_vs_par),
        hole.shots.to_string(),
        hole.putts.to_string(),
        hole.penalties.to_string(),
        format!("{:.3}", hole.hole_sg),
    ]
}

fn root_cause_row(rc: &RootCauseRecord) -> Vec<String> {
    vec![
        rc.section.label().to_string(),
        rc.root_cause.label().to_string(),
        rc.round_id.clone(),
        opt_to_string(rc.date),
        rc.hole.to_string(),
        rc.shot_number.to_string(),
        rc.shot_type.as_str().to_string(),
        format!("{:.0}", rc.distance),
        format!("{:.3}", rc.sg_value),
        if rc.penalty { "Yes" } else { "No" }.to_string(),
        rc.ending_location.clone(),
        rc.hole_score.to_string(),
        rc.par.to_string(),
    ]
}

fn hero_row(card: &HeroCard) -> Vec<String> {
    vec![
        card.category.label().to_string(),
        card.count.to_string(),
        format!("{:.3}", card.total_sg),
        card.double_bogey_count.to_string(),
        card.bogey_count.to_string(),
        card.underperformance_count.to_string(),
    ]
}

fn trend_rows(trend: &TrendData) -> Vec<Vec<String>> {
    let mut head = vec!["Round".to_string(), "Date".to_string()];
    head.extend(trend.categories.iter().map(|c: &RootCauseCategory| c.label().to_string()));
    head.push("Total".to_string());
    let mut rows = vec![head];
    for round in &trend.rounds {
        let mut row = vec![round.round_id.clone(), opt_to_string(round.date)];
        row.extend(round.counts.iter().map(|n| n.to_string()));
        row.push(round.total_fails.to_string());
        rows.push(row);
    }
    rows
}

fn tiger5_rows(rounds: &[RoundTiger5]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Round", "Rule", "Attempts", "Fails", "Fail %", "Grit"])];
    for round in rounds {
        for tally in &round.summary.rules {
            rows.push(vec![
                round.round_id.clone(),
                tally.rule.label().to_string(),
                tally.attempts.to_string(),
                tally.fails.to_string(),
                format!("{:.1}", tally.fail_rate),
                format!("{:.1}", round.summary.grit_score),
            ]);
        }
    }
    rows
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
