//! Report export to JSON and CSV.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use dispatch_core::MatchReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Write `report` to `output`, or to stdout when no path is given.
pub fn export_report(
    report: &MatchReport,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            let file = File::create(path)?;
            write_report(report, format, BufWriter::new(file))
        }
        None => write_report(report, format, io::stdout().lock()),
    }
}

pub fn write_report(
    report: &MatchReport,
    format: OutputFormat,
    writer: impl Write,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => write_json(report, writer),
        OutputFormat::Csv => write_csv(report, writer),
    }
}

fn write_json(report: &MatchReport, mut writer: impl Write) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// One row per outcome: available drivers in rank order, then excluded drivers unranked.
fn write_csv(report: &MatchReport, writer: impl Write) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "rank",
        "driver_id",
        "driver_name",
        "status",
        "score",
        "tier",
        "reason",
    ])?;

    for (index, outcome) in report.available.iter().enumerate() {
        let rank = (index + 1).to_string();
        let score = outcome.score().map(|s| s.to_string()).unwrap_or_default();
        let tier = outcome.tier().map(|t| t.to_string()).unwrap_or_default();
        let reasons = outcome.score_breakdown().join("; ");
        wtr.write_record([
            rank.as_str(),
            outcome.driver_id.as_str(),
            outcome.driver_name.as_str(),
            "eligible",
            score.as_str(),
            tier.as_str(),
            reasons.as_str(),
        ])?;
    }

    for outcome in &report.excluded {
        let reason = outcome
            .exclusion_reason()
            .map(|r| r.as_str())
            .unwrap_or_default();
        wtr.write_record([
            "",
            outcome.driver_id.as_str(),
            outcome.driver_name.as_str(),
            "excluded",
            "",
            "",
            reason,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
