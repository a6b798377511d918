use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;

use crate::calibration::CalibrationSeries;
use crate::data::types::Point;
use crate::leaderboard::Leaderboard;

/// Append-only CSV record of what was rendered.
pub struct CsvLogger {
    log_path: String,
}

impl CsvLogger {
    pub fn new(log_path: String) -> Result<Self> {
        // Create CSV file with headers if it doesn't exist
        if !std::path::Path::new(&log_path).exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)?;

            writeln!(file, "timestamp,kind,series,rank,label,x,y")?;
        }

        Ok(Self { log_path })
    }

    fn append(&self, lines: &[String]) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.log_path)?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    /// Log every calibration point of both series
    pub fn log_calibration(&self, series: &CalibrationSeries) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339();
        let row = |name: &str, p: &Point| {
            format!("{},calibration,{},,,{:.3},{:.4}", timestamp, name, p.x, p.y)
        };

        let lines: Vec<String> = series
            .yes
            .iter()
            .map(|p| row("YES", p))
            .chain(series.no.iter().map(|p| row("NO", p)))
            .collect();
        self.append(&lines)
    }

    /// Log the rows of a rendered leaderboard
    pub fn log_leaderboard(&self, leaderboard: &Leaderboard) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339();
        let lines: Vec<String> = leaderboard
            .rows
            .iter()
            .map(|r| {
                format!(
                    "{},leaderboard,{},{},{},,{}",
                    timestamp,
                    csv_field(&leaderboard.header),
                    r.rank,
                    csv_field(&r.user.username),
                    r.score
                )
            })
            .collect();
        self.append(&lines)
    }

    /// Log a free-form event
    pub fn log_event(&self, event: &str) -> Result<()> {
        self.append(&[format!("{},event,,,{},,", Utc::now().to_rfc3339(), csv_field(event))])
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
