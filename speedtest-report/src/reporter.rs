// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON report generation for comparison runs.
//!
//! Handles saving reports to timestamped JSON files for later visualization.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::metrics::ComparisonReport;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Report I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// JSON reporter for comparison results.
pub struct JsonReporter {
    /// Output directory for report files
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new JSON reporter with the specified output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save a report to a JSON file.
    ///
    /// Returns the path to the created file. The run id suffix keeps reports
    /// produced within the same second apart.
    pub fn save(&self, report: &ComparisonReport) -> Result<PathBuf, ReporterError> {
        let timestamp = report.timestamp.format("%Y-%m-%dT%H-%M-%SZ");
        let run = report.run_id.simple().to_string();
        let filename = format!("comparison_{}_{}.json", timestamp, &run[..8]);
        let filepath = self.output_dir.join(&filename);

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        Ok(filepath)
    }

    /// List all existing report files in the output directory.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReporterError> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Load an existing report from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<ComparisonReport, ReporterError> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::{arm_result, test_system_info};
    use speedtest_core::ComparisonResult;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn sample_report() -> ComparisonReport {
        let result = ComparisonResult {
            run_id: Uuid::new_v4(),
            iterations: 3,
            arms: vec![
                arm_result("rpc", vec![100.0, 110.0, 105.0]),
                arm_result("http", vec![240.0, 260.0, 250.0]),
            ],
            improvement_ratio: Some(250.0 / 105.0),
        };
        ComparisonReport::with_system_info(&result, test_system_info())
    }

    #[test]
    fn test_reporter_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();

        let report = sample_report();
        let path = reporter.save(&report).unwrap();
        assert!(path.exists());

        let loaded = JsonReporter::load(&path).unwrap();
        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.arms.len(), 2);
        assert_eq!(loaded.arms[0].name, "rpc");
        assert_eq!(loaded.arms[1].samples, vec![240.0, 260.0, 250.0]);
    }

    #[test]
    fn test_list_reports() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();

        reporter.save(&sample_report()).unwrap();
        reporter.save(&sample_report()).unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let reports = reporter.list_reports().unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_creates_nested_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("data").join("runs");
        let reporter = JsonReporter::new(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(reporter.output_dir(), nested.as_path());
    }
}
