// src/pipeline/clean.rs

//! Cleaning pass over a scrape output file.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::pipeline::stats::FieldCoverage;
use crate::services::RecordCleaner;
use crate::storage::{RecordStore, read_records, write_clean_csv};
use crate::utils::log::{header, summary};

/// Result of one cleaning run.
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows_in: usize,
    pub rows_out: usize,
    pub coverage: FieldCoverage,
}

impl CleanReport {
    pub fn dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

/// `clean` command.
///
/// Without `input`, the newest raw CSV in the output directory is used.
/// Without `output`, a timestamped cleaned file is created next to it.
pub fn run_cleaner(
    config: &Config,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<CleanReport> {
    let store = RecordStore::new(&config.output.dir);
    let input = match input {
        Some(path) => path.to_path_buf(),
        None => store.latest_csv(&config.output.raw_prefix)?.ok_or_else(|| {
            AppError::validation(format!(
                "No {}_*.csv file in {}",
                config.output.raw_prefix,
                store.root().display()
            ))
        })?,
    };
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| store.timestamped_path(&config.output.clean_prefix, "csv"));

    header("Cleaning scraped records");
    log::info!("Input: {}", input.display());

    let cleaner = RecordCleaner::new(&config.cleaning)?;
    let records = read_records(&input)?;
    let rows_in = records.len();
    let cleaned = cleaner.clean_all(records);
    write_clean_csv(&output, &cleaned)?;

    let report = CleanReport {
        input,
        output,
        rows_in,
        rows_out: cleaned.len(),
        coverage: FieldCoverage::from_records(&cleaned),
    };

    summary(
        "Cleaning",
        &[
            ("Rows read", report.rows_in.to_string()),
            ("Rows kept", report.rows_out.to_string()),
            ("Rows dropped (no name)", report.dropped().to_string()),
            ("Output", report.output.display().to_string()),
        ],
    );
    report.coverage.log("Cleaned coverage");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrganizationRecord;
    use crate::storage::write_raw_csv;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.output.dir = dir.display().to_string();
        config
    }

    #[test]
    fn cleans_newest_raw_file_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let old = dir.path().join("bde_scraping_results_20250101_000000.csv");
        let new = dir.path().join("bde_scraping_results_20250601_000000.csv");
        write_raw_csv(&old, &[]).unwrap();
        write_raw_csv(
            &new,
            &[
                OrganizationRecord {
                    name: "BDE Centrale".to_string(),
                    address: "<p>12 rue Sainte-Anne</p>".to_string(),
                    website: "https://bde-centrale.fr).".to_string(),
                    ..OrganizationRecord::new("https://www.helloasso.com/associations/bde-centrale")
                },
                OrganizationRecord::new("https://www.helloasso.com/associations/nameless"),
            ],
        )
        .unwrap();

        let report = run_cleaner(&config, None, None).unwrap();
        assert_eq!(report.input, new);
        assert_eq!(report.rows_in, 2);
        assert_eq!(report.rows_out, 1);
        assert_eq!(report.dropped(), 1);

        let cleaned = read_records(&report.output).unwrap();
        assert_eq!(cleaned[0].address, "12 rue Sainte-Anne");
        assert_eq!(cleaned[0].website, "https://bde-centrale.fr");
    }

    #[test]
    fn missing_raw_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        assert!(matches!(
            run_cleaner(&config, None, None),
            Err(AppError::Validation(_))
        ));
    }
}
