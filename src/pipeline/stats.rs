// src/pipeline/stats.rs

//! Field coverage of a record set.

use std::path::Path;

use crate::error::Result;
use crate::models::OrganizationRecord;
use crate::storage::read_records;
use crate::utils::log::{percent, summary};

/// How many records carry each contact field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldCoverage {
    pub total: usize,
    pub email: usize,
    pub website: usize,
    pub phone: usize,
    pub address: usize,
    /// Records with a contact first or last name
    pub contact: usize,
}

impl FieldCoverage {
    pub fn from_records(records: &[OrganizationRecord]) -> Self {
        let count = |field: fn(&OrganizationRecord) -> bool| {
            records.iter().filter(|r| field(r)).count()
        };

        Self {
            total: records.len(),
            email: count(|r| !r.email.trim().is_empty()),
            website: count(|r| !r.website.trim().is_empty()),
            phone: count(|r| !r.phone.trim().is_empty()),
            address: count(|r| !r.address.trim().is_empty()),
            contact: count(|r| {
                !r.contact_last_name.trim().is_empty() || !r.contact_first_name.trim().is_empty()
            }),
        }
    }

    /// Log the coverage table under `title`.
    pub fn log(&self, title: &str) {
        let line = |n: usize| format!("{n} ({})", percent(n, self.total));
        summary(
            title,
            &[
                ("Records", self.total.to_string()),
                ("Email", line(self.email)),
                ("Website", line(self.website)),
                ("Phone", line(self.phone)),
                ("Address", line(self.address)),
                ("Contact", line(self.contact)),
            ],
        );
    }
}

/// `stats` command: report field coverage of a CSV file.
pub fn run_stats(path: &Path) -> Result<FieldCoverage> {
    let records = read_records(path)?;
    let coverage = FieldCoverage::from_records(&records);
    coverage.log(&path.display().to_string());
    Ok(coverage)
}
