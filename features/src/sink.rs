use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// One row of the engineered-features table. Distances are metres; an empty
/// cell marks a failed route lookup, or the ambiguous self-match school flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureRow {
    pub address: String,
    pub lat: f64,
    pub long: f64,
    #[serde(rename = "Nearest_MRT")]
    pub nearest_mrt: String,
    #[serde(rename = "Distance_MRT")]
    pub distance_mrt: Option<f64>,
    #[serde(rename = "Nearest_Mall")]
    pub nearest_mall: String,
    #[serde(rename = "Distance_Mall")]
    pub distance_mall: Option<f64>,
    #[serde(rename = "Nearest_Pri_Sch")]
    pub nearest_school: String,
    #[serde(rename = "Within_1km_of_Pri")]
    pub within_1km_of_school: Option<bool>,
}

/// Append-only features table. Each `append` serializes the whole batch into
/// one buffer and lands it with a single write, so a batch is either fully on
/// disk or absent.
pub struct CsvSink {
    file: File,
    wrote_header: bool,
}

impl CsvSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        // resuming into a non-empty file must not repeat the header
        let wrote_header = file.metadata()?.len() > 0;

        Ok(Self { file, wrote_header })
    }

    pub fn append(&mut self, rows: &[FeatureRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut buffer = Vec::new();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(!self.wrote_header)
                .from_writer(&mut buffer);
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }

        self.file.write_all(&buffer)?;
        self.file.sync_data()?;
        self.wrote_header = true;

        Ok(())
    }
}
