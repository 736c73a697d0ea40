use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use _model::{FlatType, Sale};

use crate::outliers::{self, Numeric};

/// One row of the published resale extract. Columns we do not carry (flat
/// model, lease commencement year) are ignored by the reader.
#[derive(Debug, Deserialize)]
struct RawRecord {
    month: String,
    town: String,
    flat_type: String,
    block: String,
    street_name: String,
    storey_range: String,
    floor_area_sqm: f64,
    remaining_lease: String,
    resale_price: f64,
}

pub fn run(raw: &Path, output: &Path, trim: &[Numeric]) -> Result<()> {
    let mut reader =
        csv::Reader::from_path(raw).with_context(|| format!("failed to open {}", raw.display()))?;

    let mut sales = Vec::new();
    for (line, row) in reader.deserialize().enumerate() {
        let row: RawRecord = row?;
        // line 1 is the header
        sales.push(refine(row).with_context(|| format!("bad record on line {}", line + 2))?);
    }
    info!("cleaned {} records", sales.len());

    let before = sales.len();
    let sales = outliers::trim(sales, trim);
    if sales.len() < before {
        info!("dropped {} outlier records", before - sales.len());
    }

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    for sale in &sales {
        writer.serialize(sale)?;
    }
    writer.flush()?;

    Ok(())
}

fn refine(raw: RawRecord) -> Result<Sale> {
    let (year, month) = split_month(&raw.month)?;
    let flat_type = match FlatType::parse(&raw.flat_type) {
        Some(x) => x,
        None => bail!("unknown flat type: {}", raw.flat_type),
    };

    Ok(Sale {
        year,
        month,
        town: raw.town,
        flat_type,
        address: format!("{} {}", raw.block, raw.street_name),
        storey: lowest_storey(&raw.storey_range)?,
        floor_area: raw.floor_area_sqm,
        remaining_lease: lease_years(&raw.remaining_lease)?,
        price: raw.resale_price,
    })
}

// "2017-03" -> (2017, 3)
fn split_month(raw: &str) -> Result<(u16, u8)> {
    let (year, month) = raw
        .split_once('-')
        .with_context(|| format!("bad month: {raw}"))?;
    Ok((year.parse()?, month.parse()?))
}

// "10 TO 12" -> 10
fn lowest_storey(raw: &str) -> Result<u8> {
    raw.split_whitespace()
        .next()
        .context("empty storey range")?
        .parse()
        .with_context(|| format!("bad storey range: {raw}"))
}

// "61 years 4 months" -> 61.333, "61 years" -> 61.0
fn lease_years(raw: &str) -> Result<f64> {
    let mut parts = raw.split_whitespace();
    let years: u32 = parts
        .next()
        .context("empty remaining lease")?
        .parse()
        .with_context(|| format!("bad remaining lease: {raw}"))?;

    let months: u32 = if raw.contains("month") {
        // skip the "years" word
        parts
            .nth(1)
            .with_context(|| format!("bad remaining lease: {raw}"))?
            .parse()
            .with_context(|| format!("bad remaining lease: {raw}"))?
    } else {
        0
    };

    Ok(((years as f64 + months as f64 / 12.0) * 1000.0).round() / 1000.0)
}
