use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use _model::{FlatType, Sale};

/// Towns classified as mature estates.
const MATURE_ESTATES: [&str; 15] = [
    "ANG MO KIO",
    "BEDOK",
    "BISHAN",
    "BUKIT MERAH",
    "BUKIT TIMAH",
    "CENTRAL",
    "CLEMENTI",
    "GEYLANG",
    "KALLANG/WHAMPOA",
    "MARINE PARADE",
    "PASIR RIS",
    "QUEENSTOWN",
    "SERANGOON",
    "TAMPINES",
    "TOA PAYOH",
];

/// The slice of the features table the final dataset carries.
#[derive(Debug, Deserialize)]
struct FeatureColumns {
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "Distance_MRT")]
    distance_mrt: Option<f64>,
    #[serde(rename = "Distance_Mall")]
    distance_mall: Option<f64>,
    #[serde(rename = "Within_1km_of_Pri")]
    within_1km_of_school: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FinalRecord {
    year: u16,
    month: u8,
    town: String,
    #[serde(rename = "Flat_Type")]
    flat_type: FlatType,
    address: String,
    storey: u8,
    #[serde(rename = "Floor_Area")]
    floor_area: f64,
    #[serde(rename = "Remaining_Lease")]
    remaining_lease: f64,
    price: f64,
    #[serde(rename = "Distance_MRT")]
    distance_mrt: Option<f64>,
    #[serde(rename = "Distance_Mall")]
    distance_mall: Option<f64>,
    #[serde(rename = "Within_1km_of_Pri")]
    within_1km_of_school: Option<bool>,
    mature: bool,
}

pub fn run(clean: &Path, features: &Path, output: &Path) -> Result<()> {
    let mut by_address = BTreeMap::new();
    let mut reader = csv::Reader::from_path(features)
        .with_context(|| format!("failed to open {}", features.display()))?;
    for row in reader.deserialize() {
        let row: FeatureColumns = row?;
        by_address.insert(row.address.clone(), row);
    }

    let mut reader = csv::Reader::from_path(clean)
        .with_context(|| format!("failed to open {}", clean.display()))?;
    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut total = 0usize;
    let mut matched = 0usize;
    for row in reader.deserialize() {
        let sale: Sale = row?;
        let features = by_address.get(&sale.address);
        total += 1;
        if features.is_some() {
            matched += 1;
        }
        writer.serialize(finalize(sale, features))?;
    }
    writer.flush()?;
    info!("{matched} of {total} records matched a feature row");

    Ok(())
}

fn finalize(sale: Sale, features: Option<&FeatureColumns>) -> FinalRecord {
    let mature = MATURE_ESTATES.contains(&sale.town.as_str());

    FinalRecord {
        year: sale.year,
        month: sale.month,
        town: sale.town,
        flat_type: sale.flat_type,
        address: sale.address,
        storey: sale.storey,
        floor_area: sale.floor_area,
        remaining_lease: sale.remaining_lease,
        price: sale.price,
        distance_mrt: features.and_then(|x| x.distance_mrt),
        distance_mall: features.and_then(|x| x.distance_mall),
        within_1km_of_school: features.and_then(|x| x.within_1km_of_school),
        mature,
    }
}
