use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use _model::Place;

#[derive(Debug, Deserialize)]
struct LatLongRow {
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "Lat")]
    lat: f64,
    #[serde(rename = "Long")]
    long: f64,
}

/// Load an `{Address, Lat, Long}` coordinate table.
pub fn load_places(path: &Path) -> Result<Vec<Place>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut places = Vec::new();
    for row in reader.deserialize() {
        let row: LatLongRow = row.with_context(|| format!("bad row in {}", path.display()))?;
        places.push(Place::new(row.address, row.lat, row.long));
    }

    Ok(places)
}
