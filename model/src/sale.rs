use serde::{Deserialize, Serialize};

use crate::FlatType;

/// One normalized resale transaction, the schema shared by the cleaning and
/// merge stages.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sale {
    pub year: u16,
    pub month: u8,
    pub town: String,
    #[serde(rename = "Flat_Type")]
    pub flat_type: FlatType,
    pub address: String,
    pub storey: u8,
    #[serde(rename = "Floor_Area")]
    pub floor_area: f64,
    #[serde(rename = "Remaining_Lease")]
    pub remaining_lease: f64,
    pub price: f64,
}
