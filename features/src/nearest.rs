use anyhow::{bail, Result};
use geo::{HaversineDistance, Point};

use _model::{Category, Place};

// metres
const NEARBY_RADIUS: f64 = 1_000.0;

/// The closest candidate to a query point, with its ≤1 km classification.
#[derive(Clone, Debug)]
pub struct Nearest {
    pub address: String,
    pub point: Point,
    /// `None` when the query sits exactly on the candidate; a block that is
    /// its own nearest school has no meaningful "within 1 km" answer.
    pub within_1km: Option<bool>,
}

/// Lookup seam so a spatial tree can replace the scan without touching the
/// batch loop. Any implementation must keep first-wins tie-breaking.
pub trait ProximityIndex: Sync {
    fn nearest(&self, query: Point) -> Nearest;
}

/// Linear scan over one candidate table. The reference sets are tens to low
/// thousands of rows, well below where an index would pay for itself.
pub struct ScanIndex {
    places: Vec<Place>,
}

impl ScanIndex {
    pub fn new(category: Category, places: Vec<Place>) -> Result<Self> {
        if places.is_empty() {
            bail!("{} table has no rows", category.slug());
        }

        Ok(Self { places })
    }
}

impl ProximityIndex for ScanIndex {
    fn nearest(&self, query: Point) -> Nearest {
        let mut best = &self.places[0];
        let mut best_distance = query.haversine_distance(&best.point);
        // strict < keeps the earliest row on ties
        for place in &self.places[1..] {
            let distance = query.haversine_distance(&place.point);
            if distance < best_distance {
                best = place;
                best_distance = distance;
            }
        }

        Nearest {
            address: best.address.clone(),
            point: best.point,
            within_1km: if best_distance == 0.0 {
                None
            } else {
                Some(best_distance <= NEARBY_RADIUS)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stations() -> Vec<Place> {
        vec![
            Place::new("ORCHARD MRT", 1.30, 103.80),
            Place::new("NEWTON MRT", 1.35, 103.85),
            Place::new("BISHAN MRT", 1.40, 103.90),
        ]
    }

    #[test]
    fn picks_the_argmin_candidate() {
        let index = ScanIndex::new(Category::Mrt, stations()).unwrap();
        let hit = index.nearest(Place::new("", 1.301, 103.801).point);
        assert_eq!(hit.address, "ORCHARD MRT");
        assert_eq!(hit.within_1km, Some(true));
    }

    #[test]
    fn no_candidate_is_strictly_closer() {
        let index = ScanIndex::new(Category::Mrt, stations()).unwrap();
        let query = Place::new("", 1.37, 103.88).point;
        let hit = index.nearest(query);
        let best = query.haversine_distance(&hit.point);
        for place in stations() {
            assert!(query.haversine_distance(&place.point) >= best);
        }
    }

    #[test]
    fn self_match_is_ambiguous() {
        let index = ScanIndex::new(Category::Mrt, stations()).unwrap();
        let hit = index.nearest(Place::new("", 1.35, 103.85).point);
        assert_eq!(hit.address, "NEWTON MRT");
        assert_eq!(hit.within_1km, None);
    }

    #[test]
    fn distant_candidate_is_not_nearby() {
        let index = ScanIndex::new(Category::Mrt, stations()).unwrap();
        let hit = index.nearest(Place::new("", 1.20, 103.60).point);
        assert_eq!(hit.address, "ORCHARD MRT");
        assert_eq!(hit.within_1km, Some(false));
    }

    #[test]
    fn ties_keep_the_first_row() {
        let twins = vec![
            Place::new("FIRST", 1.30, 103.80),
            Place::new("SECOND", 1.30, 103.80),
        ];
        let index = ScanIndex::new(Category::Mall, twins).unwrap();
        let hit = index.nearest(Place::new("", 1.31, 103.81).point);
        assert_eq!(hit.address, "FIRST");
    }

    #[test]
    fn rejects_an_empty_table() {
        assert!(ScanIndex::new(Category::School, Vec::new()).is_err());
    }
}
