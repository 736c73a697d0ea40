use geo::Point;

/// A named coordinate: a housing block, an MRT station, a mall or a school.
#[derive(Clone, Debug)]
pub struct Place {
    pub address: String,
    pub point: Point,
}

impl Place {
    // geo points are (x, y) = (longitude, latitude)
    pub fn new(address: impl Into<String>, lat: f64, long: f64) -> Self {
        Self {
            address: address.into(),
            point: Point::new(long, lat),
        }
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn long(&self) -> f64 {
        self.point.x()
    }
}
