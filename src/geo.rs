// SPDX-License-Identifier: MIT

/// Mean radius of Earth, in kilometers.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6371.0088;

/// Mean diameter of Earth, in kilometers.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the `haversine formula <https://en.wikipedia.org/wiki/Haversine_formula>`_.
/// Returns the result in kilometers.
pub fn earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    EARTH_DIAMETER * h.sqrt().asin()
}

/// Calculates the initial great-circle bearing when travelling from the first
/// lat-lon position to the second, in degrees, normalized to [0, 360).
/// 0 is due north, 90 due east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// A geographic bounding box, described by its upper-left and lower-right
/// corners. A well-formed box has `ul_lon < lr_lon` and `ul_lat > lr_lat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub ul_lon: f64,
    pub ul_lat: f64,
    pub lr_lon: f64,
    pub lr_lat: f64,
}

impl BBox {
    /// Longitudinal extent of the box, in degrees.
    pub fn width(&self) -> f64 {
        self.lr_lon - self.ul_lon
    }

    /// Latitudinal extent of the box, in degrees.
    pub fn height(&self) -> f64 {
        self.ul_lat - self.lr_lat
    }

    /// Returns true if the box has no positive extent along either axis.
    pub fn is_degenerate(&self) -> bool {
        self.lr_lon <= self.ul_lon || self.lr_lat >= self.ul_lat
    }

    /// Returns true if the two boxes share a region of positive area.
    /// Boxes that merely touch along an edge do not overlap.
    pub fn overlaps(&self, other: &BBox) -> bool {
        self.ul_lon < other.lr_lon
            && self.lr_lon > other.ul_lon
            && self.ul_lat > other.lr_lat
            && self.lr_lat < other.ul_lat
    }

    /// Returns true if `other` lies entirely within this box.
    pub fn contains(&self, other: &BBox) -> bool {
        self.ul_lon <= other.ul_lon
            && self.lr_lon >= other.lr_lon
            && self.ul_lat >= other.ul_lat
            && self.lr_lat <= other.lr_lat
    }
}
