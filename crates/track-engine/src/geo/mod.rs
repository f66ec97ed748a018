// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Geodesic math and local planar projection.
//!
//! Provides great-circle distance and a cheap planar projection around a
//! reference center. The projection is not conformal; it scales longitude by
//! `cos(center_lat)` to correct for meridian convergence and is accurate only
//! near the center, which is all a terminal-area display needs.

pub mod predict;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per statute mile.
const METERS_PER_STATUTE_MILE: f64 = 1609.34;

/// Default maximum displayable range in statute miles.
const DEFAULT_MAX_RANGE_MILES: f64 = 200.0;

/// Default projection scale in pixels per degree of latitude.
const DEFAULT_SCALE_PX_PER_DEG: f64 = 800.0;

/// A geodetic position in degrees, latitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A point in the local planar space produced by [`GeoProjector::project`],
/// in pixels at unit view scale. Positive x is east, positive y is north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

/// Calculate the great-circle distance in meters between two lat/lon points
/// using the Haversine formula.
#[must_use]
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Projects geodetic coordinates into local planar offsets around a fixed
/// reference center, with a maximum-range cutoff.
#[derive(Debug, Clone)]
pub struct GeoProjector {
    center_lat: f64,
    center_lon: f64,
    scale_px_per_deg: f64,
    max_range_m: f64,
}

impl GeoProjector {
    /// Create a projector centered on the given reference point with the
    /// default scale and 200-statute-mile range cutoff.
    #[must_use]
    pub fn new(center_lat: f64, center_lon: f64) -> Self {
        Self {
            center_lat,
            center_lon,
            scale_px_per_deg: DEFAULT_SCALE_PX_PER_DEG,
            max_range_m: DEFAULT_MAX_RANGE_MILES * METERS_PER_STATUTE_MILE,
        }
    }

    /// Override the projection scale in pixels per degree.
    #[must_use]
    pub fn with_scale(mut self, scale_px_per_deg: f64) -> Self {
        self.scale_px_per_deg = scale_px_per_deg;
        self
    }

    /// Get the reference center as (lat, lon).
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.center_lat, self.center_lon)
    }

    /// Great-circle distance in meters from the reference center.
    #[must_use]
    pub fn distance_to(&self, lat: f64, lon: f64) -> f64 {
        haversine_distance_m(self.center_lat, self.center_lon, lat, lon)
    }

    /// Project a lat/lon pair into local planar offsets.
    ///
    /// Longitude deltas are scaled by `cos(center_lat)` so east/west pixel
    /// distances stay honest away from the equator. Returns `None` when the
    /// point lies beyond the range cutoff; callers skip drawing it.
    #[must_use]
    pub fn project(&self, lat: f64, lon: f64) -> Option<PlanarPoint> {
        if self.distance_to(lat, lon) > self.max_range_m {
            return None;
        }

        let x = (lon - self.center_lon) * self.scale_px_per_deg * self.center_lat.to_radians().cos();
        let y = (lat - self.center_lat) * self.scale_px_per_deg;
        Some(PlanarPoint { x, y })
    }
}
