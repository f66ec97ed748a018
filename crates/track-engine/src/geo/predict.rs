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

//! Short-horizon dead-reckoning prediction.
//!
//! Extrapolates a future position from the latest known position, track
//! angle, and ground speed assuming constant velocity. Used by the display
//! to draw a lead line ahead of each aircraft.

use super::Position;

/// Knots to meters per second.
const KNOTS_TO_MPS: f64 = 0.514444;

/// Meters per degree of latitude.
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Default prediction horizon in seconds.
pub const DEFAULT_HORIZON_SECS: f64 = 60.0;

/// Predict a future position by straight-line extrapolation.
///
/// `track_deg` is the ground track in degrees, 0° = geographic north,
/// increasing clockwise. The longitude displacement is corrected by
/// `cos(lat)` so a degree of longitude shrinks toward the poles.
/// Deterministic for identical inputs.
#[must_use]
pub fn predict_position(
    lat: f64,
    lon: f64,
    track_deg: f64,
    ground_speed_kt: f64,
    horizon_secs: f64,
) -> Position {
    let distance_m = ground_speed_kt * KNOTS_TO_MPS * horizon_secs;
    let track_rad = track_deg.to_radians();

    let north_m = distance_m * track_rad.cos();
    let east_m = distance_m * track_rad.sin();

    let delta_lat = north_m / METERS_PER_DEG_LAT;
    let meters_per_deg_lon = METERS_PER_DEG_LAT * lat.to_radians().cos();
    let delta_lon = east_m / meters_per_deg_lon;

    Position::new(lat + delta_lat, lon + delta_lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_north_moves_latitude_only() {
        let from = (41.9786, -87.9047);
        let to = predict_position(from.0, from.1, 0.0, 120.0, 60.0);

        // 120 kt for 60 s is about 0.0333 degrees of latitude
        let expected_delta = 120.0 * 0.514444 * 60.0 / 111_320.0;
        assert!((to.lat - from.0 - expected_delta).abs() < 1e-6);
        assert!((to.lon - from.1).abs() < 1e-9);
    }

    #[test]
    fn test_due_east_moves_longitude_only() {
        let from = (41.9786, -87.9047);
        let to = predict_position(from.0, from.1, 90.0, 120.0, 60.0);

        assert!((to.lat - from.0).abs() < 1e-9);
        assert!(to.lon > from.1);

        // Longitude displacement must be stretched by 1/cos(lat)
        let lat_equivalent = 120.0 * 0.514444 * 60.0 / 111_320.0;
        let expected_delta = lat_equivalent / from.0.to_radians().cos();
        assert!((to.lon - from.1 - expected_delta).abs() < 1e-6);
    }

    #[test]
    fn test_zero_speed_is_identity() {
        let to = predict_position(41.9786, -87.9047, 215.0, 0.0, 60.0);
        assert_eq!(to, Position::new(41.9786, -87.9047));
    }

    #[test]
    fn test_deterministic() {
        let a = predict_position(35.0, -120.0, 42.0, 310.0, 60.0);
        let b = predict_position(35.0, -120.0, 42.0, 310.0, 60.0);
        assert_eq!(a, b);
    }
}
