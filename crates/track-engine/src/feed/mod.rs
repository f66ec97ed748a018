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

//! Feed schema and report normalization.
//!
//! Live aircraft feeds are loosely typed: the same key can hold a number, a
//! numeric string, a junk string, or nothing at all. This module maps raw
//! feed records onto a strongly-typed [`AircraftReport`], keeping "field
//! absent" and "field invalid" distinguishable so the store can log the
//! difference when it drops a report.

pub mod adsblol;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while fetching or decoding a feed response.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("feed returned HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed feed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A numeric feed field with absent and invalid states kept apart.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NumericField {
    /// Field present and numerically convertible.
    Number(f64),
    /// Field missing from the record.
    #[default]
    Absent,
    /// Field present but not convertible to a number.
    Invalid,
}

impl NumericField {
    /// Normalize a raw JSON value. Numbers and numeric strings convert;
    /// anything else present is invalid.
    #[must_use]
    pub fn from_raw(raw: Option<&Value>) -> Self {
        match raw {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Number(n)) => n.as_f64().map_or(Self::Invalid, Self::Number),
            Some(Value::String(s)) => s.trim().parse::<f64>().map_or(Self::Invalid, Self::Number),
            Some(_) => Self::Invalid,
        }
    }

    /// Get the numeric value, if any.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Absent | Self::Invalid => None,
        }
    }
}

/// One normalized aircraft state report.
///
/// Transient: lives for a single fetch cycle. Reports with no identifier are
/// rendered for the cycle but never retained as tracks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AircraftReport {
    /// Stable identifier: trimmed callsign, falling back to the ICAO hex.
    pub ident: Option<String>,
    /// ICAO 24-bit address (hex string), when present.
    pub hex: Option<String>,
    /// Latitude in degrees.
    pub lat: NumericField,
    /// Longitude in degrees.
    pub lon: NumericField,
    /// Barometric altitude in feet.
    pub altitude: Option<i32>,
    /// Ground speed in knots.
    pub ground_speed: Option<f64>,
    /// Track angle in degrees (0-360, north = 0).
    pub track: Option<f64>,
    /// Emergency declared by the transponder.
    pub emergency: bool,
    /// Report is flagged as on the ground by the feed.
    pub on_ground: bool,
    /// Sticky local highlight annotation. Never comes from the feed; the
    /// store re-attaches it during reconciliation.
    pub highlighted: bool,
}

impl AircraftReport {
    /// Validated position, available when both coordinates are numeric.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat.value(), self.lon.value()) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_field_number() {
        let v = json!(41.978);
        assert_eq!(NumericField::from_raw(Some(&v)), NumericField::Number(41.978));
    }

    #[test]
    fn test_numeric_field_numeric_string() {
        let v = json!("  -87.904 ");
        assert_eq!(NumericField::from_raw(Some(&v)), NumericField::Number(-87.904));
    }

    #[test]
    fn test_numeric_field_junk_string() {
        let v = json!("ground");
        assert_eq!(NumericField::from_raw(Some(&v)), NumericField::Invalid);
    }

    #[test]
    fn test_numeric_field_absent() {
        assert_eq!(NumericField::from_raw(None), NumericField::Absent);
        let v = json!(null);
        assert_eq!(NumericField::from_raw(Some(&v)), NumericField::Absent);
    }

    #[test]
    fn test_report_position_requires_both_coordinates() {
        let report = AircraftReport {
            lat: NumericField::Number(41.9),
            lon: NumericField::Invalid,
            ..Default::default()
        };
        assert_eq!(report.position(), None);

        let report = AircraftReport {
            lat: NumericField::Number(41.9),
            lon: NumericField::Number(-87.9),
            ..Default::default()
        };
        assert_eq!(report.position(), Some((41.9, -87.9)));
    }
}
