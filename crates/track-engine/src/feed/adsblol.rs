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

//! adsb.lol v2 payload mapping.
//!
//! The v2 endpoint returns `{ "ac": [ ... ] }` where each entry is a
//! loosely-typed aircraft object. Field names follow the readsb convention:
//! `hex`, `flight`, `lat`, `lon`, `alt_baro`, `gs`, `track`, `emergency`.
//! `alt_baro` holds either feet or the literal string `"ground"`.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::{AircraftReport, FeedError, NumericField};

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    ac: Vec<RawAircraft>,
}

/// One aircraft entry as it comes off the wire. Numeric fields stay as raw
/// JSON values until normalization so one aircraft with a junk string never
/// fails deserialization of the whole payload.
#[derive(Debug, Deserialize)]
struct RawAircraft {
    hex: Option<String>,
    flight: Option<String>,
    lat: Option<Value>,
    lon: Option<Value>,
    alt_baro: Option<Value>,
    gs: Option<Value>,
    track: Option<Value>,
    emergency: Option<String>,
}

impl RawAircraft {
    fn normalize(self) -> AircraftReport {
        let hex = self.hex.map(|h| h.trim().to_lowercase()).filter(|h| !h.is_empty());
        let callsign = self.flight.map(|f| f.trim().to_string()).filter(|f| !f.is_empty());
        let ident = callsign.or_else(|| hex.clone());

        let (altitude, on_ground) = match self.alt_baro {
            Some(Value::String(ref s)) if s.eq_ignore_ascii_case("ground") => (None, true),
            ref raw => (
                NumericField::from_raw(raw.as_ref())
                    .value()
                    .map(|v| v.round() as i32),
                false,
            ),
        };

        AircraftReport {
            ident,
            hex,
            lat: NumericField::from_raw(self.lat.as_ref()),
            lon: NumericField::from_raw(self.lon.as_ref()),
            altitude,
            ground_speed: NumericField::from_raw(self.gs.as_ref()).value(),
            track: NumericField::from_raw(self.track.as_ref()).value(),
            emergency: self
                .emergency
                .map(|e| !e.is_empty() && !e.eq_ignore_ascii_case("none"))
                .unwrap_or(false),
            on_ground,
            highlighted: false,
        }
    }
}

/// Decode an adsb.lol v2 response body into normalized reports.
pub fn parse_payload(body: &[u8]) -> Result<Vec<AircraftReport>, FeedError> {
    let payload: Payload = serde_json::from_slice(body)?;
    debug!("feed payload contained {} aircraft", payload.ac.len());
    Ok(payload.ac.into_iter().map(RawAircraft::normalize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "ac": [
            {"hex": "a1b2c3", "flight": "UAL123  ", "lat": 41.9, "lon": -87.9,
             "alt_baro": 12000, "gs": 250.5, "track": 89.0, "emergency": "none"},
            {"hex": "abc123", "lat": "41.5", "lon": "-88.1", "alt_baro": "ground", "gs": 8.0},
            {"hex": "dead01", "lat": 42.0, "lon": "not-a-number", "emergency": "general"},
            {"flight": "   ", "lat": 41.0, "lon": -87.0}
        ],
        "total": 4,
        "now": 1700000000
    }"#;

    #[test]
    fn test_parse_payload_fields() {
        let reports = parse_payload(SAMPLE.as_bytes()).unwrap();
        assert_eq!(reports.len(), 4);

        let first = &reports[0];
        assert_eq!(first.ident.as_deref(), Some("UAL123"));
        assert_eq!(first.hex.as_deref(), Some("a1b2c3"));
        assert_eq!(first.position(), Some((41.9, -87.9)));
        assert_eq!(first.altitude, Some(12000));
        assert_eq!(first.ground_speed, Some(250.5));
        assert!(!first.emergency);
        assert!(!first.on_ground);
    }

    #[test]
    fn test_numeric_strings_convert_and_ground_is_flagged() {
        let reports = parse_payload(SAMPLE.as_bytes()).unwrap();
        let ground = &reports[1];
        // No callsign, so ident falls back to hex
        assert_eq!(ground.ident.as_deref(), Some("abc123"));
        assert_eq!(ground.position(), Some((41.5, -88.1)));
        assert_eq!(ground.altitude, None);
        assert!(ground.on_ground);
    }

    #[test]
    fn test_invalid_longitude_and_emergency() {
        let reports = parse_payload(SAMPLE.as_bytes()).unwrap();
        let broken = &reports[2];
        assert_eq!(broken.lon, NumericField::Invalid);
        assert_eq!(broken.position(), None);
        assert!(broken.emergency);
    }

    #[test]
    fn test_blank_callsign_without_hex_has_no_ident() {
        let reports = parse_payload(SAMPLE.as_bytes()).unwrap();
        assert_eq!(reports[3].ident, None);
    }

    #[test]
    fn test_empty_payload() {
        let reports = parse_payload(br#"{"ac": [], "total": 0}"#).unwrap();
        assert!(reports.is_empty());

        // "ac" missing entirely is also an empty batch, not an error
        let reports = parse_payload(br#"{"total": 0}"#).unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        assert!(parse_payload(b"<html>503</html>").is_err());
    }

    #[test]
    fn test_string_speed_degrades_one_field_not_the_batch() {
        // The feed emits string speeds like "ground" for some aircraft;
        // that must cost the field, never the sibling reports.
        let body = br#"{
            "ac": [
                {"hex": "a1b2c3", "flight": "UAL123", "lat": 41.9, "lon": -87.9,
                 "gs": "ground", "track": []},
                {"hex": "abc124", "flight": "AAL45", "lat": 42.0, "lon": -88.0,
                 "gs": 250.5, "track": "89.0"}
            ]
        }"#;

        let reports = parse_payload(body).unwrap();
        assert_eq!(reports.len(), 2);

        let junk = &reports[0];
        assert_eq!(junk.ident.as_deref(), Some("UAL123"));
        assert_eq!(junk.position(), Some((41.9, -87.9)));
        assert_eq!(junk.ground_speed, None);
        assert_eq!(junk.track, None);

        let valid = &reports[1];
        assert_eq!(valid.ground_speed, Some(250.5));
        assert_eq!(valid.track, Some(89.0));
    }
}
