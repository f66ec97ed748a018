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

//! Overlay geometry extracted from GeoJSON.
//!
//! Only `LineString` features are consumed (airspace boundaries, sector
//! lines). GeoJSON orders coordinates `[lon, lat]`; the swap to the internal
//! (lat, lon) convention happens here, at the boundary, and nowhere else.

use geojson::{FeatureCollection, Value};

use crate::geo::Position;

/// One overlay polyline in internal coordinate order.
#[derive(Debug, Clone)]
pub struct OverlayLine {
    pub points: Vec<Position>,
}

/// Extract the `LineString` features of a parsed `FeatureCollection`.
///
/// Features with other geometry types (or no geometry) are ignored.
#[must_use]
pub fn lines_from_feature_collection(collection: &FeatureCollection) -> Vec<OverlayLine> {
    collection
        .features
        .iter()
        .filter_map(|feature| feature.geometry.as_ref())
        .filter_map(|geometry| match &geometry.value {
            Value::LineString(coords) => Some(OverlayLine {
                points: coords
                    .iter()
                    .filter(|c| c.len() >= 2)
                    .map(|c| Position::new(c[1], c[0]))
                    .collect(),
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "sector boundary"},
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-87.9, 41.9], [-87.8, 42.0], [-87.7, 42.1]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Point",
                    "coordinates": [-87.9, 41.9]
                }
            }
        ]
    }"#;

    #[test]
    fn test_linestrings_extracted_with_axis_swap() {
        let collection: FeatureCollection = COLLECTION.parse().unwrap();
        let lines = lines_from_feature_collection(&collection);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].points.len(), 3);
        // GeoJSON [lon, lat] becomes internal (lat, lon)
        assert_eq!(lines[0].points[0], Position::new(41.9, -87.9));
        assert_eq!(lines[0].points[2], Position::new(42.1, -87.7));
    }

    #[test]
    fn test_empty_collection() {
        let collection: FeatureCollection =
            r#"{"type": "FeatureCollection", "features": []}"#.parse().unwrap();
        assert!(lines_from_feature_collection(&collection).is_empty());
    }
}
