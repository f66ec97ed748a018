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

//! Track state management and reconciliation.
//!
//! The store owns one [`Track`] per identified aircraft: a bounded position
//! history, the latest full report, and the sticky highlight flag. Each
//! fetch cycle replaces the whole aircraft set, so [`TrackStore::reconcile`]
//! merges the fresh batch into existing per-identifier state instead of
//! starting over, which is what keeps trails and highlights alive across
//! refreshes.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::feed::{AircraftReport, NumericField};
use crate::geo::Position;

/// Maximum number of historical positions kept per track.
pub const HISTORY_LIMIT: usize = 8;

/// Default number of consecutive absent reconciliations before a track is
/// evicted.
pub const DEFAULT_EVICTION_CYCLES: u32 = 5;

/// Persistent record of one aircraft's recent history and annotations.
#[derive(Debug, Clone)]
pub struct Track {
    /// Stable aircraft identifier, the store key.
    pub ident: String,
    /// Validated positions, newest last, at most [`HISTORY_LIMIT`] entries.
    pub history: VecDeque<Position>,
    /// Most recent valid report for this aircraft.
    pub latest: AircraftReport,
    /// Sticky highlight flag; survives full-set refreshes.
    pub highlighted: bool,
    /// Timestamp of the last reconciliation that included this aircraft.
    pub last_seen: DateTime<Utc>,
    /// Consecutive reconciliations this aircraft was absent from.
    missed_cycles: u32,
}

impl Track {
    fn new(ident: String) -> Self {
        Self {
            ident,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            latest: AircraftReport::default(),
            highlighted: false,
            last_seen: Utc::now(),
            missed_cycles: 0,
        }
    }

    fn push_position(&mut self, lat: f64, lon: f64) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(Position::new(lat, lon));
    }

    /// Latest known position.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.history.back().copied()
    }
}

/// A consistent read of store state for rendering.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Tracked aircraft, ordered by identifier.
    pub tracks: Vec<Track>,
    /// Valid reports from the current cycle that carried no identifier;
    /// rendered once and never retained.
    pub unidentified: Vec<AircraftReport>,
}

/// Configuration for the track store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Evict a track after this many consecutive absent reconciliations.
    pub eviction_cycles: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            eviction_cycles: DEFAULT_EVICTION_CYCLES,
        }
    }
}

/// Owns all per-aircraft track state.
///
/// Not internally synchronized: callers that share a store across threads
/// wrap it in a mutex so `reconcile`, `toggle_highlight`, and `snapshot`
/// exclude each other and no reader ever observes a half-applied batch.
#[derive(Debug)]
pub struct TrackStore {
    tracks: HashMap<String, Track>,
    unidentified: Vec<AircraftReport>,
    eviction_cycles: u32,
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl TrackStore {
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            tracks: HashMap::new(),
            unidentified: Vec::new(),
            eviction_cycles: config.eviction_cycles,
        }
    }

    /// Merge one fetched batch into existing track state.
    ///
    /// Called once per completed fetch cycle, never concurrently with
    /// itself. Individual malformed reports are dropped with a warning; the
    /// rest of the batch always goes through. Returns the post-merge
    /// snapshot.
    pub fn reconcile(&mut self, batch: Vec<AircraftReport>) -> Snapshot {
        self.unidentified.clear();

        let now = Utc::now();
        let mut seen: HashSet<String> = HashSet::with_capacity(batch.len());

        for mut report in batch {
            let (lat, lon) = match report.position() {
                Some(pos) => pos,
                None => {
                    warn!(
                        "dropping report for {:?}: lat {}, lon {}",
                        report.ident.as_deref().unwrap_or("unknown"),
                        describe_field(&report.lat),
                        describe_field(&report.lon),
                    );
                    continue;
                }
            };

            let Some(ident) = report.ident.clone() else {
                // Drawable this cycle, but no key to track it under
                self.unidentified.push(report);
                continue;
            };

            let track = self
                .tracks
                .entry(ident.clone())
                .or_insert_with(|| Track::new(ident.clone()));

            track.push_position(lat, lon);
            // The feed knows nothing about local annotations; re-attach the
            // sticky flag before the new report replaces the old one.
            report.highlighted = track.highlighted;
            track.latest = report;
            track.last_seen = now;
            track.missed_cycles = 0;
            seen.insert(ident);
        }

        // Aircraft absent from this batch keep their stale state for a few
        // cycles, then get evicted so the store doesn't grow forever.
        let eviction_cycles = self.eviction_cycles;
        self.tracks.retain(|ident, track| {
            if seen.contains(ident) {
                return true;
            }
            track.missed_cycles += 1;
            if track.missed_cycles >= eviction_cycles {
                info!("evicting track {ident} after {} absent cycles", track.missed_cycles);
                return false;
            }
            true
        });

        self.snapshot()
    }

    /// Flip the sticky highlight flag for a tracked identifier.
    ///
    /// Takes effect immediately and survives subsequent reconciliations.
    /// Returns the new value, or `None` for an unknown identifier.
    pub fn toggle_highlight(&mut self, ident: &str) -> Option<bool> {
        let track = self.tracks.get_mut(ident)?;
        track.highlighted = !track.highlighted;
        track.latest.highlighted = track.highlighted;
        Some(track.highlighted)
    }

    /// A consistent view of current state, ordered by identifier.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut tracks: Vec<Track> = self.tracks.values().cloned().collect();
        tracks.sort_unstable_by(|a, b| a.ident.cmp(&b.ident));
        Snapshot {
            tracks,
            unidentified: self.unidentified.clone(),
        }
    }

    /// Get a specific track by identifier.
    #[must_use]
    pub fn get(&self, ident: &str) -> Option<&Track> {
        self.tracks.get(ident)
    }

    /// Number of tracked aircraft.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

fn describe_field(field: &NumericField) -> &'static str {
    match field {
        NumericField::Number(_) => "ok",
        NumericField::Absent => "absent",
        NumericField::Invalid => "invalid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(ident: &str, lat: f64, lon: f64) -> AircraftReport {
        AircraftReport {
            ident: Some(ident.to_string()),
            lat: NumericField::Number(lat),
            lon: NumericField::Number(lon),
            ..Default::default()
        }
    }

    #[test]
    fn test_reconcile_creates_tracks() {
        let mut store = TrackStore::default();
        let snap = store.reconcile(vec![report("UAL123", 41.9, -87.9)]);

        assert_eq!(snap.tracks.len(), 1);
        assert_eq!(snap.tracks[0].ident, "UAL123");
        assert_eq!(snap.tracks[0].history.len(), 1);
        assert_eq!(snap.tracks[0].position(), Some(Position::new(41.9, -87.9)));
    }

    #[test]
    fn test_malformed_report_skipped_batch_continues() {
        let mut store = TrackStore::default();
        let broken = AircraftReport {
            ident: Some("BAD1".to_string()),
            lat: NumericField::Number(41.0),
            lon: NumericField::Invalid,
            ..Default::default()
        };

        let snap = store.reconcile(vec![broken, report("UAL123", 41.9, -87.9)]);
        assert_eq!(snap.tracks.len(), 1);
        assert_eq!(snap.tracks[0].ident, "UAL123");
    }

    #[test]
    fn test_unidentified_rendered_but_not_retained() {
        let mut store = TrackStore::default();
        let anon = AircraftReport {
            lat: NumericField::Number(41.0),
            lon: NumericField::Number(-87.0),
            ..Default::default()
        };

        let snap = store.reconcile(vec![anon]);
        assert!(snap.tracks.is_empty());
        assert_eq!(snap.unidentified.len(), 1);

        // Next cycle without it clears the transient list
        let snap = store.reconcile(vec![]);
        assert!(snap.unidentified.is_empty());
    }

    #[test]
    fn test_history_bounded_and_grows_one_per_cycle() {
        let mut store = TrackStore::default();

        for i in 0..20 {
            let snap = store.reconcile(vec![report("UAL123", 41.0 + f64::from(i) * 0.01, -87.9)]);
            assert!(snap.tracks[0].history.len() <= HISTORY_LIMIT);
            assert_eq!(snap.tracks[0].history.len(), usize::min(i as usize + 1, HISTORY_LIMIT));
        }

        let track = store.get("UAL123").unwrap();
        assert_eq!(track.history.len(), HISTORY_LIMIT);
        // Newest-last insertion order: the back holds the final update
        assert!((track.position().unwrap().lat - 41.19).abs() < 1e-9);
    }

    #[test]
    fn test_same_batch_twice_updates_latest_identically() {
        let mut store = TrackStore::default();
        let batch = vec![report("UAL123", 41.9, -87.9)];

        let first = store.reconcile(batch.clone());
        let second = store.reconcile(batch);

        assert_eq!(first.tracks[0].latest, second.tracks[0].latest);
        assert_eq!(second.tracks[0].history.len(), 2);
    }

    #[test]
    fn test_highlight_survives_reconcile() {
        let mut store = TrackStore::default();
        store.reconcile(vec![report("UAL123", 41.9, -87.9)]);

        assert_eq!(store.toggle_highlight("UAL123"), Some(true));

        let snap = store.reconcile(vec![report("UAL123", 41.91, -87.9)]);
        assert!(snap.tracks[0].highlighted);
        assert!(snap.tracks[0].latest.highlighted);

        assert_eq!(store.toggle_highlight("UAL123"), Some(false));
        assert_eq!(store.toggle_highlight("NOSUCH"), None);
    }

    #[test]
    fn test_highlight_survives_transient_absence() {
        let mut store = TrackStore::default();
        store.reconcile(vec![report("UAL123", 41.9, -87.9)]);
        store.toggle_highlight("UAL123");

        // Absent for one cycle, then back
        store.reconcile(vec![]);
        let snap = store.reconcile(vec![report("UAL123", 41.92, -87.9)]);
        assert!(snap.tracks[0].highlighted);
    }

    #[test]
    fn test_eviction_after_configured_cycles() {
        let mut store = TrackStore::new(StoreConfig { eviction_cycles: 3 });
        store.reconcile(vec![report("UAL123", 41.9, -87.9)]);

        store.reconcile(vec![]);
        store.reconcile(vec![]);
        assert_eq!(store.len(), 1, "still retained while stale");

        store.reconcile(vec![]);
        assert!(store.is_empty(), "evicted on the third absent cycle");
    }

    #[test]
    fn test_stale_track_not_updated_by_other_aircraft() {
        let mut store = TrackStore::default();
        store.reconcile(vec![report("UAL123", 41.9, -87.9)]);
        let snap = store.reconcile(vec![report("AAL45", 42.0, -88.0)]);

        assert_eq!(snap.tracks.len(), 2);
        let stale = snap.tracks.iter().find(|t| t.ident == "UAL123").unwrap();
        assert_eq!(stale.history.len(), 1);
    }
}
