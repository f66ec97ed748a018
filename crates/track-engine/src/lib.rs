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

//! Track engine for live aircraft feeds.
//!
//! This library turns a periodically polled HTTP aircraft feed into stable,
//! renderable track state. It is built from layers that can be used
//! independently or composed together:
//!
//! - **Feed layer**: loosely-typed feed records normalized into strongly
//!   typed [`AircraftReport`] values
//! - **Poller layer**: periodic fetching with an at-most-one-in-flight
//!   guarantee and graceful degradation on feed failure
//! - **Store layer**: per-aircraft bounded position history, sticky
//!   highlight flags, and full-set reconciliation
//! - **Geometry**: haversine distance, local planar projection with a range
//!   cutoff, dead-reckoning prediction, and an interactive pan/zoom view
//!   transform
//!
//! # Quick Start
//!
//! Use the [`Engine`] type for full-stack operation:
//!
//! ```no_run
//! use track_engine::{Engine, EngineConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = Engine::spawn(EngineConfig {
//!         center: (41.978611, -87.904724),
//!         radius_nm: 150,
//!         ..Default::default()
//!     })
//!     .expect("failed to start engine");
//!
//!     loop {
//!         for track in engine.snapshot().tracks {
//!             println!("{}: {:?}", track.ident, track.position());
//!         }
//!         tokio::time::sleep(Duration::from_secs(1)).await;
//!     }
//! }
//! ```
//!
//! # Using Individual Layers
//!
//! The store works without any async machinery:
//!
//! ```
//! use track_engine::feed::{AircraftReport, NumericField};
//! use track_engine::store::{StoreConfig, TrackStore};
//!
//! let mut store = TrackStore::new(StoreConfig::default());
//! store.reconcile(vec![AircraftReport {
//!     ident: Some("UAL123".to_string()),
//!     lat: NumericField::Number(41.9),
//!     lon: NumericField::Number(-87.9),
//!     ..Default::default()
//! }]);
//!
//! assert_eq!(store.len(), 1);
//! ```

pub mod feed;
pub mod geo;
pub mod overlay;
pub mod poller;
pub mod store;
pub mod view;

use std::sync::{Arc, Mutex};

pub use feed::{AircraftReport, FeedError, NumericField};
pub use geo::predict::predict_position;
pub use geo::{haversine_distance_m, GeoProjector, PlanarPoint, Position};
pub use overlay::{lines_from_feature_collection, OverlayLine};
pub use poller::{AdsbLolSource, FeedPoller, FeedSource, PollerConfig};
pub use store::{Snapshot, StoreConfig, Track, TrackStore};
pub use view::{ScreenPoint, ScreenVec, ViewTransform};

/// Configuration for the full-stack engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Feed query center as (lat, lon).
    pub center: (f64, f64),
    /// Feed query radius in nautical miles.
    pub radius_nm: u32,
    /// Poller configuration.
    pub poller: PollerConfig,
    /// Store configuration.
    pub store: StoreConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // O'Hare; the config layer overrides this per site
            center: (41.978611, -87.904724),
            radius_nm: 150,
            poller: PollerConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Full-stack track engine that wires the feed, poller, and store together.
///
/// Must be spawned from within a tokio runtime; the poll loop runs as a
/// background task until [`Engine::shutdown`] or drop.
#[derive(Debug)]
pub struct Engine {
    store: Arc<Mutex<TrackStore>>,
    poller: FeedPoller,
}

impl Engine {
    /// Spawn an engine polling the adsb.lol feed around the configured
    /// center.
    pub fn spawn(config: EngineConfig) -> Result<Self, FeedError> {
        let (lat, lon) = config.center;
        let source = Arc::new(AdsbLolSource::new(lat, lon, config.radius_nm)?);
        let store = Arc::new(Mutex::new(TrackStore::new(config.store)));
        let poller = FeedPoller::spawn(source, Arc::clone(&store), config.poller);

        Ok(Self { store, poller })
    }

    /// A consistent snapshot of current track state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.store
            .lock()
            .expect("track store lock poisoned - unrecoverable state")
            .snapshot()
    }

    /// Flip the sticky highlight flag for a tracked identifier.
    pub fn toggle_highlight(&self, ident: &str) -> Option<bool> {
        self.store
            .lock()
            .expect("track store lock poisoned - unrecoverable state")
            .toggle_highlight(ident)
    }

    /// Number of tracked aircraft.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.store
            .lock()
            .expect("track store lock poisoned - unrecoverable state")
            .len()
    }

    /// Stop the poll loop.
    pub fn shutdown(&self) {
        self.poller.shutdown();
    }
}
