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

//! Periodic feed polling.
//!
//! One timer drives fetch attempts; the fetch itself runs in its own task so
//! it never blocks the poll loop or the UI. The poller is a two-state
//! machine (`Idle` / `Fetching`): a timer tick while a fetch is in flight is
//! dropped, so a slow feed can never pile up duplicate requests. Every
//! completed cycle, successful or not, ends in exactly one
//! [`TrackStore::reconcile`] call, with failures degrading to an empty batch.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::feed::adsblol;
use crate::feed::{AircraftReport, FeedError};
use crate::store::TrackStore;

/// Source of normalized aircraft report batches.
///
/// The seam between scheduling and transport: production code uses
/// [`AdsbLolSource`], tests substitute their own.
pub trait FeedSource: Send + Sync + 'static {
    /// Fetch one batch of reports.
    fn fetch(&self) -> impl std::future::Future<Output = Result<Vec<AircraftReport>, FeedError>> + Send;
}

/// Configuration for the feed poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between fetch attempts.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// HTTP source for the adsb.lol v2 point-radius endpoint.
#[derive(Debug, Clone)]
pub struct AdsbLolSource {
    client: reqwest::Client,
    url: String,
}

impl AdsbLolSource {
    /// Default per-request timeout.
    ///
    /// Without one, a hung fetch would leave the poller in `Fetching`
    /// forever and silently stop all future polling.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a source for the given center and radius in nautical miles.
    pub fn new(center_lat: f64, center_lon: f64, radius_nm: u32) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()?;
        let url = format!("https://api.adsb.lol/v2/lat/{center_lat}/lon/{center_lon}/dist/{radius_nm}");
        Ok(Self { client, url })
    }
}

impl FeedSource for AdsbLolSource {
    async fn fetch(&self) -> Result<Vec<AircraftReport>, FeedError> {
        debug!("fetching {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let body = response.bytes().await?;
        let reports = adsblol::parse_payload(&body)?;

        // The display is airborne-only; the feed marks surface traffic
        Ok(reports.into_iter().filter(|r| !r.on_ground).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollerState {
    Idle,
    Fetching,
}

/// Handle to a running poll loop.
///
/// The loop runs in a background task until the handle is shut down or
/// dropped, feeding every cycle's batch into the shared store.
#[derive(Debug)]
pub struct FeedPoller {
    cancel_token: CancellationToken,
}

impl FeedPoller {
    /// Spawn the poll loop against the given source and store.
    #[must_use]
    pub fn spawn<S: FeedSource>(
        source: Arc<S>,
        store: Arc<Mutex<TrackStore>>,
        config: PollerConfig,
    ) -> Self {
        let cancel_token = CancellationToken::new();
        let task_cancel = cancel_token.clone();

        tokio::spawn(async move {
            poll_loop(source, store, config, task_cancel).await;
        });

        Self { cancel_token }
    }

    /// Stop the poll loop.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for FeedPoller {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn poll_loop<S: FeedSource>(
    source: Arc<S>,
    store: Arc<Mutex<TrackStore>>,
    config: PollerConfig,
    cancel_token: CancellationToken,
) {
    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let (result_tx, mut result_rx) = mpsc::channel::<Result<Vec<AircraftReport>, FeedError>>(1);
    let mut state = PollerState::Idle;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if state == PollerState::Fetching {
                    debug!("fetch still in flight, skipping tick");
                    continue;
                }
                state = PollerState::Fetching;

                let task_source = Arc::clone(&source);
                let tx = result_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(task_source.fetch().await).await;
                });
            }

            Some(result) = result_rx.recv() => {
                state = PollerState::Idle;

                let batch = match result {
                    Ok(batch) => batch,
                    Err(e) => {
                        // A bad cycle still reconciles, as an empty set
                        warn!("feed fetch failed: {e}");
                        Vec::new()
                    }
                };

                store
                    .lock()
                    .expect("track store lock poisoned - unrecoverable state")
                    .reconcile(batch);
            }

            () = cancel_token.cancelled() => {
                info!("feed poller cancelled");
                return;
            }
        }
    }
}
