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

//! Application configuration management.
//!
//! Persistent TOML configuration via confy: a table of radar sites (terminal
//! areas with their own center, display scale, and overlay geometry) plus
//! feed and display preferences.

use serde::{Deserialize, Serialize};

/// One radar site: a named center with display and overlay settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SiteConfig {
    /// Display name, also the selection key (e.g. "C90").
    pub name: String,

    /// Radar center latitude in degrees.
    pub center_lat: f64,

    /// Radar center longitude in degrees.
    pub center_lon: f64,

    /// Projection scale in pixels per degree of latitude.
    #[serde(default = "default_projection_scale")]
    pub scale_px_per_deg: f64,

    /// Path to a GeoJSON file with boundary LineStrings, if any.
    #[serde(default)]
    pub overlay_file: Option<std::path::PathBuf>,
}

impl SiteConfig {
    /// The default site: Chicago TRACON, centered on O'Hare.
    pub fn default_c90() -> Self {
        Self {
            name: "C90".to_string(),
            center_lat: 41.978611,
            center_lon: -87.904724,
            scale_px_per_deg: default_projection_scale(),
            overlay_file: None,
        }
    }
}

/// Application configuration stored in TOML format.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version for migrations.
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Configured radar sites.
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteConfig>,

    /// Site selected when no --site argument is given.
    #[serde(default = "default_site_name")]
    pub default_site: String,

    /// Feed poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Feed query radius in nautical miles.
    #[serde(default = "default_feed_radius")]
    pub feed_radius_nm: u32,

    /// Hide aircraft above this barometric altitude in feet.
    #[serde(default = "default_altitude_ceiling")]
    pub altitude_ceiling_ft: i32,

    /// Dead-reckoning lead line horizon in seconds.
    #[serde(default = "default_prediction_horizon")]
    pub prediction_horizon_secs: f64,

    /// Initial view zoom scale.
    #[serde(default = "default_view_scale")]
    pub default_view_scale: f64,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_sites() -> Vec<SiteConfig> {
    vec![SiteConfig::default_c90()]
}

fn default_site_name() -> String {
    "C90".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_feed_radius() -> u32 {
    150
}

fn default_altitude_ceiling() -> i32 {
    18_000
}

fn default_prediction_horizon() -> f64 {
    60.0
}

fn default_projection_scale() -> f64 {
    800.0
}

fn default_view_scale() -> f64 {
    1.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            sites: default_sites(),
            default_site: default_site_name(),
            poll_interval_secs: default_poll_interval(),
            feed_radius_nm: default_feed_radius(),
            altitude_ceiling_ft: default_altitude_ceiling(),
            prediction_horizon_secs: default_prediction_horizon(),
            default_view_scale: default_view_scale(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating the default on first run.
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("radarview-desktop", "config")
    }

    /// Save configuration to disk.
    #[allow(dead_code)]
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store("radarview-desktop", "config", self)
    }

    /// Get a site by name.
    pub fn get_site(&self, name: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|s| s.name == name)
    }
}
