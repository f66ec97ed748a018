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

mod config;

use std::str::FromStr;

use clap::Parser;
use eframe::egui;
use log::{error, info, warn};

use config::{AppConfig, SiteConfig};
use track_engine::view::{
    FAST_ZOOM_IN_STEP, FAST_ZOOM_OUT_STEP, ZOOM_IN_STEP, ZOOM_OUT_STEP,
};
use track_engine::{
    lines_from_feature_collection, predict_position, Engine, EngineConfig, GeoProjector,
    OverlayLine, PollerConfig, ScreenPoint, ScreenVec, Snapshot, StoreConfig, Track,
    ViewTransform,
};

/// Pixel radius for resolving a click to an aircraft.
const SELECT_RADIUS_PX: f64 = 15.0;

/// Leader line length in pixels.
const LEADER_LENGTH_PX: f32 = 20.0;

/// Range ring spacing in planar pixels at unit scale.
const RANGE_RING_SPACING_PX: f64 = 80.0;

#[derive(Parser, Debug)]
#[command(name = "radarview", about = "Radar-style live aircraft display", version)]
struct Args {
    /// Site to display (defaults to the configured default site)
    #[arg(long)]
    site: Option<String>,

    /// List configured sites and exit
    #[arg(long)]
    list_sites: bool,

    /// Override the feed poll interval in seconds
    #[arg(long)]
    interval: Option<u64>,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    let args = Args::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if args.list_sites {
        for site in &config.sites {
            println!(
                "{}  ({:.4}, {:.4})",
                site.name, site.center_lat, site.center_lon
            );
        }
        return Ok(());
    }

    let site_name = args.site.as_deref().unwrap_or(&config.default_site);
    let Some(site) = config.get_site(site_name).cloned() else {
        eprintln!("Site {site_name} not found in configuration");
        std::process::exit(1);
    };

    let mut config = config;
    if let Some(interval) = args.interval {
        config.poll_interval_secs = interval;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title(format!("RadarView :: {}", site.name)),
        ..Default::default()
    };

    eframe::run_native(
        "RadarView",
        options,
        Box::new(move |_cc| Ok(Box::new(RadarApp::new(&config, site)))),
    )
}

struct RadarApp {
    engine: Engine,
    // Dropping the runtime would kill the poll loop with it
    _runtime: tokio::runtime::Runtime,
    projector: GeoProjector,
    view: ViewTransform,
    overlay: Vec<OverlayLine>,
    site_name: String,
    altitude_ceiling_ft: i32,
    prediction_horizon_secs: f64,
}

impl RadarApp {
    fn new(config: &AppConfig, site: SiteConfig) -> Self {
        info!("Starting RadarView for site {}", site.name);

        let overlay = site
            .overlay_file
            .as_ref()
            .map(|path| load_overlay(path))
            .unwrap_or_default();

        let runtime = tokio::runtime::Runtime::new()
            .expect("failed to start tokio runtime - unrecoverable state");

        let engine = {
            let _guard = runtime.enter();
            Engine::spawn(EngineConfig {
                center: (site.center_lat, site.center_lon),
                radius_nm: config.feed_radius_nm,
                poller: PollerConfig {
                    interval: std::time::Duration::from_secs(config.poll_interval_secs),
                },
                store: StoreConfig::default(),
            })
            .expect("failed to start track engine - unrecoverable state")
        };

        Self {
            engine,
            _runtime: runtime,
            projector: GeoProjector::new(site.center_lat, site.center_lon)
                .with_scale(site.scale_px_per_deg),
            view: ViewTransform::new(config.default_view_scale, ScreenPoint::new(0.0, 0.0)),
            overlay,
            site_name: site.name,
            altitude_ceiling_ft: config.altitude_ceiling_ft,
            prediction_horizon_secs: config.prediction_horizon_secs,
        }
    }

    /// Project a lat/lon pair all the way to screen space. `None` means
    /// out of range: skip drawing.
    fn to_screen(&self, lat: f64, lon: f64) -> Option<egui::Pos2> {
        let planar = self.projector.project(lat, lon)?;
        let screen = self.view.to_screen(planar);
        Some(egui::pos2(screen.x as f32, screen.y as f32))
    }

    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response, snapshot: &Snapshot) {
        if response.dragged() {
            let delta = response.drag_delta();
            self.view
                .pan(ScreenVec::new(f64::from(delta.x), f64::from(delta.y)));
        }

        let (scroll_y, fast) = ui
            .ctx()
            .input(|i| (i.raw_scroll_delta.y, i.modifiers.ctrl));
        if scroll_y.abs() > 0.0 {
            if let Some(hover) = response.hover_pos() {
                let factor = match (scroll_y > 0.0, fast) {
                    (true, false) => ZOOM_IN_STEP,
                    (false, false) => ZOOM_OUT_STEP,
                    (true, true) => FAST_ZOOM_IN_STEP,
                    (false, true) => FAST_ZOOM_OUT_STEP,
                };
                self.view.zoom_at(
                    ScreenPoint::new(f64::from(hover.x), f64::from(hover.y)),
                    factor,
                );
            }
        }

        if response.clicked() {
            if let Some(click) = response.interact_pointer_pos() {
                if let Some(ident) = self.nearest_track_within(snapshot, click, SELECT_RADIUS_PX) {
                    let highlighted = self.engine.toggle_highlight(&ident);
                    info!("highlight {ident}: {highlighted:?}");
                }
            }
        }

        if ui.ctx().input(|i| i.key_pressed(egui::Key::F11)) {
            let fullscreen = ui
                .ctx()
                .input(|i| i.viewport().fullscreen.unwrap_or(false));
            ui.ctx()
                .send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
        }
    }

    /// Resolve a click position to the nearest visible track within
    /// `radius_px`.
    fn nearest_track_within(
        &self,
        snapshot: &Snapshot,
        click: egui::Pos2,
        radius_px: f64,
    ) -> Option<String> {
        let mut best: Option<(f64, &Track)> = None;

        for track in &snapshot.tracks {
            let Some(position) = track.position() else {
                continue;
            };
            let Some(pos) = self.to_screen(position.lat, position.lon) else {
                continue;
            };
            let dist_sq =
                f64::from(click.x - pos.x).powi(2) + f64::from(click.y - pos.y).powi(2);
            if dist_sq <= radius_px * radius_px
                && best.map_or(true, |(d, _)| dist_sq < d)
            {
                best = Some((dist_sq, track));
            }
        }

        best.map(|(_, track)| track.ident.clone())
    }

    fn draw_range_rings(&self, painter: &egui::Painter) {
        let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 60, 60));
        let center = self
            .view
            .to_screen(track_engine::PlanarPoint { x: 0.0, y: 0.0 });
        let center = egui::pos2(center.x as f32, center.y as f32);

        for i in 1..=9 {
            let radius = (f64::from(i) * RANGE_RING_SPACING_PX * self.view.scale()) as f32;
            painter.circle_stroke(center, radius, stroke);
        }
    }

    fn draw_overlay(&self, painter: &egui::Painter) {
        let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(255, 255, 255, 127));

        for line in &self.overlay {
            for pair in line.points.windows(2) {
                // Skip segments with an out-of-range endpoint
                let (Some(start), Some(end)) = (
                    self.to_screen(pair[0].lat, pair[0].lon),
                    self.to_screen(pair[1].lat, pair[1].lon),
                ) else {
                    continue;
                };
                painter.line_segment([start, end], stroke);
            }
        }
    }

    fn draw_trail(&self, painter: &egui::Painter, track: &Track) {
        // Newest first so the fade marches backward along the trail
        for (i, point) in track.history.iter().rev().enumerate().skip(1) {
            let Some(pos) = self.to_screen(point.lat, point.lon) else {
                continue;
            };
            let alpha = 255_i32.saturating_sub(i as i32 * 30).max(50) as u8;
            let color = egui::Color32::from_rgba_unmultiplied(27, 110, 224, alpha);
            painter.circle_filled(pos, 4.0, color);
        }
    }

    fn draw_track(&self, painter: &egui::Painter, track: &Track) {
        let report = &track.latest;

        let Some(position) = track.position() else {
            return;
        };
        let Some(pos) = self.to_screen(position.lat, position.lon) else {
            return;
        };

        self.draw_trail(painter, track);

        let color = if report.emergency {
            egui::Color32::from_rgb(255, 60, 60)
        } else if track.highlighted {
            egui::Color32::from_rgb(255, 200, 50)
        } else {
            egui::Color32::from_rgb(31, 122, 255)
        };

        // Dead-reckoned lead line from the present position
        if let (Some(track_deg), Some(gs)) = (report.track, report.ground_speed) {
            let predicted = predict_position(
                position.lat,
                position.lon,
                track_deg,
                gs,
                self.prediction_horizon_secs,
            );
            if let Some(lead) = self.to_screen(predicted.lat, predicted.lon) {
                painter.line_segment([pos, lead], egui::Stroke::new(1.0, color));
            }
        }

        painter.circle_filled(pos, 5.0, color);

        // Sector letter inside the dot
        let sector = assign_sector(report.altitude.unwrap_or(0));
        painter.text(
            pos,
            egui::Align2::CENTER_CENTER,
            sector,
            egui::FontId::monospace(7.0),
            egui::Color32::BLACK,
        );

        // Leader line up to the data block
        let leader_end = pos + egui::vec2(0.0, -LEADER_LENGTH_PX);
        painter.line_segment([pos, leader_end], egui::Stroke::new(1.0, egui::Color32::WHITE));

        let alt_hundreds = report.altitude.unwrap_or(0) / 100;
        let speed = report.ground_speed.unwrap_or(0.0) as i32;
        painter.text(
            leader_end + egui::vec2(5.0, -5.0),
            egui::Align2::LEFT_BOTTOM,
            &track.ident,
            egui::FontId::monospace(11.0),
            egui::Color32::WHITE,
        );
        painter.text(
            leader_end + egui::vec2(5.0, 10.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{alt_hundreds:03} {speed}"),
            egui::FontId::monospace(11.0),
            egui::Color32::WHITE,
        );
    }

    fn draw_radar(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), ui.available_height()),
            egui::Sense::click_and_drag(),
        );

        let rect = response.rect;
        painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

        // The radar center tracks the window center across resizes;
        // pan/zoom state persists independently of it
        let center = rect.center();
        self.view
            .set_origin(ScreenPoint::new(f64::from(center.x), f64::from(center.y)));

        let snapshot = self.engine.snapshot();
        self.handle_input(ui, &response, &snapshot);

        self.draw_range_rings(&painter);
        self.draw_overlay(&painter);

        for track in &snapshot.tracks {
            if track.latest.altitude.unwrap_or(0) > self.altitude_ceiling_ft {
                continue;
            }
            self.draw_track(&painter, track);
        }

        // Unidentified reports are drawn for this cycle only: dot and data
        // block, no trail, nothing to click
        for report in &snapshot.unidentified {
            let Some((lat, lon)) = report.position() else {
                continue;
            };
            if report.altitude.unwrap_or(0) > self.altitude_ceiling_ft {
                continue;
            }
            let Some(pos) = self.to_screen(lat, lon) else {
                continue;
            };
            painter.circle_filled(pos, 4.0, egui::Color32::from_rgb(120, 120, 140));
            painter.text(
                pos + egui::vec2(8.0, 0.0),
                egui::Align2::LEFT_CENTER,
                format!(
                    "{:03} {}",
                    report.altitude.unwrap_or(0) / 100,
                    report.ground_speed.unwrap_or(0.0) as i32
                ),
                egui::FontId::monospace(10.0),
                egui::Color32::from_rgb(150, 150, 150),
            );
        }

        painter.text(
            rect.left_top() + egui::vec2(10.0, 10.0),
            egui::Align2::LEFT_TOP,
            format!(
                "{} | {} tracks | {}",
                self.site_name,
                snapshot.tracks.len(),
                chrono::Utc::now().format("%H:%M:%SZ")
            ),
            egui::FontId::monospace(12.0),
            egui::Color32::from_rgb(100, 200, 100),
        );
        painter.text(
            rect.left_bottom() + egui::vec2(10.0, -10.0),
            egui::Align2::LEFT_BOTTOM,
            "Drag to pan | Scroll to zoom (Ctrl = fast) | Click to highlight",
            egui::FontId::proportional(11.0),
            egui::Color32::from_rgb(120, 120, 120),
        );
    }
}

impl eframe::App for RadarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Repaint on a timer so fresh fetch cycles show up promptly
        ctx.request_repaint_after(std::time::Duration::from_millis(500));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_radar(ui);
        });
    }
}

/// Assign a sector letter by altitude band.
fn assign_sector(altitude_ft: i32) -> &'static str {
    match altitude_ft {
        i32::MIN..=9_999 => "F",
        10_000..=19_999 => "V",
        20_000..=29_999 => "A",
        _ => "H",
    }
}

/// Load overlay lines from a GeoJSON file. A missing or unparseable file
/// degrades to an empty overlay rather than aborting startup.
fn load_overlay(path: &std::path::Path) -> Vec<OverlayLine> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            error!("failed to read overlay file {}: {e}", path.display());
            return Vec::new();
        }
    };

    match geojson::FeatureCollection::from_str(&contents) {
        Ok(collection) => {
            let lines = lines_from_feature_collection(&collection);
            info!("loaded {} overlay lines from {}", lines.len(), path.display());
            lines
        }
        Err(e) => {
            warn!("overlay file {} is not valid GeoJSON: {e}", path.display());
            Vec::new()
        }
    }
}
