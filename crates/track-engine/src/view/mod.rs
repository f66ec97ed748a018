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

//! Pan/zoom view transform from planar to screen coordinates.
//!
//! Owned and mutated by the input-handling side only; rendering reads it.
//! Screen Y grows downward while geographic north is up, so the Y axis is
//! inverted in [`ViewTransform::to_screen`].

use crate::geo::PlanarPoint;

/// Wheel-step zoom factor, zooming in.
pub const ZOOM_IN_STEP: f64 = 1.1;
/// Wheel-step zoom factor, zooming out.
pub const ZOOM_OUT_STEP: f64 = 0.9;
/// Accelerated zoom-in factor (modifier key held).
pub const FAST_ZOOM_IN_STEP: f64 = 1.7;
/// Accelerated zoom-out factor (modifier key held).
pub const FAST_ZOOM_OUT_STEP: f64 = 0.5;

/// A point in screen space, in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A displacement in screen space, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenVec {
    pub x: f64,
    pub y: f64,
}

impl ScreenVec {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Interactive pan/zoom state mapping planar offsets onto the screen.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    /// Zoom scale factor, strictly positive.
    scale: f64,
    /// Accumulated pan offset in pixels.
    offset: ScreenVec,
    /// Screen-space radar center.
    origin: ScreenPoint,
}

impl ViewTransform {
    /// Create a transform with the given initial scale, centered at `origin`.
    #[must_use]
    pub fn new(scale: f64, origin: ScreenPoint) -> Self {
        debug_assert!(scale > 0.0);
        Self {
            scale,
            offset: ScreenVec::default(),
            origin,
        }
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn offset(&self) -> ScreenVec {
        self.offset
    }

    /// Move the screen-space radar center, e.g. after a window resize.
    pub fn set_origin(&mut self, origin: ScreenPoint) {
        self.origin = origin;
    }

    /// Map a planar point to screen coordinates.
    #[must_use]
    pub fn to_screen(&self, point: PlanarPoint) -> ScreenPoint {
        ScreenPoint {
            x: self.origin.x + point.x * self.scale + self.offset.x,
            y: self.origin.y - point.y * self.scale + self.offset.y,
        }
    }

    /// Apply a drag delta. Called continuously while a drag is active.
    pub fn pan(&mut self, delta: ScreenVec) {
        self.offset.x += delta.x;
        self.offset.y += delta.y;
    }

    /// Multiply the scale by `factor`, keeping the world point under
    /// `cursor` fixed on screen.
    ///
    /// With `r` the cursor position relative to the content before zooming,
    /// re-solving the screen equation after rescaling gives
    /// `offset -= r * (factor - 1)`. Zooming around the origin instead of
    /// the cursor makes the content slide out from under the pointer.
    pub fn zoom_at(&mut self, cursor: ScreenPoint, factor: f64) {
        debug_assert!(factor > 0.0);

        let r_x = cursor.x - self.origin.x - self.offset.x;
        let r_y = cursor.y - self.origin.y - self.offset.y;

        self.scale *= factor;

        self.offset.x -= r_x * (factor - 1.0);
        self.offset.y -= r_y * (factor - 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::PlanarPoint;

    fn transform() -> ViewTransform {
        ViewTransform::new(1.0, ScreenPoint::new(400.0, 300.0))
    }

    #[test]
    fn test_to_screen_inverts_y() {
        let view = transform();
        let north = view.to_screen(PlanarPoint { x: 0.0, y: 10.0 });
        // North of center lands above center on screen
        assert!((north.x - 400.0).abs() < 1e-9);
        assert!((north.y - 290.0).abs() < 1e-9);
    }

    #[test]
    fn test_pan_accumulates() {
        let mut view = transform();
        view.pan(ScreenVec::new(5.0, -3.0));
        view.pan(ScreenVec::new(2.0, 1.0));
        assert_eq!(view.offset(), ScreenVec::new(7.0, -2.0));

        let p = view.to_screen(PlanarPoint { x: 0.0, y: 0.0 });
        assert_eq!(p, ScreenPoint::new(407.0, 298.0));
    }

    #[test]
    fn test_zoom_direction() {
        let mut view = transform();
        view.zoom_at(ScreenPoint::new(400.0, 300.0), ZOOM_IN_STEP);
        assert!(view.scale() > 1.0);
        view.zoom_at(ScreenPoint::new(400.0, 300.0), ZOOM_OUT_STEP);
        view.zoom_at(ScreenPoint::new(400.0, 300.0), ZOOM_OUT_STEP);
        assert!(view.scale() < 1.1);
    }

    #[test]
    fn test_zoom_at_keeps_cursor_point_fixed() {
        // For a spread of scale/offset/factor combinations, the world point
        // under the cursor must stay under the cursor after zooming.
        let cases = [
            (1.0, (0.0, 0.0), 1.1),
            (1.0, (0.0, 0.0), 0.9),
            (2.5, (120.0, -40.0), 1.7),
            (0.3, (-76.0, 210.0), 0.5),
            (8.0, (9.0, 9.0), 0.9),
        ];

        for (scale, (off_x, off_y), factor) in cases {
            let mut view = ViewTransform::new(scale, ScreenPoint::new(400.0, 300.0));
            view.pan(ScreenVec::new(off_x, off_y));

            let cursor = ScreenPoint::new(531.0, 188.0);

            // Invert to find the planar point currently under the cursor
            let world = PlanarPoint {
                x: (cursor.x - 400.0 - view.offset().x) / view.scale(),
                y: -(cursor.y - 300.0 - view.offset().y) / view.scale(),
            };

            view.zoom_at(cursor, factor);
            let after = view.to_screen(world);

            assert!(
                (after.x - cursor.x).abs() < 1e-6 && (after.y - cursor.y).abs() < 1e-6,
                "cursor drifted: scale={scale} factor={factor} got ({}, {})",
                after.x,
                after.y
            );
        }
    }
}
