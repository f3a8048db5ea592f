//! Pan/zoom state for the wall canvas.
//!
//! The controller exclusively owns the viewport transform. Pointer events
//! and zoom actions mutate it directly; everything downstream reads an
//! immutable [`ViewportState`] snapshot once per render pass.

use common::geometry::BoundingBox;
use glam::Vec2;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Tuning knobs for the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Multiplicative factor applied per zoom-in step.
    pub zoom_step: f32,
    /// Pointer travel (in screen pixels) below which a gesture still counts
    /// as a click rather than a pan.
    pub drag_threshold: f32,
    /// Screen-pixel margin kept around the content by `zoom_to_fit`.
    pub fit_margin: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            min_scale: 0.1,
            max_scale: 10.0,
            zoom_step: 1.25,
            drag_threshold: 4.0,
            fit_margin: 48.0,
        }
    }
}

/// Immutable snapshot of the viewport transform, taken once per render pass.
///
/// Screen and world space are related by `screen = world * scale + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub pan: Vec2,
    pub scale: f32,
}

impl ViewportState {
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.pan
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan) / self.scale
    }
}

/// An in-progress pan gesture. Discarded on pointer-up.
#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    /// Last pointer position seen; pan deltas are taken against this rather
    /// than the drag start to avoid drift accumulation.
    last: Vec2,
    /// Total pointer travel so far, for click disambiguation.
    moved: f32,
}

/// Translates raw pointer events into a pan/zoom transform.
///
/// The gesture state machine has two states, idle and dragging. Out-of-order
/// pointer events (an up without a down, a move while idle) are absorbed as
/// no-ops; they never propagate errors to the shell.
pub struct ViewportController {
    config: ViewportConfig,
    pan: Vec2,
    scale: f32,
    viewport_size: Vec2,
    drag: Option<ActiveDrag>,
    last_gesture_was_drag: bool,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        ViewportController {
            config,
            pan: Vec2::ZERO,
            scale: 1.0,
            viewport_size: Vec2::ZERO,
            drag: None,
            last_gesture_was_drag: false,
        }
    }

    /// Updates the measured viewport dimensions (on mount and resize).
    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport_size = size;
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Current zoom level as a rounded percentage.
    pub fn percent(&self) -> i32 {
        (self.scale * 100.0).round() as i32
    }

    pub fn snapshot(&self) -> ViewportState {
        ViewportState {
            pan: self.pan,
            scale: self.scale,
        }
    }

    /// Begins a drag. A second pointer-down while already dragging is
    /// tolerated as a no-op.
    pub fn pointer_down(&mut self, screen: Vec2) {
        if self.drag.is_none() {
            self.drag = Some(ActiveDrag {
                last: screen,
                moved: 0.0,
            });
        }
    }

    /// Applies the delta since the previous pointer event to the pan.
    pub fn pointer_move(&mut self, screen: Vec2) {
        if let Some(drag) = &mut self.drag {
            let delta = screen - drag.last;
            drag.last = screen;
            drag.moved += delta.length();
            self.pan += delta;
        }
    }

    /// Ends the gesture and records whether it was a drag or a click.
    pub fn pointer_up(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.last_gesture_was_drag = drag.moved > self.config.drag_threshold;
            trace!(
                "gesture ended: moved {:.1}px, drag = {}",
                drag.moved,
                self.last_gesture_was_drag
            );
        }
    }

    /// Treated like pointer-up; a cancelled gesture never becomes a click.
    pub fn pointer_cancel(&mut self) {
        self.pointer_up();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// True when the most recently completed gesture moved beyond the drag
    /// threshold. Click handlers consult this to suppress clicks that were
    /// really the tail end of a pan.
    pub fn was_dragging(&self) -> bool {
        self.last_gesture_was_drag
    }

    pub fn zoom_in(&mut self) {
        self.set_scale_anchored(self.scale * self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale_anchored(self.scale / self.config.zoom_step);
    }

    pub fn zoom_to_100(&mut self) {
        self.set_scale_anchored(1.0);
    }

    /// Picks the scale and pan that fit `bounds` within the viewport, with
    /// the configured margin. A no-op until the viewport has been measured.
    pub fn zoom_to_fit(&mut self, bounds: &BoundingBox) {
        if self.viewport_size.x <= 0.0 || self.viewport_size.y <= 0.0 {
            return;
        }

        let available =
            (self.viewport_size - Vec2::splat(self.config.fit_margin * 2.0)).max(Vec2::ONE);
        let scale = if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            1.0
        } else {
            (available.x / bounds.width()).min(available.y / bounds.height())
        };

        self.scale = scale.clamp(self.config.min_scale, self.config.max_scale);
        self.pan = self.viewport_size / 2.0 - bounds.center() * self.scale;
        debug!(
            "zoom_to_fit: scale {:.2}, pan ({:.0}, {:.0})",
            self.scale, self.pan.x, self.pan.y
        );
    }

    /// Sets the scale, clamped, keeping the world point under the viewport
    /// center fixed.
    fn set_scale_anchored(&mut self, target: f32) {
        let new_scale = target.clamp(self.config.min_scale, self.config.max_scale);
        let center = self.viewport_size / 2.0;
        let world_center = (center - self.pan) / self.scale;

        self.scale = new_scale;
        self.pan = center - world_center * new_scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::geometry::bbox;
    use glam::vec2;

    fn controller() -> ViewportController {
        let mut vp = ViewportController::default();
        vp.set_viewport_size(vec2(800.0, 600.0));
        vp
    }

    #[test]
    fn test_pan_accumulates_move_deltas() {
        let mut vp = controller();

        vp.pointer_down(vec2(10.0, 10.0));
        vp.pointer_move(vec2(20.0, 15.0));
        vp.pointer_move(vec2(25.0, 15.0));
        vp.pointer_up();

        assert_eq!(vp.pan(), vec2(15.0, 5.0));
    }

    #[test]
    fn test_drag_vs_click_disambiguation() {
        let mut vp = controller();

        // A real pan
        vp.pointer_down(vec2(0.0, 0.0));
        vp.pointer_move(vec2(30.0, 0.0));
        vp.pointer_up();
        assert!(vp.was_dragging());

        // A clean click
        vp.pointer_down(vec2(5.0, 5.0));
        vp.pointer_up();
        assert!(!vp.was_dragging());

        // A wiggle below the threshold still counts as a click
        vp.pointer_down(vec2(0.0, 0.0));
        vp.pointer_move(vec2(2.0, 0.0));
        vp.pointer_up();
        assert!(!vp.was_dragging());
    }

    #[test]
    fn test_orphan_pointer_events_are_noops() {
        let mut vp = controller();

        vp.pointer_move(vec2(50.0, 50.0));
        vp.pointer_up();
        vp.pointer_cancel();

        assert_eq!(vp.pan(), Vec2::ZERO);
        assert!(!vp.is_dragging());
        assert!(!vp.was_dragging());
    }

    #[test]
    fn test_duplicate_pointer_down_keeps_gesture() {
        let mut vp = controller();

        vp.pointer_down(vec2(0.0, 0.0));
        vp.pointer_down(vec2(100.0, 100.0)); // Ignored
        vp.pointer_move(vec2(10.0, 0.0));

        assert_eq!(vp.pan(), vec2(10.0, 0.0));
    }

    #[test]
    fn test_scale_clamping() {
        let mut vp = controller();

        for _ in 0..100 {
            vp.zoom_in();
        }
        assert_eq!(vp.scale(), 10.0);

        for _ in 0..100 {
            vp.zoom_out();
        }
        assert_eq!(vp.scale(), 0.1);
    }

    #[test]
    fn test_zoom_to_100_is_exact() {
        let mut vp = controller();
        vp.zoom_in();
        vp.zoom_in();
        vp.zoom_to_100();
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.percent(), 100);
    }

    #[test]
    fn test_zoom_anchors_at_viewport_center() {
        let mut vp = controller();
        vp.pointer_down(vec2(0.0, 0.0));
        vp.pointer_move(vec2(120.0, -40.0));
        vp.pointer_up();

        let center = vec2(400.0, 300.0);
        let world_center = vp.snapshot().screen_to_world(center);

        vp.zoom_in();
        let after = vp.snapshot().world_to_screen(world_center);
        assert!(after.distance(center) < 1e-3);

        vp.zoom_out();
        vp.zoom_out();
        let after = vp.snapshot().world_to_screen(world_center);
        assert!(after.distance(center) < 1e-3);
    }

    #[test]
    fn test_percent_tracks_zoom_step() {
        let mut vp = controller();
        assert_eq!(vp.percent(), 100);
        vp.zoom_in();
        assert_eq!(vp.percent(), 125);
    }

    #[test]
    fn test_zoom_to_fit_contains_bounds() {
        let mut vp = controller();
        let bounds = bbox(vec2(-2000.0, -1500.0), vec2(2000.0, 1500.0));

        vp.zoom_to_fit(&bounds);
        let state = vp.snapshot();

        let top_left = state.world_to_screen(bounds.min());
        let bottom_right = state.world_to_screen(bounds.max());
        assert!(top_left.x >= 0.0 && top_left.y >= 0.0);
        assert!(bottom_right.x <= 800.0 && bottom_right.y <= 600.0);
    }

    #[test]
    fn test_zoom_to_fit_before_measurement_is_noop() {
        let mut vp = ViewportController::default();
        let before = vp.snapshot();
        vp.zoom_to_fit(&bbox(vec2(0.0, 0.0), vec2(100.0, 100.0)));
        assert_eq!(vp.snapshot(), before);
    }

    #[test]
    fn test_roundtrip_world_screen() {
        let state = ViewportState {
            pan: vec2(37.0, -12.0),
            scale: 1.5,
        };
        let world = vec2(125.0, 185.0);
        let screen = state.world_to_screen(world);
        assert_eq!(screen, vec2(224.5, 265.5));
        assert!(state.screen_to_world(screen).distance(world) < 1e-4);
    }
}
