//! Interactive canvas core for signature walls.
//!
//! Visitors' signatures are laid out as spatially arranged elements on a
//! pannable, zoomable canvas. This crate owns the algorithmic pipeline —
//! deterministic layout, viewport transform, visibility culling, and reveal
//! staggering — and leaves data fetching and painting to the consuming
//! shell:
//!
//! entries → [`layout`] → positions + reveal order
//!         → [`viewport`] tracks user pan/zoom
//!         → [`culling`] intersects positions with the viewport
//!         → [`SignatureCanvas::frame`] emits visible elements with delays

pub mod culling;
pub mod entry;
pub mod layout;
pub mod reveal;
pub mod viewport;

pub use entry::{EntryId, EntrySource, ImageRef, SignatureRecord};
pub use layout::{compute_layout, Layout, LayoutConfig, SignaturePosition};
pub use reveal::{RevealConfig, RevealSchedule};
pub use viewport::{ViewportConfig, ViewportController, ViewportState};

use common::geometry::{BoundingBox, Footprint};
use culling::{CullCache, SpatialIndex};
use glam::Vec2;
use layout::LayoutCache;
use log::{info, trace};
use std::sync::Arc;
use std::time::Duration;

/// One element of a composed frame: where to paint a signature and when it
/// becomes visible.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasElement {
    pub id: EntryId,
    /// Screen-space center of the element.
    pub screen: Vec2,
    /// Screen-space size (the world footprint scaled by the current zoom).
    pub size: Vec2,
    /// Reveal delay relative to mount.
    pub delay: Duration,
}

/// The composed output of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasFrame {
    pub state: ViewportState,
    /// Visible elements in layout order.
    pub elements: Vec<CanvasElement>,
}

/// The canvas: owns the entry feed snapshot, the layout/culling caches, and
/// the viewport, and composes them into frames.
///
/// All operations are synchronous, pure computations; the canvas performs no
/// I/O and never errors across this boundary. The worst case for malformed
/// input is an empty frame.
pub struct SignatureCanvas {
    entries: EntrySource,
    layout_config: LayoutConfig,
    footprint: Footprint,
    cull_buffer: f32,
    reveal_config: RevealConfig,

    layout_cache: LayoutCache,
    layout: Option<Arc<Layout>>,
    index: Option<SpatialIndex>,
    schedule: Option<RevealSchedule>,
    cull_cache: CullCache,

    viewport: ViewportController,
    on_open: Option<Box<dyn Fn(&EntryId)>>,
}

impl Default for SignatureCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureCanvas {
    pub fn new() -> Self {
        SignatureCanvas {
            entries: EntrySource::Pending,
            layout_config: LayoutConfig::default(),
            footprint: Footprint::default(),
            cull_buffer: 200.0,
            reveal_config: RevealConfig::default(),
            layout_cache: LayoutCache::new(),
            layout: None,
            index: None,
            schedule: None,
            cull_cache: CullCache::new(),
            viewport: ViewportController::default(),
            on_open: None,
        }
    }

    pub fn with_layout_config(mut self, config: LayoutConfig) -> Self {
        self.layout_config = config;
        self
    }

    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = footprint;
        self
    }

    pub fn with_cull_buffer(mut self, buffer: f32) -> Self {
        self.cull_buffer = buffer;
        self
    }

    pub fn with_reveal_config(mut self, config: RevealConfig) -> Self {
        self.reveal_config = config;
        self
    }

    pub fn with_viewport_config(mut self, config: ViewportConfig) -> Self {
        self.viewport = ViewportController::new(config);
        self
    }

    /// Registers the handler invoked when a signature is clicked (and the
    /// click was not the tail end of a pan).
    pub fn on_open_signature(&mut self, handler: impl Fn(&EntryId) + 'static) {
        self.on_open = Some(Box::new(handler));
    }

    pub fn entries(&self) -> &EntrySource {
        &self.entries
    }

    pub fn layout(&self) -> Option<&Arc<Layout>> {
        self.layout.as_ref()
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    /// Updates the measured canvas dimensions (on mount and resize).
    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport.set_viewport_size(size);
    }

    /// Replaces the entry feed snapshot and recomputes layout state if the
    /// entry set actually changed.
    ///
    /// A `Pending` or `Missing` feed renders nothing; no layout is computed
    /// over an absent set.
    pub fn set_entries(&mut self, source: impl Into<EntrySource>) {
        self.entries = source.into();

        if !self.entries.is_ready() {
            self.layout = None;
            self.index = None;
            self.schedule = None;
            self.cull_cache.invalidate();
            return;
        }

        let layout = self
            .layout_cache
            .get_or_compute(self.entries.records(), &self.layout_config);

        let unchanged = self
            .layout
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &layout));
        if unchanged {
            return;
        }

        info!("wall layout refreshed: {} signatures", layout.len());
        self.index = Some(SpatialIndex::new(&layout.positions, self.footprint));
        self.schedule = Some(RevealSchedule::new(
            &layout.reveal_order,
            &self.reveal_config,
        ));
        self.cull_cache.invalidate();
        self.layout = Some(layout);
    }

    /// World-space box containing every placed element, or `None` while the
    /// wall is empty.
    pub fn content_bounds(&self) -> Option<BoundingBox> {
        let layout = self.layout.as_ref()?;
        let mut positions = layout.positions.iter();
        let first = self.footprint.bounds_at(positions.next()?.world);
        Some(positions.fold(first, |acc, p| {
            acc.union(&self.footprint.bounds_at(p.world))
        }))
    }

    /// Fits the whole wall into the viewport.
    pub fn zoom_to_fit(&mut self) {
        if let Some(bounds) = self.content_bounds() {
            self.viewport.zoom_to_fit(&bounds);
        }
    }

    /// Composes one render pass: culls the layout against the current
    /// viewport snapshot and emits the visible elements with their reveal
    /// delays.
    pub fn frame(&mut self) -> CanvasFrame {
        let state = self.viewport.snapshot();
        let mut elements = Vec::new();

        if let (Some(layout), Some(index), Some(schedule)) =
            (&self.layout, &self.index, &self.schedule)
        {
            let visible = self.cull_cache.get_or_compute(
                &layout.positions,
                index,
                state,
                self.viewport.viewport_size(),
                self.cull_buffer,
            );

            elements.reserve(visible.len());
            for &i in visible.iter() {
                let position = &layout.positions[i];
                elements.push(CanvasElement {
                    id: position.id.clone(),
                    screen: state.world_to_screen(position.world),
                    size: self.footprint.size() * state.scale,
                    delay: schedule.delay_of(&position.id),
                });
            }
        }

        CanvasFrame { state, elements }
    }

    /// Reports a click on a rendered element. Returns whether the
    /// open-signature handler ran; clicks that end a pan gesture are
    /// suppressed.
    pub fn element_clicked(&self, id: &EntryId) -> bool {
        if self.viewport.was_dragging() {
            trace!("click on {} suppressed after pan", id);
            return false;
        }
        match &self.on_open {
            Some(handler) => {
                handler(id);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn records(n: usize) -> Vec<SignatureRecord> {
        (0..n)
            .map(|i| SignatureRecord::new(format!("e{i}"), format!("Visitor {i}")))
            .collect()
    }

    fn ready_canvas(n: usize) -> SignatureCanvas {
        let mut canvas = SignatureCanvas::new();
        canvas.set_viewport_size(vec2(800.0, 600.0));
        canvas.set_entries(EntrySource::Ready(records(n)));
        canvas
    }

    #[test]
    fn test_pending_and_missing_render_nothing() {
        let mut canvas = SignatureCanvas::new();
        canvas.set_viewport_size(vec2(800.0, 600.0));

        assert!(canvas.frame().elements.is_empty());

        canvas.set_entries(EntrySource::Missing);
        assert!(canvas.frame().elements.is_empty());

        canvas.set_entries(None::<Vec<SignatureRecord>>);
        assert!(canvas.frame().elements.is_empty());
        assert_eq!(canvas.entries(), &EntrySource::Missing);
    }

    #[test]
    fn test_ready_entries_render_after_fit() {
        let mut canvas = ready_canvas(60);
        canvas.zoom_to_fit();

        let frame = canvas.frame();
        assert_eq!(frame.elements.len(), 60);

        // Every element carries a bounded reveal delay
        let config = RevealConfig::default();
        let bound = config.base_delay + config.stagger * (config.ring_count - 1) as u32;
        assert!(frame.elements.iter().all(|e| e.delay <= bound));
    }

    #[test]
    fn test_layout_reused_when_ids_unchanged() {
        let mut canvas = ready_canvas(10);
        let first = canvas.layout().cloned().expect("layout");

        canvas.set_entries(EntrySource::Ready(records(10)));
        let second = canvas.layout().cloned().expect("layout");
        assert!(Arc::ptr_eq(&first, &second));

        canvas.set_entries(EntrySource::Ready(records(11)));
        let third = canvas.layout().cloned().expect("layout");
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_feed_going_pending_clears_canvas() {
        let mut canvas = ready_canvas(10);
        canvas.zoom_to_fit();
        assert!(!canvas.frame().elements.is_empty());

        canvas.set_entries(EntrySource::Pending);
        assert!(canvas.frame().elements.is_empty());
        assert!(canvas.content_bounds().is_none());
    }

    #[test]
    fn test_element_screen_positions_follow_transform() {
        let mut canvas = ready_canvas(5);
        canvas.zoom_to_fit();

        let frame = canvas.frame();
        let layout = canvas.layout().expect("layout").clone();
        for element in &frame.elements {
            let position = layout
                .positions
                .iter()
                .find(|p| p.id == element.id)
                .expect("id in layout");
            assert_eq!(element.screen, frame.state.world_to_screen(position.world));
            assert_eq!(
                element.size,
                canvas.footprint().size() * frame.state.scale
            );
        }
    }

    #[test]
    fn test_click_opens_signature() {
        let mut canvas = ready_canvas(3);
        let opened: Rc<RefCell<Vec<EntryId>>> = Rc::default();
        let sink = opened.clone();
        canvas.on_open_signature(move |id| sink.borrow_mut().push(id.clone()));

        let id = EntryId::from("e1");
        assert!(canvas.element_clicked(&id));
        assert_eq!(opened.borrow().as_slice(), &[id]);
    }

    #[test]
    fn test_click_after_pan_is_suppressed() {
        let mut canvas = ready_canvas(3);
        let opened: Rc<RefCell<Vec<EntryId>>> = Rc::default();
        let sink = opened.clone();
        canvas.on_open_signature(move |id| sink.borrow_mut().push(id.clone()));

        // Pan gesture ending on an element must not open it
        canvas.viewport_mut().pointer_down(vec2(0.0, 0.0));
        canvas.viewport_mut().pointer_move(vec2(60.0, 0.0));
        canvas.viewport_mut().pointer_up();
        assert!(!canvas.element_clicked(&"e0".into()));
        assert!(opened.borrow().is_empty());

        // A clean click afterwards goes through
        canvas.viewport_mut().pointer_down(vec2(10.0, 10.0));
        canvas.viewport_mut().pointer_up();
        assert!(canvas.element_clicked(&"e0".into()));
        assert_eq!(opened.borrow().len(), 1);
    }

    #[test]
    fn test_frame_before_measurement_is_empty() {
        let mut canvas = SignatureCanvas::new();
        canvas.set_entries(EntrySource::Ready(records(10)));
        // Viewport never measured: culler's empty-set policy applies
        assert!(canvas.frame().elements.is_empty());
    }

    #[test]
    fn test_repeated_frames_hit_the_cull_cache() {
        let mut canvas = ready_canvas(20);
        canvas.zoom_to_fit();

        let first = canvas.frame();
        let second = canvas.frame();
        assert_eq!(first, second);

        canvas.viewport_mut().zoom_in();
        let third = canvas.frame();
        assert_ne!(first.state, third.state);
    }

    #[test]
    fn test_content_bounds_cover_all_positions() {
        let canvas = {
            let mut c = ready_canvas(25);
            c.zoom_to_fit();
            c
        };
        let bounds = canvas.content_bounds().expect("bounds");
        let layout = canvas.layout().expect("layout");
        for position in &layout.positions {
            assert!(bounds.contains_point(position.world));
        }
    }
}
