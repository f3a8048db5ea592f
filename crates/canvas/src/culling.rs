//! Viewport culling: filtering the full position set down to the elements
//! whose screen-space box intersects the (buffered) viewport.
//!
//! With hundreds of image-bearing signatures on a wall, rendering all of
//! them regardless of visibility would dominate frame time; this is the
//! performance-critical path of the canvas. Positions are indexed once per
//! layout pass into a quadtree over their world-space boxes, and each
//! visibility query inverse-transforms the buffered viewport rectangle into
//! world space before probing the tree.

use crate::layout::SignaturePosition;
use crate::viewport::ViewportState;
use common::geometry::{bbox, BoundingBox, Footprint};
use glam::Vec2;
use log::trace;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::sync::Arc;

/// Maximum number of entries before subdividing a node
const MAX_ENTRIES_PER_NODE: usize = 8;
/// Maximum depth of the quadtree
const MAX_DEPTH: u32 = 8;

/// A node in the quadtree spatial index. Each item is stored exactly once:
/// at the deepest node whose quad fully contains its box.
struct QuadTreeNode {
    bounds: BoundingBox,
    /// Items stored at this level (if they don't fit entirely in a child),
    /// with their world-space boxes.
    entries: SmallVec<[(usize, BoundingBox); MAX_ENTRIES_PER_NODE]>,
    /// Child nodes (subdivisions of this quad).
    children: Option<Box<[QuadTreeNode; 4]>>,
}

impl QuadTreeNode {
    fn new(bounds: BoundingBox) -> Self {
        QuadTreeNode {
            bounds,
            entries: SmallVec::new(),
            children: None,
        }
    }

    fn insert(&mut self, item: usize, item_bounds: BoundingBox, depth: u32) {
        // At max depth, or not fully inside this quad: store it here
        if depth >= MAX_DEPTH || !self.bounds.contains(&item_bounds) {
            self.entries.push((item, item_bounds));
            return;
        }

        if self.children.is_none() && self.entries.len() >= MAX_ENTRIES_PER_NODE {
            self.subdivide();
        }

        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                if child.bounds.contains(&item_bounds) {
                    child.insert(item, item_bounds, depth + 1);
                    return;
                }
            }
        }

        // Spans the center lines, or no children yet
        self.entries.push((item, item_bounds));
    }

    fn subdivide(&mut self) {
        let min = self.bounds.min();
        let max = self.bounds.max();
        let center = self.bounds.center();

        self.children = Some(Box::new([
            // Northwest
            QuadTreeNode::new(bbox(min, center)),
            // Northeast
            QuadTreeNode::new(bbox(Vec2::new(center.x, min.y), Vec2::new(max.x, center.y))),
            // Southwest
            QuadTreeNode::new(bbox(Vec2::new(min.x, center.y), Vec2::new(center.x, max.y))),
            // Southeast
            QuadTreeNode::new(bbox(center, max)),
        ]));
    }

    fn query_region(&self, region: &BoundingBox, out: &mut HashSet<usize>) {
        for (item, item_bounds) in &self.entries {
            if item_bounds.intersects(region) {
                out.insert(*item);
            }
        }

        if let Some(children) = &self.children {
            for child in children.iter() {
                if child.bounds.intersects(region) {
                    child.query_region(region, out);
                }
            }
        }
    }
}

/// Quadtree over the world-space boxes of one layout pass.
///
/// Positions are immutable after layout, so the index is built once and
/// queried for every pan/zoom change.
pub struct SpatialIndex {
    root: Option<QuadTreeNode>,
    len: usize,
}

impl SpatialIndex {
    pub fn new(positions: &[SignaturePosition], footprint: Footprint) -> Self {
        let boxes: Vec<BoundingBox> = positions
            .iter()
            .map(|p| footprint.bounds_at(p.world))
            .collect();

        let Some(first) = boxes.first() else {
            return SpatialIndex { root: None, len: 0 };
        };

        let world = boxes.iter().skip(1).fold(*first, |acc, b| acc.union(b));
        let mut root = QuadTreeNode::new(world);
        for (item, item_bounds) in boxes.iter().enumerate() {
            root.insert(item, *item_bounds, 0);
        }

        trace!("spatial index built over {} positions", positions.len());
        SpatialIndex {
            root: Some(root),
            len: positions.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of all positions whose box intersects the world-space region.
    pub fn query_region(&self, region: &BoundingBox) -> HashSet<usize> {
        let mut out = HashSet::new();
        if let Some(root) = &self.root {
            root.query_region(region, &mut out);
        }
        out
    }
}

/// Positions visible under the given transform, as indices into the original
/// slice, in original order.
///
/// An element is visible when its screen-space box overlaps the viewport
/// rectangle grown by `buffer` pixels on every side; the slack hides pop-in
/// at the edges during fast pans. The element footprint lives in world units
/// and scales with the canvas.
///
/// Before the viewport has been measured (zero or negative dimensions) the
/// result is the empty set.
pub fn visible_indices(
    positions: &[SignaturePosition],
    index: &SpatialIndex,
    state: ViewportState,
    viewport_size: Vec2,
    buffer: f32,
) -> Vec<usize> {
    if viewport_size.x <= 0.0 || viewport_size.y <= 0.0 {
        return Vec::new();
    }

    // Inverse-transform the buffered screen rectangle into world space;
    // scale is clamped positive upstream, so ordering of corners survives
    let world_region = bbox(
        state.screen_to_world(Vec2::splat(-buffer)),
        state.screen_to_world(viewport_size + Vec2::splat(buffer)),
    );

    let hits = index.query_region(&world_region);
    (0..positions.len()).filter(|i| hits.contains(i)).collect()
}

/// Memoizes [`visible_indices`] on the transform tuple.
///
/// Pointer-move streams re-render every frame while pan and scale often sit
/// still between frames; comparing the tuple is much cheaper than re-probing
/// the tree. The owner must invalidate (or rebuild) the cache when the
/// layout itself changes.
#[derive(Default)]
pub struct CullCache {
    key: Option<CullKey>,
    value: Option<Arc<Vec<usize>>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CullKey {
    pan: Vec2,
    scale: f32,
    viewport_size: Vec2,
    buffer: f32,
}

impl CullCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        positions: &[SignaturePosition],
        index: &SpatialIndex,
        state: ViewportState,
        viewport_size: Vec2,
        buffer: f32,
    ) -> Arc<Vec<usize>> {
        let key = CullKey {
            pan: state.pan,
            scale: state.scale,
            viewport_size,
            buffer,
        };

        let hit = self.key == Some(key) && self.value.is_some();
        if !hit {
            let visible = visible_indices(positions, index, state, viewport_size, buffer);
            trace!("culled {} -> {} visible", positions.len(), visible.len());
            self.key = Some(key);
            self.value = Some(Arc::new(visible));
        }

        self.value
            .clone()
            .unwrap_or_else(|| Arc::new(Vec::new()))
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.value = None;
    }
}
