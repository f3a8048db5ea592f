//! Shared support code for the signature wall canvas: geometry primitives
//! used across the layout and culling paths, and the file logger.

pub mod geometry;
pub mod logger;

pub use geometry::{bbox, BoundingBox, Footprint};
pub use logger::WallLogger;
