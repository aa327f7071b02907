//! Rendering collaborator contract.
//!
//! Visualization is an external dependency: a viewer reads the current
//! world snapshot and performs no mutation. This module only defines the
//! vocabulary such a collaborator consumes. Arms and grippers are drawn
//! as polylines over their joint positions, landmarks as polygons; the
//! viewer owns window management and rasterization, and it is invoked on
//! demand rather than every step.

use ndarray::{Array1, Array3};

/// Geometry description for one world entity
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Closed outline, used for landmarks
    Polygon(Vec<[f32; 2]>),
    /// Open chain of points, used for arms and grippers
    Polyline(Vec<[f32; 2]>),
}

/// One drawable item of the current world snapshot
#[derive(Clone, Debug)]
pub struct RenderItem {
    pub color: [f32; 3],
    pub alpha: f32,
    pub geometry: Geometry,
}

/// Camera window in world coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl CameraBounds {
    /// Square window of half-width `range` around a position
    pub fn centered(pos: &Array1<f32>, range: f32) -> Self {
        Self {
            left: pos[0] - range,
            right: pos[0] + range,
            bottom: pos[1] - range,
            top: pos[1] + range,
        }
    }
}

/// Result of a render call
pub enum RenderOutput {
    /// The frame went to a display
    Display,
    /// RGB pixel array, height by width by channel
    Pixels(Array3<u8>),
}

/// Contract for an external viewer implementation
pub trait Viewer {
    fn set_bounds(&mut self, bounds: CameraBounds);

    /// Replace the viewer's geometry with the given snapshot
    fn set_items(&mut self, items: Vec<RenderItem>);

    /// Draw the current items, either to a display or to a pixel array
    fn render(&mut self, rgb_array: bool) -> RenderOutput;
}
