//! Pointer geometry supplied by the host.
//!
//! The engine never lays anything out itself. During a drag it asks the host
//! where siblings currently sit on the vertical axis.

use crate::view::{NodeId, ViewTree};
use std::collections::HashMap;

/// Vertical extent of a rendered node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn midpoint(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

pub trait Layout {
    /// Current bounds of a node, or `None` if it is not laid out
    fn bounds(&self, view: &ViewTree, node: NodeId) -> Option<Rect>;
}

/// Headless layout: siblings stacked in rows of equal height, in the
/// current child order of their parent
#[derive(Debug, Clone, Copy)]
pub struct StackedLayout {
    pub row_height: f32,
}

impl StackedLayout {
    pub fn new(row_height: f32) -> Self {
        Self { row_height }
    }

    /// Pointer position that lands in the upper half of row `index`
    pub fn pointer_above(&self, index: usize) -> f32 {
        index as f32 * self.row_height + self.row_height / 4.0
    }
}

impl Default for StackedLayout {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Layout for StackedLayout {
    fn bounds(&self, view: &ViewTree, node: NodeId) -> Option<Rect> {
        let index = view.index_in_parent(node)?;
        Some(Rect::new(index as f32 * self.row_height, self.row_height))
    }
}

/// Fixed measurements, e.g. captured from a real surface
impl Layout for HashMap<NodeId, Rect> {
    fn bounds(&self, _view: &ViewTree, node: NodeId) -> Option<Rect> {
        self.get(&node).copied()
    }
}
