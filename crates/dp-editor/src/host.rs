//! Bridge to the host renderer.
//!
//! The pane never paints anything itself. Everything it needs to know about
//! rendered geometry, and every visual side effect of a drag, goes through
//! [`RenderHost`].

use crate::session::Ghost;
use dp_core::geometry::{Offset, Rect};
use std::fmt;

/// A rendered direct child of a container, as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildBox<H> {
    pub handle: H,
    /// Bounding box in page coordinates.
    pub rect: Rect,
}

/// Host renderer operations consumed by [`DesignPane`](crate::pane::DesignPane).
///
/// Rectangles and offsets are page coordinates.
pub trait RenderHost {
    /// Opaque handle to a rendered element, bound through
    /// `HierarchyBuilder::bind` once the host has painted.
    type Handle: Clone + PartialEq + fmt::Debug;

    /// The pane's own element. Drag-over on the root lays out against it.
    fn pane(&self) -> Self::Handle;

    /// Bounding box of a rendered element; `None` once it is gone.
    fn bounding_rect(&self, handle: &Self::Handle) -> Option<Rect>;

    /// Direct rendered children of `container` in render order. The ghost,
    /// if currently inserted, must not be reported.
    fn child_boxes(&self, container: &Self::Handle) -> Vec<ChildBox<Self::Handle>>;

    /// Content origin of `container` accumulated up to the pane (borders
    /// included, the pane itself excluded).
    fn content_offset(&self, container: &Self::Handle) -> Option<Offset>;

    /// Insert the ghost into `container` before the child at raw position
    /// `anchor`, or append it when `anchor` is `None`.
    fn insert_ghost(&mut self, container: &Self::Handle, anchor: Option<usize>, ghost: &Ghost);

    /// Detach the ghost wherever it is. Must tolerate a detached ghost.
    fn remove_ghost(&mut self);

    /// Hide or restore a rendered element.
    fn set_hidden(&mut self, handle: &Self::Handle, hidden: bool);
}
