//! Drop-position layout helpers.
//!
//! A layout helper answers two questions for one container: may the dragged
//! node be dropped here at all, and at which child index would it land for a
//! given pointer position. The answer is a [`LayoutHint`].

use crate::geometry::{Offset, Rect};
use crate::key::NodeKey;
use crate::model::NodeRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What is being dragged, and over which container.
#[derive(Debug, Clone, Copy)]
pub struct DragContext<'a> {
    /// Key of the hovered container; `None` for the pane root.
    pub container: Option<NodeKey>,
    pub dragged_key: NodeKey,
    pub dragged_node: &'a NodeRef,
}

/// One rendered direct child of the hovered container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildRect {
    /// Bounding box in page coordinates.
    pub rect: Rect,
    /// This box belongs to the node being dragged.
    pub dragged: bool,
}

impl ChildRect {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            dragged: false,
        }
    }

    pub fn dragged(rect: Rect) -> Self {
        Self {
            rect,
            dragged: true,
        }
    }
}

/// Rendered geometry of the hovered container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryContext {
    /// Direct child boxes in render order. The ghost must not be among them.
    pub children: Vec<ChildRect>,
    /// Content origin of the container in page coordinates.
    pub offset: Offset,
}

/// Result of laying out a pending drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutHint {
    /// Insertion index among the container's children, not counting the
    /// dragged node itself.
    pub index: usize,
    /// Raw position (dragged box included) of the child the ghost goes
    /// before; `None` appends.
    pub anchor: Option<usize>,
}

impl LayoutHint {
    pub const fn append(index: usize) -> Self {
        Self {
            index,
            anchor: None,
        }
    }
}

/// Container-specific drop policy and insertion heuristic.
pub trait LayoutHelper: fmt::Debug {
    /// Veto for accepting the dragged node. Accepts everything by default.
    fn can_drop(&self, _ctx: &DragContext<'_>) -> bool {
        true
    }

    /// Insertion index for a pointer at page position `(x, y)`.
    fn layout(
        &self,
        ctx: &DragContext<'_>,
        geometry: &GeometryContext,
        x: f32,
        y: f32,
    ) -> LayoutHint;
}

// ─── Flow layout ─────────────────────────────────────────────────────────

/// Left-to-right, top-to-bottom flow heuristic.
///
/// The dragged node will vacate its slot, so its own box never counts toward
/// the insertion index.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowLayoutHelper;

impl FlowLayoutHelper {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutHelper for FlowLayoutHelper {
    fn layout(
        &self,
        ctx: &DragContext<'_>,
        geometry: &GeometryContext,
        x: f32,
        y: f32,
    ) -> LayoutHint {
        let local_x = x - geometry.offset.x;
        let local_y = y - geometry.offset.y;
        let mut index = 0;

        for (position, child) in geometry.children.iter().enumerate() {
            let rect = child.rect.translated(geometry.offset);
            let (center_x, center_y) = rect.center();

            let before_center = local_y < center_y && local_x < center_x;
            // Same row, below the visual center but still inside the band.
            let inside_band = local_y < rect.bottom() && local_x < center_x;
            if before_center || inside_band {
                log::trace!(
                    "flow layout {:?}: before child {position} -> index {index}",
                    ctx.container
                );
                return LayoutHint {
                    index,
                    anchor: Some(position),
                };
            }

            if !child.dragged {
                index += 1;
            }
        }

        log::trace!("flow layout {:?}: append -> index {index}", ctx.container);
        LayoutHint::append(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn ctx(node: &NodeRef) -> DragContext<'_> {
        DragContext {
            container: Some(NodeKey::intern("R-0")),
            dragged_key: NodeKey::intern("R-1"),
            dragged_node: node,
        }
    }

    /// Three 100×50 boxes in one row starting at (0, 0).
    fn row() -> Vec<ChildRect> {
        (0..3)
            .map(|i| ChildRect::new(Rect::new(i as f32 * 100.0, 0.0, 100.0, 50.0)))
            .collect()
    }

    #[test]
    fn upper_left_quadrant_of_first_child_is_index_zero() {
        let node = Node::element("span").into_ref();
        let geometry = GeometryContext {
            children: row(),
            offset: Offset::ZERO,
        };
        let hint = FlowLayoutHelper.layout(&ctx(&node), &geometry, 25.0, 12.5);
        assert_eq!(hint, LayoutHint { index: 0, anchor: Some(0) });
    }

    #[test]
    fn past_last_child_appends() {
        let node = Node::element("span").into_ref();
        let geometry = GeometryContext {
            children: row(),
            offset: Offset::ZERO,
        };
        let hint = FlowLayoutHelper.layout(&ctx(&node), &geometry, 350.0, 25.0);
        assert_eq!(hint, LayoutHint::append(3));
    }

    #[test]
    fn lower_half_left_of_center_still_inserts_before() {
        let node = Node::element("span").into_ref();
        let geometry = GeometryContext {
            children: row(),
            offset: Offset::ZERO,
        };
        // Below the vertical center of the second box, left of its center.
        let hint = FlowLayoutHelper.layout(&ctx(&node), &geometry, 140.0, 40.0);
        assert_eq!(hint, LayoutHint { index: 1, anchor: Some(1) });
    }

    #[test]
    fn dragged_box_does_not_count() {
        let node = Node::element("span").into_ref();
        let mut children = row();
        children[0].dragged = true;
        let geometry = GeometryContext {
            children,
            offset: Offset::ZERO,
        };
        // Right half of the third box: past everything.
        let hint = FlowLayoutHelper.layout(&ctx(&node), &geometry, 260.0, 25.0);
        assert_eq!(hint, LayoutHint::append(2));

        // Left half of the third box: before it, one real sibling ahead.
        let hint = FlowLayoutHelper.layout(&ctx(&node), &geometry, 210.0, 25.0);
        assert_eq!(hint, LayoutHint { index: 1, anchor: Some(2) });
    }

    #[test]
    fn pointer_and_boxes_are_translated_together() {
        let node = Node::element("span").into_ref();
        let offset = Offset::new(500.0, 300.0);
        let children = row()
            .into_iter()
            .map(|c| ChildRect::new(c.rect.translated(Offset::new(-500.0, -300.0))))
            .collect();
        let geometry = GeometryContext { children, offset };
        let hint = FlowLayoutHelper.layout(&ctx(&node), &geometry, 525.0, 312.5);
        assert_eq!(hint.index, 0);
    }

    #[test]
    fn empty_container_appends_at_zero() {
        let node = Node::element("span").into_ref();
        let hint = FlowLayoutHelper.layout(&ctx(&node), &GeometryContext::default(), 5.0, 5.0);
        assert_eq!(hint, LayoutHint::append(0));
    }

    #[test]
    fn default_policy_accepts_drop() {
        let node = Node::element("span").into_ref();
        assert!(FlowLayoutHelper.can_drop(&ctx(&node)));
    }
}
