//! Drag eligibility policy.

use dp_core::model::Node;

/// Decides whether a focused node may be dragged.
pub trait DragAndDropHelper {
    /// `index` is the node's position among its parent's child slots.
    fn is_draggable(&self, node: &Node, index: usize) -> bool;
}

/// Everything is draggable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDragAndDropHelper;

impl DragAndDropHelper for DefaultDragAndDropHelper {
    fn is_draggable(&self, _node: &Node, _index: usize) -> bool {
        true
    }
}

/// Closures work as policies: `|node: &Node, _| node.ty.is_intrinsic()`.
impl<F> DragAndDropHelper for F
where
    F: Fn(&Node, usize) -> bool,
{
    fn is_draggable(&self, node: &Node, index: usize) -> bool {
        self(node, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_everything() {
        let node = Node::component("Card");
        assert!(DefaultDragAndDropHelper.is_draggable(&node, 0));
        assert!(DefaultDragAndDropHelper.is_draggable(&node, 42));
    }

    #[test]
    fn closures_are_policies() {
        let pinned_first = |_: &Node, index: usize| index > 0;
        let node = Node::element("span");
        assert!(!pinned_first.is_draggable(&node, 0));
        assert!(pinned_first.is_draggable(&node, 1));
    }
}
