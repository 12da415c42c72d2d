//! State of one in-flight drag.

use crate::config::GhostStyle;
use dp_core::geometry::Rect;
use dp_core::key::NodeKey;
use dp_core::layout::{DragContext, LayoutHint};
use dp_core::model::NodeRef;
use serde::Serialize;

/// Placeholder shown at the prospective drop position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ghost {
    pub width: f32,
    pub height: f32,
    pub style: GhostStyle,
}

impl Ghost {
    /// A ghost the size of `rect`.
    pub fn sized_like(rect: Rect, style: GhostStyle) -> Self {
        Self {
            width: rect.width,
            height: rect.height,
            style,
        }
    }
}

/// The hint from the last accepted drag-over, with the container it was
/// computed for. The root sentinel key stands for the pane itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDrop {
    pub container: NodeKey,
    pub hint: LayoutHint,
}

/// Lives from drag-start to drop or cancel.
#[derive(Debug, Clone)]
pub struct DragSession<H> {
    pub key: NodeKey,
    /// Handle of the dragged element, hidden for the session's lifetime.
    pub handle: H,
    pub node: NodeRef,
    pub ghost: Ghost,
    pub pending: Option<PendingDrop>,
}

impl<H> DragSession<H> {
    pub fn new(key: NodeKey, handle: H, node: NodeRef, ghost: Ghost) -> Self {
        Self {
            key,
            handle,
            node,
            ghost,
            pending: None,
        }
    }

    /// Layout helper input for a drag over `container` (`None` = pane root).
    pub fn context(&self, container: Option<NodeKey>) -> DragContext<'_> {
        DragContext {
            container,
            dragged_key: self.key,
            dragged_node: &self.node,
        }
    }

    pub fn hint(&self) -> Option<LayoutHint> {
        self.pending.map(|p| p.hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dp_core::model::Node;

    #[test]
    fn ghost_follows_the_focus_rectangle() {
        let ghost = Ghost::sized_like(Rect::new(5.0, 5.0, 80.0, 30.0), GhostStyle::default());
        assert_eq!((ghost.width, ghost.height), (80.0, 30.0));
        assert_eq!(ghost.style.display, "inline-block");
    }

    #[test]
    fn context_carries_the_dragged_node() {
        let node = Node::element("button").into_ref();
        let key = NodeKey::intern("R-A-b1");
        let session = DragSession::new(
            key,
            7u32,
            node.clone(),
            Ghost::sized_like(Rect::default(), GhostStyle::default()),
        );
        let ctx = session.context(None);
        assert_eq!(ctx.dragged_key, key);
        assert!(std::rc::Rc::ptr_eq(ctx.dragged_node, &node));
        assert!(session.hint().is_none());
    }
}
