//! Input abstraction layer.
//!
//! Hosts translate their native pointer and drag events into a [`PaneEvent`]
//! and hand it to [`DesignPane::dispatch`](crate::pane::DesignPane::dispatch).
//! The reply is a [`PaneResponse`] telling the host what to do with the
//! native event.

use dp_core::key::NodeKey;
use dp_core::model::NodeRef;
use dp_core::render::RenderedTree;

/// A normalized pane event.
///
/// `on_overlay` marks events whose target is the focus overlay itself; the
/// pane leaves those to the overlay. Drag events carry the key of the
/// container whose wired handler fired, `None` for the pane root.
#[derive(Debug, Clone, PartialEq)]
pub enum PaneEvent {
    /// Pointer pressed at page position `(x, y)`.
    PointerDown { x: f32, y: f32, on_overlay: bool },

    /// Pointer released.
    PointerUp { on_overlay: bool },

    /// Pointer left the pane.
    PointerLeave { on_overlay: bool },

    /// The focus overlay started a native drag.
    DragStart,

    /// A drag moved over a container at page position `(x, y)`.
    DragOver {
        container: Option<NodeKey>,
        x: f32,
        y: f32,
    },

    /// A drag was released over a container.
    Drop { container: Option<NodeKey> },
}

/// Drop effect to report to the native drag protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Move,
    None,
}

/// What the host should do after an event was handled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaneResponse {
    pub stop_propagation: bool,
    pub prevent_default: bool,
    /// Set for drag-over events.
    pub drop_effect: Option<DropEffect>,
    /// The node that just started dragging.
    pub started: Option<NodeRef>,
    /// The rearranged tree after a successful drop. Hosts load it back as the
    /// new authoritative tree.
    pub layout_change: Option<RenderedTree>,
}

impl PaneResponse {
    /// The event was not for the pane; let it continue.
    pub fn ignored() -> Self {
        Self::default()
    }

    /// The pane consumed the event.
    pub fn consumed() -> Self {
        Self {
            stop_propagation: true,
            prevent_default: true,
            ..Self::default()
        }
    }

    /// Drag-over accepted by the hovered container.
    pub fn accepted() -> Self {
        Self {
            drop_effect: Some(DropEffect::Move),
            ..Self::consumed()
        }
    }

    /// Drag-over refused. Propagation continues so an enclosing container
    /// can still accept.
    pub fn rejected() -> Self {
        Self {
            prevent_default: true,
            drop_effect: Some(DropEffect::None),
            ..Self::default()
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.drop_effect == Some(DropEffect::Move)
    }
}
