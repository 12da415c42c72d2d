//! Drag session coordinator.
//!
//! `DesignPane` ties the hierarchy builder to the host's pointer protocol:
//!
//! ```text
//! Idle ──pointer-down hit──▶ Focused ──drag-start──▶ Dragging
//!   ▲                                                   │
//!   └──────────── drop / pointer-up / pointer-leave ────┘
//! ```
//!
//! The host renders the tree returned by [`DesignPane::render`], binds the
//! handles it painted, and feeds normalized events through
//! [`DesignPane::dispatch`]. A successful drop hands back the rearranged tree
//! in [`PaneResponse::layout_change`]; the host loads it and renders again.

use crate::config::{HitPolicy, PaneConfig};
use crate::dnd::{DefaultDragAndDropHelper, DragAndDropHelper};
use crate::host::RenderHost;
use crate::input::{PaneEvent, PaneResponse};
use crate::session::{DragSession, Ghost, PendingDrop};
use dp_core::action::MoveAction;
use dp_core::builder::{BuildOptions, HierarchyBuilder};
use dp_core::geometry::{Offset, Rect, relative_position};
use dp_core::key::NodeKey;
use dp_core::layout::{ChildRect, FlowLayoutHelper, GeometryContext, LayoutHelper};
use dp_core::model::Tree;
use dp_core::render::{EventHandlers, ON_DRAG_OVER, ON_DROP, RenderedTree};
use dp_core::traversal::TraversalHelper;
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneState {
    Idle,
    Focused,
    Dragging,
}

/// Handler wired onto every container by [`DesignPane::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneHook {
    DragOver,
    Drop,
}

impl PaneHook {
    /// The pane event for this hook firing on the element wired with `key`.
    pub fn event(self, key: NodeKey, x: f32, y: f32) -> PaneEvent {
        let container = (!key.is_root()).then_some(key);
        match self {
            Self::DragOver => PaneEvent::DragOver { container, x, y },
            Self::Drop => PaneEvent::Drop { container },
        }
    }
}

/// The focused node and its box relative to the pane's content area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus {
    pub key: NodeKey,
    pub rect: Rect,
}

/// What the host paints as the focus overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub key: NodeKey,
    pub rect: Rect,
    pub draggable: bool,
    /// Hidden while a drag is in flight.
    pub visible: bool,
}

/// Containers a drag-over bubbles through, innermost first. `None` is the
/// pane root.
pub type ContainerPath = SmallVec<[Option<NodeKey>; 8]>;

/// Drag-and-drop coordinator, generic over the host's render handle `R`.
pub struct DesignPane<R> {
    builder: HierarchyBuilder<R>,
    config: PaneConfig,
    dnd: Box<dyn DragAndDropHelper>,
    /// Layout helper for drags over the pane itself.
    root_helper: Rc<dyn LayoutHelper>,
    focus: Option<Focus>,
    session: Option<DragSession<R>>,
}

impl<R: Clone + PartialEq + fmt::Debug> DesignPane<R> {
    pub fn new(config: PaneConfig) -> Self {
        Self {
            builder: HierarchyBuilder::new(config.traversal_helper()),
            config,
            dnd: Box::new(DefaultDragAndDropHelper),
            root_helper: Rc::new(FlowLayoutHelper),
            focus: None,
            session: None,
        }
    }

    /// Replace the traversal policy. Drops the loaded tree, so call it
    /// before [`load`](Self::load).
    #[must_use]
    pub fn with_traversal(mut self, traversal: impl TraversalHelper + 'static) -> Self {
        self.builder = HierarchyBuilder::new(traversal);
        self
    }

    #[must_use]
    pub fn with_drag_and_drop(mut self, dnd: impl DragAndDropHelper + 'static) -> Self {
        self.dnd = Box::new(dnd);
        self
    }

    #[must_use]
    pub fn with_root_helper(mut self, helper: Rc<dyn LayoutHelper>) -> Self {
        self.root_helper = helper;
        self
    }

    pub fn config(&self) -> &PaneConfig {
        &self.config
    }

    pub fn builder(&self) -> &HierarchyBuilder<R> {
        &self.builder
    }

    // ─── Tree and handles ────────────────────────────────────────────────

    /// Replace the authoritative tree. Takes effect on the next
    /// [`render`](Self::render).
    pub fn load(&mut self, tree: Option<Tree>) {
        self.builder.load(tree);
    }

    /// Wired build with drag-over and drop hooks on every container.
    /// Rebuilds the key cache, so every handle must be bound again.
    pub fn render(&mut self) -> Option<RenderedTree<PaneHook>> {
        let mut handlers = EventHandlers::new();
        handlers.insert(ON_DRAG_OVER.to_string(), PaneHook::DragOver);
        handlers.insert(ON_DROP.to_string(), PaneHook::Drop);
        self.builder
            .render_children(&BuildOptions::default().with_container_handlers(handlers))
    }

    pub fn bind(&mut self, key: NodeKey, handle: R) -> bool {
        self.builder.bind(key, handle)
    }

    pub fn unbind(&mut self, key: NodeKey) -> Option<R> {
        self.builder.unbind(key)
    }

    // ─── State ───────────────────────────────────────────────────────────

    pub fn state(&self) -> PaneState {
        if self.session.is_some() {
            PaneState::Dragging
        } else if self.focus.is_some() {
            PaneState::Focused
        } else {
            PaneState::Idle
        }
    }

    pub fn focused(&self) -> Option<NodeKey> {
        self.focus.map(|f| f.key)
    }

    pub fn session(&self) -> Option<&DragSession<R>> {
        self.session.as_ref()
    }

    /// The focus overlay to paint, if anything is focused.
    pub fn overlay(&self) -> Option<Overlay> {
        let focus = self.focus?;
        Some(Overlay {
            key: focus.key,
            rect: focus.rect,
            draggable: self.is_draggable(focus.key),
            visible: self.session.is_none(),
        })
    }

    fn is_draggable(&self, key: NodeKey) -> bool {
        match (self.builder.node(key), self.builder.node_index(key)) {
            (Some(node), Some(index)) => self.dnd.is_draggable(node, index),
            _ => false,
        }
    }

    /// Containers a drag-over on `key` bubbles through: `key` itself when it
    /// is a container, then its ancestors up to the pane root.
    pub fn container_path(&self, key: NodeKey) -> ContainerPath {
        let mut path = ContainerPath::new();
        if self.builder.is_container(key) {
            path.push(Some(key));
        }
        match self.builder.ancestors(key) {
            Some(ancestors) => path.extend(
                ancestors
                    .as_slice()
                    .iter()
                    .rev()
                    .map(|k| (!k.is_root()).then_some(*k)),
            ),
            None => path.push(None),
        }
        path
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Single entry point for normalized host events.
    pub fn dispatch<H: RenderHost<Handle = R>>(
        &mut self,
        host: &mut H,
        event: PaneEvent,
    ) -> PaneResponse {
        match event {
            PaneEvent::PointerDown { x, y, on_overlay } => self.pointer_down(host, x, y, on_overlay),
            PaneEvent::PointerUp { on_overlay } | PaneEvent::PointerLeave { on_overlay } => {
                self.cancel(host, on_overlay)
            }
            PaneEvent::DragStart => self.drag_start(host),
            PaneEvent::DragOver { container, x, y } => self.drag_over(host, container, x, y),
            PaneEvent::Drop { container } => self.drop_on(host, container),
        }
    }

    /// Focus the node under page position `(x, y)`.
    pub fn pointer_down<H: RenderHost<Handle = R>>(
        &mut self,
        host: &mut H,
        x: f32,
        y: f32,
        on_overlay: bool,
    ) -> PaneResponse {
        if on_overlay {
            return PaneResponse::ignored();
        }
        let Some((key, rect)) = self.hit_test(host, x, y) else {
            log::trace!("pointer-down at ({x}, {y}) hit nothing");
            return PaneResponse::ignored();
        };

        if let Some(stale) = self.session.take() {
            log::warn!("pointer-down during drag of {}; dropping session", stale.key);
            self.finish(host, &stale);
        }

        let pane = host.pane();
        let origin = host.content_offset(&pane).unwrap_or(Offset::ZERO);
        self.focus = Some(Focus {
            key,
            rect: relative_position(origin, rect),
        });
        log::debug!("focused {key}");
        PaneResponse::consumed()
    }

    /// Walk the cache in build order; the last container containing the
    /// point wins unless a leaf containing it comes first.
    fn hit_test<H: RenderHost<Handle = R>>(&self, host: &H, x: f32, y: f32) -> Option<(NodeKey, Rect)> {
        let mut hit = None;
        for &key in self.builder.keys() {
            let Some(rect) = self
                .builder
                .instance(key)
                .and_then(|handle| host.bounding_rect(handle))
            else {
                continue;
            };
            if !rect.contains(x, y) {
                continue;
            }
            hit = Some((key, rect));
            match self.config.hit_policy {
                HitPolicy::Outermost => break,
                HitPolicy::Innermost if !self.builder.is_container(key) => break,
                HitPolicy::Innermost => {}
            }
        }
        hit
    }

    /// Start dragging the focused node. The response carries the node.
    pub fn drag_start<H: RenderHost<Handle = R>>(&mut self, host: &mut H) -> PaneResponse {
        let Some(focus) = self.focus else {
            log::warn!("drag-start without a focused node ignored");
            return PaneResponse::ignored();
        };
        if self.session.is_some() {
            log::warn!("drag-start while already dragging ignored");
            return PaneResponse::ignored();
        }
        if !self.is_draggable(focus.key) {
            log::debug!("{} is not draggable", focus.key);
            return PaneResponse::ignored();
        }
        let (Some(handle), Some(node)) = (
            self.builder.instance(focus.key).cloned(),
            self.builder.node(focus.key).cloned(),
        ) else {
            log::warn!("drag-start on unbound {}", focus.key);
            return PaneResponse::ignored();
        };

        host.set_hidden(&handle, true);
        let ghost = Ghost::sized_like(focus.rect, self.config.ghost.clone());
        log::debug!("dragging {}", focus.key);
        self.session = Some(DragSession::new(focus.key, handle, node.clone(), ghost));

        PaneResponse {
            started: Some(node),
            ..PaneResponse::ignored()
        }
    }

    /// Lay out a pending drop over `container` (`None` = pane root) and
    /// move the ghost there.
    pub fn drag_over<H: RenderHost<Handle = R>>(
        &mut self,
        host: &mut H,
        container: Option<NodeKey>,
        x: f32,
        y: f32,
    ) -> PaneResponse {
        let Some(session) = self.session.as_mut() else {
            log::trace!("drag-over without a session");
            return PaneResponse::rejected();
        };
        host.remove_ghost();

        let target = match container {
            Some(key) => self
                .builder
                .instance(key)
                .cloned()
                .zip(self.builder.layout_helper(key)),
            None => Some((host.pane(), self.root_helper.clone())),
        };
        let Some((handle, helper)) = target else {
            log::trace!("drag-over {container:?}: no bound container");
            session.pending = None;
            return PaneResponse::rejected();
        };

        let ctx = session.context(container);
        if !helper.can_drop(&ctx) {
            log::trace!("drag-over {container:?}: drop refused");
            session.pending = None;
            return PaneResponse::rejected();
        }
        let Some(geometry) = geometry_of(host, &handle, &session.handle) else {
            log::trace!("drag-over {container:?}: geometry unavailable");
            session.pending = None;
            return PaneResponse::rejected();
        };

        let hint = helper.layout(&ctx, &geometry, x, y);
        host.insert_ghost(&handle, hint.anchor, &session.ghost);
        session.pending = Some(PendingDrop {
            container: container.unwrap_or_else(NodeKey::root),
            hint,
        });
        PaneResponse::accepted()
    }

    /// Deliver one drag-over along `path`, innermost first, stopping at the
    /// first container that accepts.
    pub fn drag_over_path<H: RenderHost<Handle = R>>(
        &mut self,
        host: &mut H,
        path: &[Option<NodeKey>],
        x: f32,
        y: f32,
    ) -> PaneResponse {
        let mut response = PaneResponse::rejected();
        for &container in path {
            response = self.drag_over(host, container, x, y);
            if response.stop_propagation {
                break;
            }
        }
        response
    }

    /// Finish the drag. Moves the dragged node into the container that
    /// accepted the last drag-over, at the hinted index. A move that cannot
    /// be applied reports no layout change.
    pub fn drop_on<H: RenderHost<Handle = R>>(
        &mut self,
        host: &mut H,
        container: Option<NodeKey>,
    ) -> PaneResponse {
        let Some(session) = self.session.take() else {
            return PaneResponse::ignored();
        };

        let layout_change = match session.pending {
            Some(pending) => {
                let fired_on = container.unwrap_or_else(NodeKey::root);
                if fired_on != pending.container {
                    log::trace!("drop on {fired_on} goes to {}", pending.container);
                }
                let action = MoveAction::new(session.key, pending.container, pending.hint.index);
                match self.builder.try_apply(&action) {
                    Ok(rendered) => rendered,
                    Err(issue) => {
                        log::warn!("drop skipped: {issue}");
                        None
                    }
                }
            }
            None => {
                log::debug!("drop of {} without an accepted drag-over", session.key);
                None
            }
        };

        self.finish(host, &session);
        PaneResponse {
            layout_change,
            ..PaneResponse::consumed()
        }
    }

    /// Pointer-up or pointer-leave. Ends a drag without moving anything;
    /// focus survives when nothing was being dragged.
    pub fn cancel<H: RenderHost<Handle = R>>(&mut self, host: &mut H, on_overlay: bool) -> PaneResponse {
        if on_overlay {
            return PaneResponse::ignored();
        }
        if let Some(session) = self.session.take() {
            log::debug!("drag of {} cancelled", session.key);
            self.finish(host, &session);
        }
        PaneResponse::ignored()
    }

    fn finish<H: RenderHost<Handle = R>>(&mut self, host: &mut H, session: &DragSession<R>) {
        host.set_hidden(&session.handle, false);
        host.remove_ghost();
        self.focus = None;
    }
}

impl<R: Clone + PartialEq + fmt::Debug> Default for DesignPane<R> {
    fn default() -> Self {
        Self::new(PaneConfig::default())
    }
}

impl<R: fmt::Debug> fmt::Debug for DesignPane<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignPane")
            .field("builder", &self.builder)
            .field("focus", &self.focus)
            .field("session", &self.session)
            .finish()
    }
}

/// Child boxes and content offset of `container`, with the dragged
/// element's box marked.
fn geometry_of<H: RenderHost>(
    host: &H,
    container: &H::Handle,
    dragged: &H::Handle,
) -> Option<GeometryContext> {
    let offset = host.content_offset(container)?;
    let children = host
        .child_boxes(container)
        .into_iter()
        .map(|child| {
            if child.handle == *dragged {
                ChildRect::dragged(child.rect)
            } else {
                ChildRect::new(child.rect)
            }
        })
        .collect();
    Some(GeometryContext { children, offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hooks_map_to_events() {
        let key = NodeKey::intern("R-B");
        assert_eq!(
            PaneHook::DragOver.event(key, 1.0, 2.0),
            PaneEvent::DragOver {
                container: Some(key),
                x: 1.0,
                y: 2.0
            }
        );
        assert_eq!(
            PaneHook::Drop.event(NodeKey::root(), 0.0, 0.0),
            PaneEvent::Drop { container: None }
        );
    }

    #[test]
    fn fresh_pane_is_idle() {
        let pane: DesignPane<u32> = DesignPane::default();
        assert_eq!(pane.state(), PaneState::Idle);
        assert!(pane.overlay().is_none());
        assert!(pane.focused().is_none());
    }

    #[test]
    fn render_without_a_tree_is_none() {
        let mut pane: DesignPane<u32> = DesignPane::default();
        assert!(pane.render().is_none());
    }
}
