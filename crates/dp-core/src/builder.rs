//! Hierarchy builder: the keyed mirror of a host tree.
//!
//! The builder holds the tree last handed to [`HierarchyBuilder::load`].
//! A wired build walks it, assigns every element a positional [`NodeKey`],
//! classifies it through the [`TraversalHelper`], records a [`NodeMeta`]
//! entry and merges a [`Wiring`] into the output. A clean build does the
//! same walk with no cache and no wiring; moves are clean builds with a
//! splice applied at the source and destination containers.
//!
//! Render handles arrive later, once the host has painted: [`bind`] stores
//! them for keys of the current build only.
//!
//! [`bind`]: HierarchyBuilder::bind

use crate::action::{MoveAction, MoveIssue};
use crate::key::{KeyPath, NodeKey};
use crate::layout::LayoutHelper;
use crate::model::{Child, NodeRef, Tree};
use crate::render::{
    EventHandlers, NodeClass, Rendered, RenderedChild, RenderedTree, Wiring,
};
use crate::traversal::{Classified, DefaultTraversalHelper, TraversalHelper};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

// ─── Options ─────────────────────────────────────────────────────────────

/// Options for [`HierarchyBuilder::render_children`].
#[derive(Debug, Clone)]
pub struct BuildOptions<H> {
    /// Skip cache mutation and wiring entirely.
    pub clean_build: bool,
    /// Handlers wired onto every leaf.
    pub leaf_handlers: Option<EventHandlers<H>>,
    /// Handlers wired onto every container.
    pub container_handlers: Option<EventHandlers<H>>,
}

impl<H> Default for BuildOptions<H> {
    fn default() -> Self {
        Self {
            clean_build: false,
            leaf_handlers: None,
            container_handlers: None,
        }
    }
}

impl<H> BuildOptions<H> {
    pub fn clean() -> Self {
        Self {
            clean_build: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_container_handlers(mut self, handlers: EventHandlers<H>) -> Self {
        self.container_handlers = Some(handlers);
        self
    }

    #[must_use]
    pub fn with_leaf_handlers(mut self, handlers: EventHandlers<H>) -> Self {
        self.leaf_handlers = Some(handlers);
        self
    }
}

// ─── Metadata ────────────────────────────────────────────────────────────

/// Cached facts about one keyed node of the last wired build.
#[derive(Clone)]
pub struct NodeMeta<R> {
    /// Position among the parent's child slots (text and empty slots count).
    pub index: usize,
    /// Root-first ancestor keys; `ancestors.last()` is the direct parent.
    pub ancestors: KeyPath,
    pub class: NodeClass,
    /// Present exactly for containers.
    pub layout_helper: Option<Rc<dyn LayoutHelper>>,
    /// The node as loaded. Moves remove it from its parent by this pointer.
    pub node: NodeRef,
    /// Render handle, once the host has bound one.
    pub instance: Option<R>,
}

impl<R: fmt::Debug> fmt::Debug for NodeMeta<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeMeta")
            .field("index", &self.index)
            .field("ancestors", &self.ancestors)
            .field("class", &self.class)
            .field("node", &self.node.ty)
            .field("instance", &self.instance)
            .finish()
    }
}

/// Key → metadata, remembering first-insertion order.
#[derive(Debug)]
struct MetaCache<R> {
    entries: HashMap<NodeKey, NodeMeta<R>>,
    order: Vec<NodeKey>,
}

impl<R> Default for MetaCache<R> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<R> MetaCache<R> {
    fn insert(&mut self, key: NodeKey, meta: NodeMeta<R>) {
        if self.entries.insert(key, meta).is_some() {
            // Sibling identities collided; last writer wins, first position kept.
            log::warn!("duplicate node key {key}; later node replaces earlier one");
        } else {
            self.order.push(key);
        }
    }

    fn get(&self, key: NodeKey) -> Option<&NodeMeta<R>> {
        self.entries.get(&key)
    }

    fn get_mut(&mut self, key: NodeKey) -> Option<&mut NodeMeta<R>> {
        self.entries.get_mut(&key)
    }
}

// ─── Builder ─────────────────────────────────────────────────────────────

/// Keyed mirror of the host tree, generic over the host's render handle `R`.
pub struct HierarchyBuilder<R = ()> {
    controlled: Option<Tree>,
    traversal: Box<dyn TraversalHelper>,
    meta: MetaCache<R>,
}

impl<R> HierarchyBuilder<R> {
    pub fn new(traversal: impl TraversalHelper + 'static) -> Self {
        Self {
            controlled: None,
            traversal: Box::new(traversal),
            meta: MetaCache::default(),
        }
    }

    /// Replace the controlled tree. `None` means nothing is loaded.
    pub fn load(&mut self, tree: Option<Tree>) {
        self.controlled = tree;
    }

    pub fn loaded(&self) -> Option<&Tree> {
        self.controlled.as_ref()
    }

    /// Build the controlled tree.
    ///
    /// Unless `options.clean_build` is set, the metadata cache is replaced by
    /// the one computed during this walk, which also drops every previously
    /// bound handle.
    pub fn render_children<H: Clone>(
        &mut self,
        options: &BuildOptions<H>,
    ) -> Option<RenderedTree<H>> {
        let tree = self.controlled.as_ref()?;

        if options.clean_build {
            let mut walk = Walk::<H, R>::new(self.traversal.as_ref(), options, None, None);
            return Some(walk.build_root(tree));
        }

        let mut cache = MetaCache::default();
        let rendered = {
            let mut walk = Walk::new(self.traversal.as_ref(), options, Some(&mut cache), None);
            walk.build_root(tree)
        };
        log::debug!("wired build: {} keyed nodes", cache.order.len());
        self.meta = cache;
        Some(rendered)
    }

    /// Clean rebuild with `component` relocated to child `before_index` of
    /// `to_container`. Never touches the cache.
    pub fn move_to(
        &self,
        component: NodeKey,
        to_container: NodeKey,
        before_index: usize,
    ) -> Option<RenderedTree> {
        self.apply(&MoveAction::new(component, to_container, before_index))
    }

    /// [`move_to`](Self::move_to) taking the action value.
    ///
    /// A move that cannot be applied is logged and yields the unchanged tree.
    pub fn apply(&self, action: &MoveAction) -> Option<RenderedTree> {
        match self.try_apply(action) {
            Ok(rendered) => rendered,
            Err(issue) => {
                log::warn!("move skipped: {issue}");
                self.clean_rebuild()
            }
        }
    }

    /// Like [`apply`](Self::apply) but reports why a move was not applied.
    /// `Ok(None)` means nothing is loaded.
    pub fn try_apply(&self, action: &MoveAction) -> Result<Option<RenderedTree>, MoveIssue> {
        let Some(tree) = self.controlled.as_ref() else {
            return Ok(None);
        };
        self.validate_move(action)?;
        let Some(moving) = self.meta.get(action.component) else {
            return Err(MoveIssue::UnknownComponent(action.component));
        };

        let destination = if action.to_container.is_root() {
            None
        } else {
            let container = self
                .meta
                .get(action.to_container)
                .ok_or(MoveIssue::UnknownContainer(action.to_container))?;
            Some(container.node.clone())
        };

        let plan = MovePlan {
            action: *action,
            node: moving.node.clone(),
            source_parent: moving.ancestors.last(),
            destination,
            inserted: false,
            removed: false,
        };
        let options = BuildOptions::<()>::clean();
        let mut walk = Walk::<(), R>::new(self.traversal.as_ref(), &options, None, Some(plan));
        let rendered = walk.build_root(tree);

        match walk.plan {
            Some(plan) if plan.inserted && plan.removed => {
                log::debug!(
                    "moved {} into {} at {}",
                    action.component,
                    action.to_container,
                    action.before_index
                );
                Ok(Some(rendered))
            }
            _ => Err(MoveIssue::EndpointShifted(*action)),
        }
    }

    /// Check a move against the current cache without building anything.
    ///
    /// The root sentinel key is a valid destination.
    pub fn validate_move(&self, action: &MoveAction) -> Result<(), MoveIssue> {
        let moving = self
            .meta
            .get(action.component)
            .ok_or(MoveIssue::UnknownComponent(action.component))?;
        if action.to_container.is_root() {
            return Ok(());
        }
        let container = self
            .meta
            .get(action.to_container)
            .ok_or(MoveIssue::UnknownContainer(action.to_container))?;
        if !container.class.is_container() {
            return Err(MoveIssue::NotAContainer(action.to_container));
        }
        if action.to_container == action.component
            || (moving.class.is_container() && container.ancestors.contains(action.component))
        {
            return Err(MoveIssue::IntoOwnSubtree {
                component: action.component,
                container: action.to_container,
            });
        }
        Ok(())
    }

    fn clean_rebuild(&self) -> Option<RenderedTree> {
        let tree = self.controlled.as_ref()?;
        let options = BuildOptions::<()>::clean();
        let mut walk = Walk::<(), R>::new(self.traversal.as_ref(), &options, None, None);
        Some(walk.build_root(tree))
    }

    // ─── Handle binding ──────────────────────────────────────────────────

    /// Store the render handle for `key`. Ignored (returns false) when `key`
    /// is not part of the current build.
    pub fn bind(&mut self, key: NodeKey, handle: R) -> bool {
        match self.meta.get_mut(key) {
            Some(meta) => {
                meta.instance = Some(handle);
                true
            }
            None => {
                log::trace!("stale bind for {key} ignored");
                false
            }
        }
    }

    /// Clear the handle for `key` (the host unmounted it).
    pub fn unbind(&mut self, key: NodeKey) -> Option<R> {
        self.meta.get_mut(key).and_then(|meta| meta.instance.take())
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn instance(&self, key: NodeKey) -> Option<&R> {
        self.meta.get(key).and_then(|meta| meta.instance.as_ref())
    }

    pub fn node(&self, key: NodeKey) -> Option<&NodeRef> {
        self.meta.get(key).map(|meta| &meta.node)
    }

    pub fn is_container(&self, key: NodeKey) -> bool {
        self.meta
            .get(key)
            .is_some_and(|meta| meta.class.is_container())
    }

    pub fn layout_helper(&self, key: NodeKey) -> Option<Rc<dyn LayoutHelper>> {
        self.meta.get(key).and_then(|meta| meta.layout_helper.clone())
    }

    pub fn node_index(&self, key: NodeKey) -> Option<usize> {
        self.meta.get(key).map(|meta| meta.index)
    }

    pub fn ancestors(&self, key: NodeKey) -> Option<&KeyPath> {
        self.meta.get(key).map(|meta| &meta.ancestors)
    }

    pub fn meta(&self, key: NodeKey) -> Option<&NodeMeta<R>> {
        self.meta.get(key)
    }

    /// Every cached key, in cache insertion order (pre-order of the build).
    pub fn keys(&self) -> &[NodeKey] {
        &self.meta.order
    }
}

impl<R> Default for HierarchyBuilder<R> {
    fn default() -> Self {
        Self::new(DefaultTraversalHelper::new())
    }
}

impl<R: fmt::Debug> fmt::Debug for HierarchyBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchyBuilder")
            .field("loaded", &self.controlled.is_some())
            .field("keys", &self.meta.order)
            .finish()
    }
}

// ─── Walk ────────────────────────────────────────────────────────────────

/// A move in progress during a clean walk.
#[derive(Debug)]
struct MovePlan {
    action: MoveAction,
    node: NodeRef,
    source_parent: NodeKey,
    /// The destination as cached. `None` for the root list.
    destination: Option<NodeRef>,
    inserted: bool,
    removed: bool,
}

/// One pass over the controlled tree.
struct Walk<'a, H, R> {
    traversal: &'a dyn TraversalHelper,
    options: &'a BuildOptions<H>,
    /// `None` for clean builds.
    cache: Option<&'a mut MetaCache<R>>,
    plan: Option<MovePlan>,
}

impl<'a, H: Clone, R> Walk<'a, H, R> {
    fn new(
        traversal: &'a dyn TraversalHelper,
        options: &'a BuildOptions<H>,
        cache: Option<&'a mut MetaCache<R>>,
        plan: Option<MovePlan>,
    ) -> Self {
        Self {
            traversal,
            options,
            cache,
            plan,
        }
    }

    fn build_root(&mut self, tree: &[Child]) -> RenderedTree<H> {
        let path = KeyPath::root();
        let slots = self.splice(NodeKey::root(), None, tree);
        RenderedTree::new(self.build_children(&slots, &path))
    }

    fn build_children(&mut self, children: &[Child], ancestors: &KeyPath) -> Vec<RenderedChild<H>> {
        children
            .iter()
            .enumerate()
            .map(|(index, child)| self.build_child(child, index, ancestors))
            .collect()
    }

    fn build_child(&mut self, child: &Child, index: usize, ancestors: &KeyPath) -> RenderedChild<H> {
        match self.traversal.classify(child) {
            Classified::Primitive => match child {
                Child::Text(s) => RenderedChild::Text(s.clone()),
                _ => RenderedChild::Empty,
            },
            Classified::Leaf(node) => {
                let key = ancestors.last().child(node.identity.as_deref(), index);
                RenderedChild::Element(self.build_leaf(node, key, index, ancestors))
            }
            Classified::Container(node, helper) => {
                let key = ancestors.last().child(node.identity.as_deref(), index);
                RenderedChild::Element(self.build_container(node, helper, key, index, ancestors))
            }
        }
    }

    fn build_leaf(
        &mut self,
        node: NodeRef,
        key: NodeKey,
        index: usize,
        ancestors: &KeyPath,
    ) -> Rendered<H> {
        let wiring = self.record(key, || NodeMeta {
            index,
            ancestors: ancestors.clone(),
            class: NodeClass::Leaf,
            layout_helper: None,
            node: node.clone(),
            instance: None,
        });
        let wiring = wiring.then(|| Wiring::new(key, self.options.leaf_handlers.as_ref()));
        Rendered {
            node,
            class: NodeClass::Leaf,
            wiring,
            children: Vec::new(),
        }
    }

    fn build_container(
        &mut self,
        node: NodeRef,
        helper: Rc<dyn LayoutHelper>,
        key: NodeKey,
        index: usize,
        ancestors: &KeyPath,
    ) -> Rendered<H> {
        let wired = self.record(key, || NodeMeta {
            index,
            ancestors: ancestors.clone(),
            class: NodeClass::Container,
            layout_helper: Some(helper.clone()),
            node: node.clone(),
            instance: None,
        });
        let wiring = wired.then(|| Wiring::new(key, self.options.container_handlers.as_ref()));

        let slots = self.splice(key, Some(&node), &node.children);
        let children = self.build_children(&slots, &ancestors.extended(key));
        let node = settle(&node, matches!(slots, Cow::Owned(_)), &children);

        Rendered {
            node,
            class: NodeClass::Container,
            wiring,
            children,
        }
    }

    /// Record metadata when building with a cache. Returns whether this
    /// build wires its output.
    fn record(&mut self, key: NodeKey, meta: impl FnOnce() -> NodeMeta<R>) -> bool {
        match self.cache.as_deref_mut() {
            Some(cache) => {
                cache.insert(key, meta());
                true
            }
            None => false,
        }
    }

    /// Apply the pending move to the child list of the container `key`
    /// (`container` is `None` for the root list). Removal comes first, so the
    /// insertion index is relative to the list without the moving node.
    ///
    /// The destination must match by key and by node. A positional key can
    /// shift onto a sibling once the moving node is removed.
    fn splice<'c>(
        &mut self,
        key: NodeKey,
        container: Option<&NodeRef>,
        children: &'c [Child],
    ) -> Cow<'c, [Child]> {
        let Some(plan) = self.plan.as_mut() else {
            return Cow::Borrowed(children);
        };
        let from_here = !plan.removed && plan.source_parent == key;
        let to_here = !plan.inserted
            && plan.action.to_container == key
            && match (plan.destination.as_ref(), container) {
                (None, None) => true,
                (Some(expected), Some(visited)) => Rc::ptr_eq(expected, visited),
                _ => false,
            };
        if plan.action.to_container == key && !plan.inserted && !to_here {
            log::trace!("{key} now names a different container; not inserting");
        }
        if !from_here && !to_here {
            return Cow::Borrowed(children);
        }

        let mut slots = children.to_vec();
        if from_here {
            match slots.iter().position(|c| c.is_same_node(&plan.node)) {
                Some(pos) => {
                    slots.remove(pos);
                    plan.removed = true;
                }
                None => log::warn!("{key} no longer holds {}", plan.action.component),
            }
        }
        if to_here {
            let at = plan.action.before_index.min(slots.len());
            slots.insert(at, Child::Element(plan.node.clone()));
            plan.inserted = true;
        }
        Cow::Owned(slots)
    }
}

/// The node to render for a container: the original when its children came
/// out slot-for-slot identical, a rebuilt one otherwise.
fn settle<H>(original: &NodeRef, spliced: bool, children: &[RenderedChild<H>]) -> NodeRef {
    let unchanged = !spliced
        && children.len() == original.children.len()
        && children
            .iter()
            .zip(&original.children)
            .all(|(rendered, slot)| rendered.renders(slot));
    if unchanged {
        return original.clone();
    }
    let slots = children.iter().map(RenderedChild::to_child).collect();
    Rc::new(original.with_replaced_children(slots))
}
