//! Output of a hierarchy build: the controlled tree.
//!
//! Every element position carries the [`NodeRef`] rendered there. Wired
//! builds also attach a [`Wiring`]: the positional key plus the event
//! handlers bound to that key. Hosts attach those handlers to whatever they
//! paint for the element.

use crate::key::NodeKey;
use crate::model::{Child, NodeRef, Tree};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Event name for drag-over hooks.
pub const ON_DRAG_OVER: &str = "onDragOver";
/// Event name for drop hooks.
pub const ON_DROP: &str = "onDrop";
/// Event name for drag-start hooks.
pub const ON_DRAG_START: &str = "onDragStart";

/// Handlers keyed by event name.
pub type EventHandlers<H> = BTreeMap<String, H>;

/// Container or leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Container,
    Leaf,
}

impl NodeClass {
    pub fn is_container(self) -> bool {
        self == Self::Container
    }
}

/// A handler bound to the key of the element it was wired onto.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundHandler<H> {
    pub event: String,
    pub key: NodeKey,
    pub handler: H,
}

impl<H> BoundHandler<H> {
    /// Invoke a callable handler with its bound key and the raw event.
    pub fn call<E, R>(&self, event: &E) -> R
    where
        H: Fn(NodeKey, &E) -> R,
    {
        (self.handler)(self.key, event)
    }
}

/// Key and handlers merged into an element by a wired build.
#[derive(Debug, Clone, PartialEq)]
pub struct Wiring<H> {
    pub key: NodeKey,
    pub handlers: SmallVec<[BoundHandler<H>; 2]>,
}

impl<H: Clone> Wiring<H> {
    pub fn new(key: NodeKey, handlers: Option<&EventHandlers<H>>) -> Self {
        let handlers = handlers
            .into_iter()
            .flatten()
            .map(|(event, handler)| BoundHandler {
                event: event.clone(),
                key,
                handler: handler.clone(),
            })
            .collect();
        Self { key, handlers }
    }
}

impl<H> Wiring<H> {
    pub fn handler(&self, event: &str) -> Option<&BoundHandler<H>> {
        self.handlers.iter().find(|h| h.event == event)
    }
}

/// One element of the controlled tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered<H> {
    /// The node rendered at this position. Containers whose children changed
    /// during a move get a rebuilt node; everything else is the original.
    pub node: NodeRef,
    pub class: NodeClass,
    /// `None` in clean builds.
    pub wiring: Option<Wiring<H>>,
    /// Controlled children. Always empty for leaves: a leaf's content is
    /// `node.children`, passed through as is.
    pub children: Vec<RenderedChild<H>>,
}

impl<H> Rendered<H> {
    pub fn key(&self) -> Option<NodeKey> {
        self.wiring.as_ref().map(|w| w.key)
    }
}

/// One child slot of the controlled tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedChild<H> {
    Text(String),
    Empty,
    Element(Rendered<H>),
}

impl<H> RenderedChild<H> {
    pub fn as_element(&self) -> Option<&Rendered<H>> {
        match self {
            Self::Element(r) => Some(r),
            _ => None,
        }
    }

    /// True when this position still renders exactly `slot`: the same `Rc`
    /// for elements, an equal value for primitives.
    pub fn renders(&self, slot: &Child) -> bool {
        match (self, slot) {
            (Self::Element(r), Child::Element(node)) => Rc::ptr_eq(&r.node, node),
            (Self::Text(a), Child::Text(b)) => a == b,
            (Self::Empty, Child::Empty) => true,
            _ => false,
        }
    }

    /// Plain slot for this position.
    pub fn to_child(&self) -> Child {
        match self {
            Self::Text(s) => Child::Text(s.clone()),
            Self::Empty => Child::Empty,
            Self::Element(r) => Child::Element(r.node.clone()),
        }
    }
}

/// The controlled tree returned by builds and moves.
///
/// Handler type defaults to `()` for clean builds, which carry no wiring.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTree<H = ()> {
    pub children: Vec<RenderedChild<H>>,
}

impl<H> RenderedTree<H> {
    pub fn new(children: Vec<RenderedChild<H>>) -> Self {
        Self { children }
    }

    /// Plain tree, suitable for handing back to `HierarchyBuilder::load`.
    pub fn to_tree(&self) -> Tree {
        self.children.iter().map(RenderedChild::to_child).collect()
    }

    /// Depth-first search for the element wired with `key`.
    pub fn find(&self, key: NodeKey) -> Option<&Rendered<H>> {
        fn walk<H>(children: &[RenderedChild<H>], key: NodeKey) -> Option<&Rendered<H>> {
            for child in children {
                if let RenderedChild::Element(r) = child {
                    if r.key() == Some(key) {
                        return Some(r);
                    }
                    if let Some(found) = walk(&r.children, key) {
                        return Some(found);
                    }
                }
            }
            None
        }
        walk(&self.children, key)
    }

    /// Every wired key, in document order.
    pub fn keys(&self) -> Vec<NodeKey> {
        fn walk<H>(children: &[RenderedChild<H>], out: &mut Vec<NodeKey>) {
            for child in children {
                if let RenderedChild::Element(r) = child {
                    out.extend(r.key());
                    walk(&r.children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }
}
