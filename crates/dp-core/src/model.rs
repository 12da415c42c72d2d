//! Node model for controlled trees.
//!
//! A tree is an ordered list of [`Child`] slots. Element slots hold a shared,
//! immutable [`Node`]; the `Rc` pointer is the node's identity, which is what
//! lets a move relocate a node without copying it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Shared handle to an immutable node.
pub type NodeRef = Rc<Node>;

/// A list of child slots; the unit hosts hand to `HierarchyBuilder::load`.
pub type Tree = Vec<Child>;

// ─── Element types ───────────────────────────────────────────────────────

/// What kind of element a node describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// A primitive element kind of the host renderer (`div`, `button`, ...).
    Intrinsic(String),
    /// A user-defined component.
    Component(String),
}

impl ElementType {
    pub fn name(&self) -> &str {
        match self {
            Self::Intrinsic(name) | Self::Component(name) => name,
        }
    }

    pub fn is_intrinsic(&self) -> bool {
        matches!(self, Self::Intrinsic(_))
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Attribute map; names are unique and iterate in sorted order.
pub type Attrs = BTreeMap<String, AttrValue>;

// ─── Nodes ───────────────────────────────────────────────────────────────

/// One child slot in a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// A text (or other primitive) value.
    Text(String),
    /// An empty slot. Still occupies a sibling position.
    Empty,
    /// A nested element.
    Element(NodeRef),
}

impl Child {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Self::Element(node) => Some(node),
            _ => None,
        }
    }

    /// True when both slots hold the very same node (pointer identity).
    pub fn is_same_node(&self, node: &NodeRef) -> bool {
        matches!(self, Self::Element(n) if Rc::ptr_eq(n, node))
    }

    /// Cheap identity check between two slots: same `Rc` for elements,
    /// equal values for primitives.
    pub fn same_slot(&self, other: &Child) -> bool {
        match (self, other) {
            (Self::Element(a), Self::Element(b)) => Rc::ptr_eq(a, b),
            (a, b) => a == b,
        }
    }
}

impl From<NodeRef> for Child {
    fn from(node: NodeRef) -> Self {
        Self::Element(node)
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Self::Element(Rc::new(node))
    }
}

impl From<&str> for Child {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Immutable description of one UI element.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub ty: ElementType,

    /// Host-supplied identity, stable across rebuilds. Takes the place of the
    /// sibling index when keys are computed.
    pub identity: Option<String>,

    pub attrs: Attrs,

    pub children: Vec<Child>,
}

impl Node {
    pub fn new(ty: ElementType) -> Self {
        Self {
            ty,
            identity: None,
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    /// An intrinsic element, e.g. `Node::element("div")`.
    pub fn element(name: &str) -> Self {
        Self::new(ElementType::Intrinsic(name.to_string()))
    }

    /// A user-defined component element.
    pub fn component(name: &str) -> Self {
        Self::new(ElementType::Component(name.to_string()))
    }

    #[must_use]
    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = Some(identity.to_string());
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Child>) -> Self {
        self.children.extend(children);
        self
    }

    /// Same type, identity and attributes, different children.
    /// Used when a rebuild has to replace the child list of a container.
    pub fn with_replaced_children(&self, children: Vec<Child>) -> Self {
        Self {
            ty: self.ty.clone(),
            identity: self.identity.clone(),
            attrs: self.attrs.clone(),
            children,
        }
    }

    /// Element children only, in order.
    pub fn element_children(&self) -> impl Iterator<Item = &NodeRef> {
        self.children.iter().filter_map(Child::as_node)
    }

    /// Wrap in an `Rc` for use as a tree slot.
    pub fn into_ref(self) -> NodeRef {
        Rc::new(self)
    }
}

/// Find the first node (depth-first, document order) whose identity matches.
pub fn find_by_identity<'a>(tree: &'a [Child], identity: &str) -> Option<&'a NodeRef> {
    for child in tree {
        if let Child::Element(node) = child {
            if node.identity.as_deref() == Some(identity) {
                return Some(node);
            }
            if let Some(found) = find_by_identity(&node.children, identity) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_compose() {
        let node = Node::element("div")
            .with_identity("A")
            .with_attr("class", "row")
            .with_attr("hidden", false)
            .with_child(Node::element("button").with_identity("b1"))
            .with_child("label");

        assert_eq!(node.ty, ElementType::Intrinsic("div".into()));
        assert_eq!(node.identity.as_deref(), Some("A"));
        assert_eq!(node.attrs["class"], AttrValue::Str("row".into()));
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.element_children().count(), 1);
    }

    #[test]
    fn slot_identity_is_pointer_identity() {
        let a = Node::element("span").into_ref();
        let twin = Node::element("span").into_ref();
        let slot = Child::Element(a.clone());

        assert!(slot.is_same_node(&a));
        assert!(!slot.is_same_node(&twin));
        // Structurally equal, but not the same slot.
        assert_eq!(slot, Child::Element(twin.clone()));
        assert!(!slot.same_slot(&Child::Element(twin)));
        assert!(Child::text("x").same_slot(&Child::text("x")));
    }

    #[test]
    fn replaced_children_keep_everything_else() {
        let node = Node::component("Card")
            .with_identity("c")
            .with_attr("elevation", 2.0)
            .with_child("old");
        let rebuilt = node.with_replaced_children(vec![Child::text("new")]);
        assert_eq!(rebuilt.ty, node.ty);
        assert_eq!(rebuilt.identity, node.identity);
        assert_eq!(rebuilt.attrs, node.attrs);
        assert_eq!(rebuilt.children, vec![Child::text("new")]);
    }

    #[test]
    fn find_by_identity_searches_depth_first() {
        let tree: Tree = vec![
            Node::element("div")
                .with_identity("A")
                .with_child(Node::element("button").with_identity("b1"))
                .into(),
            Node::element("div").with_identity("B").into(),
        ];
        assert!(find_by_identity(&tree, "b1").is_some());
        assert!(find_by_identity(&tree, "B").is_some());
        assert!(find_by_identity(&tree, "nope").is_none());
    }
}
