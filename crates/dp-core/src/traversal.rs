//! Container/leaf classification policy.

use crate::layout::{FlowLayoutHelper, LayoutHelper};
use crate::model::{Child, ElementType, Node, NodeRef};
use std::rc::Rc;

/// Intrinsic kinds treated as containers by [`DefaultTraversalHelper`].
pub const DEFAULT_CONTAINER_KINDS: &[&str] = &["div", "section", "article"];

/// Classification of one child slot, decided once per build.
#[derive(Debug, Clone)]
pub enum Classified {
    /// Text or empty slot; passed through untouched.
    Primitive,
    Leaf(NodeRef),
    Container(NodeRef, Rc<dyn LayoutHelper>),
}

/// Decides which nodes can hold children and receive drops.
pub trait TraversalHelper {
    fn is_container(&self, node: &Node) -> bool;

    /// Must return `Some` exactly when [`is_container`](Self::is_container)
    /// returns true.
    fn layout_helper(&self, node: &Node) -> Option<Rc<dyn LayoutHelper>>;

    fn classify(&self, child: &Child) -> Classified {
        let node = match child {
            Child::Element(node) => node,
            Child::Text(_) | Child::Empty => return Classified::Primitive,
        };
        if !self.is_container(node) {
            return Classified::Leaf(node.clone());
        }
        match self.layout_helper(node) {
            Some(helper) => Classified::Container(node.clone(), helper),
            None => {
                log::warn!(
                    "container <{}> has no layout helper; using flow layout",
                    node.ty.name()
                );
                Classified::Container(node.clone(), Rc::new(FlowLayoutHelper))
            }
        }
    }
}

/// Allow-list policy: listed intrinsic kinds are containers with a flow
/// layout, everything else (every component type included) is a leaf.
#[derive(Debug, Clone)]
pub struct DefaultTraversalHelper {
    container_kinds: Vec<String>,
    flow: Rc<FlowLayoutHelper>,
}

impl DefaultTraversalHelper {
    pub fn new() -> Self {
        Self::with_container_kinds(DEFAULT_CONTAINER_KINDS.iter().copied())
    }

    pub fn with_container_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            container_kinds: kinds.into_iter().map(|k| k.as_ref().to_string()).collect(),
            flow: Rc::new(FlowLayoutHelper),
        }
    }

    pub fn container_kinds(&self) -> &[String] {
        &self.container_kinds
    }
}

impl Default for DefaultTraversalHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl TraversalHelper for DefaultTraversalHelper {
    fn is_container(&self, node: &Node) -> bool {
        match &node.ty {
            ElementType::Intrinsic(name) => self.container_kinds.iter().any(|k| k == name),
            ElementType::Component(_) => false,
        }
    }

    fn layout_helper(&self, node: &Node) -> Option<Rc<dyn LayoutHelper>> {
        if self.is_container(node) {
            Some(self.flow.clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allow_list() {
        let helper = DefaultTraversalHelper::new();
        for kind in ["div", "section", "article"] {
            let node = Node::element(kind);
            assert!(helper.is_container(&node), "{kind} should be a container");
            assert!(helper.layout_helper(&node).is_some());
        }
        for kind in ["button", "span", "input"] {
            let node = Node::element(kind);
            assert!(!helper.is_container(&node), "{kind} should be a leaf");
            assert!(helper.layout_helper(&node).is_none());
        }
    }

    #[test]
    fn components_are_leaves_even_when_named_like_containers() {
        let helper = DefaultTraversalHelper::new();
        assert!(!helper.is_container(&Node::component("div")));
    }

    #[test]
    fn classify_covers_every_slot_kind() {
        let helper = DefaultTraversalHelper::new();
        assert!(matches!(
            helper.classify(&Child::text("hi")),
            Classified::Primitive
        ));
        assert!(matches!(helper.classify(&Child::Empty), Classified::Primitive));
        assert!(matches!(
            helper.classify(&Node::element("span").into()),
            Classified::Leaf(_)
        ));
        assert!(matches!(
            helper.classify(&Node::element("div").into()),
            Classified::Container(..)
        ));
    }

    #[test]
    fn custom_allow_list() {
        let helper = DefaultTraversalHelper::with_container_kinds(["ul", "li"]);
        assert!(helper.is_container(&Node::element("ul")));
        assert!(!helper.is_container(&Node::element("div")));
    }

    #[derive(Debug)]
    struct Inconsistent;

    impl TraversalHelper for Inconsistent {
        fn is_container(&self, _node: &Node) -> bool {
            true
        }

        fn layout_helper(&self, _node: &Node) -> Option<Rc<dyn LayoutHelper>> {
            None
        }
    }

    #[test]
    fn classify_falls_back_to_flow_for_inconsistent_policies() {
        assert!(matches!(
            Inconsistent.classify(&Node::element("x").into()),
            Classified::Container(..)
        ));
    }
}
