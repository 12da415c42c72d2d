//! Structural actions applied by the hierarchy builder.

use crate::key::NodeKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relocate `component` so it becomes child number `before_index` of
/// `to_container`.
///
/// When source and destination are the same container, `before_index` is
/// relative to the child list with the node already removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveAction {
    pub component: NodeKey,
    pub to_container: NodeKey,
    pub before_index: usize,
}

impl MoveAction {
    pub fn new(component: NodeKey, to_container: NodeKey, before_index: usize) -> Self {
        Self {
            component,
            to_container,
            before_index,
        }
    }
}

/// Why a move cannot be applied against the current metadata cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveIssue {
    /// No cached node has the component key.
    UnknownComponent(NodeKey),
    /// No cached node has the destination key.
    UnknownContainer(NodeKey),
    /// The destination exists but is a leaf.
    NotAContainer(NodeKey),
    /// The destination is the component itself or one of its descendants.
    IntoOwnSubtree {
        component: NodeKey,
        container: NodeKey,
    },
    /// The move never reached one of its endpoints, because an earlier
    /// splice shifted a positional key away from the destination or shifted
    /// a sibling container onto it.
    EndpointShifted(MoveAction),
}

impl fmt::Display for MoveIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownComponent(key) => write!(f, "unknown component {key}"),
            Self::UnknownContainer(key) => write!(f, "unknown container {key}"),
            Self::NotAContainer(key) => write!(f, "{key} is not a container"),
            Self::IntoOwnSubtree {
                component,
                container,
            } => write!(f, "cannot move {component} into its own subtree at {container}"),
            Self::EndpointShifted(action) => write!(
                f,
                "move of {} into {} lost an endpoint to a shifted key",
                action.component, action.to_container
            ),
        }
    }
}

impl std::error::Error for MoveIssue {}
