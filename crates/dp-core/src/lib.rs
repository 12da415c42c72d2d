pub mod action;
pub mod builder;
pub mod emitter;
pub mod geometry;
pub mod key;
pub mod layout;
pub mod model;
pub mod notation;
pub mod render;
pub mod traversal;

pub use action::{MoveAction, MoveIssue};
pub use builder::{BuildOptions, HierarchyBuilder, NodeMeta};
pub use emitter::{emit_tree, emit_tree_pretty};
pub use geometry::{Offset, Rect};
pub use key::{KeyPath, NodeKey};
pub use layout::{
    ChildRect, DragContext, FlowLayoutHelper, GeometryContext, LayoutHelper, LayoutHint,
};
pub use model::*;
pub use notation::{parse_node, parse_tree};
pub use render::{
    BoundHandler, EventHandlers, NodeClass, ON_DRAG_OVER, ON_DRAG_START, ON_DROP, Rendered,
    RenderedChild, RenderedTree, Wiring,
};
pub use traversal::{Classified, DefaultTraversalHelper, TraversalHelper};
