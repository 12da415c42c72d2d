pub mod config;
pub mod dnd;
pub mod host;
pub mod input;
pub mod pane;
pub mod session;

pub use config::{GhostStyle, HitPolicy, PaneConfig};
pub use dnd::{DefaultDragAndDropHelper, DragAndDropHelper};
pub use host::{ChildBox, RenderHost};
pub use input::{DropEffect, PaneEvent, PaneResponse};
pub use pane::{ContainerPath, DesignPane, Focus, Overlay, PaneHook, PaneState};
pub use session::{DragSession, Ghost, PendingDrop};
