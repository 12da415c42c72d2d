//! Rectangles and offsets reported by the host renderer.
//!
//! All host geometry is in page coordinates. Layout helpers translate it into
//! a container's local space by subtracting the container's content offset.

use serde::{Deserialize, Serialize};

/// A translation in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box of a painted element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Average of opposite corners.
    pub fn center(&self) -> (f32, f32) {
        ((self.left() + self.right()) / 2.0, (self.top() + self.bottom()) / 2.0)
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.left() && px <= self.right() && py >= self.top() && py <= self.bottom()
    }

    /// The same box expressed relative to `origin`.
    #[must_use]
    pub fn translated(&self, origin: Offset) -> Rect {
        Rect {
            x: self.x - origin.x,
            y: self.y - origin.y,
            ..*self
        }
    }

    /// Origin of this box's content area, given the border widths the host
    /// reports (`clientLeft` / `clientTop` in DOM terms).
    pub fn content_origin(&self, border_left: f32, border_top: f32) -> Offset {
        Offset::new(self.x + border_left, self.y + border_top)
    }
}

/// Position of `child` relative to the content area starting at `container`.
///
/// This is what the focus overlay is positioned with.
pub fn relative_position(container: Offset, child: Rect) -> Rect {
    child.translated(container)
}
