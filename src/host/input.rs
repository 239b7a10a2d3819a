// src/host/input.rs - Pointer events as delivered by the viewer's input routing

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::host::viewport::Viewport;

/// Bit mask of the mouse buttons a tool responds to (bit 0 = left, 1 = middle, 2 = right)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButtonMask(pub u8);

impl MouseButtonMask {
    pub const LEFT: MouseButtonMask = MouseButtonMask(1);
    pub const MIDDLE: MouseButtonMask = MouseButtonMask(2);
    pub const RIGHT: MouseButtonMask = MouseButtonMask(4);

    /// Whether the button reported as `which` (1-based, 0 = none) is in the mask
    pub fn is_enabled(self, which: u8) -> bool {
        if which == 0 || which > 8 {
            return false;
        }
        self.0 & (1 << (which - 1)) != 0
    }
}

impl Default for MouseButtonMask {
    fn default() -> Self {
        Self::LEFT
    }
}

/// One pointer position expressed in both coordinate spaces
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventPoints {
    pub image: Point,
    pub canvas: Point,
}

impl EventPoints {
    /// Build from a canvas position using the surface transform
    pub fn from_canvas<V: Viewport + ?Sized>(viewport: &V, canvas: Point) -> Self {
        Self {
            image: viewport.canvas_to_pixel(canvas),
            canvas,
        }
    }
}

/// Mouse or touch event data
///
/// `which` is the pressed button (1-based, 0 when no button is held; touch
/// events always report 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub which: u8,
    /// Where the gesture started
    pub start_points: EventPoints,
    /// Previous position in the gesture
    pub last_points: EventPoints,
    pub current_points: EventPoints,
}

impl PointerEvent {
    /// First event of a gesture at a canvas position
    pub fn at<V: Viewport + ?Sized>(viewport: &V, canvas: Point, which: u8) -> Self {
        let points = EventPoints::from_canvas(viewport, canvas);
        Self {
            which,
            start_points: points,
            last_points: points,
            current_points: points,
        }
    }

    /// Next event of the same gesture, the pointer now at `canvas`
    pub fn moved_to<V: Viewport + ?Sized>(&self, viewport: &V, canvas: Point) -> Self {
        Self {
            which: self.which,
            start_points: self.start_points,
            last_points: self.current_points,
            current_points: EventPoints::from_canvas(viewport, canvas),
        }
    }

    /// Image-space movement since the previous event
    pub fn image_delta(&self) -> (f64, f64) {
        self.last_points.image.delta_to(self.current_points.image)
    }

    pub fn has_button(&self) -> bool {
        self.which != 0
    }
}
