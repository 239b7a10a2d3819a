// src/host/mod.rs - Viewer-side collaborators the annotation tool is plugged into
//
// The viewer owns the render loop, the pixel/canvas transforms, the per-surface
// tool state and the pointer routing. These modules describe that surface as
// the tool sees it.

pub mod canvas;
pub mod input;
pub mod state;
pub mod viewport;

pub use canvas::{Canvas, DrawCommand, RecordingCanvas, Shadow, StrokeStyle, TextBoxOptions};
pub use input::{EventPoints, MouseButtonMask, PointerEvent};
pub use state::{Identified, MeasurementId, SharedToolState, ToolStateStore};
pub use viewport::{AffineViewport, ImageInfo, SurfaceId, Viewport};
