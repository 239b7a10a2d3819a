// src/lib.rs - MiVi Special Length Tool Library

//! # MiVi Special Length
//!
//! Two-handle length measurement annotation for the MiVi medical image viewer.
//!
//! ## Features
//!
//! - **Length measurement**: physical length in mm on calibrated images, pixels otherwise
//! - **Length-preserving rotation**: grabbing the end handle rotates the line around its start
//! - **Movable label**: dragged labels stay put and get a dashed leader line
//! - **Guide ticks**: perpendicular marks at the midpoint and thirds of the line
//! - **Mouse and touch**: both input paths share the same gesture handling
//!
//! ## Architecture
//!
//! - **host**: interfaces of the viewer the tool plugs into (viewport transform,
//!   pointer events, annotation store, canvas)
//! - **tool**: the measurement records, hit-testing, drag sessions, rendering and
//!   the tool state machine
//! - **script**: replays recorded gestures against a tool instance
//!
//! ## Usage
//!
//! ```rust
//! use mivi_special_length::{
//!     geometry::Point,
//!     host::{AffineViewport, ImageInfo, PointerEvent, RecordingCanvas, ToolStateStore},
//!     tool::{SpecialLengthTool, ToolEventBus},
//!     MouseButtonMask,
//! };
//!
//! let image = ImageInfo::new(512, 512).with_pixel_spacing(0.5, 0.5);
//! let viewport = AffineViewport::new("axial", image);
//! let mut tool = SpecialLengthTool::new(viewport, ToolStateStore::shared(), ToolEventBus::default());
//! tool.activate(MouseButtonMask::LEFT);
//!
//! let down = PointerEvent::at(tool.viewport(), Point::new(10.0, 10.0), 1);
//! tool.on_mouse_down_activate(&down);
//! let drag = down.moved_to(tool.viewport(), Point::new(40.0, 50.0));
//! tool.on_mouse_drag(&drag);
//! tool.on_mouse_up(&drag);
//!
//! let mut canvas = RecordingCanvas::default();
//! tool.on_image_rendered(&mut canvas);
//! assert_eq!(canvas.texts().collect::<Vec<_>>(), vec!["25.00 mm"]);
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod cli;
pub mod error;
pub mod geometry;
pub mod host;
pub mod script;
pub mod tool;

// Re-exports for convenience
pub use cli::{Args, LogLevel};
pub use error::{ErrorReporter, ResultExt, SpecialLengthError, SpecialLengthResult};
pub use host::{AffineViewport, ImageInfo, MouseButtonMask, PointerEvent, SurfaceId, Viewport};
pub use script::{GestureScript, ReplayReport, ScriptRunner};
pub use tool::{
    MeasurementData, SpecialLengthTool, ToolConfiguration, ToolEvent, ToolEventBus, ToolMode,
    TOOL_TYPE,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with specified level
///
/// `RUST_LOG` takes precedence over `level`. Logs go to stderr so the JSON
/// report on stdout stays clean.
pub fn init_logging(level: LogLevel) -> SpecialLengthResult<()> {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("mivi_special_length={}", level.as_filter())))
        .map_err(|e| SpecialLengthError::config(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(true)
        .try_init()
        .map_err(|e| SpecialLengthError::config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}
