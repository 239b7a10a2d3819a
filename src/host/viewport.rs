// src/host/viewport.rs - Image surface and pixel/canvas coordinate transforms

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Identifier of a rendering surface (one displayed image element)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SurfaceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SurfaceId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata of the displayed image the measurements are anchored to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Physical size of a pixel along a row (mm), if calibrated
    pub row_pixel_spacing: Option<f64>,
    /// Physical size of a pixel along a column (mm), if calibrated
    pub column_pixel_spacing: Option<f64>,
}

impl ImageInfo {
    /// Uncalibrated image: lengths are reported in pixels
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            row_pixel_spacing: None,
            column_pixel_spacing: None,
        }
    }

    pub fn with_pixel_spacing(mut self, row: f64, column: f64) -> Self {
        self.row_pixel_spacing = Some(row);
        self.column_pixel_spacing = Some(column);
        self
    }

    /// True when both axes carry a usable (non-zero) spacing
    pub fn has_pixel_spacing(&self) -> bool {
        usable_spacing(self.row_pixel_spacing).is_some()
            && usable_spacing(self.column_pixel_spacing).is_some()
    }

    /// Spacing used for length computation as `(column, row)`, each axis
    /// falling back to 1 when missing or zero
    pub fn effective_spacing(&self) -> (f64, f64) {
        (
            usable_spacing(self.column_pixel_spacing).unwrap_or(1.0),
            usable_spacing(self.row_pixel_spacing).unwrap_or(1.0),
        )
    }

    /// Whether a pixel-space point lies on the image (edges inclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.x <= self.width as f64
            && point.y >= 0.0
            && point.y <= self.height as f64
    }

    /// Nearest point on the image to `point`
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(0.0, self.width as f64),
            point.y.clamp(0.0, self.height as f64),
        )
    }
}

fn usable_spacing(spacing: Option<f64>) -> Option<f64> {
    spacing.filter(|value| value.is_finite() && *value != 0.0)
}

/// Coordinate transform service for one surface
pub trait Viewport {
    /// Surface this viewport renders into
    fn surface_id(&self) -> &SurfaceId;

    /// Image currently displayed on the surface
    fn image(&self) -> &ImageInfo;

    /// Image pixel space to canvas space
    fn pixel_to_canvas(&self, point: Point) -> Point;

    /// Canvas space to image pixel space
    fn canvas_to_pixel(&self, point: Point) -> Point;
}

/// Zoom + pan transform: `canvas = pixel * scale + translation`
#[derive(Debug, Clone, PartialEq)]
pub struct AffineViewport {
    surface_id: SurfaceId,
    image: ImageInfo,
    scale: f64,
    translation: Point,
}

impl AffineViewport {
    pub fn new(surface_id: impl Into<SurfaceId>, image: ImageInfo) -> Self {
        Self {
            surface_id: surface_id.into(),
            image,
            scale: 1.0,
            translation: Point::default(),
        }
    }

    /// Set the zoom factor; non-positive or non-finite values are ignored
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.set_scale(scale);
        self
    }

    pub fn with_translation(mut self, translation: Point) -> Self {
        self.translation = translation;
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
    }

    pub fn translation(&self) -> Point {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Point) {
        self.translation = translation;
    }

    pub fn set_image(&mut self, image: ImageInfo) {
        self.image = image;
    }
}

impl Viewport for AffineViewport {
    fn surface_id(&self) -> &SurfaceId {
        &self.surface_id
    }

    fn image(&self) -> &ImageInfo {
        &self.image
    }

    fn pixel_to_canvas(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.translation.x,
            point.y * self.scale + self.translation.y,
        )
    }

    fn canvas_to_pixel(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.translation.x) / self.scale,
            (point.y - self.translation.y) / self.scale,
        )
    }
}
