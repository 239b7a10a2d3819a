// src/cli.rs - Command Line Interface for the MiVi special length tool

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::geometry::Point;
use crate::host::viewport::ImageInfo;
use crate::tool::config::ToolConfiguration;

/// MiVi special length - replay measurement gestures against an image surface
#[derive(Parser, Debug, Clone)]
#[command(name = "MiVi Special Length")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replay length measurement gestures and report the resulting annotations")]
#[command(long_about = r#"
MiVi Special Length

Drives the two-handle length measurement tool of the MiVi viewer from a JSON
gesture script. Pointer coordinates in the script are canvas coordinates; the
surface maps them to image pixels through the given zoom and pan.

SCRIPT FORMAT:
  { "steps": [
      { "op": "activate" },
      { "op": "down", "x": 10, "y": 10 },
      { "op": "drag", "x": 40, "y": 50 },
      { "op": "up" },
      { "op": "render" }
  ] }

EXAMPLES:
  # Calibrated CT slice, 0.7mm pixels, zoomed in
  mivi_special_length --script gestures.json --row-spacing 0.7 --column-spacing 0.7 --zoom 2

  # Uncalibrated image, report written to a file
  mivi_special_length --script gestures.json --output report.json --pretty
"#)]
pub struct Args {
    /// Gesture script to replay
    #[arg(short = 's', long)]
    #[arg(help = "JSON gesture script to replay")]
    pub script: PathBuf,

    /// Configuration file path
    #[arg(short = 'c', long)]
    #[arg(help = "Load tool configuration from file (default: user config dir)")]
    pub config: Option<PathBuf>,

    /// Surface identifier
    #[arg(long, default_value = "viewport-0")]
    #[arg(help = "Identifier of the image surface")]
    pub surface: String,

    /// Image width in pixels
    #[arg(long, default_value_t = 512)]
    #[arg(help = "Image width in pixels")]
    pub image_width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 512)]
    #[arg(help = "Image height in pixels")]
    pub image_height: u32,

    /// Row pixel spacing in mm
    #[arg(long)]
    #[arg(help = "Row pixel spacing in mm (lengths are reported in pixels without it)")]
    pub row_spacing: Option<f64>,

    /// Column pixel spacing in mm
    #[arg(long)]
    #[arg(help = "Column pixel spacing in mm (lengths are reported in pixels without it)")]
    pub column_spacing: Option<f64>,

    /// Zoom factor
    #[arg(short = 'z', long, default_value_t = 1.0)]
    #[arg(help = "Canvas units per image pixel")]
    pub zoom: f64,

    /// Horizontal pan
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    #[arg(help = "Canvas x of the image origin")]
    pub pan_x: f64,

    /// Vertical pan
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    #[arg(help = "Canvas y of the image origin")]
    pub pan_y: f64,

    /// Disable guide ticks
    #[arg(long, default_value_t = false)]
    #[arg(help = "Do not draw guide ticks on inactive measurements")]
    pub no_guide_lines: bool,

    /// Stroke width override
    #[arg(long)]
    #[arg(help = "Line width of the measurement strokes")]
    pub line_width: Option<f64>,

    /// Enable drop shadows
    #[arg(long, default_value_t = false)]
    #[arg(help = "Draw a drop shadow under every stroke")]
    pub shadow: bool,

    /// Report destination
    #[arg(short = 'o', long)]
    #[arg(help = "Write the JSON report to a file instead of stdout")]
    pub output: Option<PathBuf>,

    /// Pretty-print the report
    #[arg(long, default_value_t = false)]
    #[arg(help = "Pretty-print the JSON report")]
    pub pretty: bool,

    /// Enable verbose debug output
    #[arg(short = 'v', long, default_value_t = false)]
    #[arg(help = "Enable verbose logging and debug output")]
    pub verbose: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    #[arg(value_enum)]
    #[arg(help = "Logging level (error, warn, info, debug, trace)")]
    pub log_level: LogLevel,
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Error level only
    Error,
    /// Warning and error levels
    Warn,
    /// Info, warning, and error levels
    Info,
    /// Debug and above levels
    Debug,
    /// All log levels (most verbose)
    Trace,
}

impl LogLevel {
    /// Convert to tracing level filter
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }

    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Args {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<(), String> {
        if self.surface.is_empty() {
            return Err("Surface identifier cannot be empty".to_string());
        }

        // Validate dimensions
        if self.image_width == 0 || self.image_height == 0 {
            return Err("Image width and height must be greater than 0".to_string());
        }

        if self.image_width > 16384 || self.image_height > 16384 {
            return Err("Image dimensions too large (max 16384x16384)".to_string());
        }

        for (name, spacing) in [("Row", self.row_spacing), ("Column", self.column_spacing)] {
            if let Some(spacing) = spacing {
                if !spacing.is_finite() || spacing < 0.0 {
                    return Err(format!("{} spacing must be a non-negative number", name));
                }
            }
        }

        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err("Zoom must be greater than 0".to_string());
        }

        if self.zoom > 64.0 {
            return Err("Zoom too large (max 64)".to_string());
        }

        if !self.pan_x.is_finite() || !self.pan_y.is_finite() {
            return Err("Pan offsets must be finite".to_string());
        }

        if let Some(width) = self.line_width {
            if !width.is_finite() || width <= 0.0 {
                return Err("Line width must be greater than 0".to_string());
            }
        }

        if !self.script.exists() {
            return Err(format!("Gesture script does not exist: {}", self.script.display()));
        }

        if let Some(ref config_file) = self.config {
            if !config_file.exists() {
                return Err(format!("Configuration file does not exist: {}", config_file.display()));
            }
        }

        Ok(())
    }

    /// `--verbose` raises the level to at least debug
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose && self.log_level.to_tracing_level() < tracing::Level::DEBUG {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }

    pub fn image_info(&self) -> ImageInfo {
        let mut image = ImageInfo::new(self.image_width, self.image_height);
        image.row_pixel_spacing = self.row_spacing;
        image.column_pixel_spacing = self.column_spacing;
        image
    }

    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Apply command line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut ToolConfiguration) {
        if self.no_guide_lines {
            config.draw_guide_lines = false;
        }
        if let Some(width) = self.line_width {
            config.style.line_width = width;
        }
        if self.shadow {
            config.shadow.enabled = true;
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        eprintln!("📋 Configuration Summary:");
        eprintln!("   📜 Script: {}", self.script.display());
        eprintln!("   🖼️ Surface: {}", self.surface);
        eprintln!("   📐 Image Size: {}x{}", self.image_width, self.image_height);
        match (self.row_spacing, self.column_spacing) {
            (Some(row), Some(column)) => eprintln!("   📏 Pixel Spacing: {} x {} mm", row, column),
            _ => eprintln!("   📏 Pixel Spacing: uncalibrated"),
        }
        eprintln!("   🔍 Zoom: {} (pan {}, {})", self.zoom, self.pan_x, self.pan_y);
        eprintln!("   ➕ Guide Lines: {}", !self.no_guide_lines);

        if let Some(ref config) = self.config {
            eprintln!("   ⚙️ Config: {}", config.display());
        }

        if let Some(ref output) = self.output {
            eprintln!("   💾 Output: {}", output.display());
        }
    }
}
