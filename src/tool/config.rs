// src/tool/config.rs - Per-instance configuration of the length tool

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SpecialLengthError, SpecialLengthResult};
use crate::host::canvas::Shadow;

/// File name looked up under the user configuration directory
pub const CONFIG_FILE_NAME: &str = "special_length.json";

/// Colors and stroke width of the tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolStyle {
    pub active_color: String,
    pub inactive_color: String,
    pub line_width: f64,
}

impl ToolStyle {
    pub fn color_if_active(&self, active: bool) -> &str {
        if active {
            &self.active_color
        } else {
            &self.inactive_color
        }
    }
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            active_color: "greenyellow".to_string(),
            inactive_color: "white".to_string(),
            line_width: 1.0,
        }
    }
}

/// Optional drop shadow under every stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub enabled: bool,
    pub color: String,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ShadowConfig {
    pub fn to_shadow(&self) -> Option<Shadow> {
        self.enabled.then(|| Shadow {
            color: self.color.clone(),
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        })
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#000000".to_string(),
            offset_x: 1.0,
            offset_y: 1.0,
        }
    }
}

/// Label font metrics, handed to the canvas with every text box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub font_size: f64,
    pub padding: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_size: 15.0,
            padding: 5.0,
        }
    }
}

/// Configuration held by one tool instance and read at render time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfiguration {
    pub draw_guide_lines: bool,
    pub style: ToolStyle,
    pub shadow: ShadowConfig,
    pub text: TextConfig,
}

impl Default for ToolConfiguration {
    fn default() -> Self {
        Self {
            draw_guide_lines: true,
            style: ToolStyle::default(),
            shadow: ShadowConfig::default(),
            text: TextConfig::default(),
        }
    }
}

impl ToolConfiguration {
    /// Parse a JSON configuration; absent fields take their defaults
    pub fn from_json(json: &str) -> SpecialLengthResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit file
    pub fn load(path: &Path) -> SpecialLengthResult<Self> {
        debug!("Loading tool configuration from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|e| {
            SpecialLengthError::from(e).with_context(format!("reading {}", path.display()))
        })?;
        Self::from_json(&json).map_err(|e| e.with_context(format!("parsing {}", path.display())))
    }

    /// Load the user configuration file if present, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> SpecialLengthResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                info!("Using tool configuration {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> SpecialLengthResult<()> {
        if !(self.style.line_width.is_finite() && self.style.line_width > 0.0) {
            return Err(SpecialLengthError::config("Line width must be a positive number"));
        }

        if self.style.active_color.is_empty() || self.style.inactive_color.is_empty() {
            return Err(SpecialLengthError::config("Tool colors cannot be empty"));
        }

        if !(self.text.font_size.is_finite() && self.text.font_size > 0.0) {
            return Err(SpecialLengthError::config("Font size must be a positive number"));
        }

        if !(self.text.padding.is_finite() && self.text.padding >= 0.0) {
            return Err(SpecialLengthError::config("Text padding cannot be negative"));
        }

        Ok(())
    }
}

/// `<config dir>/mivi/special_length.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mivi").join(CONFIG_FILE_NAME))
}
