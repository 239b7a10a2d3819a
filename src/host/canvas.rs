// src/host/canvas.rs - Drawing primitives the render pass issues against the viewer canvas

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};

/// Drop shadow applied to strokes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: String,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Stroke parameters for one draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
    /// `[dash, gap]` pattern, solid when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

impl StrokeStyle {
    pub fn solid(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            dash: None,
            shadow: None,
        }
    }

    pub fn dashed(mut self, dash: f64, gap: f64) -> Self {
        self.dash = Some([dash, gap]);
        self
    }

    pub fn with_shadow(mut self, shadow: Option<Shadow>) -> Self {
        self.shadow = shadow;
        self
    }
}

/// Label font metrics and which axes of the text box are centered on the anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextBoxOptions {
    pub font_size: f64,
    /// Space between the text and every edge of the box
    pub padding: f64,
    pub center_x: bool,
    pub center_y: bool,
}

impl TextBoxOptions {
    pub fn new(font_size: f64, padding: f64) -> Self {
        Self {
            font_size,
            padding,
            center_x: false,
            center_y: false,
        }
    }

    pub fn centered_y(mut self) -> Self {
        self.center_y = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.center_x = true;
        self.center_y = true;
        self
    }
}

impl Default for TextBoxOptions {
    fn default() -> Self {
        Self::new(15.0, 5.0)
    }
}

/// Canvas the render pass draws into (all coordinates in canvas space)
pub trait Canvas {
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle);

    fn stroke_circle(&mut self, center: Point, radius: f64, style: &StrokeStyle);

    /// Draw a boxed label and report the rectangle it occupies
    fn draw_text_box(
        &mut self,
        text: &str,
        anchor: Point,
        color: &str,
        options: TextBoxOptions,
    ) -> BoundingBox;
}

/// A draw call captured by [`RecordingCanvas`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Line {
        from: Point,
        to: Point,
        style: StrokeStyle,
    },
    Circle {
        center: Point,
        radius: f64,
        style: StrokeStyle,
    },
    TextBox {
        text: String,
        color: String,
        bounding_box: BoundingBox,
    },
}

/// Canvas that records draw calls instead of rasterizing them
///
/// Text extents are approximated from the requested font size: each character
/// is `0.6 * font_size` wide and the box is padded on every side.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Recorded line segments, in draw order
    pub fn lines(&self) -> impl Iterator<Item = (&Point, &Point, &StrokeStyle)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line { from, to, style } => Some((from, to, style)),
            _ => None,
        })
    }

    /// Recorded label texts, in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::TextBox { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

}

fn measure(text: &str, options: &TextBoxOptions) -> (f64, f64) {
    let text_width = text.chars().count() as f64 * options.font_size * 0.6;
    (
        text_width + 2.0 * options.padding,
        options.font_size + 2.0 * options.padding,
    )
}

impl Canvas for RecordingCanvas {
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            style: style.clone(),
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, style: &StrokeStyle) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            style: style.clone(),
        });
    }

    fn draw_text_box(
        &mut self,
        text: &str,
        anchor: Point,
        color: &str,
        options: TextBoxOptions,
    ) -> BoundingBox {
        let (width, height) = measure(text, &options);
        let left = if options.center_x { anchor.x - width / 2.0 } else { anchor.x };
        let top = if options.center_y { anchor.y - height / 2.0 } else { anchor.y };

        let bounding_box = BoundingBox { left, top, width, height };
        self.commands.push(DrawCommand::TextBox {
            text: text.to_string(),
            color: color.to_string(),
            bounding_box,
        });
        bounding_box
    }
}
