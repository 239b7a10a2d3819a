// src/script.rs - Gesture script replay
//
// A script is a list of host events (pointer, touch, lifecycle, render)
// expressed in canvas coordinates. Replaying it drives one tool instance the
// way the viewer's input routing would and collects what the tool produced.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::{ResultExt, SpecialLengthError, SpecialLengthResult};
use crate::geometry::Point;
use crate::host::canvas::{DrawCommand, RecordingCanvas};
use crate::host::input::{MouseButtonMask, PointerEvent};
use crate::host::viewport::{AffineViewport, SurfaceId, Viewport};
use crate::tool::events::drain_events;
use crate::tool::{MeasurementData, SpecialLengthTool, ToolEvent, ToolMode};

fn left_button() -> u8 {
    1
}

/// One scripted host event
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GestureStep {
    Enable,
    Disable,
    Activate {
        #[serde(default)]
        mask: Option<u8>,
    },
    Deactivate {
        #[serde(default)]
        mask: Option<u8>,
    },
    /// Pointer movement with no button held
    Move { x: f64, y: f64 },
    Down {
        x: f64,
        y: f64,
        #[serde(default = "left_button")]
        button: u8,
    },
    Drag { x: f64, y: f64 },
    Up,
    TouchStart { x: f64, y: f64 },
    TouchDrag { x: f64, y: f64 },
    TouchEnd,
    Tap { x: f64, y: f64 },
    Render,
    ToggleGuideLines,
    Zoom { scale: f64 },
    Pan { x: f64, y: f64 },
}

impl GestureStep {
    fn point(&self) -> Option<Point> {
        match *self {
            GestureStep::Move { x, y }
            | GestureStep::Down { x, y, .. }
            | GestureStep::Drag { x, y }
            | GestureStep::TouchStart { x, y }
            | GestureStep::TouchDrag { x, y }
            | GestureStep::Tap { x, y }
            | GestureStep::Pan { x, y } => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// Ordered list of steps
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GestureScript {
    #[serde(default)]
    pub steps: Vec<GestureStep>,
}

impl GestureScript {
    pub fn from_json(json: &str) -> SpecialLengthResult<Self> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> SpecialLengthResult<Self> {
        debug!("Loading gesture script from {}", path.display());
        let json = std::fs::read_to_string(path)
            .with_context_lazy(|| format!("reading gesture script {}", path.display()))?;
        Self::from_json(&json).with_context_lazy(|| format!("parsing gesture script {}", path.display()))
    }

    /// Reject coordinates and zoom factors the viewport cannot use
    pub fn validate(&self) -> SpecialLengthResult<()> {
        for (index, step) in self.steps.iter().enumerate() {
            if step.point().is_some_and(|point| !point.is_finite()) {
                return Err(SpecialLengthError::script(format!(
                    "step {}: coordinates must be finite",
                    index + 1
                )));
            }

            if let GestureStep::Zoom { scale } = step {
                if !scale.is_finite() || *scale <= 0.0 {
                    return Err(SpecialLengthError::script(format!(
                        "step {}: zoom scale must be greater than 0",
                        index + 1
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Draw calls of one scripted render
#[derive(Debug, Clone, Serialize)]
pub struct RenderedFrame {
    /// 1-based index of the render step
    pub step: usize,
    pub commands: Vec<DrawCommand>,
}

/// Everything a replay produced
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub generated_at: DateTime<Utc>,
    pub surface: SurfaceId,
    pub mode: ToolMode,
    pub steps: usize,
    pub redraw_requests: usize,
    pub measurements: Vec<MeasurementData>,
    pub frames: Vec<RenderedFrame>,
    pub events: Vec<ToolEvent>,
}

impl ReplayReport {
    /// Label texts drawn by the last render
    pub fn final_labels(&self) -> Vec<&str> {
        self.frames
            .last()
            .map(|frame| {
                frame
                    .commands
                    .iter()
                    .filter_map(|command| match command {
                        DrawCommand::TextBox { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Feeds script steps to a tool on an [`AffineViewport`]
pub struct ScriptRunner {
    tool: SpecialLengthTool<AffineViewport>,
    canvas: RecordingCanvas,
    event_rx: broadcast::Receiver<ToolEvent>,
    events: Vec<ToolEvent>,
    frames: Vec<RenderedFrame>,
    gesture: Option<PointerEvent>,
    redraw_requests: usize,
}

impl ScriptRunner {
    pub fn new(tool: SpecialLengthTool<AffineViewport>) -> Self {
        let canvas = RecordingCanvas::default();
        let event_rx = tool.events().subscribe();

        Self {
            tool,
            canvas,
            event_rx,
            events: Vec::new(),
            frames: Vec::new(),
            gesture: None,
            redraw_requests: 0,
        }
    }

    pub fn tool(&self) -> &SpecialLengthTool<AffineViewport> {
        &self.tool
    }

    /// Replay every step, then render once more if the tool asked for it
    pub fn run(mut self, script: &GestureScript) -> SpecialLengthResult<ReplayReport> {
        info!("▶️ Replaying {} gesture steps", script.steps.len());

        for (index, step) in script.steps.iter().enumerate() {
            self.apply(index + 1, step)
                .with_context_lazy(|| format!("replaying step {}", index + 1))?;
        }

        if self.gesture.is_some() {
            debug!("Script ended with a gesture still in progress");
        }

        let pending_redraw = self.tool.take_redraw_request();
        if pending_redraw {
            self.redraw_requests += 1;
        }
        if pending_redraw || self.frames.is_empty() {
            self.render(script.steps.len());
        }
        self.collect_events();

        let report = ReplayReport {
            generated_at: Utc::now(),
            surface: self.tool.viewport().surface_id().clone(),
            mode: self.tool.mode(),
            steps: script.steps.len(),
            redraw_requests: self.redraw_requests,
            measurements: self.tool.measurements(),
            frames: self.frames,
            events: self.events,
        };

        info!(
            "✅ Replay finished: {} measurements, {} frames, {} events",
            report.measurements.len(),
            report.frames.len(),
            report.events.len()
        );
        Ok(report)
    }

    fn apply(&mut self, number: usize, step: &GestureStep) -> SpecialLengthResult<()> {
        debug!(step = number, ?step, "Applying gesture step");

        match *step {
            GestureStep::Enable => self.tool.enable(),
            GestureStep::Disable => {
                self.gesture = None;
                self.tool.disable();
            }
            GestureStep::Activate { mask } => self.tool.activate(mask_or_default(mask)),
            GestureStep::Deactivate { mask } => self.tool.deactivate(mask_or_default(mask)),
            GestureStep::Move { x, y } => {
                let event = PointerEvent::at(self.tool.viewport(), Point::new(x, y), 0);
                self.tool.on_mouse_move(&event);
            }
            GestureStep::Down { x, y, button } => {
                self.ensure_idle(number)?;
                let event = PointerEvent::at(self.tool.viewport(), Point::new(x, y), button);
                if !self.tool.on_mouse_down(&event).is_consumed() {
                    self.tool.on_mouse_down_activate(&event);
                }
                self.gesture = Some(event);
            }
            GestureStep::Drag { x, y } => {
                let event = self.next_event(number, Point::new(x, y))?;
                self.tool.on_mouse_drag(&event);
                self.gesture = Some(event);
            }
            GestureStep::Up => {
                let event = self.end_gesture(number)?;
                self.tool.on_mouse_up(&event);
            }
            GestureStep::TouchStart { x, y } => {
                self.ensure_idle(number)?;
                let event = PointerEvent::at(self.tool.viewport(), Point::new(x, y), 0);
                if !self.tool.on_touch_start(&event).is_consumed() {
                    self.tool.on_touch_start_active(&event);
                }
                self.gesture = Some(event);
            }
            GestureStep::TouchDrag { x, y } => {
                let event = self.next_event(number, Point::new(x, y))?;
                self.tool.on_touch_drag(&event);
                self.gesture = Some(event);
            }
            GestureStep::TouchEnd => {
                let event = self.end_gesture(number)?;
                self.tool.on_touch_end(&event);
            }
            GestureStep::Tap { x, y } => {
                let event = PointerEvent::at(self.tool.viewport(), Point::new(x, y), 0);
                self.tool.on_tap(&event);
            }
            GestureStep::Render => {
                if self.tool.take_redraw_request() {
                    self.redraw_requests += 1;
                }
                self.render(number);
            }
            GestureStep::ToggleGuideLines => {
                self.tool.toggle_draw_guide_lines();
            }
            GestureStep::Zoom { scale } => self.tool.viewport_mut().set_scale(scale),
            GestureStep::Pan { x, y } => self.tool.viewport_mut().set_translation(Point::new(x, y)),
        }

        if self.tool.take_redraw_request() {
            self.redraw_requests += 1;
        }
        self.collect_events();
        Ok(())
    }

    fn ensure_idle(&self, number: usize) -> SpecialLengthResult<()> {
        if self.gesture.is_some() {
            return Err(SpecialLengthError::script(format!(
                "step {}: a gesture is already in progress",
                number
            )));
        }
        Ok(())
    }

    fn next_event(&self, number: usize, canvas: Point) -> SpecialLengthResult<PointerEvent> {
        self.gesture
            .as_ref()
            .map(|previous| previous.moved_to(self.tool.viewport(), canvas))
            .ok_or_else(|| {
                SpecialLengthError::script(format!("step {}: drag without a preceding press", number))
            })
    }

    fn end_gesture(&mut self, number: usize) -> SpecialLengthResult<PointerEvent> {
        self.gesture.take().ok_or_else(|| {
            SpecialLengthError::script(format!("step {}: release without a preceding press", number))
        })
    }

    fn render(&mut self, step: usize) {
        self.canvas.clear();
        self.tool.on_image_rendered(&mut self.canvas);
        self.frames.push(RenderedFrame {
            step,
            commands: self.canvas.take_commands(),
        });
    }

    fn collect_events(&mut self) {
        self.events.extend(drain_events(&mut self.event_rx));
    }
}

fn mask_or_default(mask: Option<u8>) -> MouseButtonMask {
    mask.map(MouseButtonMask).unwrap_or_default()
}
