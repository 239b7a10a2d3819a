// src/tool/mod.rs - The special length tool: lifecycle, pointer handlers and rendering hook

pub mod config;
pub mod drag;
pub mod events;
pub mod measurement;
pub mod render;
pub mod touch;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::Point;
use crate::host::canvas::Canvas;
use crate::host::input::{MouseButtonMask, PointerEvent};
use crate::host::state::{MeasurementId, SharedToolState};
use crate::host::viewport::Viewport;

pub use config::{ShadowConfig, TextConfig, ToolConfiguration, ToolStyle};
pub use drag::{DragKind, DragOutcome, DragSession, MoveAllOptions};
pub use events::{ToolEvent, ToolEventBus};
pub use measurement::{create_new_measurement, HandleKey, MeasurementData};

use hit_test::{
    activate_handle_near, handle_near_point, record_end_handle_grab, HANDLE_HIT_DISTANCE,
};

/// Key under which records are kept in the tool state store
pub const TOOL_TYPE: &str = "specialLength";

/// A grabbed handle this close to the end handle (pixels) drags in rotation mode
pub const END_COINCIDENCE_TOLERANCE: f64 = 0.01;

/// Listening state of a tool instance on its surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    /// Not drawn, not interactive
    Disabled,
    /// Drawn but not interactive
    Enabled,
    /// Drawn, existing records can be hovered and dragged
    Passive,
    /// Passive plus creation of new records
    Active,
}

/// Input the host can route to the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    ImageRendered,
    MouseMove,
    MouseDown,
    MouseDownActivate,
    MouseDrag,
    MouseUp,
    TouchStart,
    TouchStartActive,
    TouchDrag,
    TouchEnd,
    Tap,
}

impl ToolMode {
    /// Whether a tool in this mode handles `kind`
    pub fn listens_to(self, kind: InputKind) -> bool {
        use InputKind::*;

        match self {
            ToolMode::Disabled => false,
            ToolMode::Enabled => matches!(kind, ImageRendered | MouseDrag | MouseUp | TouchDrag | TouchEnd),
            ToolMode::Passive => !matches!(kind, MouseDownActivate | TouchStartActive),
            ToolMode::Active => true,
        }
    }
}

/// Whether a handler acted on an event; consumed events stop propagating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Consumed,
    Ignored,
}

impl EventOutcome {
    pub fn is_consumed(self) -> bool {
        self == EventOutcome::Consumed
    }
}

/// Length measurement tool attached to one image surface
pub struct SpecialLengthTool<V: Viewport> {
    viewport: V,
    state: SharedToolState<MeasurementData>,
    configuration: ToolConfiguration,
    events: ToolEventBus,
    mode: ToolMode,
    mouse_button_mask: MouseButtonMask,
    session: Option<DragSession>,
    redraw_requested: bool,
}

impl<V: Viewport> SpecialLengthTool<V> {
    /// New tool in [`ToolMode::Disabled`] with the default configuration
    pub fn new(viewport: V, state: SharedToolState<MeasurementData>, events: ToolEventBus) -> Self {
        Self {
            viewport,
            state,
            configuration: ToolConfiguration::default(),
            events,
            mode: ToolMode::Disabled,
            mouse_button_mask: MouseButtonMask::default(),
            session: None,
            redraw_requested: false,
        }
    }

    pub fn with_configuration(mut self, configuration: ToolConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Zoom/pan changes go through here; the next render picks them up
    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn state(&self) -> SharedToolState<MeasurementData> {
        Arc::clone(&self.state)
    }

    pub fn events(&self) -> &ToolEventBus {
        &self.events
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn mouse_button_mask(&self) -> MouseButtonMask {
        self.mouse_button_mask
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Snapshot of the records stored for this surface
    pub fn measurements(&self) -> Vec<MeasurementData> {
        self.state
            .read()
            .get(self.viewport.surface_id(), TOOL_TYPE)
            .map(<[MeasurementData]>::to_vec)
            .unwrap_or_default()
    }

    /// Returns and clears the pending redraw request
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
        self.events.publish(ToolEvent::ImageUpdateRequested {
            surface: self.viewport.surface_id().clone(),
        });
    }

    // Lifecycle

    /// Stop drawing and listening; an in-progress drag is dropped where it is
    pub fn disable(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(id = %session.measurement(), "Dropping drag session on disable");
        }
        self.set_mode(ToolMode::Disabled);
    }

    /// Draw records but ignore pointer input
    pub fn enable(&mut self) {
        self.set_mode(ToolMode::Enabled);
    }

    /// Draw, edit and create records with the buttons in `mask`
    pub fn activate(&mut self, mask: MouseButtonMask) {
        self.mouse_button_mask = mask;
        self.set_mode(ToolMode::Active);
    }

    /// Draw and edit existing records; creation is switched off
    pub fn deactivate(&mut self, mask: MouseButtonMask) {
        self.events.publish(ToolEvent::ToolDeactivated {
            tool_type: TOOL_TYPE,
            surface: self.viewport.surface_id().clone(),
            mouse_button_mask: mask,
        });
        self.mouse_button_mask = mask;
        self.set_mode(ToolMode::Passive);
    }

    fn set_mode(&mut self, mode: ToolMode) {
        debug!(
            surface = %self.viewport.surface_id(),
            from = ?self.mode,
            to = ?mode,
            "Tool mode change"
        );
        self.mode = mode;
        self.request_redraw();
    }

    pub fn listens_to(&self, kind: InputKind) -> bool {
        self.mode.listens_to(kind)
    }

    // Configuration

    pub fn configuration(&self) -> &ToolConfiguration {
        &self.configuration
    }

    pub fn set_configuration(&mut self, configuration: ToolConfiguration) {
        self.configuration = configuration;
    }

    /// Flip guide-line drawing, returning the new setting
    pub fn toggle_draw_guide_lines(&mut self) -> bool {
        self.configuration.draw_guide_lines = !self.configuration.draw_guide_lines;
        debug!(enabled = self.configuration.draw_guide_lines, "Guide lines toggled");
        self.configuration.draw_guide_lines
    }

    /// Whether `pointer_canvas` lies on the line of `data`
    pub fn point_near_tool(&self, data: &MeasurementData, pointer_canvas: Point) -> bool {
        hit_test::point_near_tool(&self.viewport, data, pointer_canvas)
    }

    // Mouse handlers

    /// Hover: highlight the handle and line under the pointer
    pub fn on_mouse_move(&mut self, event: &PointerEvent) {
        if !self.listens_to(InputKind::MouseMove) || event.has_button() || self.session.is_some() {
            trace!("mouse move ignored");
            return;
        }

        let pointer = event.current_points.canvas;
        let state = Arc::clone(&self.state);
        let mut store = state.write();
        let Some(records) = store.get_mut(self.viewport.surface_id(), TOOL_TYPE) else {
            return;
        };

        let mut needs_update = false;
        for data in records.iter_mut() {
            if activate_handle_near(&self.viewport, &mut data.handles, pointer) {
                needs_update = true;
            }

            if hit_test::point_near_tool(&self.viewport, data, pointer) != data.active {
                data.active = !data.active;
                needs_update = true;
            }
        }
        drop(store);

        if needs_update {
            self.request_redraw();
        }
    }

    /// Grab a handle or the line of an existing record
    pub fn on_mouse_down(&mut self, event: &PointerEvent) -> EventOutcome {
        if !self.listens_to(InputKind::MouseDown) || !self.mouse_button_mask.is_enabled(event.which) {
            return EventOutcome::Ignored;
        }
        self.begin_existing_drag(event, HANDLE_HIT_DISTANCE)
    }

    /// Create a record at the pointer when nothing else took the press
    pub fn on_mouse_down_activate(&mut self, event: &PointerEvent) -> EventOutcome {
        if !self.listens_to(InputKind::MouseDownActivate)
            || !self.mouse_button_mask.is_enabled(event.which)
        {
            return EventOutcome::Ignored;
        }
        self.add_new_measurement(event)
    }

    pub fn on_mouse_drag(&mut self, event: &PointerEvent) {
        if self.listens_to(InputKind::MouseDrag) {
            self.continue_drag(event);
        }
    }

    pub fn on_mouse_up(&mut self, _event: &PointerEvent) {
        if self.listens_to(InputKind::MouseUp) {
            self.finish_drag();
        }
    }

    /// Draw every record of the surface after the image was rendered
    pub fn on_image_rendered<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        if !self.listens_to(InputKind::ImageRendered) {
            return;
        }

        let mut store = self.state.write();
        if let Some(records) = store.get_mut(self.viewport.surface_id(), TOOL_TYPE) {
            render::render_measurements(&self.viewport, canvas, &self.configuration, records);
        }
    }

    // Gesture plumbing shared by mouse and touch input

    pub(crate) fn add_new_measurement(&mut self, event: &PointerEvent) -> EventOutcome {
        if self.session.is_some() {
            return EventOutcome::Ignored;
        }

        let surface = self.viewport.surface_id().clone();
        let origin = event.current_points.image;
        let id = self
            .state
            .write()
            .add(&surface, TOOL_TYPE, create_new_measurement(origin));

        debug!(%id, x = origin.x, y = origin.y, "Creating measurement");
        self.events.publish(ToolEvent::MeasurementAdded {
            tool_type: TOOL_TYPE,
            surface,
            id,
        });

        self.session = Some(DragSession::begin_new_handle(id, HandleKey::End));
        self.request_redraw();
        EventOutcome::Consumed
    }

    /// Handle pass over all records, then line pass
    pub(crate) fn begin_existing_drag(&mut self, event: &PointerEvent, handle_distance: f64) -> EventOutcome {
        if self.session.is_some() {
            return EventOutcome::Ignored;
        }

        let pointer = event.start_points.canvas;
        let state = Arc::clone(&self.state);
        let mut store = state.write();
        let Some(records) = store.get_mut(self.viewport.surface_id(), TOOL_TYPE) else {
            return EventOutcome::Ignored;
        };

        for data in records.iter_mut() {
            let Some(key) = handle_near_point(&self.viewport, &data.handles, pointer, handle_distance) else {
                continue;
            };

            data.active = true;
            data.handles.activate_only(Some(key));
            let grab = record_end_handle_grab(&self.viewport, data, pointer);

            let session = if key != HandleKey::TextBox && coincides_with_end(data, key) {
                debug!(id = %data.id, length = grab.cached_length, "Rotating end handle");
                DragSession::begin_rotate(data, key, grab.cached_length, event)
            } else {
                debug!(id = %data.id, handle = ?key, "Moving handle");
                DragSession::begin_move_handle(data, key, event)
            };
            self.session = Some(session);
            return EventOutcome::Consumed;
        }

        for data in records.iter_mut() {
            data.active = false;
            if hit_test::point_near_tool(&self.viewport, data, pointer) {
                data.active = true;
                debug!(id = %data.id, "Moving whole measurement");
                self.session = Some(DragSession::begin_move_all(data.id, MoveAllOptions::default()));
                return EventOutcome::Consumed;
            }
        }

        EventOutcome::Ignored
    }

    pub(crate) fn continue_drag(&mut self, event: &PointerEvent) {
        let Some(session) = self.session.as_mut() else {
            trace!("drag without session ignored");
            return;
        };

        let id = session.measurement();
        let surface = self.viewport.surface_id().clone();
        let image = self.viewport.image();
        let modified = self
            .state
            .write()
            .find_mut(&surface, TOOL_TYPE, id)
            .map(|data| {
                session.on_move(data, event, image);
                data.clone()
            });

        let Some(measurement) = modified else {
            debug!(%id, "Dragged record no longer stored");
            self.session = None;
            return;
        };

        self.events.publish(ToolEvent::MeasurementModified {
            tool_type: TOOL_TYPE,
            surface,
            measurement,
        });
        self.request_redraw();
    }

    pub(crate) fn finish_drag(&mut self) {
        let surface = self.viewport.surface_id().clone();
        let state = Arc::clone(&self.state);
        let mut store = state.write();
        let finished_session = self.session.is_some();

        if let Some(session) = self.session.take() {
            let id = session.measurement();
            let kind = session.kind();

            let outcome = store
                .find_mut(&surface, TOOL_TYPE, id)
                .map(|data| session.end(data, self.viewport.image()));

            match outcome {
                Some(DragOutcome::Keep) => {
                    debug!(%id, ?kind, "Drag completed");
                    self.events.publish(ToolEvent::MeasurementCompleted {
                        tool_type: TOOL_TYPE,
                        surface: surface.clone(),
                        id,
                    });
                }
                Some(DragOutcome::Remove) => {
                    store.remove(&surface, TOOL_TYPE, id);
                    debug!(%id, ?kind, "Handle outside image, measurement removed");
                    self.events.publish(ToolEvent::MeasurementRemoved {
                        tool_type: TOOL_TYPE,
                        surface: surface.clone(),
                        id,
                    });
                }
                None => trace!(%id, "finished drag of a record that is gone"),
            }
        }

        // A removed last record still needs a repaint to clear it
        let has_data = store.get(&surface, TOOL_TYPE).is_some();
        drop(store);

        if finished_session || has_data {
            self.request_redraw();
        }
    }

    /// Remove one record from this surface
    pub fn remove_measurement(&mut self, id: MeasurementId) -> Option<MeasurementData> {
        let surface = self.viewport.surface_id().clone();
        let removed = self.state.write().remove(&surface, TOOL_TYPE, id)?;

        if self.session.as_ref().is_some_and(|session| session.measurement() == id) {
            self.session = None;
        }

        self.events.publish(ToolEvent::MeasurementRemoved {
            tool_type: TOOL_TYPE,
            surface,
            id,
        });
        self.request_redraw();
        Some(removed)
    }
}

fn coincides_with_end(data: &MeasurementData, key: HandleKey) -> bool {
    let handle = data.handles.position(key);
    let end = data.end();
    (handle.x - end.x).abs() < END_COINCIDENCE_TOLERANCE
        && (handle.y - end.y).abs() < END_COINCIDENCE_TOLERANCE
}

impl<V: Viewport> std::fmt::Debug for SpecialLengthTool<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecialLengthTool")
            .field("surface", self.viewport.surface_id())
            .field("mode", &self.mode)
            .field("mouse_button_mask", &self.mouse_button_mask)
            .field("session", &self.session)
            .field("measurements", &self.state.read().len(self.viewport.surface_id(), TOOL_TYPE))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::canvas::RecordingCanvas;
    use crate::host::state::ToolStateStore;
    use crate::host::viewport::{AffineViewport, ImageInfo};
    use crate::tool::events::drain_events;

    fn tool(image: ImageInfo) -> SpecialLengthTool<AffineViewport> {
        let viewport = AffineViewport::new("axial", image);
        let mut tool = SpecialLengthTool::new(viewport, ToolStateStore::shared(), ToolEventBus::default());
        tool.activate(MouseButtonMask::LEFT);
        tool
    }

    fn calibrated() -> ImageInfo {
        ImageInfo::new(512, 512).with_pixel_spacing(1.0, 1.0)
    }

    fn press(tool: &SpecialLengthTool<AffineViewport>, x: f64, y: f64) -> PointerEvent {
        PointerEvent::at(tool.viewport(), Point::new(x, y), 1)
    }

    /// Press, drag through `path`, release; returns the last event
    fn gesture(tool: &mut SpecialLengthTool<AffineViewport>, from: Point, path: &[Point]) -> PointerEvent {
        let mut event = press(tool, from.x, from.y);
        if !tool.on_mouse_down(&event).is_consumed() {
            tool.on_mouse_down_activate(&event);
        }
        for point in path {
            event = event.moved_to(tool.viewport(), *point);
            tool.on_mouse_drag(&event);
        }
        tool.on_mouse_up(&event);
        event
    }

    fn hover(tool: &mut SpecialLengthTool<AffineViewport>, x: f64, y: f64) {
        let event = PointerEvent::at(tool.viewport(), Point::new(x, y), 0);
        tool.on_mouse_move(&event);
    }

    #[test]
    fn test_create_then_render_length() {
        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(0.0, 0.0), &[Point::new(3.0, 4.0)]);

        let records = tool.measurements();
        assert_eq!(records.len(), 1);
        assert!(!records[0].active);
        assert!(records[0].invalidated);
        assert_eq!(records[0].handles.active_handle(), None);

        let mut canvas = RecordingCanvas::default();
        tool.on_image_rendered(&mut canvas);
        assert_eq!(canvas.texts().collect::<Vec<_>>(), vec!["5.00 mm"]);
        assert_eq!(tool.measurements()[0].length, Some(5.0));
    }

    #[test]
    fn test_rotate_end_handle_preserves_length() {
        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(0.0, 0.0), &[Point::new(10.0, 0.0)]);

        let mut event = press(&tool, 10.0, 0.0);
        assert!(tool.on_mouse_down(&event).is_consumed());
        assert_eq!(tool.drag_session().map(DragSession::kind), Some(DragKind::RotatePreserveLength));

        let data = &tool.measurements()[0];
        assert!(data.pressed_end_handle);
        assert_eq!(data.dist_ab, 10.0);

        for point in [Point::new(7.0, 5.0), Point::new(3.0, 3.0), Point::new(0.0, 1.0)] {
            event = event.moved_to(tool.viewport(), point);
            tool.on_mouse_drag(&event);
            let data = &tool.measurements()[0];
            assert!((data.pixel_distance() - 10.0).abs() <= 0.1);
        }
        tool.on_mouse_up(&event);

        let data = &tool.measurements()[0];
        assert!(data.end().x.abs() < 1e-9);
        assert!((data.end().y - 10.0).abs() < 1e-9);
        assert_eq!(data.start(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_handle_outside_image_removes_record() {
        let mut tool = tool(calibrated());
        let mut rx = tool.events().subscribe();

        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(600.0, 10.0)]);

        assert!(tool.measurements().is_empty());
        let events = drain_events(&mut rx);
        assert!(matches!(events.first(), Some(ToolEvent::MeasurementAdded { .. })));
        assert!(events.iter().any(|event| matches!(event, ToolEvent::MeasurementRemoved { .. })));
        assert!(!events.iter().any(|event| matches!(event, ToolEvent::MeasurementCompleted { .. })));
    }

    #[test]
    fn test_removing_last_record_requests_redraw() {
        let image = ImageInfo::new(100, 100);
        let mut tool = tool(image);

        let down = press(&tool, 10.0, 10.0);
        tool.on_mouse_down_activate(&down);
        let drag = down.moved_to(tool.viewport(), Point::new(150.0, 10.0));
        tool.on_mouse_drag(&drag);
        tool.take_redraw_request();

        let mut rx = tool.events().subscribe();
        tool.on_mouse_up(&drag);

        assert!(tool.measurements().is_empty());
        assert!(tool.take_redraw_request());
        let events = drain_events(&mut rx);
        let removed = events
            .iter()
            .position(|event| matches!(event, ToolEvent::MeasurementRemoved { .. }))
            .unwrap();
        assert!(events[removed..]
            .iter()
            .any(|event| matches!(event, ToolEvent::ImageUpdateRequested { .. })));
    }

    #[test]
    fn test_bare_mouse_up_without_records_requests_nothing() {
        let mut tool = tool(calibrated());
        tool.take_redraw_request();

        let event = press(&tool, 10.0, 10.0);
        tool.on_mouse_up(&event);

        assert!(!tool.take_redraw_request());
    }

    #[test]
    fn test_drag_inside_image_keeps_single_record() {
        let mut tool = tool(calibrated());
        let mut rx = tool.events().subscribe();

        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(40.0, 50.0)]);

        assert_eq!(tool.measurements().len(), 1);
        let events = drain_events(&mut rx);
        assert!(events.iter().any(|event| matches!(event, ToolEvent::MeasurementModified { .. })));
        assert!(events.iter().any(|event| matches!(event, ToolEvent::MeasurementCompleted { .. })));
        assert!(tool.take_redraw_request());
        assert!(!tool.take_redraw_request());
    }

    #[test]
    fn test_line_press_moves_whole_measurement() {
        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(50.0, 10.0)]);

        let event = press(&tool, 30.0, 11.0);
        assert!(tool.on_mouse_down(&event).is_consumed());
        assert_eq!(tool.drag_session().map(DragSession::kind), Some(DragKind::WholeTool));
        assert!(tool.measurements()[0].active);

        let event = event.moved_to(tool.viewport(), Point::new(30.0, 21.0));
        tool.on_mouse_drag(&event);
        tool.on_mouse_up(&event);

        let data = &tool.measurements()[0];
        assert_eq!(data.start(), Point::new(10.0, 20.0));
        assert_eq!(data.end(), Point::new(50.0, 20.0));
        assert!(!data.active);
        assert!(tool.drag_session().is_none());
    }

    #[test]
    fn test_start_handle_moves_freely() {
        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(50.0, 10.0)]);

        gesture(&mut tool, Point::new(11.0, 10.0), &[Point::new(21.0, 30.0)]);

        let data = &tool.measurements()[0];
        assert_eq!(data.start(), Point::new(20.0, 30.0));
        assert_eq!(data.end(), Point::new(50.0, 10.0));
        assert!(!data.handles.start.active);
    }

    #[test]
    fn test_handle_pass_wins_over_line_pass() {
        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(100.0, 100.0), &[Point::new(200.0, 100.0)]);
        // Second line crossing near the first one's start handle
        gesture(&mut tool, Point::new(90.0, 102.0), &[Point::new(90.0, 300.0)]);

        let event = press(&tool, 100.0, 101.0);
        assert!(tool.on_mouse_down(&event).is_consumed());

        let session = tool.drag_session().unwrap();
        assert_eq!(session.kind(), DragKind::FreeMove);
        assert_eq!(session.handle(), Some(HandleKey::Start));
        assert_eq!(session.measurement(), tool.measurements()[0].id);
    }

    #[test]
    fn test_press_on_empty_space_is_not_consumed() {
        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(50.0, 10.0)]);

        let event = press(&tool, 300.0, 300.0);
        assert_eq!(tool.on_mouse_down(&event), EventOutcome::Ignored);
        assert!(tool.measurements().iter().all(|data| !data.active));
    }

    #[test]
    fn test_button_mask_gates_presses() {
        let mut tool = tool(calibrated());
        let right = PointerEvent::at(tool.viewport(), Point::new(5.0, 5.0), 3);

        assert_eq!(tool.on_mouse_down_activate(&right), EventOutcome::Ignored);
        assert!(tool.measurements().is_empty());

        tool.activate(MouseButtonMask(MouseButtonMask::LEFT.0 | MouseButtonMask::RIGHT.0));
        assert!(tool.on_mouse_down_activate(&right).is_consumed());
        assert_eq!(tool.measurements().len(), 1);
    }

    #[test]
    fn test_hover_toggles_line_and_handle_highlight() {
        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(110.0, 10.0)]);
        tool.take_redraw_request();

        hover(&mut tool, 60.0, 11.0);
        assert!(tool.measurements()[0].active);
        assert!(tool.take_redraw_request());

        hover(&mut tool, 60.0, 12.0);
        assert!(!tool.take_redraw_request());

        hover(&mut tool, 110.0, 11.0);
        let data = &tool.measurements()[0];
        assert_eq!(data.handles.active_handle(), Some(HandleKey::End));

        hover(&mut tool, 60.0, 80.0);
        let data = &tool.measurements()[0];
        assert!(!data.active);
        assert_eq!(data.handles.active_handle(), None);
    }

    #[test]
    fn test_hover_with_button_held_is_ignored() {
        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(110.0, 10.0)]);

        let event = PointerEvent::at(tool.viewport(), Point::new(60.0, 10.0), 1);
        tool.on_mouse_move(&event);
        assert!(!tool.measurements()[0].active);
    }

    #[test]
    fn test_lifecycle_modes() {
        assert!(!ToolMode::Disabled.listens_to(InputKind::ImageRendered));
        assert!(ToolMode::Enabled.listens_to(InputKind::ImageRendered));
        assert!(!ToolMode::Enabled.listens_to(InputKind::MouseDown));
        assert!(ToolMode::Passive.listens_to(InputKind::MouseDown));
        assert!(!ToolMode::Passive.listens_to(InputKind::MouseDownActivate));
        assert!(ToolMode::Active.listens_to(InputKind::TouchStartActive));

        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(50.0, 10.0)]);

        tool.disable();
        let mut canvas = RecordingCanvas::default();
        tool.on_image_rendered(&mut canvas);
        assert!(canvas.commands().is_empty());

        tool.enable();
        tool.on_image_rendered(&mut canvas);
        assert!(!canvas.commands().is_empty());
        assert_eq!(tool.on_mouse_down(&press(&tool, 10.0, 10.0)), EventOutcome::Ignored);
    }

    #[test]
    fn test_deactivate_announces_and_stops_creation() {
        let mut tool = tool(calibrated());
        let mut rx = tool.events().subscribe();

        tool.deactivate(MouseButtonMask::LEFT);
        assert_eq!(tool.mode(), ToolMode::Passive);

        let events = drain_events(&mut rx);
        assert!(matches!(
            events.first(),
            Some(ToolEvent::ToolDeactivated { mouse_button_mask: MouseButtonMask::LEFT, .. })
        ));

        let event = press(&tool, 20.0, 20.0);
        assert_eq!(tool.on_mouse_down_activate(&event), EventOutcome::Ignored);
        assert!(tool.measurements().is_empty());
    }

    #[test]
    fn test_disable_drops_session_in_place() {
        let mut tool = tool(calibrated());
        let event = press(&tool, 10.0, 10.0);
        tool.on_mouse_down_activate(&event);
        tool.on_mouse_drag(&event.moved_to(tool.viewport(), Point::new(20.0, 10.0)));

        tool.disable();
        assert!(tool.drag_session().is_none());

        let data = &tool.measurements()[0];
        assert_eq!(data.end(), Point::new(20.0, 10.0));
        assert!(!data.invalidated);
    }

    #[test]
    fn test_toggle_guide_lines() {
        let mut tool = tool(calibrated());
        assert!(tool.configuration().draw_guide_lines);
        assert!(!tool.toggle_draw_guide_lines());
        assert!(tool.toggle_draw_guide_lines());

        tool.set_configuration(ToolConfiguration {
            draw_guide_lines: false,
            ..ToolConfiguration::default()
        });
        assert!(!tool.configuration().draw_guide_lines);
    }

    #[test]
    fn test_text_box_drag_marks_label_moved() {
        let mut tool = tool(ImageInfo::new(512, 512));
        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(50.0, 10.0)]);

        let mut canvas = RecordingCanvas::default();
        tool.on_image_rendered(&mut canvas);
        let bbox = tool.measurements()[0].handles.text_box.bounding_box.unwrap();
        let inside = Point::new(bbox.left + 2.0, bbox.top + 2.0);

        gesture(&mut tool, inside, &[inside.offset(0.0, 40.0)]);

        let data = &tool.measurements()[0];
        assert!(data.handles.text_box.has_moved);
        assert_eq!(data.handles.text_box.position(), Point::new(50.0, 50.0));

        canvas.clear();
        tool.on_image_rendered(&mut canvas);
        assert_eq!(canvas.texts().collect::<Vec<_>>(), vec!["40.00 pixels"]);
        assert!(canvas.lines().any(|(_, _, style)| style.dash.is_some()));
    }

    #[test]
    fn test_remove_measurement() {
        let mut tool = tool(calibrated());
        gesture(&mut tool, Point::new(10.0, 10.0), &[Point::new(50.0, 10.0)]);
        let id = tool.measurements()[0].id;

        assert!(tool.remove_measurement(id).is_some());
        assert!(tool.remove_measurement(id).is_none());
        assert!(tool.measurements().is_empty());
    }
}
