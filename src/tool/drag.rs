// src/tool/drag.rs - Drag sessions: begin on press, update per move, settle on release

use std::fmt;

use tracing::trace;

use crate::geometry::{point_distance, unit_direction, DEGENERATE_LENGTH};
use crate::host::input::PointerEvent;
use crate::host::state::MeasurementId;
use crate::host::viewport::ImageInfo;
use crate::tool::measurement::{HandleKey, MeasurementData, MeasurementHandles};

/// Length drift (image pixels) tolerated before rotation mode rescales the end handle
pub const LENGTH_TOLERANCE: f64 = 0.1;

/// Options of a whole-measurement drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveAllOptions {
    pub delete_if_handle_outside_image: bool,
    pub prevent_handle_outside_image: bool,
}

impl Default for MoveAllOptions {
    fn default() -> Self {
        Self {
            delete_if_handle_outside_image: true,
            prevent_handle_outside_image: false,
        }
    }
}

/// How a record is changed on every move of a drag
pub trait HandleUpdate: fmt::Debug + Send + Sync {
    fn apply(&mut self, data: &mut MeasurementData, event: &PointerEvent, image: &ImageInfo);
}

/// Freshly created handle: sits exactly under the pointer
#[derive(Debug)]
pub struct FollowPointer {
    handle: HandleKey,
}

impl HandleUpdate for FollowPointer {
    fn apply(&mut self, data: &mut MeasurementData, event: &PointerEvent, _image: &ImageInfo) {
        data.handles.activate_only(Some(self.handle));
        data.handles.set_position(self.handle, event.current_points.image);
    }
}

/// Existing handle: keeps the offset between handle and pointer at press time
#[derive(Debug)]
pub struct OffsetMove {
    handle: HandleKey,
    offset: (f64, f64),
}

impl HandleUpdate for OffsetMove {
    fn apply(&mut self, data: &mut MeasurementData, event: &PointerEvent, _image: &ImageInfo) {
        if self.handle == HandleKey::TextBox {
            data.handles.text_box.has_moved = true;
        }
        data.handles.activate_only(Some(self.handle));
        data.handles
            .set_position(self.handle, event.current_points.image.offset(self.offset.0, self.offset.1));
    }
}

/// End handle dragged around the start handle at constant length
#[derive(Debug)]
pub struct RotatePreserveLength {
    handle: HandleKey,
    offset: (f64, f64),
    length: f64,
}

impl RotatePreserveLength {
    pub fn length(&self) -> f64 {
        self.length
    }
}

impl HandleUpdate for RotatePreserveLength {
    fn apply(&mut self, data: &mut MeasurementData, event: &PointerEvent, _image: &ImageInfo) {
        data.handles.activate_only(Some(self.handle));
        data.handles
            .set_position(self.handle, event.current_points.image.offset(self.offset.0, self.offset.1));

        let start = data.start();
        let end = data.end();
        if (point_distance(start, end) - self.length).abs() <= LENGTH_TOLERANCE {
            return;
        }

        // A zero-length line has no direction to preserve; the handle just follows
        if self.length < DEGENERATE_LENGTH {
            return;
        }

        if let Some((ux, uy)) = unit_direction(start, end) {
            data.handles.end.set_position(start.offset(self.length * ux, self.length * uy));
        }
    }
}

/// Whole measurement: every dependent handle shifts by the pointer delta
#[derive(Debug)]
pub struct TranslateAll {
    prevent_handle_outside_image: bool,
}

impl HandleUpdate for TranslateAll {
    fn apply(&mut self, data: &mut MeasurementData, event: &PointerEvent, image: &ImageInfo) {
        let (dx, dy) = event.image_delta();

        for key in HandleKey::ALL {
            if data.handles.moves_independently(key) {
                continue;
            }

            let mut moved = data.handles.position(key).offset(dx, dy);
            if self.prevent_handle_outside_image && !data.handles.allowed_outside_image(key) {
                moved = image.clamp(moved);
            }
            data.handles.set_position(key, moved);
        }
    }
}

/// What kind of gesture a session implements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Dragging the end handle of a record created by this gesture
    Creating,
    /// Dragging an existing handle freely
    FreeMove,
    /// Rotating the end handle around the start handle
    RotatePreserveLength,
    /// Dragging the whole measurement
    WholeTool,
}

/// Whether the record survives the end of a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Keep,
    /// A bounded handle ended outside the image
    Remove,
}

/// An in-progress drag of one record
#[derive(Debug)]
pub struct DragSession {
    measurement: MeasurementId,
    kind: DragKind,
    handle: Option<HandleKey>,
    update: Box<dyn HandleUpdate>,
    deactivate_on_end: bool,
    delete_if_handle_outside_image: bool,
}

impl DragSession {
    /// Creation gesture: the new handle follows the pointer
    pub fn begin_new_handle(measurement: MeasurementId, handle: HandleKey) -> Self {
        Self {
            measurement,
            kind: DragKind::Creating,
            handle: Some(handle),
            update: Box::new(FollowPointer { handle }),
            deactivate_on_end: true,
            delete_if_handle_outside_image: true,
        }
    }

    /// Drag an existing handle, keeping the press offset
    pub fn begin_move_handle(data: &MeasurementData, handle: HandleKey, event: &PointerEvent) -> Self {
        Self {
            measurement: data.id,
            kind: DragKind::FreeMove,
            handle: Some(handle),
            update: Box::new(OffsetMove {
                handle,
                offset: grab_offset(&data.handles, handle, event),
            }),
            deactivate_on_end: false,
            delete_if_handle_outside_image: true,
        }
    }

    /// Rotate `handle` (the end handle) around start, preserving `length`
    pub fn begin_rotate(
        data: &MeasurementData,
        handle: HandleKey,
        length: f64,
        event: &PointerEvent,
    ) -> Self {
        Self {
            measurement: data.id,
            kind: DragKind::RotatePreserveLength,
            handle: Some(handle),
            update: Box::new(RotatePreserveLength {
                handle,
                offset: grab_offset(&data.handles, handle, event),
                length,
            }),
            deactivate_on_end: false,
            delete_if_handle_outside_image: true,
        }
    }

    /// Drag every handle of the record together
    pub fn begin_move_all(measurement: MeasurementId, options: MoveAllOptions) -> Self {
        Self {
            measurement,
            kind: DragKind::WholeTool,
            handle: None,
            update: Box::new(TranslateAll {
                prevent_handle_outside_image: options.prevent_handle_outside_image,
            }),
            deactivate_on_end: true,
            delete_if_handle_outside_image: options.delete_if_handle_outside_image,
        }
    }

    pub fn measurement(&self) -> MeasurementId {
        self.measurement
    }

    pub fn kind(&self) -> DragKind {
        self.kind
    }

    pub fn handle(&self) -> Option<HandleKey> {
        self.handle
    }

    /// Apply one pointer move
    pub fn on_move(&mut self, data: &mut MeasurementData, event: &PointerEvent, image: &ImageInfo) {
        self.update.apply(data, event, image);
        trace!(
            id = %self.measurement,
            kind = ?self.kind,
            start = ?data.start(),
            end = ?data.end(),
            "drag update"
        );
    }

    /// Settle the record once the pointer is released
    pub fn end(self, data: &mut MeasurementData, image: &ImageInfo) -> DragOutcome {
        if let Some(handle) = self.handle {
            data.handles.set_active(handle, false);
        }
        if self.deactivate_on_end {
            data.active = false;
        }
        data.invalidated = true;

        if self.delete_if_handle_outside_image && any_handles_outside_image(image, &data.handles) {
            DragOutcome::Remove
        } else {
            DragOutcome::Keep
        }
    }
}

/// Whether any handle that must stay on the image lies outside it
pub fn any_handles_outside_image(image: &ImageInfo, handles: &MeasurementHandles) -> bool {
    HandleKey::ALL
        .into_iter()
        .filter(|&key| !handles.allowed_outside_image(key))
        .any(|key| !image.contains(handles.position(key)))
}

fn grab_offset(handles: &MeasurementHandles, handle: HandleKey, event: &PointerEvent) -> (f64, f64) {
    event.current_points.image.delta_to(handles.position(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::host::viewport::{AffineViewport, Viewport};
    use crate::tool::measurement::create_new_measurement;

    fn viewport() -> AffineViewport {
        AffineViewport::new("ax", ImageInfo::new(100, 100))
    }

    fn line(start: Point, end: Point) -> MeasurementData {
        let mut data = create_new_measurement(start);
        data.handles.end.set_position(end);
        data.handles.activate_only(None);
        data
    }

    #[test]
    fn test_new_handle_follows_pointer() {
        let viewport = viewport();
        let mut data = create_new_measurement(Point::new(10.0, 10.0));
        let down = PointerEvent::at(&viewport, Point::new(10.0, 10.0), 1);
        let mut session = DragSession::begin_new_handle(data.id, HandleKey::End);

        session.on_move(&mut data, &down.moved_to(&viewport, Point::new(13.0, 14.0)), viewport.image());
        assert_eq!(data.end(), Point::new(13.0, 14.0));
        assert_eq!(data.start(), Point::new(10.0, 10.0));

        assert_eq!(session.end(&mut data, viewport.image()), DragOutcome::Keep);
        assert!(!data.active);
        assert!(data.invalidated);
        assert_eq!(data.handles.active_handle(), None);
    }

    #[test]
    fn test_move_handle_keeps_grab_offset() {
        let viewport = viewport();
        let mut data = line(Point::new(10.0, 10.0), Point::new(40.0, 10.0));
        data.active = true;

        // Pressed 2px left of the start handle
        let down = PointerEvent::at(&viewport, Point::new(8.0, 10.0), 1);
        let mut session = DragSession::begin_move_handle(&data, HandleKey::Start, &down);
        session.on_move(&mut data, &down.moved_to(&viewport, Point::new(18.0, 30.0)), viewport.image());

        assert_eq!(data.start(), Point::new(20.0, 30.0));
        assert_eq!(data.handles.active_handle(), Some(HandleKey::Start));

        assert_eq!(session.end(&mut data, viewport.image()), DragOutcome::Keep);
        assert!(data.active);
        assert_eq!(data.handles.active_handle(), None);
    }

    #[test]
    fn test_moving_text_box_marks_it_moved() {
        let viewport = viewport();
        let mut data = line(Point::new(10.0, 10.0), Point::new(40.0, 10.0));
        data.handles.text_box.set_position(Point::new(40.0, 10.0));

        let down = PointerEvent::at(&viewport, Point::new(55.0, 10.0), 1);
        let mut session = DragSession::begin_move_handle(&data, HandleKey::TextBox, &down);
        assert!(!data.handles.text_box.has_moved);

        session.on_move(&mut data, &down.moved_to(&viewport, Point::new(60.0, 30.0)), viewport.image());
        assert!(data.handles.text_box.has_moved);
        assert_eq!(data.handles.text_box.position(), Point::new(45.0, 30.0));
    }

    #[test]
    fn test_rotation_preserves_length_over_moves() {
        let viewport = viewport();
        let mut data = line(Point::new(50.0, 50.0), Point::new(80.0, 50.0));
        let down = PointerEvent::at(&viewport, Point::new(81.0, 51.0), 1);
        let mut session = DragSession::begin_rotate(&data, HandleKey::End, 30.0, &down);

        let mut event = down;
        for target in [
            Point::new(75.0, 70.0),
            Point::new(51.0, 95.0),
            Point::new(20.0, 52.0),
            Point::new(50.5, 52.0),
            Point::new(90.0, 10.0),
        ] {
            event = event.moved_to(&viewport, target);
            session.on_move(&mut data, &event, viewport.image());
            assert!((data.pixel_distance() - 30.0).abs() <= LENGTH_TOLERANCE);
            assert_eq!(data.start(), Point::new(50.0, 50.0));
        }
    }

    #[test]
    fn test_rotation_follows_direction_of_pointer() {
        let viewport = viewport();
        let mut data = line(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let down = PointerEvent::at(&viewport, Point::new(10.0, 0.0), 1);
        let mut session = DragSession::begin_rotate(&data, HandleKey::End, 10.0, &down);

        session.on_move(&mut data, &down.moved_to(&viewport, Point::new(0.0, 5.0)), viewport.image());
        assert!(data.end().x.abs() < 1e-9);
        assert!((data.end().y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_of_zero_length_line_stays_finite() {
        let viewport = viewport();
        let mut data = line(Point::new(20.0, 20.0), Point::new(20.0, 20.0));
        let down = PointerEvent::at(&viewport, Point::new(20.0, 20.0), 1);
        let mut session = DragSession::begin_rotate(&data, HandleKey::End, 0.0, &down);

        session.on_move(&mut data, &down.moved_to(&viewport, Point::new(25.0, 20.0)), viewport.image());
        assert!(data.end().is_finite());
        assert_eq!(data.end(), Point::new(25.0, 20.0));
    }

    #[test]
    fn test_move_all_translates_every_handle() {
        let viewport = viewport();
        let mut data = line(Point::new(10.0, 10.0), Point::new(20.0, 20.0));
        data.handles.text_box.set_position(Point::new(20.0, 20.0));

        let down = PointerEvent::at(&viewport, Point::new(15.0, 15.0), 1);
        let mut session = DragSession::begin_move_all(data.id, MoveAllOptions::default());
        let step = down.moved_to(&viewport, Point::new(18.0, 11.0));
        session.on_move(&mut data, &step, viewport.image());
        session.on_move(&mut data, &step.moved_to(&viewport, Point::new(20.0, 11.0)), viewport.image());

        assert_eq!(data.start(), Point::new(15.0, 6.0));
        assert_eq!(data.end(), Point::new(25.0, 16.0));
        assert_eq!(data.handles.text_box.position(), Point::new(25.0, 16.0));
    }

    #[test]
    fn test_move_all_clamps_when_requested() {
        let viewport = viewport();
        let mut data = line(Point::new(10.0, 10.0), Point::new(90.0, 10.0));
        let options = MoveAllOptions {
            delete_if_handle_outside_image: true,
            prevent_handle_outside_image: true,
        };

        let down = PointerEvent::at(&viewport, Point::new(50.0, 10.0), 1);
        let mut session = DragSession::begin_move_all(data.id, options);
        session.on_move(&mut data, &down.moved_to(&viewport, Point::new(70.0, 10.0)), viewport.image());

        assert_eq!(data.end(), Point::new(100.0, 10.0));
        assert_eq!(session.end(&mut data, viewport.image()), DragOutcome::Keep);
    }

    #[test]
    fn test_end_outside_image_requests_removal() {
        let viewport = viewport();
        let mut data = line(Point::new(90.0, 50.0), Point::new(95.0, 50.0));

        let down = PointerEvent::at(&viewport, Point::new(95.0, 50.0), 1);
        let mut session = DragSession::begin_move_handle(&data, HandleKey::End, &down);
        session.on_move(&mut data, &down.moved_to(&viewport, Point::new(130.0, 50.0)), viewport.image());

        assert_eq!(session.end(&mut data, viewport.image()), DragOutcome::Remove);
        assert!(data.invalidated);
    }

    #[test]
    fn test_text_box_may_leave_the_image() {
        let image = ImageInfo::new(100, 100);
        let mut handles = line(Point::new(10.0, 10.0), Point::new(20.0, 20.0)).handles;
        handles.text_box.set_position(Point::new(-40.0, 500.0));

        assert!(!any_handles_outside_image(&image, &handles));

        handles.start.set_position(Point::new(-1.0, 10.0));
        assert!(any_handles_outside_image(&image, &handles));
    }
}
