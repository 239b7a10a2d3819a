// src/tool/measurement.rs - Length measurement record and its factory

use serde::{Deserialize, Serialize};

use crate::geometry::{point_distance, BoundingBox, Point};
use crate::host::state::{Identified, MeasurementId};

/// Draggable end point of the measured segment (image pixel space)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineHandle {
    pub x: f64,
    pub y: f64,
    pub highlight: bool,
    pub active: bool,
}

impl LineHandle {
    fn at(origin: Point, active: bool) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            highlight: true,
            active,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, point: Point) {
        self.x = point.x;
        self.y = point.y;
    }
}

/// Anchor of the length label (image pixel space)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextBoxHandle {
    pub x: f64,
    pub y: f64,
    pub active: bool,
    /// Set once the user has dragged the label away from its default spot
    pub has_moved: bool,
    pub moves_independently: bool,
    pub drawn_independently: bool,
    pub allowed_outside_image: bool,
    pub has_bounding_box: bool,
    /// Canvas rectangle of the label from the last render
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl TextBoxHandle {
    fn unmoved(origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            active: false,
            has_moved: false,
            moves_independently: false,
            drawn_independently: true,
            allowed_outside_image: true,
            has_bounding_box: true,
            bounding_box: None,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, point: Point) {
        self.x = point.x;
        self.y = point.y;
    }
}

/// Names one of the three handles of a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKey {
    Start,
    End,
    TextBox,
}

impl HandleKey {
    /// Order in which handles are hit-tested
    pub const ALL: [HandleKey; 3] = [HandleKey::Start, HandleKey::End, HandleKey::TextBox];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementHandles {
    pub start: LineHandle,
    pub end: LineHandle,
    pub text_box: TextBoxHandle,
}

impl MeasurementHandles {
    pub fn position(&self, key: HandleKey) -> Point {
        match key {
            HandleKey::Start => self.start.position(),
            HandleKey::End => self.end.position(),
            HandleKey::TextBox => self.text_box.position(),
        }
    }

    pub fn set_position(&mut self, key: HandleKey, point: Point) {
        match key {
            HandleKey::Start => self.start.set_position(point),
            HandleKey::End => self.end.set_position(point),
            HandleKey::TextBox => self.text_box.set_position(point),
        }
    }

    pub fn is_active(&self, key: HandleKey) -> bool {
        match key {
            HandleKey::Start => self.start.active,
            HandleKey::End => self.end.active,
            HandleKey::TextBox => self.text_box.active,
        }
    }

    pub fn set_active(&mut self, key: HandleKey, active: bool) {
        match key {
            HandleKey::Start => self.start.active = active,
            HandleKey::End => self.end.active = active,
            HandleKey::TextBox => self.text_box.active = active,
        }
    }

    /// The handle currently flagged active, if any
    pub fn active_handle(&self) -> Option<HandleKey> {
        HandleKey::ALL.into_iter().find(|key| self.is_active(*key))
    }

    /// Make `key` the only active handle (or clear all with `None`)
    pub fn activate_only(&mut self, key: Option<HandleKey>) {
        for candidate in HandleKey::ALL {
            self.set_active(candidate, Some(candidate) == key);
        }
    }

    /// Whether the handle may sit outside the image without being culled
    pub fn allowed_outside_image(&self, key: HandleKey) -> bool {
        match key {
            HandleKey::TextBox => self.text_box.allowed_outside_image,
            HandleKey::Start | HandleKey::End => false,
        }
    }

    /// Whether a whole-tool drag leaves this handle in place
    pub fn moves_independently(&self, key: HandleKey) -> bool {
        match key {
            HandleKey::TextBox => self.text_box.moves_independently,
            HandleKey::Start | HandleKey::End => false,
        }
    }
}

/// One drawn length annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementData {
    pub id: MeasurementId,
    pub visible: bool,
    pub active: bool,
    pub handles: MeasurementHandles,
    /// Set by the last end-handle grab query
    pub pressed_end_handle: bool,
    /// Start-end pixel distance cached when the end handle was pressed
    pub dist_ab: f64,
    /// Physical (or pixel) length from the last render
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Set once a create or drag gesture has completed
    pub invalidated: bool,
}

impl MeasurementData {
    pub fn start(&self) -> Point {
        self.handles.start.position()
    }

    pub fn end(&self) -> Point {
        self.handles.end.position()
    }

    /// Start-end distance in image pixels
    pub fn pixel_distance(&self) -> f64 {
        point_distance(self.start(), self.end())
    }
}

impl Identified for MeasurementData {
    fn id(&self) -> MeasurementId {
        self.id
    }

    fn set_id(&mut self, id: MeasurementId) {
        self.id = id;
    }
}

/// Fresh record at `origin` (image pixel space) with the end handle grabbed
pub fn create_new_measurement(origin: Point) -> MeasurementData {
    MeasurementData {
        id: MeasurementId(0),
        visible: true,
        active: true,
        handles: MeasurementHandles {
            start: LineHandle::at(origin, false),
            end: LineHandle::at(origin, true),
            text_box: TextBoxHandle::unmoved(origin),
        },
        pressed_end_handle: false,
        dist_ab: 0.0,
        length: None,
        invalidated: false,
    }
}
