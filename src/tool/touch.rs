// src/tool/touch.rs - Touch input for the special length tool
//
// Touch reuses the mouse gesture plumbing with a finger-sized handle radius.
// Touch events carry no button, so the mouse button mask does not apply.

use std::sync::Arc;

use tracing::trace;

use crate::host::input::PointerEvent;
use crate::host::viewport::Viewport;
use crate::tool::hit_test::{self, TOUCH_HANDLE_HIT_DISTANCE};
use crate::tool::{EventOutcome, InputKind, SpecialLengthTool, TOOL_TYPE};

impl<V: Viewport> SpecialLengthTool<V> {
    /// Create a record under the finger and drag its end handle
    pub fn on_touch_start_active(&mut self, event: &PointerEvent) -> EventOutcome {
        if !self.listens_to(InputKind::TouchStartActive) {
            return EventOutcome::Ignored;
        }
        self.add_new_measurement(event)
    }

    /// Grab a handle within finger reach, or the line under the finger
    pub fn on_touch_start(&mut self, event: &PointerEvent) -> EventOutcome {
        if !self.listens_to(InputKind::TouchStart) {
            return EventOutcome::Ignored;
        }
        self.begin_existing_drag(event, TOUCH_HANDLE_HIT_DISTANCE)
    }

    pub fn on_touch_drag(&mut self, event: &PointerEvent) {
        if self.listens_to(InputKind::TouchDrag) {
            self.continue_drag(event);
        }
    }

    pub fn on_touch_end(&mut self, _event: &PointerEvent) {
        if self.listens_to(InputKind::TouchEnd) {
            self.finish_drag();
        }
    }

    /// Toggle the highlight of every line under the finger
    pub fn on_tap(&mut self, event: &PointerEvent) -> EventOutcome {
        if !self.listens_to(InputKind::Tap) {
            return EventOutcome::Ignored;
        }

        let pointer = event.current_points.canvas;
        let state = Arc::clone(&self.state);
        let mut store = state.write();
        let Some(records) = store.get_mut(self.viewport.surface_id(), TOOL_TYPE) else {
            return EventOutcome::Ignored;
        };

        let mut toggled = false;
        for data in records.iter_mut() {
            if hit_test::point_near_tool(&self.viewport, data, pointer) {
                data.active = !data.active;
                trace!(id = %data.id, active = data.active, "tap toggled measurement");
                toggled = true;
            }
        }
        drop(store);

        if toggled {
            self.request_redraw();
            EventOutcome::Consumed
        } else {
            EventOutcome::Ignored
        }
    }
}
