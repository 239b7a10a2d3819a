// src/tool/events.rs - Notifications the tool publishes to the viewer

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::host::input::MouseButtonMask;
use crate::host::state::MeasurementId;
use crate::host::viewport::SurfaceId;
use crate::tool::measurement::MeasurementData;

/// Events emitted by the length tool
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolEvent {
    /// A record was created and stored
    MeasurementAdded {
        tool_type: &'static str,
        surface: SurfaceId,
        id: MeasurementId,
    },
    /// A drag step changed a record
    MeasurementModified {
        tool_type: &'static str,
        surface: SurfaceId,
        measurement: MeasurementData,
    },
    /// A create or drag gesture finished and the record was kept
    MeasurementCompleted {
        tool_type: &'static str,
        surface: SurfaceId,
        id: MeasurementId,
    },
    /// A record was dropped because a handle ended outside the image
    MeasurementRemoved {
        tool_type: &'static str,
        surface: SurfaceId,
        id: MeasurementId,
    },
    ToolDeactivated {
        tool_type: &'static str,
        surface: SurfaceId,
        mouse_button_mask: MouseButtonMask,
    },
    /// The surface should be re-rendered
    ImageUpdateRequested { surface: SurfaceId },
}

/// Broadcast channel for [`ToolEvent`]s
///
/// Publishing never blocks and is dropped silently when nobody listens;
/// subscribers read with `try_recv` from the dispatch thread.
#[derive(Debug, Clone)]
pub struct ToolEventBus {
    event_tx: broadcast::Sender<ToolEvent>,
}

impl ToolEventBus {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self { event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToolEvent> {
        self.event_tx.subscribe()
    }

    pub fn publish(&self, event: ToolEvent) {
        trace!(?event, "publishing tool event");
        let _ = self.event_tx.send(event);
    }
}

impl Default for ToolEventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Drain everything currently buffered on a receiver
pub fn drain_events(receiver: &mut broadcast::Receiver<ToolEvent>) -> Vec<ToolEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                trace!(skipped, "event receiver lagged");
            }
            Err(_) => break,
        }
    }
    events
}
