use std::fmt;

use crate::frame::Frame;

/// User-visible state changes the viewer records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer moved onto a different marker.
    Hover,
    /// Drag started or ended.
    Drag,
    /// Canvas geometry changed.
    Resize,
    /// Markers were added to the globe.
    Markers,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Hover => "hover",
            EventKind::Drag => "drag",
            EventKind::Resize => "resize",
            EventKind::Markers => "markers",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Events since the last [`EventBus::drain`], in emission order.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_of_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Most recent event of `kind`, if any.
    pub fn last_of_kind(&self, kind: EventKind) -> Option<&Event> {
        self.events.iter().rev().find(|e| e.kind == kind)
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
