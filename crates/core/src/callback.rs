// Controller events and listener registration

use crate::error::PlayerError;
use crate::segment::Segment;
use crate::state::State;
use parking_lot::Mutex;
use std::sync::Arc;

/// Controller event types
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Controller state changed
    StateChanged { old_state: State, new_state: State },

    /// Play-when-ready toggled by start/pause
    PlayingStateChanged { playing: bool },

    /// A seek was requested
    WillSeek { position: i64 },

    /// The engine is ready again after a seek
    DidSeek { position: i64 },

    /// Playback reached the end of the media
    MediaCompleted,

    /// Unrecoverable error; the controller releases itself
    FatalError { error: PlayerError },

    /// Recoverable error, playback continues
    TransientError { error: PlayerError },

    /// A new segment list was installed by prepare
    SegmentListChanged { segments: Vec<Segment> },

    /// User switched to a segment
    SegmentSelected { segment: Segment },

    /// Playback entered a segment
    SegmentStart { segment: Segment },

    /// Playback left a segment
    SegmentEnd { segment: Segment },

    /// Playback moved from one segment straight into the next
    SegmentSwitch { from: Segment, to: Segment },

    /// A blocked segment was skipped
    SegmentSkippedBlocked { segment: Segment },
}

/// Listener for controller events.
/// Called on the thread that triggered the event, outside the controller locks.
pub trait EventListener: Send + Sync {
    fn on_event(&self, tag: &str, event: &ControllerEvent);
}

/// Fan-out of controller events to registered listeners
pub struct EventDispatcher {
    listeners: Mutex<Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, listener: Arc<dyn EventListener>) {
        let mut listeners = self.listeners.lock();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    /// Returns false if the listener was not registered
    pub fn unregister(&self, listener: &Arc<dyn EventListener>) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dispatch(&self, tag: &str, event: &ControllerEvent) {
        // Snapshot so listeners can (un)register while being notified
        let listeners: Vec<Arc<dyn EventListener>> = self.listeners.lock().clone();
        for listener in listeners {
            listener.on_event(tag, event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener that records every event, for tests
#[cfg(test)]
pub struct RecordingListener {
    events: Mutex<Vec<ControllerEvent>>,
}

#[cfg(test)]
impl RecordingListener {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<ControllerEvent> {
        self.events.lock().clone()
    }

    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&ControllerEvent) -> bool,
    {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[cfg(test)]
impl EventListener for RecordingListener {
    fn on_event(&self, _tag: &str, event: &ControllerEvent) {
        self.events.lock().push(event.clone());
    }
}
