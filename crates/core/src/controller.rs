// Media player controller: drives a playback engine, tracks segments and
// notifies listeners

use crate::callback::{ControllerEvent, EventDispatcher, EventListener};
use crate::engine::{EngineEvent, PlaybackEngine, StreamType};
use crate::error::{PlayerError, Result};
use crate::segment::Segment;
use crate::segments::{SegmentTracker, SegmentTransition};
use crate::state::{State, StateContainer};
use parking_lot::Mutex;
use std::sync::Arc;

const FULL_VOLUME: f32 = 1.0;
const MUTED_VOLUME: f32 = 0.0;

/// Controller settings
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Name passed to listeners and used in log lines
    pub tag: String,
    /// Log every engine report at info level
    pub debug_mode: bool,
    pub muted: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tag: "SRGMediaPlayer".to_string(),
            debug_mode: false,
            muted: false,
        }
    }
}

impl ControllerConfig {
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }
}

/// Mutable controller state. Every state transition happens while this is
/// locked, so a `Released` check made under the lock holds until it is dropped.
struct Inner {
    engine: Box<dyn PlaybackEngine>,
    tracker: SegmentTracker,
    play_when_ready: bool,
    /// Last requested seek position, reported once the engine is ready
    pending_seek: Option<i64>,
    /// Position reported after the engine is gone
    last_position: i64,
    debug_mode: bool,
    muted: bool,
}

/// Playback controller facade.
///
/// Commands may be issued from any thread. Listener callbacks run on the
/// calling thread after the controller's locks are dropped, so listeners
/// are free to call back into the controller.
pub struct MediaPlayerController {
    tag: String,
    state: StateContainer,
    inner: Mutex<Inner>,
    dispatcher: EventDispatcher,
}

impl MediaPlayerController {
    pub fn new(engine: Box<dyn PlaybackEngine>, config: ControllerConfig) -> Self {
        log::info!("[{}] MediaPlayerController::new", config.tag);
        Self {
            tag: config.tag,
            state: StateContainer::new(),
            inner: Mutex::new(Inner {
                engine,
                tracker: SegmentTracker::default(),
                play_when_ready: false,
                pending_seek: None,
                last_position: 0,
                debug_mode: config.debug_mode,
                muted: config.muted,
            }),
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn register_event_listener(&self, listener: Arc<dyn EventListener>) {
        self.dispatcher.register(listener);
    }

    pub fn unregister_event_listener(&self, listener: &Arc<dyn EventListener>) -> bool {
        self.dispatcher.unregister(listener)
    }

    /// Load a media into the engine.
    ///
    /// `selected` overrides `start_position` with its mark-in when it is part
    /// of `segments` and not blocked. A start position inside a blocked
    /// segment is moved past it.
    pub fn prepare(
        &self,
        uri: &str,
        start_position: Option<i64>,
        stream_type: StreamType,
        segments: Vec<Segment>,
        selected: Option<&Segment>,
    ) -> Result<()> {
        let mut events = Vec::new();
        let result = self.prepare_locked(
            uri,
            start_position,
            stream_type,
            segments,
            selected,
            &mut events,
        );
        self.emit(events);
        result
    }

    /// Prepare without segments and start playing
    pub fn play(&self, uri: &str, start_position: Option<i64>, stream_type: StreamType) -> Result<()> {
        self.prepare(uri, start_position, stream_type, Vec::new(), None)?;
        self.start()
    }

    pub fn start(&self) -> Result<()> {
        self.set_play_when_ready(true)
    }

    pub fn pause(&self) -> Result<()> {
        self.set_play_when_ready(false)
    }

    /// Seek to `position`. Ignored once released.
    pub fn seek_to(&self, position: i64) -> Result<()> {
        let mut events = Vec::new();
        let result = {
            let mut inner = self.inner.lock();
            if self.is_released() {
                log::warn!("[{}] seek_to({}) ignored, controller released", self.tag, position);
                return Ok(());
            }
            self.seek_locked(&mut inner, position, &mut events)
        };
        self.emit(events);
        result
    }

    /// Jump to the start of a segment of the current list
    pub fn switch_to_segment(&self, identifier: &str) -> Result<()> {
        let mut events = Vec::new();
        let result = {
            let mut inner = self.inner.lock();
            if self.is_released() {
                return Err(PlayerError::Released);
            }
            let segment = inner
                .tracker
                .find(identifier)
                .cloned()
                .ok_or_else(|| PlayerError::SegmentNotFound(identifier.to_string()))?;
            if let Some(reason) = segment.blocking_reason().filter(|_| segment.is_blocked()) {
                return Err(PlayerError::SegmentBlocked {
                    identifier: identifier.to_string(),
                    reason: reason.to_string(),
                });
            }
            inner.tracker.select(identifier);
            events.push(ControllerEvent::SegmentSelected {
                segment: segment.clone(),
            });
            self.seek_locked(&mut inner, segment.mark_in(), &mut events)
        };
        self.emit(events);
        result
    }

    /// Feed an engine report into the controller
    pub fn on_engine_event(&self, event: EngineEvent) {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.lock();
            if self.is_released() {
                log::debug!("[{}] engine event {:?} after release", self.tag, event);
                return;
            }
            if inner.debug_mode {
                log::info!("[{}] engine event {:?}", self.tag, event);
            } else {
                log::debug!("[{}] engine event {:?}", self.tag, event);
            }

            match event {
                EngineEvent::Buffering => {
                    self.change_state(State::Buffering, &mut events);
                }
                EngineEvent::Ready => {
                    self.change_state(State::Ready, &mut events);
                    if let Some(position) = inner.pending_seek.take() {
                        events.push(ControllerEvent::DidSeek { position });
                    }
                }
                EngineEvent::Ended => {
                    events.push(ControllerEvent::MediaCompleted);
                    self.release_locked(&mut inner, &mut events);
                }
                EngineEvent::Error { error, fatal: true } => {
                    log::error!("[{}] fatal error: {}", self.tag, error);
                    events.push(ControllerEvent::FatalError { error });
                    self.release_locked(&mut inner, &mut events);
                }
                EngineEvent::Error { error, fatal: false } => {
                    log::warn!("[{}] transient error: {}", self.tag, error);
                    events.push(ControllerEvent::TransientError { error });
                }
            }
        }
        self.emit(events);
    }

    /// Compare the engine position with the segment list.
    ///
    /// Reports segment start/end/switch and skips blocked segments. Meant to
    /// be called periodically while the media plays.
    pub fn check_position(&self) -> Result<()> {
        let mut events = Vec::new();
        let result = {
            let mut inner = self.inner.lock();
            if matches!(self.state.get(), State::Idle | State::Released) {
                return Ok(());
            }
            let position = inner.engine.position();
            let target = track_position(&mut inner.tracker, position, &mut events);
            if target != position {
                log::info!("[{}] skipping blocked range {} -> {}", self.tag, position, target);
                inner.engine.seek_to(target)
            } else {
                Ok(())
            }
        };
        self.emit(events);
        result
    }

    /// Release the engine. The controller reports `Released` right away and
    /// ignores further commands.
    pub fn release(&self) {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.lock();
            self.release_locked(&mut inner, &mut events);
        }
        self.emit(events);
    }

    pub fn set_mute(&self, muted: bool) {
        let mut inner = self.inner.lock();
        inner.muted = muted;
        if !self.is_released() {
            inner.engine.set_volume(volume_for(muted));
        }
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().muted
    }

    pub fn set_debug_mode(&self, debug_mode: bool) {
        self.inner.lock().debug_mode = debug_mode;
    }

    pub fn is_debug_mode(&self) -> bool {
        self.inner.lock().debug_mode
    }

    pub fn state(&self) -> State {
        self.state.get()
    }

    pub fn is_released(&self) -> bool {
        self.state.get() == State::Released
    }

    pub fn is_playing(&self) -> bool {
        self.state.get() == State::Ready && self.inner.lock().play_when_ready
    }

    pub fn is_loading(&self) -> bool {
        self.state.get().is_loading()
    }

    pub fn is_live(&self) -> bool {
        self.with_engine(false, |engine| engine.is_live())
    }

    pub fn has_video_track(&self) -> bool {
        self.with_engine(false, |engine| engine.has_video_track())
    }

    /// Current position in milliseconds; 0 before anything is prepared
    pub fn media_position(&self) -> i64 {
        let inner = self.inner.lock();
        match self.state.get() {
            State::Idle => 0,
            State::Released => inner.last_position,
            _ => inner.engine.position(),
        }
    }

    /// Media duration in milliseconds, `None` while unknown
    pub fn media_duration(&self) -> Option<i64> {
        self.with_engine(None, |engine| engine.duration())
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.inner.lock().tracker.segments().to_vec()
    }

    pub fn current_segment(&self) -> Option<Segment> {
        self.inner.lock().tracker.current().cloned()
    }

    pub fn selected_segment(&self) -> Option<Segment> {
        self.inner.lock().tracker.selected().cloned()
    }

    fn prepare_locked(
        &self,
        uri: &str,
        start_position: Option<i64>,
        stream_type: StreamType,
        segments: Vec<Segment>,
        selected: Option<&Segment>,
        events: &mut Vec<ControllerEvent>,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        self.state.transition(State::Preparing).map(|old_state| {
            events.push(ControllerEvent::StateChanged {
                old_state,
                new_state: State::Preparing,
            })
        })?;
        log::info!("[{}] prepare {} ({:?})", self.tag, uri, stream_type);

        inner.tracker = SegmentTracker::new(segments);
        inner.pending_seek = None;
        events.push(ControllerEvent::SegmentListChanged {
            segments: inner.tracker.segments().to_vec(),
        });

        // Same rules as switch_to_segment: listed and not blocked
        let chosen = selected.and_then(|wanted| match inner.tracker.find(wanted.identifier()) {
            Some(segment) if segment.is_blocked() => {
                log::warn!("[{}] selected segment {} is blocked", self.tag, wanted.identifier());
                None
            }
            Some(segment) => Some(segment.clone()),
            None => {
                log::warn!("[{}] selected segment {} not in segment list", self.tag, wanted.identifier());
                None
            }
        });
        let requested = match chosen {
            Some(segment) => {
                inner.tracker.select(segment.identifier());
                let mark_in = segment.mark_in();
                events.push(ControllerEvent::SegmentSelected { segment });
                mark_in
            }
            None => start_position.unwrap_or(0),
        };
        let position = track_position(&mut inner.tracker, requested, events);

        let muted = inner.muted;
        inner.engine.set_volume(volume_for(muted));
        if let Err(error) = inner.engine.prepare(uri, stream_type, position) {
            log::error!("[{}] prepare failed: {}", self.tag, error);
            events.push(ControllerEvent::FatalError {
                error: error.clone(),
            });
            self.release_locked(&mut inner, events);
            return Err(error);
        }
        let play_when_ready = inner.play_when_ready;
        inner.engine.set_play_when_ready(play_when_ready);

        self.change_state(State::Buffering, events);
        Ok(())
    }

    fn seek_locked(
        &self,
        inner: &mut Inner,
        position: i64,
        events: &mut Vec<ControllerEvent>,
    ) -> Result<()> {
        if self.state.get() == State::Idle {
            return Err(PlayerError::InvalidState(
                "seek requested before prepare".to_string(),
            ));
        }
        events.push(ControllerEvent::WillSeek { position });
        inner.tracker.reset();
        let target = track_position(&mut inner.tracker, position, events);
        inner.engine.seek_to(target)?;
        inner.pending_seek = Some(target);
        if self.state.get() == State::Ready {
            self.change_state(State::Buffering, events);
        }
        Ok(())
    }

    fn set_play_when_ready(&self, play_when_ready: bool) -> Result<()> {
        let changed = {
            let mut inner = self.inner.lock();
            if self.is_released() {
                log::debug!("[{}] play_when_ready({}) ignored, controller released", self.tag, play_when_ready);
                return Ok(());
            }
            inner.engine.set_play_when_ready(play_when_ready);
            let changed = inner.play_when_ready != play_when_ready;
            inner.play_when_ready = play_when_ready;
            changed
        };
        if changed {
            self.emit(vec![ControllerEvent::PlayingStateChanged {
                playing: play_when_ready,
            }]);
        }
        Ok(())
    }

    fn release_locked(&self, inner: &mut Inner, events: &mut Vec<ControllerEvent>) {
        let old_state = match self.state.transition(State::Released) {
            Ok(old_state) => old_state,
            Err(_) => return,
        };
        log::info!("[{}] release", self.tag);
        if old_state != State::Idle {
            inner.last_position = inner.engine.position();
        }
        inner.play_when_ready = false;
        inner.pending_seek = None;
        inner.engine.release();
        events.push(ControllerEvent::StateChanged {
            old_state,
            new_state: State::Released,
        });
    }

    fn change_state(&self, new_state: State, events: &mut Vec<ControllerEvent>) {
        if self.state.get() == new_state {
            return;
        }
        match self.state.transition(new_state) {
            Ok(old_state) => events.push(ControllerEvent::StateChanged {
                old_state,
                new_state,
            }),
            Err(e) => log::warn!("[{}] {}", self.tag, e),
        }
    }

    fn with_engine<T, F>(&self, default: T, f: F) -> T
    where
        F: FnOnce(&dyn PlaybackEngine) -> T,
    {
        let inner = self.inner.lock();
        match self.state.get() {
            State::Idle | State::Released => default,
            _ => f(inner.engine.as_ref()),
        }
    }

    fn emit(&self, events: Vec<ControllerEvent>) {
        for event in events {
            self.dispatcher.dispatch(&self.tag, &event);
        }
    }
}

impl Drop for MediaPlayerController {
    fn drop(&mut self) {
        if !self.is_released() {
            let inner = self.inner.get_mut();
            inner.engine.release();
        }
    }
}

/// Run the tracker at `position`, following blocked skips. Returns the
/// position playback should continue from.
fn track_position(tracker: &mut SegmentTracker, mut position: i64, events: &mut Vec<ControllerEvent>) -> i64 {
    loop {
        match tracker.update(position) {
            SegmentTransition::Blocked { segment, skip_to } => {
                log::debug!(
                    "segment {} blocked ({:?}), skip to {}",
                    segment.identifier(),
                    segment.blocking_reason(),
                    skip_to
                );
                events.push(ControllerEvent::SegmentSkippedBlocked { segment });
                position = skip_to;
            }
            SegmentTransition::Start(segment) => {
                events.push(ControllerEvent::SegmentStart { segment });
                return position;
            }
            SegmentTransition::End(segment) => {
                events.push(ControllerEvent::SegmentEnd { segment });
                return position;
            }
            SegmentTransition::Switch { from, to } => {
                events.push(ControllerEvent::SegmentSwitch { from, to });
                return position;
            }
            SegmentTransition::None => return position,
        }
    }
}

fn volume_for(muted: bool) -> f32 {
    if muted {
        MUTED_VOLUME
    } else {
        FULL_VOLUME
    }
}
