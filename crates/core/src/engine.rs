// Playback engine abstraction
// The engine does the actual streaming, buffering and rendering; the
// controller only drives it and reacts to what it reports.

use crate::error::{PlayerError, Result};

/// How the media is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamType {
    Hls,
    HttpProgressive,
    Dash,
}

/// Events reported by the engine back to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Engine needs more data before it can render
    Buffering,
    /// Engine can render at the current position
    Ready,
    /// End of media reached
    Ended,
    /// Engine failure; `fatal` errors stop playback
    Error { error: PlayerError, fatal: bool },
}

/// Media playback engine driven by the controller.
/// Positions and durations are in milliseconds on the media timeline.
pub trait PlaybackEngine: Send {
    /// Load a media and start buffering at `start_position`
    fn prepare(&mut self, uri: &str, stream_type: StreamType, start_position: i64) -> Result<()>;

    /// Play as soon as enough data is buffered (`true`) or hold (`false`)
    fn set_play_when_ready(&mut self, play_when_ready: bool);

    fn seek_to(&mut self, position: i64) -> Result<()>;

    fn position(&self) -> i64;

    /// Media duration, `None` while unknown
    fn duration(&self) -> Option<i64>;

    fn is_live(&self) -> bool;

    fn has_video_track(&self) -> bool;

    /// Volume in 0.0 - 1.0
    fn set_volume(&mut self, volume: f32);

    /// Release all resources; the engine is not used afterwards
    fn release(&mut self);
}

/// Map an HTTP status reported by the engine's data source to an error event
pub fn http_status_event(status: u16) -> EngineEvent {
    let error = PlayerError::Network(format!("HTTP status {}", status));
    // Client errors will not go away by retrying
    let fatal = (400..500).contains(&status);
    EngineEvent::Error { error, fatal }
}
