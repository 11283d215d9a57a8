// Core types for the SRG media player controller
// Segments, metadata provider contract, controller state machine and events

pub mod callback;
pub mod controller;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod segment;
pub mod segments;
pub mod state;

// Re-export commonly used types
pub use callback::{ControllerEvent, EventDispatcher, EventListener};
pub use controller::{ControllerConfig, MediaPlayerController};
pub use engine::{EngineEvent, PlaybackEngine, StreamType};
pub use error::{PlayerError, Result};
pub use metadata::{MediaMetadata, MetadataCallback, MetadataOutcome, MetadataProvider};
pub use segment::{sort_by_mark_in, Segment};
pub use segments::{SegmentTracker, SegmentTransition};
pub use state::{State, StateContainer};

/// Install the platform logger. Safe to call more than once.
pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("SRGMediaPlayer"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        // Already initialized by the host application is fine
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}

/// Create a controller around `engine`, installing the platform logger first
pub fn create_controller(
    engine: Box<dyn PlaybackEngine>,
    config: ControllerConfig,
) -> std::sync::Arc<MediaPlayerController> {
    init_logging();
    log::info!("Creating media player controller '{}'", config.tag);
    std::sync::Arc::new(MediaPlayerController::new(engine, config))
}
