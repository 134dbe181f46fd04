use crate::audio::metadata::TrackMetadata;
use crate::input::InputEvent;

/// Everything the navigation loop reacts to, carried on one channel.
#[derive(Debug, Clone)]
pub enum Event {
    // Input
    Input(InputEvent),

    // Playback session
    TrackStarted(TrackMetadata),
    /// The session exhausted its track list (natural completion).
    SessionFinished,
    /// The session exited on an explicit stop request.
    SessionStopped,

    // Process
    Shutdown,
}
