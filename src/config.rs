use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub music_dir: PathBuf,
    pub timing: Timing,
    pub volume: VolumeSettings,
}

/// Every polling cadence and debounce window in one place.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Command poll cadence of the playback loop.
    pub playback_poll: Duration,
    /// Pin sampling cadence of the volume monitor.
    pub volume_poll: Duration,
    /// Per-button hardware debounce window.
    pub button_debounce: Duration,
    /// Cross-button cooldown applied to every logical button event.
    pub event_cooldown: Duration,
    /// Upper bound on waiting for the playback task during shutdown.
    pub stop_join: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            playback_poll: Duration::from_millis(100),
            volume_poll: Duration::from_millis(2),
            button_debounce: Duration::from_millis(50),
            event_cooldown: Duration::from_millis(200),
            stop_join: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VolumeSettings {
    /// Gain applied at startup.
    pub initial: f32,
    /// Gain change per valid encoder transition.
    pub step: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            initial: 0.5,
            step: 0.01,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            music_dir: PathBuf::from("playlists"),
            timing: Timing::default(),
            volume: VolumeSettings::default(),
        }
    }
}

impl Config {
    /// Defaults with environment overrides (`TONBOX_MUSIC_DIR`).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("TONBOX_MUSIC_DIR") {
            config.music_dir = PathBuf::from(dir);
        }
        config
    }
}
