use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AudioError {
    #[error("audio output device error: {0}")]
    Device(String),

    #[error("decoding error: {0}")]
    Decode(String),

    #[error("playlist has no tracks: {0}")]
    EmptyPlaylist(String),

    #[error("i/o error: {0}")]
    Io(String),
}
