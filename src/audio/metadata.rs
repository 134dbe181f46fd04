use std::path::Path;

use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use tracing::debug;

pub const UNKNOWN: &str = "Unknown";

/// Display-ready track description. Missing tags fall back to the file
/// name (title) or `"Unknown"`; resolution never fails the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
}

impl TrackMetadata {
    fn fallback(path: &Path) -> Self {
        Self {
            title: file_stem(path),
            artist: UNKNOWN.to_string(),
            album: UNKNOWN.to_string(),
            year: UNKNOWN.to_string(),
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Best-effort tag read for one track.
pub fn resolve(path: &Path) -> TrackMetadata {
    let tagged = match Probe::open(path).and_then(|probe| probe.read()) {
        Ok(tagged) => tagged,
        Err(e) => {
            debug!(track = %path.display(), error = %e, "no readable tags");
            return TrackMetadata::fallback(path);
        }
    };

    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return TrackMetadata::fallback(path);
    };

    TrackMetadata {
        title: tag
            .title()
            .map(|value| value.into_owned())
            .unwrap_or_else(|| file_stem(path)),
        artist: tag
            .artist()
            .map(|value| value.into_owned())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        album: tag
            .album()
            .map(|value| value.into_owned())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        year: tag
            .year()
            .map(|year| year.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string()),
    }
}
