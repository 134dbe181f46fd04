use std::io;
use std::path::{Path, PathBuf};

/// Playlist storage: one subdirectory per playlist, `.mp3` files inside.
pub struct PlaylistLibrary {
    base: PathBuf,
}

impl PlaylistLibrary {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Sorted playlist names.
    pub fn playlists(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.base)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn playlist_path(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }
}

/// Sorted `.mp3` paths directly inside `dir`.
pub fn tracks(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut tracks = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_mp3 = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
        if is_mp3 && path.is_file() {
            tracks.push(path);
        }
    }
    tracks.sort();
    Ok(tracks)
}
