use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use flume::Sender;
use rand::rng;
use rand::seq::SliceRandom;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Timing;
use crate::event::events::Event;
use crate::library;

use super::commands::{CommandCell, PlayerCommand};
use super::error::AudioError;
use super::metadata;
use super::output::AudioOutput;

/// How one track ended.
enum TrackExit {
    /// Natural end or skip: move to the next index.
    Advance,
    /// Rewind request: step the index back, or restart track 0.
    StepBack,
    /// Stop request: leave the loop without a completion signal.
    Halted,
}

/// Control handle owned by the navigation side. Every request is
/// fire-and-set; nothing here blocks the caller.
pub struct SessionHandle {
    commands: Arc<CommandCell>,
    paused: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn pause(&self) {
        self.commands.set(PlayerCommand::Pause);
    }

    pub fn resume(&self) {
        self.commands.set(PlayerCommand::Resume);
    }

    pub fn skip(&self) {
        self.commands.set(PlayerCommand::Skip);
    }

    pub fn rewind(&self) {
        self.commands.set(PlayerCommand::Rewind);
    }

    pub fn request_stop(&self) {
        self.commands.set(PlayerCommand::Stop);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Stop and wait for the loop to exit, bounded so shutdown cannot
    /// hang on a wedged audio backend.
    pub async fn shutdown(self, limit: Duration) {
        self.request_stop();
        if tokio::time::timeout(limit, self.task).await.is_err() {
            warn!("playback task did not stop within {limit:?}, abandoning it");
        }
    }
}

/// One playback session: a shuffled snapshot of a playlist directory and
/// the loop feeding it to the audio output track by track.
///
/// The loop is the only consumer of the command cell and the only writer
/// of the track index. Exactly one of `SessionFinished` (natural end) or
/// `SessionStopped` (stop request) is emitted per session.
pub struct PlaybackSession {
    tracks: Vec<PathBuf>,
    output: Arc<dyn AudioOutput>,
    events: Sender<Event>,
    commands: Arc<CommandCell>,
    paused: Arc<AtomicBool>,
    poll: Duration,
}

impl PlaybackSession {
    /// Enumerate `dir`, shuffle, and spawn the track loop. An empty
    /// directory is reported as `EmptyPlaylist`; callers treat that as an
    /// already-finished session.
    pub fn start(
        dir: &Path,
        output: Arc<dyn AudioOutput>,
        events: Sender<Event>,
        timing: &Timing,
    ) -> Result<SessionHandle, AudioError> {
        let mut tracks = library::tracks(dir).map_err(|e| AudioError::Io(e.to_string()))?;
        if tracks.is_empty() {
            return Err(AudioError::EmptyPlaylist(dir.display().to_string()));
        }
        tracks.shuffle(&mut rng());
        info!(playlist = %dir.display(), count = tracks.len(), "starting playback session");

        let commands = Arc::new(CommandCell::new());
        let paused = Arc::new(AtomicBool::new(false));
        let session = Self {
            tracks,
            output,
            events,
            commands: commands.clone(),
            paused: paused.clone(),
            poll: timing.playback_poll,
        };
        let task = tokio::spawn(session.run());

        Ok(SessionHandle {
            commands,
            paused,
            task,
        })
    }

    async fn run(mut self) {
        let mut index = 0usize;
        while index < self.tracks.len() {
            let path = self.tracks[index].clone();
            match self.play_one(&path).await {
                TrackExit::Advance => index += 1,
                TrackExit::StepBack => index = index.saturating_sub(1),
                TrackExit::Halted => {
                    debug!("session stopped on request");
                    let _ = self.events.send(Event::SessionStopped);
                    return;
                }
            }
        }
        debug!("playlist exhausted");
        let _ = self.events.send(Event::SessionFinished);
    }

    /// Load one track and poll it to an exit. A failed load is logged and
    /// skipped; the session keeps going.
    async fn play_one(&mut self, path: &Path) -> TrackExit {
        self.paused.store(false, Ordering::SeqCst);
        if let Err(e) = self.output.load(path) {
            warn!(track = %path.display(), error = %e, "skipping unplayable track");
            return TrackExit::Advance;
        }
        let _ = self.events.send(Event::TrackStarted(metadata::resolve(path)));

        loop {
            if !self.output.is_busy() && !self.paused.load(Ordering::SeqCst) {
                return TrackExit::Advance;
            }
            tokio::time::sleep(self.poll).await;
            match self.commands.take() {
                PlayerCommand::None => {}
                PlayerCommand::Pause => {
                    self.output.pause();
                    self.paused.store(true, Ordering::SeqCst);
                }
                PlayerCommand::Resume => {
                    self.output.resume();
                    self.paused.store(false, Ordering::SeqCst);
                }
                PlayerCommand::Skip => {
                    self.output.stop();
                    return TrackExit::Advance;
                }
                PlayerCommand::Rewind => {
                    self.output.stop();
                    return TrackExit::StepBack;
                }
                PlayerCommand::Stop => {
                    self.output.stop();
                    return TrackExit::Halted;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::testing::MockOutput;
    use flume::Receiver;
    use std::fs::File;

    fn timing() -> Timing {
        Timing {
            playback_poll: Duration::from_millis(1),
            ..Timing::default()
        }
    }

    fn playlist_dir(track_names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in track_names {
            File::create(dir.path().join(name)).unwrap();
        }
        dir
    }

    async fn next_event(rx: &Receiver<Event>) -> Event {
        tokio::time::timeout(Duration::from_secs(5), rx.recv_async())
            .await
            .expect("event before timeout")
            .expect("channel open")
    }

    async fn wait_for_terminal(rx: &Receiver<Event>) -> Event {
        loop {
            match next_event(rx).await {
                Event::TrackStarted(_) => continue,
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn empty_playlist_is_rejected_without_loading_anything() {
        let dir = playlist_dir(&[]);
        let output = MockOutput::new(3);
        let (tx, rx) = flume::unbounded();

        let result = PlaybackSession::start(dir.path(), output.clone(), tx, &timing());
        assert!(matches!(result, Err(AudioError::EmptyPlaylist(_))));
        assert_eq!(output.load_count(), 0);
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn natural_exhaustion_fires_completion_exactly_once() {
        let dir = playlist_dir(&["a.mp3", "b.mp3"]);
        let output = MockOutput::new(3);
        let (tx, rx) = flume::unbounded();

        let handle =
            PlaybackSession::start(dir.path(), output.clone(), tx, &timing()).unwrap();

        assert!(matches!(wait_for_terminal(&rx).await, Event::SessionFinished));
        handle.shutdown(Duration::from_secs(1)).await;
        assert_eq!(output.load_count(), 2);
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn stop_suppresses_the_completion_signal() {
        let dir = playlist_dir(&["a.mp3"]);
        let output = MockOutput::new(i64::MAX);
        let (tx, rx) = flume::unbounded();

        let handle =
            PlaybackSession::start(dir.path(), output.clone(), tx, &timing()).unwrap();
        handle.request_stop();

        assert!(matches!(wait_for_terminal(&rx).await, Event::SessionStopped));
        handle.shutdown(Duration::from_secs(1)).await;
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn skip_on_the_last_track_finishes_the_session() {
        let dir = playlist_dir(&["only.mp3"]);
        let output = MockOutput::new(i64::MAX);
        let (tx, rx) = flume::unbounded();

        let handle =
            PlaybackSession::start(dir.path(), output.clone(), tx, &timing()).unwrap();
        handle.skip();

        assert!(matches!(wait_for_terminal(&rx).await, Event::SessionFinished));
        handle.shutdown(Duration::from_secs(1)).await;
        assert_eq!(output.load_count(), 1);
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn rewind_on_the_first_track_reloads_it() {
        let dir = playlist_dir(&["only.mp3"]);
        let output = MockOutput::new(i64::MAX);
        let (tx, rx) = flume::unbounded();

        let handle =
            PlaybackSession::start(dir.path(), output.clone(), tx, &timing()).unwrap();
        handle.rewind();

        // First load, then the reload of the same track.
        while output.load_count() < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        {
            let loads = output.loads.lock().unwrap();
            assert_eq!(loads[0], loads[1]);
        }

        handle.request_stop();
        assert!(matches!(wait_for_terminal(&rx).await, Event::SessionStopped));
        handle.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn unplayable_track_is_skipped_and_the_session_continues() {
        let dir = playlist_dir(&["bad.mp3", "good.mp3"]);
        let output = MockOutput::new(2);
        *output.fail_matching.lock().unwrap() = Some("bad".to_string());
        let (tx, rx) = flume::unbounded();

        let handle =
            PlaybackSession::start(dir.path(), output.clone(), tx, &timing()).unwrap();

        let mut started = 0;
        loop {
            match next_event(&rx).await {
                Event::TrackStarted(meta) => {
                    assert_eq!(meta.title, "good");
                    started += 1;
                }
                Event::SessionFinished => break,
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(started, 1);
        assert_eq!(output.load_count(), 1);
        handle.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn pause_holds_the_track_until_resume() {
        let dir = playlist_dir(&["only.mp3"]);
        let output = MockOutput::new(2);
        let (tx, rx) = flume::unbounded();

        let handle =
            PlaybackSession::start(dir.path(), output.clone(), tx, &timing()).unwrap();
        assert!(matches!(next_event(&rx).await, Event::TrackStarted(_)));
        handle.pause();

        while !handle.is_paused() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        // The two busy polls are long spent; only the paused flag keeps
        // the track alive.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handle.is_paused());
        assert!(rx.is_empty());

        handle.resume();
        assert!(matches!(wait_for_terminal(&rx).await, Event::SessionFinished));
        handle.shutdown(Duration::from_secs(1)).await;
    }
}
