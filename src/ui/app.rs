use std::sync::Arc;

use flume::{Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::audio::error::AudioError;
use crate::audio::metadata::TrackMetadata;
use crate::audio::output::AudioOutput;
use crate::audio::session::{PlaybackSession, SessionHandle};
use crate::config::Config;
use crate::event::events::Event;
use crate::input::InputEvent;
use crate::library::PlaylistLibrary;
use crate::ui::display::{DisplayError, PanelDisplay};
use crate::ui::menu::MenuList;
use crate::ui::screens;
use crate::ui::state::{HomeCursor, HomeOption, Screen};

/// The navigation state machine: owns the active screen, both cursors,
/// the panel, and the handle of the running playback session. All state
/// here is confined to the event-loop task; other contexts only reach it
/// through the event channel.
pub struct App {
    config: Config,
    library: PlaylistLibrary,
    display: Box<dyn PanelDisplay>,
    output: Arc<dyn AudioOutput>,
    event_rx: Receiver<Event>,
    event_tx: Sender<Event>,
    screen: Screen,
    home: HomeCursor,
    menu: MenuList,
    session: Option<SessionHandle>,
    now_playing: Option<TrackMetadata>,
    paused: bool,
}

impl App {
    pub fn new(
        config: Config,
        display: Box<dyn PanelDisplay>,
        output: Arc<dyn AudioOutput>,
        event_tx: Sender<Event>,
        event_rx: Receiver<Event>,
    ) -> Self {
        let library = PlaylistLibrary::new(config.music_dir.clone());
        Self {
            config,
            library,
            display,
            output,
            event_rx,
            event_tx,
            screen: Screen::Home,
            home: HomeCursor::default(),
            menu: MenuList::default(),
            session: None,
            now_playing: None,
            paused: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let initial = screens::home(self.display.as_mut(), &self.home);
        self.recover(initial);

        while let Ok(event) = self.event_rx.recv_async().await {
            if matches!(event, Event::Shutdown) {
                break;
            }
            self.handle_event(event);
        }

        self.shutdown().await;
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Input(input) => self.handle_input(input),
            Event::TrackStarted(meta) => {
                if self.screen == Screen::Playback {
                    self.now_playing = Some(meta);
                    self.paused = false;
                    let drawn = match &self.now_playing {
                        Some(meta) => screens::now_playing(self.display.as_mut(), meta),
                        None => Ok(()),
                    };
                    self.recover(drawn);
                }
            }
            Event::SessionFinished => self.session_ended(true),
            Event::SessionStopped => self.session_ended(false),
            Event::Shutdown => {}
        }
    }

    fn handle_input(&mut self, event: InputEvent) {
        match (self.screen, event) {
            // The volume monitor consumes rotation and mute on its own
            // poll path; nothing to do at the navigation level.
            (_, InputEvent::RotateCw | InputEvent::RotateCcw | InputEvent::MuteToggle) => {}

            (Screen::Home, InputEvent::Up) => {
                let previous = self.home.index();
                if self.home.up() {
                    let drawn = screens::home_move(self.display.as_mut(), &self.home, previous);
                    self.recover(drawn);
                }
            }
            (Screen::Home, InputEvent::Down) => {
                let previous = self.home.index();
                if self.home.down() {
                    let drawn = screens::home_move(self.display.as_mut(), &self.home, previous);
                    self.recover(drawn);
                }
            }
            (Screen::Home, InputEvent::Select) => match self.home.selected() {
                HomeOption::Playlists => self.enter_menu(),
                HomeOption::Bluetooth => {
                    self.screen = Screen::Bluetooth;
                    let drawn = screens::bluetooth(self.display.as_mut());
                    self.recover(drawn);
                }
            },
            (Screen::Home, _) => {}

            (Screen::Menu, InputEvent::Up) => {
                if let Some(moved) = self.menu.up() {
                    let drawn = self.menu.render_move(self.display.as_mut(), moved);
                    self.recover(drawn);
                }
            }
            (Screen::Menu, InputEvent::Down) => {
                if let Some(moved) = self.menu.down() {
                    let drawn = self.menu.render_move(self.display.as_mut(), moved);
                    self.recover(drawn);
                }
            }
            (Screen::Menu, InputEvent::Select) => self.start_playback(),
            (Screen::Menu, InputEvent::Left | InputEvent::Right) => self.go_home(),

            (Screen::Playback, InputEvent::Up | InputEvent::Down) => {
                // Transition to Menu happens when SessionStopped arrives.
                if let Some(session) = &self.session {
                    session.request_stop();
                }
            }
            (Screen::Playback, InputEvent::Select) => self.toggle_pause(),
            (Screen::Playback, InputEvent::Left) => {
                if let Some(session) = &self.session {
                    session.rewind();
                }
            }
            (Screen::Playback, InputEvent::Right) => {
                if let Some(session) = &self.session {
                    session.skip();
                }
            }

            (Screen::Bluetooth, InputEvent::Select | InputEvent::Left | InputEvent::Right) => {
                self.go_home()
            }
            (Screen::Bluetooth, _) => {}
        }
    }

    fn go_home(&mut self) {
        self.home = HomeCursor::default();
        self.screen = Screen::Home;
        let drawn = screens::home(self.display.as_mut(), &self.home);
        self.recover(drawn);
    }

    /// Enter the playlist menu from Home: fresh listing, cursor reset.
    fn enter_menu(&mut self) {
        let names = match self.library.playlists() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "cannot list playlists");
                Vec::new()
            }
        };
        self.menu = MenuList::new(names);
        self.screen = Screen::Menu;
        let drawn = self.menu.render(self.display.as_mut());
        self.recover(drawn);
    }

    fn start_playback(&mut self) {
        let Some(name) = self.menu.selected_item().map(str::to_string) else {
            return;
        };
        let path = self.library.playlist_path(&name);
        match PlaybackSession::start(
            &path,
            self.output.clone(),
            self.event_tx.clone(),
            &self.config.timing,
        ) {
            Ok(handle) => {
                info!(playlist = %name, "playback started");
                self.session = Some(handle);
                self.now_playing = None;
                self.paused = false;
                self.screen = Screen::Playback;
                let drawn = screens::loading(self.display.as_mut());
                self.recover(drawn);
            }
            Err(AudioError::EmptyPlaylist(_)) => {
                // An empty playlist is an already-finished session.
                debug!(playlist = %name, "empty playlist selected");
                let drawn = self.menu.render(self.display.as_mut());
                self.recover(drawn);
            }
            Err(e) => {
                warn!(playlist = %name, error = %e, "could not start playback");
                let drawn = self.menu.render(self.display.as_mut());
                self.recover(drawn);
            }
        }
    }

    fn toggle_pause(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        if self.paused {
            session.resume();
        } else {
            session.pause();
        }
        self.paused = !self.paused;
        let drawn = match &self.now_playing {
            Some(meta) => screens::pause_banner(self.display.as_mut(), meta, self.paused),
            None => Ok(()),
        };
        self.recover(drawn);
    }

    /// Both session endings land back in the menu at the previous cursor;
    /// only a natural ending was announced by a completion signal.
    fn session_ended(&mut self, natural: bool) {
        if natural {
            info!("playlist finished");
        } else {
            info!("playback stopped");
        }
        self.session = None;
        self.now_playing = None;
        self.paused = false;
        self.screen = Screen::Menu;
        let drawn = self.menu.render(self.display.as_mut());
        self.recover(drawn);
    }

    /// A failed panel write means the device state is unknown: force a
    /// reinitialize-and-redraw instead of propagating.
    fn recover(&mut self, result: Result<(), DisplayError>) {
        let Err(e) = result else { return };
        warn!(error = %e, "display write failed, forcing full redraw");
        let _ = self.display.clear();
        if let Err(e) = self.redraw_screen() {
            error!(error = %e, "display reinitialization failed");
        }
    }

    fn redraw_screen(&mut self) -> Result<(), DisplayError> {
        match self.screen {
            Screen::Home => screens::home(self.display.as_mut(), &self.home),
            Screen::Menu => self.menu.render(self.display.as_mut()),
            Screen::Playback => match &self.now_playing {
                Some(meta) => {
                    screens::now_playing(self.display.as_mut(), meta)?;
                    if self.paused {
                        screens::pause_banner(self.display.as_mut(), meta, true)?;
                    }
                    Ok(())
                }
                None => screens::loading(self.display.as_mut()),
            },
            Screen::Bluetooth => screens::bluetooth(self.display.as_mut()),
        }
    }

    /// Orderly exit. Failures are logged and ignored; exiting never
    /// hangs on a wedged collaborator.
    async fn shutdown(&mut self) {
        info!("shutting down");
        if let Some(session) = self.session.take() {
            session.shutdown(self.config.timing.stop_join).await;
        }
        self.output.stop();
        if let Err(e) = self.display.clear() {
            warn!(error = %e, "display clear failed during shutdown");
        }
    }
}
