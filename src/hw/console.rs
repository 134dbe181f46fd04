//! Development frontend: runs the appliance UI in a workstation terminal
//! when the panel, buttons, and encoder are not attached. The real GPIO
//! and LCD drivers implement the same traits out of tree.

use std::collections::VecDeque;
use std::io::{Stdout, Write, stdout};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use flume::Sender;

use crate::event::events::Event;
use crate::input::{Button, InputDispatcher, QuadratureDecoder, Rotation};
use crate::ui::display::{DisplayError, LINES, PanelDisplay, WIDTH};
use crate::volume::RotaryPins;

const KEY_HELP: &str = "arrows/enter: navigate  +/-: volume  m: mute  q: quit";

/// Repaints the 4x20 frame in the terminal on every line write.
pub struct ConsolePanel {
    lines: [String; LINES],
    out: Stdout,
}

impl ConsolePanel {
    pub fn new() -> Result<Self, DisplayError> {
        terminal::enable_raw_mode().map_err(io_error)?;
        let mut panel = Self {
            lines: Default::default(),
            out: stdout(),
        };
        panel.repaint()?;
        Ok(panel)
    }

    fn repaint(&mut self) -> Result<(), DisplayError> {
        execute!(
            self.out,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        )
        .map_err(io_error)?;
        let border = "-".repeat(WIDTH);
        write!(self.out, "+{border}+\r\n").map_err(io_error)?;
        for line in &self.lines {
            write!(self.out, "|{line:<width$}|\r\n", width = WIDTH).map_err(io_error)?;
        }
        write!(self.out, "+{border}+\r\n{KEY_HELP}\r\n").map_err(io_error)?;
        self.out.flush().map_err(io_error)
    }
}

fn io_error(e: std::io::Error) -> DisplayError {
    DisplayError::Write(e.to_string())
}

impl PanelDisplay for ConsolePanel {
    fn write_line(&mut self, line: usize, text: &str) -> Result<(), DisplayError> {
        if !(1..=LINES).contains(&line) {
            return Err(DisplayError::Write(format!("line {line} out of range")));
        }
        self.lines[line - 1] = text.chars().take(WIDTH).collect();
        self.repaint()
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.lines = Default::default();
        self.repaint()
    }
}

impl Drop for ConsolePanel {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Default)]
struct RotaryQueue {
    pending: VecDeque<u8>,
    current: u8,
    switch: bool,
}

/// Keyboard-driven stand-in for the encoder lines: each `+`/`-` keypress
/// queues one valid quadrature transition, consumed one per monitor
/// poll tick.
#[derive(Clone)]
pub struct ConsoleRotary(Arc<Mutex<RotaryQueue>>);

impl ConsoleRotary {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(RotaryQueue {
            // Pull-ups idle both lines high.
            current: 0b11,
            ..Default::default()
        })))
    }

    pub fn turn(&self, direction: Rotation) {
        let mut queue = self.0.lock().unwrap();
        let from = queue.pending.back().copied().unwrap_or(queue.current);
        queue
            .pending
            .push_back(QuadratureDecoder::next_state(from, direction));
    }

    pub fn press_mute(&self) {
        self.0.lock().unwrap().switch = true;
    }
}

impl Default for ConsoleRotary {
    fn default() -> Self {
        Self::new()
    }
}

impl RotaryPins for ConsoleRotary {
    fn encoder_state(&mut self) -> u8 {
        let mut queue = self.0.lock().unwrap();
        if let Some(next) = queue.pending.pop_front() {
            queue.current = next;
        }
        queue.current
    }

    fn switch_pressed(&mut self) -> bool {
        // One poll sees the press, the next sees the release.
        std::mem::take(&mut self.0.lock().unwrap().switch)
    }
}

/// Blocking key-reader thread: translates workstation keys into the same
/// raw edges the panel hardware would produce.
pub fn spawn_key_reader(
    dispatcher: Arc<InputDispatcher>,
    rotary: ConsoleRotary,
    events: Sender<Event>,
) {
    std::thread::spawn(move || {
        loop {
            let Ok(event) = crossterm::event::read() else {
                break;
            };
            let TermEvent::Key(KeyEvent { code, kind, .. }) = event else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Up => {
                    dispatcher.button_edge(Button::Up, Instant::now());
                }
                KeyCode::Down => {
                    dispatcher.button_edge(Button::Down, Instant::now());
                }
                KeyCode::Left => {
                    dispatcher.button_edge(Button::Left, Instant::now());
                }
                KeyCode::Right => {
                    dispatcher.button_edge(Button::Right, Instant::now());
                }
                KeyCode::Enter => {
                    dispatcher.button_edge(Button::Select, Instant::now());
                }
                KeyCode::Char('+') | KeyCode::Char('=') => rotary.turn(Rotation::Clockwise),
                KeyCode::Char('-') => rotary.turn(Rotation::CounterClockwise),
                KeyCode::Char('m') => rotary.press_mute(),
                KeyCode::Char('q') => {
                    let _ = events.send(Event::Shutdown);
                    break;
                }
                _ => {}
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_turns_replay_as_valid_transitions() {
        let rotary = ConsoleRotary::new();
        rotary.turn(Rotation::Clockwise);
        rotary.turn(Rotation::Clockwise);

        let mut pins: Box<dyn RotaryPins> = Box::new(rotary);
        let mut decoder = QuadratureDecoder::new(0b11);
        assert_eq!(decoder.step(pins.encoder_state()), Some(Rotation::Clockwise));
        assert_eq!(decoder.step(pins.encoder_state()), Some(Rotation::Clockwise));
        // Queue drained: the held state decodes as nothing.
        assert_eq!(decoder.step(pins.encoder_state()), None);
    }

    #[test]
    fn mute_press_is_a_single_edge() {
        let rotary = ConsoleRotary::new();
        rotary.press_mute();

        let mut pins: Box<dyn RotaryPins> = Box::new(rotary);
        assert!(pins.switch_pressed());
        assert!(!pins.switch_pressed());
    }
}
