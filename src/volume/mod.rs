use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::audio::output::AudioOutput;
use crate::config::VolumeSettings;
use crate::input::{InputEvent, QuadratureDecoder, Rotation};

/// Output-gain state. Single writer: the volume monitor.
#[derive(Debug, Clone)]
pub struct VolumeState {
    level: f32,
    muted: bool,
    stored: f32,
}

impl VolumeState {
    pub fn new(initial: f32) -> Self {
        let level = initial.clamp(0.0, 1.0);
        Self {
            level,
            muted: false,
            stored: level,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain to hand to the sink right now.
    pub fn gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.level }
    }

    /// Apply one logical volume event; `true` if the gain changed.
    pub fn apply(&mut self, event: InputEvent, step: f32) -> bool {
        match event {
            InputEvent::RotateCw => self.adjust(step),
            InputEvent::RotateCcw => self.adjust(-step),
            InputEvent::MuteToggle => {
                if self.muted {
                    self.level = self.stored;
                    self.muted = false;
                } else {
                    self.stored = self.level;
                    self.muted = true;
                }
                true
            }
            _ => false,
        }
    }

    fn adjust(&mut self, delta: f32) -> bool {
        let target = (self.level + delta).clamp(0.0, 1.0);
        if target == self.level && !self.muted {
            return false;
        }
        self.level = target;
        // Turning the knob always makes the current level audible again.
        self.muted = false;
        true
    }
}

/// Hardware seam: the encoder's two lines and its push switch.
pub trait RotaryPins: Send {
    /// Current 2-bit line state (CLK << 1 | DT).
    fn encoder_state(&mut self) -> u8;
    /// True while the switch is held.
    fn switch_pressed(&mut self) -> bool;
}

/// Polls the rotary hardware for the life of the process, independent of
/// whatever screen the panel shows. Gain changes reach the sink
/// immediately, never batched.
pub struct VolumeMonitor {
    pins: Box<dyn RotaryPins>,
    output: Arc<dyn AudioOutput>,
    decoder: QuadratureDecoder,
    state: VolumeState,
    step: f32,
    switch_was_pressed: bool,
    interval: Duration,
}

impl VolumeMonitor {
    pub fn new(
        mut pins: Box<dyn RotaryPins>,
        output: Arc<dyn AudioOutput>,
        settings: &VolumeSettings,
        interval: Duration,
    ) -> Self {
        let decoder = QuadratureDecoder::new(pins.encoder_state());
        let state = VolumeState::new(settings.initial);
        output.set_volume(state.gain());
        Self {
            pins,
            output,
            decoder,
            state,
            step: settings.step,
            switch_was_pressed: false,
            interval,
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::time::sleep(self.interval).await;
            self.poll_once();
        }
    }

    /// One sampling tick: decode any line transition, edge-detect the
    /// mute switch, and push the resulting gain.
    pub fn poll_once(&mut self) {
        if let Some(rotation) = self.decoder.step(self.pins.encoder_state()) {
            let event = match rotation {
                Rotation::Clockwise => InputEvent::RotateCw,
                Rotation::CounterClockwise => InputEvent::RotateCcw,
            };
            self.apply(event);
        }

        let pressed = self.pins.switch_pressed();
        if pressed && !self.switch_was_pressed {
            self.apply(InputEvent::MuteToggle);
        }
        self.switch_was_pressed = pressed;
    }

    fn apply(&mut self, event: InputEvent) {
        if self.state.apply(event, self.step) {
            debug!(
                level = self.state.level(),
                muted = self.state.is_muted(),
                "volume changed"
            );
            self.output.set_volume(self.state.gain());
        }
    }

    pub fn state(&self) -> &VolumeState {
        &self.state
    }
}
