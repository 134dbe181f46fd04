use std::sync::atomic::{AtomicU8, Ordering};

/// Asynchronous control request for the playback loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlayerCommand {
    None = 0,
    Pause = 1,
    Resume = 2,
    Skip = 3,
    Rewind = 4,
    Stop = 5,
}

impl PlayerCommand {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Pause,
            2 => Self::Resume,
            3 => Self::Skip,
            4 => Self::Rewind,
            5 => Self::Stop,
            _ => Self::None,
        }
    }
}

/// Single-slot command mailbox between the input context and the playback
/// loop. Producers overwrite it (latest wins); the loop consumes it at
/// most once per poll tick, so a burst of requests collapses to the
/// newest one instead of leaving stale flags behind.
#[derive(Debug, Default)]
pub struct CommandCell(AtomicU8);

impl CommandCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(PlayerCommand::None as u8))
    }

    pub fn set(&self, command: PlayerCommand) {
        self.0.store(command as u8, Ordering::SeqCst);
    }

    pub fn take(&self) -> PlayerCommand {
        PlayerCommand::from_raw(self.0.swap(PlayerCommand::None as u8, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_the_pending_command() {
        let cell = CommandCell::new();
        cell.set(PlayerCommand::Skip);
        assert_eq!(cell.take(), PlayerCommand::Skip);
        assert_eq!(cell.take(), PlayerCommand::None);
    }

    #[test]
    fn latest_request_wins() {
        let cell = CommandCell::new();
        cell.set(PlayerCommand::Pause);
        cell.set(PlayerCommand::Stop);
        assert_eq!(cell.take(), PlayerCommand::Stop);
        assert_eq!(cell.take(), PlayerCommand::None);
    }
}
