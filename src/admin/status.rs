//! Shared server status flag.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of an admin server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerStatus {
    NotStarted = 0,
    Running = 1,
    Stopped = 2,
}

impl ServerStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ServerStatus::Running,
            2 => ServerStatus::Stopped,
            _ => ServerStatus::NotStarted,
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerStatus::NotStarted => "not started",
            ServerStatus::Running => "running",
            ServerStatus::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Status shared between the lifecycle manager and its serving task.
///
/// Sequentially consistent so the `Stopped` written before a close is
/// visible to the serving task once that close fails its accept.
#[derive(Debug)]
pub struct StatusFlag(AtomicU8);

impl StatusFlag {
    pub fn new() -> Self {
        Self(AtomicU8::new(ServerStatus::NotStarted as u8))
    }

    pub fn load(&self) -> ServerStatus {
        ServerStatus::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn store(&self, status: ServerStatus) {
        self.0.store(status as u8, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.load() == ServerStatus::Running
    }
}

impl Default for StatusFlag {
    fn default() -> Self {
        Self::new()
    }
}
