//! Process lifecycle for the admin server binary.
//!
//! # Data Flow
//! ```text
//! Startup:  load config → init logging → construct → start
//! Shutdown: SIGTERM/SIGINT → stop (flag, then close listener) → exit
//! ```

pub mod signals;

pub use signals::shutdown_signal;
