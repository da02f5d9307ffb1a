//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Bind capability
//!     → listener.rs (bind, accept, close)
//!     → connection.rs (per-connection id and accounting)
//!     → Hand off to the admin serving loop
//! ```
//!
//! # Design Decisions
//! - Binding is injected so tests can substitute listeners without sockets
//! - Closing a listener fails its pending accept; nothing else cancels the loop

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{AdminListener, Bind, TcpAdminListener, TcpBinder};
