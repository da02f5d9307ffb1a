//! Admin Server Library
//!
//! Lifecycle management for a network-exposed administrative service:
//! bind a listener, serve a request-handling collaborator on it from a
//! detached task, and stop it without reporting the shutdown as a fault.

pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use admin::{AdminError, AdminServer, AdminService, ServerStatus, StatusService};
pub use config::{AdminConfig, Config};
pub use net::{AdminListener, Bind, TcpBinder};
