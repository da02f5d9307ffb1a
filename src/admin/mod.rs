//! Admin server subsystem.
//!
//! # Data Flow
//! ```text
//! AdminConfig
//!     → server.rs (construct, start: bind + spawn, stop: flag + close)
//!     → serve.rs (accept loop, one hyper connection task per client)
//!     → service.rs (router supplied by the request-handling collaborator)
//! ```
//!
//! # Design Decisions
//! - A disabled config produces no server, not an inert one
//! - Start returns once bound; the serving task is detached
//! - Serve-loop failures are logged only while the server is meant to run

pub mod auth;
pub mod error;
pub mod handlers;
pub mod serve;
pub mod server;
pub mod service;
pub mod status;

pub use error::{AdminError, ServeError};
pub use server::AdminServer;
pub use service::{AdminService, StatusService};
pub use status::ServerStatus;
