//! Observability subsystem.
//!
//! Every subsystem logs through `tracing`; this module only wires the
//! subscriber for the binary. Libraries embedding the admin server install
//! their own.

pub mod logging;
