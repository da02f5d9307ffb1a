//! Admin server lifecycle.
//!
//! # State machine
//! ```text
//! NotStarted --start(ok)--> Running --stop--> Stopped
//! NotStarted --start(bind fails)--> NotStarted
//! Running    --stop(close fails)--> Stopped
//! ```
//!
//! `Stopped` is terminal; serving again needs a fresh instance. `stop` flips
//! the status before closing the listener, since the close is what wakes
//! the serving task with an error it must then recognise as expected.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::instrument::WithSubscriber;

use crate::admin::error::AdminError;
use crate::admin::serve::run_serving_task;
use crate::admin::service::AdminService;
use crate::admin::status::{ServerStatus, StatusFlag};
use crate::config::AdminConfig;
use crate::net::{AdminListener, Bind, ConnectionTracker, TcpBinder};

/// Administrative server bound to a single listener.
pub struct AdminServer<B: Bind = TcpBinder> {
    bind_addr: String,
    port: u16,
    binder: B,
    service: Arc<dyn AdminService>,
    listener: Option<Arc<B::Listener>>,
    local_addr: Option<SocketAddr>,
    status: Arc<StatusFlag>,
    connections: ConnectionTracker,
}

impl AdminServer<TcpBinder> {
    /// Create a server that binds real TCP sockets.
    ///
    /// Returns `None` when the admin server is disabled; no I/O happens here.
    pub fn new(config: &AdminConfig, service: impl AdminService) -> Option<Self> {
        Self::with_binder(config, service, TcpBinder)
    }
}

impl<B: Bind> AdminServer<B> {
    /// Create a server that binds through `binder`.
    pub fn with_binder(config: &AdminConfig, service: impl AdminService, binder: B) -> Option<Self> {
        if config.disabled {
            return None;
        }
        Some(Self {
            bind_addr: config.bind_addr.clone(),
            port: config.port,
            binder,
            service: Arc::new(service),
            listener: None,
            local_addr: None,
            status: Arc::new(StatusFlag::new()),
            connections: ConnectionTracker::new(),
        })
    }

    /// Bind the listener and spawn the serving task.
    ///
    /// Returns as soon as the listener is bound. Must be called from within
    /// a tokio runtime.
    pub async fn start(&mut self) -> Result<(), AdminError> {
        let status = self.status.load();
        if status != ServerStatus::NotStarted {
            return Err(AdminError::InvalidState(status));
        }

        let addr = self.address();
        let bind_error = |source| AdminError::Bind {
            addr: addr.clone(),
            source,
        };
        let listener = self.binder.bind(&addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        let listener = Arc::new(listener);
        self.listener = Some(Arc::clone(&listener));
        self.local_addr = Some(local_addr);
        self.status.store(ServerStatus::Running);

        tracing::info!(bind_addr = %local_addr, "started admin server");

        let task = run_serving_task(
            listener,
            self.service.router(),
            self.connections.clone(),
            Arc::clone(&self.status),
        );
        tokio::spawn(task.with_current_subscriber());
        Ok(())
    }

    /// Close the listener, ending the serving task.
    ///
    /// The status is `Stopped` afterwards even if the close fails. Calling
    /// `stop` again closes an already closed listener and returns its error.
    pub fn stop(&mut self) -> Result<(), AdminError> {
        let Some(listener) = self.listener.as_ref() else {
            return Err(AdminError::NotStarted);
        };

        self.status.store(ServerStatus::Stopped);
        listener.close().map_err(AdminError::Close)?;

        tracing::info!(bind_addr = %self.display_addr(), "closed admin server");
        Ok(())
    }

    /// Current lifecycle state.
    pub fn status(&self) -> ServerStatus {
        self.status.load()
    }

    /// Address the listener resolved to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Number of admin connections currently being served.
    pub fn active_connections(&self) -> u64 {
        self.connections.active_count()
    }

    /// Configured `host:port` to bind.
    pub fn address(&self) -> String {
        join_host_port(&self.bind_addr, self.port)
    }

    fn display_addr(&self) -> String {
        match self.local_addr {
            Some(addr) => addr.to_string(),
            None => self.address(),
        }
    }
}

impl<B: Bind> std::fmt::Debug for AdminServer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminServer")
            .field("address", &self.address())
            .field("local_addr", &self.local_addr)
            .field("status", &self.status.load())
            .finish_non_exhaustive()
    }
}

/// Join a host and port. An empty host means every interface and bare IPv6
/// literals are bracketed.
fn join_host_port(host: &str, port: u16) -> String {
    if host.is_empty() {
        format!("0.0.0.0:{port}")
    } else if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
