//! Serving loop for the admin listener.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
    service::TowerToHyperService,
};
use tracing::instrument::WithSubscriber;

use crate::admin::error::ServeError;
use crate::admin::status::StatusFlag;
use crate::net::{AdminListener, ConnectionTracker};

/// Pause before accepting again after a resource error such as EMFILE.
pub const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Errors that concern a single incoming connection, not the listener.
fn is_connection_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
    )
}

/// Accept connections until the listener is closed, serving each on its own task.
///
/// Per-connection accept errors are skipped and other errors are retried
/// after [`ACCEPT_BACKOFF`] while the server is running. Returns once the
/// listener reports itself closed or the status leaves `Running`.
pub async fn serve<L: AdminListener>(
    listener: Arc<L>,
    router: Router,
    connections: ConnectionTracker,
    status: Arc<StatusFlag>,
) -> Result<(), ServeError> {
    loop {
        let (io, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) if !status.is_running() || err.kind() == io::ErrorKind::NotConnected => {
                return Err(err.into());
            }
            Err(err) if is_connection_error(&err) => {
                tracing::debug!(error = %err, "Admin accept skipped connection");
                continue;
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    backoff = ?ACCEPT_BACKOFF,
                    "Admin accept failed, retrying"
                );
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        let guard = connections.track();
        let service = TowerToHyperService::new(router.clone());

        tracing::debug!(
            connection_id = %guard.id(),
            peer_addr = %peer_addr,
            "Admin connection accepted"
        );

        let connection = async move {
            let connection_id = guard.id();
            let builder = auto::Builder::new(TokioExecutor::new());
            if let Err(err) = builder.serve_connection(TokioIo::new(io), service).await {
                tracing::debug!(
                    connection_id = %connection_id,
                    peer_addr = %peer_addr,
                    error = %err,
                    "Admin connection error"
                );
            }
            drop(guard);
        };
        tokio::spawn(connection.with_current_subscriber());
    }
}

/// Body of the detached serving task.
///
/// A loop failure is only reported while the server is still meant to be
/// running; once `stop` has flipped the flag, the failure is our own close.
pub async fn run_serving_task<L: AdminListener>(
    listener: Arc<L>,
    router: Router,
    connections: ConnectionTracker,
    status: Arc<StatusFlag>,
) {
    if let Err(err) = serve(listener, router, connections, Arc::clone(&status)).await {
        if status.is_running() {
            tracing::error!(error = %err, "admin server error");
        }
    }
}
