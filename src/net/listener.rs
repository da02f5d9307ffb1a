//! Listener abstraction for the admin server.
//!
//! # Responsibilities
//! - Bind to a `host:port` address through a pluggable [`Bind`] capability
//! - Accept incoming connections
//! - Close synchronously, failing any pending accept
//!
//! # Design Decisions
//! - Closing the listener is the only cancellation mechanism for the accept loop
//! - `close` drops the socket before returning, so new connects are refused
//! - Closing twice is an error, like closing any other released handle

use std::future::{poll_fn, Future};
use std::io;
use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

/// A bound listening endpoint that the serving loop accepts from.
///
/// `accept` and `close` both take `&self`: the lifecycle manager closes the
/// listener while the serving task is blocked in `accept`.
pub trait AdminListener: Send + Sync + 'static {
    /// Stream type produced for each accepted connection.
    type Io: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Wait for the next connection. Fails once the listener is closed.
    fn accept(&self) -> impl Future<Output = io::Result<(Self::Io, SocketAddr)>> + Send;

    /// Release the socket and wake any pending `accept`.
    fn close(&self) -> io::Result<()>;

    /// Address the listener is actually bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// Capability to bind a listener at an address.
pub trait Bind: Send + Sync + 'static {
    type Listener: AdminListener;

    fn bind(&self, addr: &str) -> impl Future<Output = io::Result<Self::Listener>> + Send;
}

/// Binds real TCP sockets through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpBinder;

impl Bind for TcpBinder {
    type Listener = TcpAdminListener;

    async fn bind(&self, addr: &str) -> io::Result<TcpAdminListener> {
        TcpAdminListener::bind(addr).await
    }
}

/// A TCP listener that can be closed from outside the accept loop.
#[derive(Debug)]
pub struct TcpAdminListener {
    /// `None` once closed.
    socket: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    closed: Notify,
}

impl TcpAdminListener {
    /// Bind a TCP socket at `addr`.
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let socket = TcpListener::bind(addr).await?;
        let local_addr = socket.local_addr()?;

        tracing::debug!(address = %local_addr, "Admin listener bound");

        Ok(Self {
            socket: Mutex::new(Some(socket)),
            local_addr,
            closed: Notify::new(),
        })
    }

    /// The guarded section never panics, so a poisoned lock still holds a
    /// consistent `Option`.
    fn lock_socket(&self) -> MutexGuard<'_, Option<TcpListener>> {
        self.socket.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poll_accept(&self, cx: &mut Context<'_>) -> Poll<io::Result<(TcpStream, SocketAddr)>> {
        let socket = self.lock_socket();
        match socket.as_ref() {
            Some(socket) => socket.poll_accept(cx),
            None => Poll::Ready(Err(closed_error())),
        }
    }
}

impl AdminListener for TcpAdminListener {
    type Io = TcpStream;

    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        // Register interest before checking the socket so a concurrent close
        // cannot slip between the check and the wait.
        let closed = self.closed.notified();
        tokio::pin!(closed);
        closed.as_mut().enable();

        tokio::select! {
            accepted = poll_fn(|cx| self.poll_accept(cx)) => accepted,
            () = closed => Err(closed_error()),
        }
    }

    fn close(&self) -> io::Result<()> {
        let socket = self.lock_socket().take();

        match socket {
            Some(socket) => {
                drop(socket);
                self.closed.notify_waiters();
                Ok(())
            }
            None => Err(closed_error()),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local_addr)
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "admin listener already closed")
}
