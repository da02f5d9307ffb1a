//! Shared utilities for admin server integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use admin_server::{AdminListener, Bind};
use tokio::io::DuplexStream;
use tokio::sync::Notify;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// A log event as seen by the capturing layer.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: HashMap<String, String>,
}

/// Layer that records every event it sees.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Install a capturing subscriber as the thread default.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.message == message)
            .collect()
    }

    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    /// Poll until an event with `message` shows up, or panic after a second.
    pub async fn wait_for(&self, message: &str) -> CapturedEvent {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        loop {
            if let Some(event) = self.with_message(message).into_iter().next() {
                return event;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("no {message:?} event; saw {:?}", self.events());
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{value:?}"));
    }
}

impl FieldVisitor {
    fn record(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

/// Counters and switches shared by a [`FakeBinder`] and its listeners.
#[derive(Debug, Default)]
pub struct FakeState {
    pub binds: AtomicUsize,
    pub closes: AtomicUsize,
    pub accept_calls: AtomicUsize,
    pub accept_failures: AtomicUsize,
    fail_bind: AtomicBool,
    /// Errors returned by the next accepts, in order.
    accept_script: Mutex<VecDeque<io::ErrorKind>>,
    fail_close: AtomicBool,
}

/// Binder that hands out in-memory listeners.
#[derive(Debug, Clone, Default)]
pub struct FakeBinder {
    pub state: Arc<FakeState>,
}

impl FakeBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_bind(self) -> Self {
        self.state.fail_bind.store(true, Ordering::SeqCst);
        self
    }

    /// Make the next accept fail with `kind`; repeat to queue more.
    pub fn failing_accept(self, kind: io::ErrorKind) -> Self {
        self.state.accept_script.lock().unwrap().push_back(kind);
        self
    }

    pub fn failing_close(self) -> Self {
        self.state.fail_close.store(true, Ordering::SeqCst);
        self
    }

    pub fn binds(&self) -> usize {
        self.state.binds.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn accept_calls(&self) -> usize {
        self.state.accept_calls.load(Ordering::SeqCst)
    }

    pub fn accept_failures(&self) -> usize {
        self.state.accept_failures.load(Ordering::SeqCst)
    }

    /// Wait until a listener's accept has returned an error.
    pub async fn wait_for_accept_failure(&self) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        while self.accept_failures() == 0 {
            assert!(
                tokio::time::Instant::now() < deadline,
                "serving loop never observed an accept failure"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        // Let the serving task finish its post-failure handling.
        tokio::task::yield_now().await;
    }

    /// Wait until the serving loop has called accept at least `calls` times.
    pub async fn wait_for_accept_calls(&self, calls: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.accept_calls() < calls {
            assert!(
                tokio::time::Instant::now() < deadline,
                "serving loop stopped accepting after {} calls",
                self.accept_calls()
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Bind for FakeBinder {
    type Listener = FakeListener;

    async fn bind(&self, _addr: &str) -> io::Result<FakeListener> {
        self.state.binds.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_bind.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::AddrInUse, "injected bind failure"));
        }
        Ok(FakeListener {
            state: Arc::clone(&self.state),
            closed: AtomicBool::new(false),
            wake: Notify::new(),
        })
    }
}

/// Listener that never yields a connection.
///
/// Scripted errors are returned first. After that, a pending accept fails with `ConnectionAborted` the moment it is
/// closed, standing in for the transport error a real close produces.
#[derive(Debug)]
pub struct FakeListener {
    state: Arc<FakeState>,
    closed: AtomicBool,
    wake: Notify,
}

pub const FAKE_ADDR: &str = "192.0.2.1:15280";

impl AdminListener for FakeListener {
    type Io = DuplexStream;

    async fn accept(&self) -> io::Result<(DuplexStream, SocketAddr)> {
        self.state.accept_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.wait_for_close().await;
        self.state.accept_failures.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn close(&self) -> io::Result<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected close failure"));
        }
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "already closed"));
        }
        self.wake.notify_waiters();
        Ok(())
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(FAKE_ADDR.parse().unwrap())
    }
}

impl FakeListener {
    async fn wait_for_close(&self) -> io::Result<(DuplexStream, SocketAddr)> {
        let scripted = self.state.accept_script.lock().unwrap().pop_front();
        if let Some(kind) = scripted {
            return Err(io::Error::new(kind, "injected accept failure"));
        }

        let woken = self.wake.notified();
        tokio::pin!(woken);
        woken.as_mut().enable();
        if !self.closed.load(Ordering::SeqCst) {
            woken.await;
        }
        Err(io::Error::new(
            io::ErrorKind::ConnectionAborted,
            "listener closed mid-accept",
        ))
    }
}
