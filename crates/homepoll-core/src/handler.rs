// ── Handler ──
//
// Per-device orchestrator. Owns the device adapter behind a mutex, runs
// connection and the fixed-delay poll loop on a background task, routes
// inbound commands, and publishes everything to a `StateSink`.
//
// Nothing a device returns can escape a handler: failures become log
// entries, and routing failures additionally take the device offline.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::channel::{Channel, Command, DeviceStatus};
use crate::config::Schedule;
use crate::device::{PolledDevice, Updates};
use crate::error::CoreError;
use crate::sink::StateSink;

/// Orchestrates one device.
///
/// Cheaply cloneable. A handler is single-use: once
/// [`dispose`](Self::dispose) has run it cannot be initialized again.
pub struct Handler<D: PolledDevice> {
    inner: Arc<HandlerInner<D>>,
}

impl<D: PolledDevice> Clone for Handler<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct HandlerInner<D> {
    name: String,
    schedule: Schedule,
    device: Mutex<D>,
    /// Set from `initialize` until the first connect attempt settles.
    connecting: AtomicBool,
    sink: Arc<dyn StateSink>,
    status: watch::Sender<DeviceStatus>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<D: PolledDevice> Handler<D> {
    /// Create a handler. Does NOT connect -- call
    /// [`initialize()`](Self::initialize) to start the background task.
    pub fn new(
        name: impl Into<String>,
        device: D,
        schedule: Schedule,
        sink: Arc<dyn StateSink>,
    ) -> Self {
        let (status, _) = watch::channel(DeviceStatus::Unknown);
        Self {
            inner: Arc::new(HandlerInner {
                name: name.into(),
                schedule,
                device: Mutex::new(device),
                connecting: AtomicBool::new(false),
                sink,
                status,
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn schedule(&self) -> Schedule {
        self.inner.schedule
    }

    /// Last published device status.
    pub fn status(&self) -> DeviceStatus {
        self.inner.status.borrow().clone()
    }

    /// Subscribe to device status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<DeviceStatus> {
        self.inner.status.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Publish `Unknown`, then connect and start polling in the background.
    ///
    /// Returns immediately; a slow first connection never blocks command
    /// handling. Polling is armed whether or not the connection succeeds.
    pub async fn initialize(&self) {
        if self.inner.cancel.is_cancelled() {
            warn!(device = %self.inner.name, "initialize after dispose ignored");
            return;
        }

        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            debug!(device = %self.inner.name, "already initialized");
            return;
        }

        info!(device = %self.inner.name, "initializing");
        self.set_status(DeviceStatus::Unknown);
        self.inner.connecting.store(true, Ordering::Release);

        let handler = self.clone();
        *task = Some(tokio::spawn(handler.run()));
    }

    /// Stop polling, wait for the background task, and release the
    /// device's server-side session. Best-effort.
    pub async fn dispose(&self) {
        info!(device = %self.inner.name, "disposing");
        self.inner.cancel.cancel();

        if let Some(handle) = self.inner.task.lock().await.take() {
            let _ = handle.await;
        }

        self.inner.device.lock().await.shutdown().await;
        debug!(device = %self.inner.name, "disposed");
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Connect the device and publish `Online` or `Offline`.
    pub async fn connect(&self) -> bool {
        let result = self.inner.device.lock().await.connect().await;
        self.inner.connecting.store(false, Ordering::Release);
        match result {
            Ok(()) => {
                info!(device = %self.inner.name, "device online");
                self.set_status(DeviceStatus::Online);
                true
            }
            Err(e) => {
                warn!(device = %self.inner.name, error = %e, "device offline");
                self.set_status(DeviceStatus::Offline {
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    /// Poll once and publish every channel. On failure nothing is
    /// published and the previous state stays visible.
    pub async fn refresh(&self) -> bool {
        let mut device = self.inner.device.lock().await;
        self.poll_locked(&mut device).await
    }

    /// Route a command to the device.
    ///
    /// `Refresh` on any known channel polls immediately. An unknown
    /// channel, or a command the channel does not accept, marks the device
    /// offline. Client failures are logged only. Commands that arrive while
    /// the first connect is still in flight are dropped, not queued.
    pub async fn handle_command(&self, channel: &str, command: Command) {
        debug!(device = %self.inner.name, channel, %command, "command received");
        match self.dispatch(channel, command).await {
            Ok(updates) => self.publish(updates),
            Err(CoreError::NotReady) => {
                warn!(device = %self.inner.name, channel, "device not ready; command dropped");
            }
            Err(e) if e.marks_offline() => {
                warn!(device = %self.inner.name, error = %e, "rejecting command");
                self.set_status(DeviceStatus::Offline {
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!(device = %self.inner.name, channel, error = %e, "command failed");
            }
        }
    }

    async fn dispatch(&self, id: &str, command: Command) -> Result<Updates, CoreError> {
        if self.inner.connecting.load(Ordering::Acquire) {
            return Err(CoreError::NotReady);
        }
        let mut device = self.inner.device.lock().await;

        let channel = Channel::from_str(id)
            .ok()
            .filter(|c| device.channels().contains(c))
            .ok_or_else(|| CoreError::UnknownChannel {
                channel: id.to_owned(),
            })?;

        if command == Command::Refresh {
            self.poll_locked(&mut device).await;
            return Ok(Vec::new());
        }

        device.handle(channel, command).await
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn poll_locked(&self, device: &mut D) -> bool {
        match device.poll().await {
            Ok(updates) => {
                self.publish(updates);
                true
            }
            Err(e) => {
                warn!(device = %self.inner.name, error = %e, "poll failed");
                false
            }
        }
    }

    fn publish(&self, updates: Updates) {
        for (channel, state) in updates {
            self.inner.sink.publish(&self.inner.name, channel, state);
        }
    }

    fn set_status(&self, status: DeviceStatus) {
        self.inner.status.send_replace(status.clone());
        self.inner.sink.set_status(&self.inner.name, status);
    }

    /// Background task: connect, then poll with a fixed delay until
    /// cancelled.
    async fn run(self) {
        let cancel = self.inner.cancel.clone();

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                self.inner.connecting.store(false, Ordering::Release);
                return;
            }
            _ = self.connect() => {}
        }

        let Schedule {
            initial_delay,
            interval,
            ..
        } = self.inner.schedule;
        if interval.is_zero() {
            debug!(device = %self.inner.name, "periodic polling disabled");
            return;
        }

        info!(
            device = %self.inner.name,
            initial_delay_secs = initial_delay.as_secs(),
            interval_secs = interval.as_secs(),
            "polling armed"
        );
        poll_loop(&self, initial_delay, interval, &cancel).await;
    }
}

/// Fixed-delay loop: each sleep starts only after the previous poll has
/// finished, so a slow poll pushes the next one out.
async fn poll_loop<D: PolledDevice>(
    handler: &Handler<D>,
    initial_delay: Duration,
    interval: Duration,
    cancel: &CancellationToken,
) {
    let mut delay = initial_delay;
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = handler.refresh() => {}
        }

        delay = interval;
    }
    debug!(device = %handler.inner.name, "poll loop stopped");
}
