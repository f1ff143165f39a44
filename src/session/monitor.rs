/*!
 * Polling monitor for session authentication.
 *
 * For each identity the monitor:
 * - registers the session with the backend once
 * - queries the status every poll interval until authenticated
 * - publishes state changes and advisory events to callers
 *
 * Every query is tagged with the epoch that was current when it was
 * dispatched. `stop` bumps the epoch under the same lock that guards state
 * updates, so a reply that arrives after `stop` is always discarded.
 */

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::errors::BackendError;
use crate::providers::SessionService;

use super::models::{MonitorEvent, SessionState, StatusResponse};

/// Default interval between status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Tracks authentication for any number of session identities
#[derive(Debug)]
pub struct SessionMonitor<S: SessionService + 'static> {
    service: Arc<S>,
    poll_interval: Duration,
    sessions: Mutex<HashMap<String, SessionHandle>>,
    events: broadcast::Sender<MonitorEvent>,
}

impl<S: SessionService + 'static> SessionMonitor<S> {
    /// Create a monitor polling at the default interval
    pub fn new(service: Arc<S>) -> Self {
        Self::with_poll_interval(service, DEFAULT_POLL_INTERVAL)
    }

    /// Create a monitor polling every `poll_interval`
    pub fn with_poll_interval(service: Arc<S>, poll_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            poll_interval,
            sessions: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Subscribe to advisory events for all identities
    pub fn events(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    /// Handle of an identity that has been started, if any
    pub fn handle(&self, identity: &str) -> Option<SessionHandle> {
        self.sessions.lock().get(identity).cloned()
    }

    /// Register `identity` with the backend and start polling its status.
    ///
    /// A registration failure is reported but does not prevent polling.
    /// Starting an identity that is already polled replaces its poller.
    pub async fn start(&self, identity: &str) -> SessionHandle {
        let handle = self
            .sessions
            .lock()
            .entry(identity.to_string())
            .or_insert_with(|| SessionHandle::new(identity))
            .clone();

        if let Err(e) = self.service.register(identity).await {
            warn!("Failed to initialize session {}: {}", identity, e);
            let _ = self.events.send(MonitorEvent::RegistrationFailed {
                identity: identity.to_string(),
                error: e.to_string(),
            });
        }

        let mut control = handle.slot.control.lock();
        control.halt();

        if handle.state().is_authenticated() {
            debug!("Session {} already authenticated, not polling", identity);
            return handle.clone();
        }

        let epoch = control.epoch;
        control.timer = Some(tokio::spawn(run_poller(
            Arc::clone(&handle.slot),
            Arc::clone(&self.service),
            self.events.clone(),
            self.poll_interval,
            epoch,
        )));
        drop(control);

        info!("Polling session {} every {:?}", identity, self.poll_interval);
        handle
    }

    /// Stop polling for `handle`. Idempotent.
    pub fn stop(&self, handle: &SessionHandle) {
        handle.stop();
    }
}

impl<S: SessionService + 'static> Drop for SessionMonitor<S> {
    fn drop(&mut self) {
        for handle in self.sessions.get_mut().values() {
            handle.stop();
        }
    }
}

/// Cancellation and observation handle for one monitored identity
#[derive(Debug, Clone)]
pub struct SessionHandle {
    slot: Arc<SessionSlot>,
}

impl SessionHandle {
    fn new(identity: &str) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            slot: Arc::new(SessionSlot {
                identity: identity.to_string(),
                control: Mutex::new(PollControl::default()),
                state,
            }),
        }
    }

    pub fn identity(&self) -> &str {
        &self.slot.identity
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.slot.state.borrow().clone()
    }

    /// Current epoch; bumped by every stop
    pub fn epoch(&self) -> u64 {
        self.slot.control.lock().epoch
    }

    /// Whether a poller is currently scheduled
    pub fn is_polling(&self) -> bool {
        self.slot.control.lock().timer.is_some()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.slot.state.subscribe()
    }

    /// Resolve once the session is authenticated
    pub async fn wait_until_authenticated(&self) {
        let mut receiver = self.subscribe();
        // The sender lives in the slot this handle keeps alive
        let _ = receiver.wait_for(SessionState::is_authenticated).await;
    }

    /// Halt future ticks and invalidate queries already in flight
    pub fn stop(&self) {
        let mut control = self.slot.control.lock();
        control.halt();
        debug!("Stopped polling session {} (epoch {})", self.slot.identity, control.epoch);
    }
}

#[derive(Debug)]
struct SessionSlot {
    identity: String,
    control: Mutex<PollControl>,
    state: watch::Sender<SessionState>,
}

#[derive(Debug, Default)]
struct PollControl {
    epoch: u64,
    timer: Option<JoinHandle<()>>,
}

impl PollControl {
    fn halt(&mut self) {
        self.epoch += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl SessionSlot {
    fn apply(
        &self,
        epoch: u64,
        result: Result<StatusResponse, BackendError>,
        events: &broadcast::Sender<MonitorEvent>,
    ) {
        let mut control = self.control.lock();
        if control.epoch != epoch {
            debug!(
                "Discarding stale status for {} (epoch {}, current {})",
                self.identity, epoch, control.epoch
            );
            return;
        }

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                warn!("Error polling session {}: {}", self.identity, e);
                let _ = events.send(MonitorEvent::PollFailed {
                    identity: self.identity.clone(),
                    error: e.to_string(),
                });
                return;
            }
        };

        let mut changed = false;
        self.state.send_if_modified(|state| {
            changed = state.on_status(status);
            changed
        });
        if !changed {
            return;
        }

        let event = match &*self.state.borrow() {
            SessionState::Authenticated => {
                control.halt();
                info!("Session {} connected successfully", self.identity);
                MonitorEvent::Authenticated {
                    identity: self.identity.clone(),
                }
            }
            SessionState::AwaitingScan { qr } => {
                info!("New QR code available for session {}", self.identity);
                MonitorEvent::QrUpdated {
                    identity: self.identity.clone(),
                    qr: qr.clone(),
                }
            }
            SessionState::Initializing => return,
        };
        let _ = events.send(event);
    }
}

async fn run_poller<S: SessionService + 'static>(
    slot: Arc<SessionSlot>,
    service: Arc<S>,
    events: broadcast::Sender<MonitorEvent>,
    period: Duration,
    epoch: u64,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if slot.control.lock().epoch != epoch {
            break;
        }

        // Each query runs on its own so a slow reply never delays the next tick
        let slot = Arc::clone(&slot);
        let service = Arc::clone(&service);
        let events = events.clone();
        tokio::spawn(async move {
            let result = service.query_status(&slot.identity).await;
            slot.apply(epoch, result, &events);
        });
    }
}
