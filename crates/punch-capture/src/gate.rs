//! Submission gate.
//!
//! The gate is the only place that decides whether a sampled frame reaches
//! the backend, and the only writer of the scanner state (`GateState`, the
//! selected `SubmissionMode` and the time of the last accepted punch).
//!
//! A frame offered in live mode is submitted only while the gate is
//! `Scanning` *and* the cooldown since the last accepted punch has elapsed.
//! Submissions run in the background and do not hold back the sampler, so a
//! second frame can be admitted before the first one resolves. The cooldown
//! being wider than the sampling period keeps that rare; it is not ruled out.
//!
//! Every admitted submission is tagged with the gate's generation, which is
//! bumped whenever the scanner leaves `Paused`. An accepted outcome pauses the
//! gate only if it belongs to the current generation and the gate is still
//! scanning. Switching direction while scanning keeps the generation, so a
//! punch the backend already recorded still starts the cooldown. Anything
//! else is published as stale and leaves the state untouched, so a reply
//! from before a pause can never re-pause the resumed scanner.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use punch_models::{Frame, GateState, Recognition, Rejection, SubmissionMode, SubmissionOutcome};

use crate::metrics;

const EVENT_CAPACITY: usize = 64;

/// Sends one frame to the recognition backend and classifies the reply.
#[async_trait]
pub trait Submitter: Send + Sync + 'static {
    async fn submit(&self, mode: SubmissionMode, frame: Frame) -> SubmissionOutcome;
}

/// The gate's verdict on an offered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Frame was sent to the backend
    Submitted,
    /// Dropped: a punch was accepted and the scanner has not been resumed
    Paused,
    /// Dropped: inside the cooldown window of the last accepted punch
    CoolingDown,
}

impl Admission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Admission::Submitted => "submitted",
            Admission::Paused => "paused",
            Admission::CoolingDown => "cooling_down",
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Admission::Submitted)
    }
}

/// Live-mode results published to subscribers.
#[derive(Debug, Clone)]
pub enum GateEvent {
    Accepted {
        recognition: Recognition,
        /// True when the reply arrived after the state it was issued under
        /// had already changed; such replies do not pause the scanner.
        stale: bool,
    },
    Rejected(Rejection),
}

#[derive(Debug)]
struct GateInner {
    state: GateState,
    mode: SubmissionMode,
    last_accepted_at: Option<Instant>,
    generation: u64,
}

/// Decides which frames are submitted and tracks the scanner state.
pub struct SubmissionGate<S> {
    inner: Arc<Mutex<GateInner>>,
    submitter: Arc<S>,
    cooldown: Duration,
    events: broadcast::Sender<GateEvent>,
    state_tx: Arc<watch::Sender<GateState>>,
}

impl<S> Clone for SubmissionGate<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            submitter: Arc::clone(&self.submitter),
            cooldown: self.cooldown,
            events: self.events.clone(),
            state_tx: Arc::clone(&self.state_tx),
        }
    }
}

impl<S: Submitter> SubmissionGate<S> {
    /// Create a gate in the `Scanning` state.
    pub fn new(submitter: S, cooldown: Duration, mode: SubmissionMode) -> Self {
        Self::with_shared(Arc::new(submitter), cooldown, mode)
    }

    pub fn with_shared(submitter: Arc<S>, cooldown: Duration, mode: SubmissionMode) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (state_tx, _) = watch::channel(GateState::Scanning);
        Self {
            inner: Arc::new(Mutex::new(GateInner {
                state: GateState::Scanning,
                mode,
                last_accepted_at: None,
                generation: 0,
            })),
            submitter,
            cooldown,
            events,
            state_tx: Arc::new(state_tx),
        }
    }

    /// Offer a sampled frame in live mode.
    ///
    /// Frames failing the guards are dropped silently. An admitted frame is
    /// submitted on a background task; its outcome is applied when it
    /// resolves and published through [`subscribe`](Self::subscribe).
    /// Must be called from within a Tokio runtime.
    pub fn offer(&self, frame: Frame) -> Admission {
        let now = Instant::now();
        let (mode, generation) = {
            let inner = self.lock();
            if !inner.state.is_scanning() {
                return self.drop_frame(Admission::Paused);
            }
            if let Some(at) = inner.last_accepted_at {
                if now.saturating_duration_since(at) < self.cooldown {
                    return self.drop_frame(Admission::CoolingDown);
                }
            }
            (inner.mode, inner.generation)
        };

        debug!(mode = %mode, generation, bytes = frame.len(), "Frame admitted");
        metrics::record_admission(Admission::Submitted.as_str());

        let gate = self.clone();
        tokio::spawn(async move {
            let outcome = gate.submitter.submit(mode, frame).await;
            gate.settle(outcome, generation);
        });

        Admission::Submitted
    }

    /// Switch punch direction. Also resumes a paused scanner.
    pub fn set_mode(&self, mode: SubmissionMode) {
        let mut inner = self.lock();
        if !inner.state.is_scanning() {
            inner.generation += 1;
        }
        inner.mode = mode;
        inner.state = GateState::Scanning;
        self.state_tx.send_replace(GateState::Scanning);
        info!(mode = %mode, generation = inner.generation, "Submission mode set");
    }

    /// Resume scanning without changing direction.
    pub fn resume(&self) {
        let mut inner = self.lock();
        if !inner.state.is_scanning() {
            inner.generation += 1;
            info!(mode = %inner.mode, generation = inner.generation, "Scanner resumed");
        }
        inner.state = GateState::Scanning;
        self.state_tx.send_replace(GateState::Scanning);
    }

    /// Submit a manually captured frame.
    ///
    /// Manual captures are always intentional: pause and cooldown do not
    /// apply and the scanner state is not changed. Rejections are returned to
    /// the caller so they can be shown to the operator.
    pub async fn submit(&self, frame: Frame, mode: SubmissionMode) -> Result<Recognition, Rejection> {
        let outcome = self.submitter.submit(mode, frame).await;
        metrics::record_manual(outcome.is_accepted());
        match &outcome {
            SubmissionOutcome::Accepted(r) => info!(mode = %mode, user = %r.user.name, "Manual punch accepted"),
            SubmissionOutcome::Rejected(r) => warn!("Manual punch rejected: {}", r),
        }
        outcome.into_result()
    }

    pub fn state(&self) -> GateState {
        self.lock().state
    }

    pub fn mode(&self) -> SubmissionMode {
        self.lock().mode
    }

    /// When the last accepted punch was applied, if any.
    pub fn last_accepted_at(&self) -> Option<Instant> {
        self.lock().last_accepted_at
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Subscribe to live-mode outcomes.
    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.events.subscribe()
    }

    /// Watch `GateState` transitions.
    pub fn watch_state(&self) -> watch::Receiver<GateState> {
        self.state_tx.subscribe()
    }

    fn settle(&self, outcome: SubmissionOutcome, generation: u64) {
        match outcome {
            SubmissionOutcome::Accepted(recognition) => {
                let applied = {
                    let mut inner = self.lock();
                    if inner.state.is_scanning() && inner.generation == generation {
                        let now = Instant::now();
                        inner.state = GateState::Paused;
                        inner.last_accepted_at = Some(inner.last_accepted_at.map_or(now, |t| t.max(now)));
                        self.state_tx.send_replace(GateState::Paused);
                        true
                    } else {
                        false
                    }
                };

                if applied {
                    info!(
                        mode = %recognition.mode,
                        user = %recognition.user.name,
                        "Punch accepted, scanner paused"
                    );
                    metrics::record_outcome("accepted");
                } else {
                    debug!(
                        mode = %recognition.mode,
                        user = %recognition.user.name,
                        generation,
                        "Stale acceptance ignored"
                    );
                    metrics::record_outcome("stale");
                }

                let _ = self.events.send(GateEvent::Accepted {
                    recognition,
                    stale: !applied,
                });
            }
            SubmissionOutcome::Rejected(rejection) => {
                // Misses are expected in live mode; the next tick retries.
                debug!("Live submission rejected: {}", rejection);
                metrics::record_outcome("rejected");
                let _ = self.events.send(GateEvent::Rejected(rejection));
            }
        }
    }

    fn drop_frame(&self, admission: Admission) -> Admission {
        metrics::record_admission(admission.as_str());
        admission
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
