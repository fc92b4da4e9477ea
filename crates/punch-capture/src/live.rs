//! Live scanning: the sampler feeding the submission gate.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use punch_models::{GateState, SubmissionMode};

use crate::config::ScanConfig;
use crate::gate::{GateEvent, SubmissionGate, Submitter};
use crate::sampler::Sampler;
use crate::source::FrameSource;

/// Runs the sampler while the gate is scanning.
///
/// A supervisor task follows the gate state: the sampler is disarmed as soon
/// as a punch is accepted and re-armed with a fresh period when the operator
/// resumes or switches direction.
pub struct LiveScanner<F, S> {
    sampler: Arc<Sampler<F>>,
    gate: SubmissionGate<S>,
    supervisor: Mutex<Option<CancellationToken>>,
}

impl<F: FrameSource, S: Submitter> LiveScanner<F, S> {
    pub fn new(source: F, submitter: S, config: &ScanConfig) -> Self {
        Self::from_parts(
            Sampler::new(source, config.period),
            SubmissionGate::new(submitter, config.cooldown, config.mode),
        )
    }

    /// Wire an existing sampler to an existing gate.
    pub fn from_parts(sampler: Sampler<F>, gate: SubmissionGate<S>) -> Self {
        let offer_to = gate.clone();
        sampler.set_handler(move |frame| {
            offer_to.offer(frame);
        });

        Self {
            sampler: Arc::new(sampler),
            gate,
            supervisor: Mutex::new(None),
        }
    }

    pub fn gate(&self) -> &SubmissionGate<S> {
        &self.gate
    }

    /// Start following the gate. Returns `false` if already started.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut supervisor = self.supervisor.lock().unwrap_or_else(|e| e.into_inner());
        if supervisor.is_some() {
            return false;
        }

        let cancel = CancellationToken::new();
        *supervisor = Some(cancel.clone());
        tokio::spawn(supervise(
            Arc::clone(&self.sampler),
            self.gate.watch_state(),
            cancel,
        ));

        info!(mode = %self.gate.mode(), "Live scanner started");
        true
    }

    /// Stop the supervisor and the sampling timer.
    pub fn stop(&self) {
        if let Some(cancel) = self.supervisor.lock().unwrap_or_else(|e| e.into_inner()).take() {
            cancel.cancel();
            info!("Live scanner stopped");
        }
        self.sampler.disarm();
    }

    pub fn is_running(&self) -> bool {
        self.supervisor.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Whether the sampling timer is currently armed.
    pub fn is_sampling(&self) -> bool {
        self.sampler.is_armed()
    }

    pub fn set_mode(&self, mode: SubmissionMode) {
        self.gate.set_mode(mode);
    }

    pub fn resume(&self) {
        self.gate.resume();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.gate.subscribe()
    }
}

impl<F, S> Drop for LiveScanner<F, S> {
    fn drop(&mut self) {
        if let Some(cancel) = self.supervisor.get_mut().unwrap_or_else(|e| e.into_inner()).take() {
            cancel.cancel();
        }
    }
}

async fn supervise<F: FrameSource>(
    sampler: Arc<Sampler<F>>,
    mut state: watch::Receiver<GateState>,
    cancel: CancellationToken,
) {
    loop {
        let current = *state.borrow_and_update();
        match current {
            GateState::Scanning => {
                if sampler.arm() {
                    debug!("Sampling resumed");
                }
            }
            GateState::Paused => {
                if sampler.disarm() {
                    debug!("Sampling paused");
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    sampler.disarm();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use punch_models::Frame;

    use crate::gate::tests::ScriptedSubmitter;
    use crate::source::StaticFrameSource;

    fn scanner(submitter: &Arc<ScriptedSubmitter>) -> LiveScanner<StaticFrameSource, ScriptedSubmitter> {
        LiveScanner::from_parts(
            Sampler::new(
                StaticFrameSource::ready(Frame::jpeg(vec![0xFF, 0xD8])),
                Duration::from_millis(2000),
            ),
            SubmissionGate::with_shared(Arc::clone(submitter), Duration::from_millis(5000), SubmissionMode::In),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_punch_stops_sampling_until_resume() {
        let submitter = ScriptedSubmitter::new();
        submitter.accept_after(Duration::from_millis(200), "Ada");
        let scanner = scanner(&submitter);
        let mut events = scanner.subscribe();

        assert!(scanner.start());
        assert!(!scanner.start());

        match events.recv().await.unwrap() {
            GateEvent::Accepted { recognition, stale } => {
                assert_eq!(recognition.user.name, "Ada");
                assert!(!stale);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!scanner.is_sampling());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(submitter.calls(), 1);

        scanner.resume();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(scanner.is_sampling());
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(submitter.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_switch_rearms_with_new_direction() {
        let submitter = ScriptedSubmitter::new();
        submitter.accept_after(Duration::ZERO, "Ada");
        let scanner = scanner(&submitter);

        scanner.start();
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(scanner.gate().state(), GateState::Paused);

        tokio::time::sleep(Duration::from_secs(5)).await;
        scanner.set_mode(SubmissionMode::Out);
        tokio::time::sleep(Duration::from_millis(2100)).await;

        assert_eq!(submitter.modes(), vec![SubmissionMode::In, SubmissionMode::Out]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_tears_down_timer() {
        let submitter = ScriptedSubmitter::new();
        let scanner = scanner(&submitter);

        scanner.start();
        tokio::time::sleep(Duration::from_millis(4100)).await;
        assert_eq!(submitter.calls(), 2);

        scanner.stop();
        assert!(!scanner.is_running());
        assert!(!scanner.is_sampling());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(submitter.calls(), 2);
    }
}
