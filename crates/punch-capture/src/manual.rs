//! Single-shot capture on explicit operator action.

use std::sync::Arc;

use punch_models::{Recognition, SubmissionMode};
use tracing::debug;

use crate::error::{CaptureError, CaptureResult};
use crate::gate::{SubmissionGate, Submitter};
use crate::source::FrameSource;

/// Captures one frame and submits it, bypassing pause and cooldown.
pub struct ManualCapture<F, S> {
    source: Arc<F>,
    gate: SubmissionGate<S>,
}

impl<F: FrameSource, S: Submitter> ManualCapture<F, S> {
    pub fn new(source: Arc<F>, gate: SubmissionGate<S>) -> Self {
        Self { source, gate }
    }

    /// Capture now and submit in `mode`.
    ///
    /// Unlike live scanning, failures are returned: a camera without a frame
    /// is [`CaptureError::DeviceNotReady`] and a declined punch is
    /// [`CaptureError::Rejected`] carrying the backend's message.
    pub async fn capture_and_submit(&self, mode: SubmissionMode) -> CaptureResult<Recognition> {
        let frame = self
            .source
            .capture_frame()
            .await
            .ok_or(CaptureError::DeviceNotReady)?;
        debug!(mode = %mode, bytes = frame.len(), "Manual capture");

        Ok(self.gate.submit(frame, mode).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use punch_models::{Frame, GateState};

    use crate::gate::tests::ScriptedSubmitter;
    use crate::source::StaticFrameSource;

    fn gate(submitter: &Arc<ScriptedSubmitter>) -> SubmissionGate<ScriptedSubmitter> {
        SubmissionGate::with_shared(Arc::clone(submitter), Duration::from_secs(5), SubmissionMode::In)
    }

    #[tokio::test]
    async fn test_device_not_ready_makes_no_call() {
        let submitter = ScriptedSubmitter::new();
        let manual = ManualCapture::new(Arc::new(StaticFrameSource::not_ready()), gate(&submitter));

        let err = manual.capture_and_submit(SubmissionMode::In).await.unwrap_err();
        assert!(matches!(err, CaptureError::DeviceNotReady));
        assert_eq!(submitter.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejection_is_surfaced_with_detail() {
        let submitter = ScriptedSubmitter::new();
        submitter.reject_after(Duration::ZERO);
        let source = Arc::new(StaticFrameSource::ready(Frame::jpeg(vec![0xFF, 0xD8])));
        let manual = ManualCapture::new(source, gate(&submitter));

        let err = manual.capture_and_submit(SubmissionMode::Out).await.unwrap_err();
        assert_eq!(err.to_string(), "No matching face found");
        assert_eq!(submitter.modes(), vec![SubmissionMode::Out]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_gate_still_submits_once() {
        let submitter = ScriptedSubmitter::new();
        submitter.accept_after(Duration::ZERO, "Ada");
        submitter.accept_after(Duration::ZERO, "Bo");
        let gate = gate(&submitter);
        let source = Arc::new(StaticFrameSource::ready(Frame::jpeg(vec![0xFF, 0xD8])));

        gate.offer(Frame::jpeg(vec![0xFF, 0xD8]));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(gate.state(), GateState::Paused);

        let manual = ManualCapture::new(source, gate.clone());
        let recognition = manual.capture_and_submit(SubmissionMode::In).await.unwrap();
        assert_eq!(recognition.user.name, "Bo");
        assert_eq!(submitter.calls(), 2);
        assert_eq!(gate.state(), GateState::Paused);
    }
}
