//! Timer-driven frame sampler.
//!
//! While armed, the sampler captures a frame every `period` and hands it to
//! the current handler. The next tick is only scheduled once the current
//! capture has finished, so a slow source lowers the effective rate instead
//! of piling up captures. Arming always starts a fresh period.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use punch_models::Frame;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::metrics;
use crate::source::FrameSource;

/// Callback receiving sampled frames.
pub type FrameHandler = Arc<dyn Fn(Frame) + Send + Sync>;

/// Replaceable frame handler shared with the sampling task.
///
/// Swapping the handler takes effect on the next tick and does not touch the
/// timer.
#[derive(Clone, Default)]
pub struct HandlerSlot {
    inner: Arc<RwLock<Option<FrameHandler>>>,
}

impl HandlerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<H>(&self, handler: H)
    where
        H: Fn(Frame) + Send + Sync + 'static,
    {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(handler));
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    fn current(&self) -> Option<FrameHandler> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl std::fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlot").field("set", &self.is_set()).finish()
    }
}

/// Periodic, non-overlapping sampler over a [`FrameSource`].
pub struct Sampler<F> {
    source: Arc<F>,
    period: Duration,
    handler: HandlerSlot,
    capture_lock: Arc<tokio::sync::Mutex<()>>,
    running: Mutex<Option<CancellationToken>>,
}

impl<F: FrameSource> Sampler<F> {
    pub fn new(source: F, period: Duration) -> Self {
        Self::with_shared(Arc::new(source), period)
    }

    pub fn with_shared(source: Arc<F>, period: Duration) -> Self {
        Self {
            source,
            period,
            handler: HandlerSlot::new(),
            capture_lock: Arc::new(tokio::sync::Mutex::new(())),
            running: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn source(&self) -> &Arc<F> {
        &self.source
    }

    /// The handler slot; clones share the same slot.
    pub fn handler(&self) -> &HandlerSlot {
        &self.handler
    }

    pub fn set_handler<H>(&self, handler: H)
    where
        H: Fn(Frame) + Send + Sync + 'static,
    {
        self.handler.set(handler);
    }

    pub fn is_armed(&self) -> bool {
        self.running.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Start sampling. Returns `false` if already armed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn arm(&self) -> bool {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if running.is_some() {
            return false;
        }

        let cancel = CancellationToken::new();
        *running = Some(cancel.clone());

        tokio::spawn(sample_loop(
            Arc::clone(&self.source),
            self.period,
            self.handler.clone(),
            Arc::clone(&self.capture_lock),
            cancel,
        ));

        debug!(period_ms = self.period.as_millis() as u64, "Sampler armed");
        true
    }

    /// Stop sampling. An in-flight capture is abandoned and never delivered.
    /// Returns `false` if not armed.
    pub fn disarm(&self) -> bool {
        let token = self.running.lock().unwrap_or_else(|e| e.into_inner()).take();
        match token {
            Some(token) => {
                token.cancel();
                debug!("Sampler disarmed");
                true
            }
            None => false,
        }
    }
}

impl<F> Drop for Sampler<F> {
    fn drop(&mut self) {
        if let Some(token) = self.running.get_mut().unwrap_or_else(|e| e.into_inner()).take() {
            token.cancel();
        }
    }
}

async fn sample_loop<F: FrameSource>(
    source: Arc<F>,
    period: Duration,
    handler: HandlerSlot,
    capture_lock: Arc<tokio::sync::Mutex<()>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(period) => {}
        }

        // Held across the capture so a re-armed loop cannot overlap one
        // that is still being torn down.
        let _guard = tokio::select! {
            _ = cancel.cancelled() => break,
            guard = capture_lock.lock() => guard,
        };

        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = source.capture_frame() => frame,
        };
        metrics::record_capture(frame.is_some());

        if cancel.is_cancelled() {
            break;
        }

        match (frame, handler.current()) {
            (Some(frame), Some(handler)) => handler(frame),
            (Some(_), None) => trace!("No frame handler set, frame dropped"),
            (None, _) => trace!("Camera not ready, skipping tick"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    /// Source taking `delay` per capture and recording concurrency.
    #[derive(Default)]
    struct ProbeSource {
        delay: Duration,
        ready: bool,
        started: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ProbeSource {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                ready: true,
                ..Default::default()
            })
        }

        fn not_ready() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn started(&self) -> usize {
            self.started.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FrameSource for ProbeSource {
        async fn capture_frame(&self) -> Option<Frame> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.ready.then(|| Frame::jpeg(vec![0xFF, 0xD8]))
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn(Frame) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move |_frame| {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_never_overlaps() {
        let source = ProbeSource::new(Duration::from_secs(3));
        let sampler = Sampler::with_shared(Arc::clone(&source), Duration::from_secs(2));
        let (delivered, handler) = counter();
        sampler.set_handler(handler);

        assert!(sampler.arm());
        tokio::time::sleep(Duration::from_millis(19_500)).await;
        sampler.disarm();

        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(source.started() <= 19_500 / 2000);
        // Captures start at 2s, 7s, 12s, 17s.
        assert_eq!(source.started(), 4);
        assert_eq!(delivered.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_swap_keeps_timer() {
        let source = ProbeSource::new(Duration::ZERO);
        let sampler = Sampler::with_shared(source, Duration::from_secs(2));
        let (first, first_handler) = counter();
        let (second, second_handler) = counter();

        sampler.set_handler(first_handler);
        sampler.arm();
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);

        sampler.set_handler(second_handler);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_stops_sampling() {
        let source = ProbeSource::new(Duration::ZERO);
        let sampler = Sampler::with_shared(Arc::clone(&source), Duration::from_secs(2));
        let (delivered, handler) = counter();
        sampler.set_handler(handler);

        sampler.arm();
        tokio::time::sleep(Duration::from_millis(4500)).await;
        assert!(sampler.disarm());
        assert!(!sampler.disarm());
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(source.started(), 2);
        assert_eq!(delivered.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_abandons_in_flight_capture() {
        let source = ProbeSource::new(Duration::from_secs(3));
        let sampler = Sampler::with_shared(Arc::clone(&source), Duration::from_secs(1));
        let (delivered, handler) = counter();
        sampler.set_handler(handler);

        sampler.arm();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(source.started(), 1);
        sampler.disarm();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(delivered.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_starts_fresh_period() {
        let source = ProbeSource::new(Duration::ZERO);
        let sampler = Sampler::with_shared(Arc::clone(&source), Duration::from_secs(2));
        let (delivered, handler) = counter();
        sampler.set_handler(handler);

        sampler.arm();
        assert!(!sampler.arm());
        tokio::time::sleep(Duration::from_millis(3000)).await;
        sampler.disarm();
        sampler.arm();

        // Old schedule would tick at 4s; the fresh one ticks at 5s.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(delivered.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_ready_ticks_are_skipped() {
        let source = ProbeSource::not_ready();
        let sampler = Sampler::with_shared(Arc::clone(&source), Duration::from_secs(2));
        let (delivered, handler) = counter();
        sampler.set_handler(handler);

        sampler.arm();
        tokio::time::sleep(Duration::from_millis(6500)).await;

        assert_eq!(source.started(), 3);
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
        assert!(sampler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_disarms() {
        let source = ProbeSource::new(Duration::ZERO);
        let sampler = Sampler::with_shared(Arc::clone(&source), Duration::from_secs(1));
        sampler.arm();
        drop(sampler);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.started(), 0);
    }
}
