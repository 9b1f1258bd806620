//! Background composer with a latest-value input cell.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use mosaic_core::Frame;
use parking_lot::{Condvar, Mutex, RwLock};

use crate::error::ComposeError;

/// A screen's drawing function: external state in, optional frame out.
pub type ComposeFn<S> = Box<dyn FnMut(&S) -> Result<Option<Frame>, ComposeError> + Send>;

/// State shared between the render-facing handle and the worker thread.
struct Shared<S> {
    /// Latest state handed in by the render loop, taken by the worker.
    pending: Mutex<Option<S>>,
    wake: Condvar,
    /// Last frame produced.
    frame: RwLock<Option<Frame>>,
    running: AtomicBool,
    computes: AtomicU64,
}

/// Runs a composer function on its own thread, recomputing only when the
/// state changes.
///
/// [`get`](Self::get) never waits for a compute: it hands the newest state
/// to the worker and returns whatever frame was finished last, which may be
/// a few render ticks old. The worker starts on the first `get` and stops
/// when the composer is dropped.
pub struct Composer<S> {
    name: String,
    /// Minimum time between the starts of two computes. `None` recomputes as
    /// soon as a new state arrives.
    interval: Option<Duration>,
    shared: Arc<Shared<S>>,
    compose: Option<ComposeFn<S>>,
    worker: Option<JoinHandle<()>>,
}

impl<S> Composer<S>
where
    S: PartialEq + Send + 'static,
{
    pub fn new<F>(name: impl Into<String>, compose: F) -> Self
    where
        F: FnMut(&S) -> Result<Option<Frame>, ComposeError> + Send + 'static,
    {
        Self {
            name: name.into(),
            interval: None,
            shared: Arc::new(Shared {
                pending: Mutex::new(None),
                wake: Condvar::new(),
                frame: RwLock::new(None),
                running: AtomicBool::new(false),
                computes: AtomicU64::new(0),
            }),
            compose: Some(Box::new(compose)),
            worker: None,
        }
    }

    pub fn with_interval(mut self, interval: Option<Duration>) -> Self {
        self.interval = interval;
        self
    }

    /// Hand `state` to the worker and return the last finished frame.
    pub fn get(&mut self, state: S) -> Option<Frame> {
        *self.shared.pending.lock() = Some(state);
        self.shared.wake.notify_one();
        self.start();
        self.latest()
    }

    fn start(&mut self) {
        let Some(compose) = self.compose.take() else {
            return;
        };

        self.shared.running.store(true, Ordering::Release);
        let shared = self.shared.clone();
        let name = self.name.clone();
        let interval = self.interval;

        let spawned = thread::Builder::new()
            .name(format!("compose-{}", self.name))
            .spawn(move || run(&name, &shared, compose, interval));

        match spawned {
            Ok(handle) => {
                tracing::debug!(composer = %self.name, ?interval, "composer worker started");
                self.worker = Some(handle);
            }
            Err(err) => {
                self.shared.running.store(false, Ordering::Release);
                tracing::error!(composer = %self.name, error = %err, "failed to spawn composer worker");
            }
        }
    }
}

impl<S> Composer<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last finished frame, without submitting new state.
    pub fn latest(&self) -> Option<Frame> {
        self.shared.frame.read().clone()
    }

    /// Number of times the composer function has been invoked.
    pub fn compute_count(&self) -> u64 {
        self.shared.computes.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Stop the worker and wait for it to exit. The last frame stays
    /// available through [`latest`](Self::latest).
    pub fn stop(&mut self) {
        {
            // Flip the flag under the lock so a waiting worker cannot miss it.
            let _pending = self.shared.pending.lock();
            self.shared.running.store(false, Ordering::Release);
        }
        self.shared.wake.notify_all();
        if let Some(handle) = self.worker.take()
            && handle.join().is_err()
        {
            tracing::error!(composer = %self.name, "composer worker exited abnormally");
        }
    }
}

impl<S> Drop for Composer<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<S> std::fmt::Debug for Composer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("computes", &self.shared.computes.load(Ordering::Relaxed))
            .finish()
    }
}

/// Worker loop: wait for a state unequal to the last one, compute, then rest
/// out the interval.
fn run<S: PartialEq>(
    name: &str,
    shared: &Shared<S>,
    mut compose: ComposeFn<S>,
    interval: Option<Duration>,
) {
    let mut last: Option<S> = None;

    while let Some(state) = next_state(shared, last.as_ref()) {
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| compose(&state)));
        shared.computes.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(Ok(frame)) => *shared.frame.write() = frame,
            Ok(Err(err)) => {
                tracing::warn!(composer = name, error = %err, "compose failed, keeping last frame");
            }
            Err(payload) => {
                tracing::error!(
                    composer = name,
                    panic = panic_message(payload.as_ref()),
                    "composer panicked, keeping last frame"
                );
            }
        }
        // A failed state is retried only once the state changes.
        last = Some(state);

        if let Some(interval) = interval {
            let deadline = started + interval;
            let mut pending = shared.pending.lock();
            while shared.running.load(Ordering::Acquire) && Instant::now() < deadline {
                shared.wake.wait_until(&mut pending, deadline);
            }
        }
    }

    tracing::debug!(composer = name, "composer worker stopped");
}

/// Block until a state different from `last` is pending. `None` once the
/// composer is stopped.
fn next_state<S: PartialEq>(shared: &Shared<S>, last: Option<&S>) -> Option<S> {
    let mut pending = shared.pending.lock();
    loop {
        if !shared.running.load(Ordering::Acquire) {
            return None;
        }
        if let Some(state) = pending.take()
            && last != Some(&state)
        {
            return Some(state);
        }
        shared.wake.wait(&mut pending);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::Rgba;
    use std::sync::atomic::AtomicUsize;

    const WAIT: Duration = Duration::from_secs(5);

    /// Poll `cond` until it holds or the wait budget runs out.
    fn eventually(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    fn shade(value: &u8) -> Result<Option<Frame>, ComposeError> {
        Ok(Some(Frame::solid(1, 1, Rgba([*value, 0, 0, 255]))))
    }

    #[test]
    fn test_lazy_start() {
        let mut composer = Composer::new("lazy", shade);
        assert!(!composer.is_running());
        assert_eq!(composer.latest(), None);
        composer.get(1);
        assert!(composer.is_running());
    }

    #[test]
    fn test_same_state_is_not_recomputed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut composer = Composer::new("memo", move |v: &u8| {
            counter.fetch_add(1, Ordering::SeqCst);
            shade(v)
        });

        composer.get(7);
        assert!(eventually(|| composer.latest().is_some()));
        composer.get(7);
        composer.get(7);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(composer.compute_count(), 1);

        composer.get(8);
        assert!(eventually(|| composer.compute_count() == 2));
        assert!(eventually(|| {
            composer.latest().map(|f| f.pixel(0, 0).0[0]) == Some(8)
        }));
    }

    #[test]
    fn test_get_does_not_wait_for_compute() {
        let mut composer = Composer::new("slow", |v: &u8| {
            thread::sleep(Duration::from_millis(300));
            shade(v)
        });
        let started = Instant::now();
        assert_eq!(composer.get(1), None);
        assert!(started.elapsed() < Duration::from_millis(200));
        assert!(eventually(|| composer.get(1).is_some()));
    }

    #[test]
    fn test_error_keeps_last_frame() {
        let mut composer = Composer::new("flaky", |v: &u8| match v {
            0 => Err(ComposeError::missing("no reading")),
            v => shade(v),
        });
        composer.get(3);
        assert!(eventually(|| composer.latest().is_some()));
        let good = composer.latest();

        composer.get(0);
        assert!(eventually(|| composer.compute_count() == 2));
        assert_eq!(composer.latest(), good);
    }

    #[test]
    fn test_panic_keeps_last_frame_and_worker() {
        let mut composer = Composer::new("panicky", |v: &u8| {
            if *v == 0 {
                panic!("boom");
            }
            shade(v)
        });
        composer.get(4);
        assert!(eventually(|| composer.latest().is_some()));
        let good = composer.latest();

        composer.get(0);
        assert!(eventually(|| composer.compute_count() == 2));
        assert_eq!(composer.latest(), good);

        composer.get(5);
        assert!(eventually(|| composer.compute_count() == 3));
        assert!(eventually(|| composer.latest() != good));
    }

    #[test]
    fn test_interval_limits_rate() {
        let mut composer = Composer::new("paced", shade).with_interval(Some(Duration::from_secs(60)));
        composer.get(1);
        assert!(eventually(|| composer.compute_count() == 1));
        composer.get(2);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(composer.compute_count(), 1);
    }

    #[test]
    fn test_absent_frame_replaces_last() {
        let mut composer = Composer::new("optional", |v: &u8| {
            if *v == 0 { Ok(None) } else { shade(v) }
        });
        composer.get(2);
        assert!(eventually(|| composer.latest().is_some()));
        composer.get(0);
        assert!(eventually(|| composer.latest().is_none()));
    }

    #[test]
    fn test_stop_joins_worker() {
        let mut composer = Composer::new("stopper", shade).with_interval(Some(Duration::from_secs(60)));
        composer.get(1);
        assert!(eventually(|| composer.compute_count() == 1));
        let started = Instant::now();
        composer.stop();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!composer.is_running());
        assert!(composer.latest().is_some());
    }
}
