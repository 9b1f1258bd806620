//! System load sampling for the load card.

use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};
use sysinfo::System;

/// One system load sample.
#[derive(Debug, Clone)]
pub struct SystemMetrics {
    /// CPU usage (0.0 - 1.0).
    pub cpu_usage: f32,
    /// Memory usage (0.0 - 1.0).
    pub memory_usage: f32,
    /// When the sample was taken.
    pub last_update: Instant,
}

impl SystemMetrics {
    /// Whole-percent view of the sample, so that jitter below 1% does not
    /// count as a change.
    pub fn load(&self) -> SystemLoad {
        SystemLoad {
            cpu: percent(self.cpu_usage),
            memory: percent(self.memory_usage),
        }
    }
}

fn percent(fraction: f32) -> u8 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Quantised load, compared by composers to decide whether to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemLoad {
    pub cpu: u8,
    pub memory: u8,
}

/// System monitor that polls resource usage in a background thread.
#[derive(Debug)]
pub struct SystemMonitor {
    /// Latest sample; `None` until the first one is taken.
    metrics: Arc<RwLock<Option<SystemMetrics>>>,
    /// Copy of the latest sample for when the lock is contended.
    cached_metrics: Arc<RwLock<Option<SystemMetrics>>>,
    /// Flag to signal thread termination.
    running: Arc<RwLock<bool>>,
    interval: Duration,
}

impl SystemMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            metrics: Arc::new(RwLock::new(None)),
            cached_metrics: Arc::new(RwLock::new(None)),
            running: Arc::new(RwLock::new(false)),
            interval,
        }
    }

    /// Start the background sampling thread.
    pub fn start(&self) {
        if let Ok(mut running) = self.running.write() {
            if *running {
                return;
            }
            *running = true;
        }

        let metrics = self.metrics.clone();
        let cached = self.cached_metrics.clone();
        let running = self.running.clone();
        let interval = self.interval;

        let spawned = thread::Builder::new()
            .name("system-monitor".to_string())
            .spawn(move || {
                let mut sys = System::new();

                // CPU usage needs two refreshes to produce a value.
                sys.refresh_cpu_all();
                thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

                loop {
                    if let Ok(is_running) = running.read()
                        && !*is_running
                    {
                        break;
                    }

                    sys.refresh_cpu_all();
                    sys.refresh_memory();

                    let cpu_usage = sys.global_cpu_usage() / 100.0;
                    let memory_usage = if sys.total_memory() > 0 {
                        sys.used_memory() as f32 / sys.total_memory() as f32
                    } else {
                        0.0
                    };

                    let sample = SystemMetrics {
                        cpu_usage: cpu_usage.clamp(0.0, 1.0),
                        memory_usage: memory_usage.clamp(0.0, 1.0),
                        last_update: Instant::now(),
                    };
                    tracing::trace!(cpu = sample.cpu_usage, memory = sample.memory_usage, "system sample");

                    if let Ok(mut m) = metrics.write() {
                        *m = Some(sample.clone());
                    }
                    if let Ok(mut c) = cached.write() {
                        *c = Some(sample);
                    }

                    thread::sleep(interval);
                }
                tracing::debug!("system monitor stopped");
            });

        if let Err(err) = spawned {
            tracing::error!(error = %err, "failed to start system monitor");
            if let Ok(mut running) = self.running.write() {
                *running = false;
            }
        }
    }

    /// Stop the background sampling thread.
    pub fn stop(&self) {
        if let Ok(mut running) = self.running.write() {
            *running = false;
        }
    }

    /// The latest sample, if one has been taken.
    /// Uses try_read with fallback to the cached copy to avoid blocking.
    pub fn get_metrics(&self) -> Option<SystemMetrics> {
        if let Ok(m) = self.metrics.try_read() {
            return m.clone();
        }
        if let Ok(c) = self.cached_metrics.read() {
            return c.clone();
        }
        None
    }
}

impl Drop for SystemMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
