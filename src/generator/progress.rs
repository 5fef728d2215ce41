//! Synthetic progress for a single generation request.
//!
//! The backend exposes no progress signal, so a ticker task advances an
//! estimate on a fixed period. The ticker is owned by the request: dropping it
//! cancels the task and closes the reporter, after which the callback is never
//! invoked again.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::config::ProgressConfig;

/// Receives a percentage in `0..=100`.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

pub const COMPLETE: u8 = 100;
const ESTIMATE_CAP: f64 = 99.0;

/// Adapts the callback interface into a stream of percentages.
pub fn progress_channel() -> (ProgressCallback, UnboundedReceiverStream<u8>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: ProgressCallback = Arc::new(move |percent| {
        let _ = tx.send(percent);
    });
    (callback, UnboundedReceiverStream::new(rx))
}

/// One step of the estimate. Past the ceiling the counter is pinned to
/// `ceiling + jitter`.
pub fn advance(counter: f64, increment: f64, ceiling: f64, jitter: f64) -> f64 {
    let next = counter + increment;
    if next > ceiling {
        ceiling + jitter
    } else {
        next
    }
}

/// The value reported for a counter; never 100.
pub fn estimate(counter: f64) -> u8 {
    counter.min(ESTIMATE_CAP).max(0.0).round() as u8
}

struct ReporterState {
    closed: bool,
    last: u8,
}

struct Reporter {
    callback: ProgressCallback,
    state: Mutex<ReporterState>,
}

impl Reporter {
    fn new(callback: ProgressCallback) -> Self {
        Self {
            callback,
            state: Mutex::new(ReporterState {
                closed: false,
                last: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reports a monotonic value; returns false once closed.
    fn report(&self, percent: u8) -> bool {
        let mut state = self.lock();
        if state.closed {
            return false;
        }
        let percent = percent.max(state.last);
        state.last = percent;
        (self.callback)(percent);
        true
    }

    fn close(&self, final_report: Option<u8>) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        if let Some(percent) = final_report {
            state.last = percent;
            (self.callback)(percent);
        }
        state.closed = true;
    }
}

/// Periodic estimate scoped to one request.
pub struct ProgressTicker {
    reporter: Arc<Reporter>,
    task: JoinHandle<()>,
}

impl ProgressTicker {
    /// Reports `0` immediately, then ticks every `config.tick`.
    pub fn start(callback: ProgressCallback, increment: f64, config: &ProgressConfig) -> Self {
        let reporter = Arc::new(Reporter::new(callback));
        reporter.report(0);

        let tick = config.tick;
        let ceiling = config.ceiling;
        let max_jitter = config.max_jitter.max(0.0);
        let task_reporter = Arc::clone(&reporter);

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick, tick);
            let mut counter = 0.0;
            loop {
                interval.tick().await;
                let jitter = rand::random::<f64>() * max_jitter;
                counter = advance(counter, increment, ceiling, jitter);
                if !task_reporter.report(estimate(counter)) {
                    break;
                }
            }
        });

        Self { reporter, task }
    }

    /// Stops ticking and reports `100`.
    pub fn complete(self) {
        self.task.abort();
        self.reporter.close(Some(COMPLETE));
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.task.abort();
        self.reporter.close(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |p| sink.lock().unwrap().push(p));
        (callback, seen)
    }

    #[test]
    fn advance_pins_at_ceiling() {
        assert_eq!(advance(0.0, 15.0, 90.0, 1.0), 15.0);
        assert_eq!(advance(90.0, 15.0, 90.0, 1.5), 91.5);
        assert_eq!(advance(85.0, 5.0, 90.0, 1.0), 90.0);
    }

    #[test]
    fn estimate_never_reaches_complete() {
        assert_eq!(estimate(15.4), 15);
        assert_eq!(estimate(91.6), 92);
        assert_eq!(estimate(250.0), 99);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_the_configured_period() {
        let (callback, seen) = recorder();
        let ticker = ProgressTicker::start(callback, 15.0, &ProgressConfig::default());

        time::sleep(Duration::from_millis(1300)).await;
        assert_eq!(*seen.lock().unwrap(), vec![0, 15, 30, 45]);

        ticker.complete();
        assert_eq!(seen.lock().unwrap().last(), Some(&100));
    }

    #[tokio::test(start_paused = true)]
    async fn reports_stay_below_complete_and_monotonic() {
        let (callback, seen) = recorder();
        let ticker = ProgressTicker::start(callback, 15.0, &ProgressConfig::default());

        time::sleep(Duration::from_secs(20)).await;
        drop(ticker);

        let seen = seen.lock().unwrap();
        assert!(seen.iter().all(|p| *p < 100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(*seen.last().unwrap() >= 90);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_reported_after_drop() {
        let (callback, seen) = recorder();
        let ticker = ProgressTicker::start(callback, 5.0, &ProgressConfig::default());
        time::sleep(Duration::from_millis(900)).await;
        drop(ticker);
        let count = seen.lock().unwrap().len();

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(seen.lock().unwrap().len(), count);
        assert!(!seen.lock().unwrap().contains(&100));
    }

    #[tokio::test]
    async fn channel_delivers_reports() {
        use futures::StreamExt;

        let (callback, mut stream) = progress_channel();
        callback(0);
        callback(100);
        drop(callback);
        let values: Vec<u8> = stream.by_ref().collect().await;
        assert_eq!(values, vec![0, 100]);
    }
}
