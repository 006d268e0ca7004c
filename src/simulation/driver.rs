use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use log::{debug, error, info, warn};
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use uuid::Uuid;

use super::config::SimulationConfig;
use super::lifecycle::RunState;
use super::listener::SimulationListener;
use super::run::SimulationRun;
use crate::error::SimError;

type ListenerSlot = Arc<Mutex<Option<Box<dyn SimulationListener>>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub candles: u64,
    pub final_close: f64,
    pub state: RunState,
}

/// Drives a [`SimulationRun`] from a single timer. Each progress step
/// reports progress, and every `tick_interval / progress_interval` steps a
/// candle is generated.
pub struct SimulationDriver<R> {
    run: SimulationRun<R>,
    run_id: Uuid,
}

impl<R: Rng + Send + 'static> SimulationDriver<R> {
    pub fn new(config: SimulationConfig, rng: R) -> Result<Self, SimError> {
        Ok(Self {
            run: SimulationRun::new(config, rng)?,
            run_id: Uuid::new_v4(),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Starts the run on the current tokio runtime.
    pub fn spawn<L>(mut self, listener: L) -> Result<SimulationHandle, SimError>
    where
        L: SimulationListener + 'static,
    {
        let started_at = Utc::now().timestamp_millis().max(0) as u64;
        self.run.start(started_at)?;
        info!(
            "run {} started: {} ticks of {:?}, initial value {:.2}",
            self.run_id,
            self.run.total_ticks(),
            self.run.config().tick_interval,
            self.run.config().initial_value
        );

        let boxed: Box<dyn SimulationListener> = Box::new(listener);
        let listener: ListenerSlot = Arc::new(Mutex::new(Some(boxed)));
        let task = tokio::spawn(drive(self.run, self.run_id, listener.clone()));

        Ok(SimulationHandle {
            run_id: self.run_id,
            listener,
            task: Some(task),
        })
    }
}

/// Calls `f` with the listener unless the run has been torn down.
fn emit<F>(slot: &ListenerSlot, f: F) -> bool
where
    F: FnOnce(&mut (dyn SimulationListener + 'static)),
{
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    match guard.as_mut() {
        Some(listener) => {
            f(&mut **listener);
            true
        }
        None => false,
    }
}

async fn drive<R: Rng>(mut run: SimulationRun<R>, run_id: Uuid, slot: ListenerSlot) -> RunSummary {
    let period = run.config().progress_interval;
    let steps_per_tick = run.config().steps_per_tick();
    let total_steps = run.config().total_steps();

    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut step: u64 = 0;
    loop {
        interval.tick().await;
        step += 1;

        let fraction = (step as f64 / total_steps as f64).min(1.0);
        if !emit(&slot, |listener| listener.on_progress(fraction)) {
            run.teardown();
            break;
        }
        if step % steps_per_tick != 0 {
            continue;
        }

        match run.advance() {
            Ok(Some(report)) => {
                let close = report.candle.close;
                let window = run.window();
                let delivered = emit(&slot, |listener| {
                    listener.on_candle(&report.candle, window);
                    listener.on_tick(close);
                    if report.completed {
                        listener.on_tick(close);
                        listener.on_complete();
                    }
                });
                if !delivered {
                    run.teardown();
                    break;
                }
                if report.completed {
                    info!("run {} complete, final close {:.2}", run_id, close);
                    break;
                }
            }
            Ok(None) => {
                debug!("run {} stopped in state {:?}", run_id, run.state());
                break;
            }
            Err(e) => {
                error!("run {} failed: {}", run_id, e);
                break;
            }
        }
    }

    RunSummary {
        run_id,
        candles: run.elapsed_ticks(),
        final_close: run.last_close(),
        state: run.state(),
    }
}

/// Owner of a spawned run. Dropping the handle tears the run down.
pub struct SimulationHandle {
    run_id: Uuid,
    listener: ListenerSlot,
    task: Option<JoinHandle<RunSummary>>,
}

impl SimulationHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Waits for the run to end on its own. Returns `None` if it was torn
    /// down or already joined.
    pub async fn join(&mut self) -> Option<RunSummary> {
        let task = self.task.as_mut()?;
        let result = task.await;
        self.task = None;
        match result {
            Ok(summary) => Some(summary),
            Err(e) => {
                if !e.is_cancelled() {
                    error!("run {} task failed: {}", self.run_id, e);
                }
                None
            }
        }
    }

    /// Stops the run and releases its timer. No listener callback runs after
    /// this returns. Must not be called from inside a listener callback.
    pub fn teardown(&mut self) {
        let released = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                warn!("run {} torn down before completion", self.run_id);
            }
            task.abort();
        }
        drop(released);
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::listener::SimulationEvent;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<SimulationEvent>) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn candle_closes(events: &[SimulationEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                SimulationEvent::Candle { candle, .. } => Some(candle.close),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_tick_run() {
        let config = SimulationConfig::new(1000.0, Duration::from_millis(2000));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = SimulationDriver::new(config, StdRng::seed_from_u64(7))
            .unwrap()
            .spawn(tx)
            .unwrap();

        let summary = handle.join().await.unwrap();
        assert_eq!(summary.candles, 2);
        assert_eq!(summary.state, RunState::Complete);
        assert_eq!(summary.run_id, handle.run_id());

        let events = drain(&mut rx);
        let closes = candle_closes(&events);
        assert_eq!(closes.len(), 2);
        assert_eq!(summary.final_close, closes[1]);

        let ticks: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                SimulationEvent::Tick(close) => Some(*close),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![closes[0], closes[1], closes[1]]);

        let completes = events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::Complete))
            .count();
        assert_eq!(completes, 1);
        assert!(matches!(events.last(), Some(SimulationEvent::Complete)));

        // completion follows the second candle, never the first
        let second_candle = events
            .iter()
            .rposition(|e| matches!(e, SimulationEvent::Candle { .. }))
            .unwrap();
        let complete = events
            .iter()
            .position(|e| matches!(e, SimulationEvent::Complete))
            .unwrap();
        assert!(complete > second_candle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_is_reported_by_the_same_timer() {
        let config = SimulationConfig::new(1000.0, Duration::from_millis(2000));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = SimulationDriver::new(config, StdRng::seed_from_u64(1))
            .unwrap()
            .spawn(tx)
            .unwrap();
        handle.join().await.unwrap();

        let events = drain(&mut rx);
        let progress: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                SimulationEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(progress.len(), 20);
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*progress.last().unwrap(), 1.0);

        // the first candle arrives right after the tenth progress step
        let first_candle = events
            .iter()
            .position(|e| matches!(e, SimulationEvent::Candle { .. }))
            .unwrap();
        assert_eq!(first_candle, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_snapshots_are_prefix_consistent() {
        let mut config = SimulationConfig::new(1000.0, Duration::from_secs(30));
        config.window_capacity = 5;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = SimulationDriver::new(config, StdRng::seed_from_u64(2))
            .unwrap()
            .spawn(tx)
            .unwrap();
        handle.join().await.unwrap();

        let mut previous: Option<Vec<u64>> = None;
        for event in drain(&mut rx) {
            if let SimulationEvent::Candle { candle, window } = event {
                let stamps: Vec<u64> = window.iter().map(|c| c.timestamp).collect();
                assert!(stamps.len() <= 5);
                assert!(stamps.windows(2).all(|w| w[0] < w[1]));
                assert_eq!(window.last(), Some(&candle));
                if let Some(prev) = previous {
                    // everything but the newest candle was already on screen
                    assert!(prev.ends_with(&stamps[..stamps.len() - 1]));
                }
                previous = Some(stamps);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_callbacks_after_teardown() {
        let config = SimulationConfig::new(1000.0, Duration::from_secs(10));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = SimulationDriver::new(config, StdRng::seed_from_u64(3))
            .unwrap()
            .spawn(tx)
            .unwrap();

        time::sleep(Duration::from_millis(2550)).await;
        handle.teardown();
        assert!(handle.join().await.is_none());

        time::sleep(Duration::from_secs(20)).await;
        let events = drain(&mut rx);
        assert_eq!(candle_closes(&events).len(), 2);
        assert!(!events.iter().any(|e| matches!(e, SimulationEvent::Complete)));
        // the listener (and with it the sender) has been released
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_handle_stops_the_run() {
        let config = SimulationConfig::new(1000.0, Duration::from_secs(10));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = SimulationDriver::new(config, StdRng::seed_from_u64(4))
            .unwrap()
            .spawn(tx)
            .unwrap();

        time::sleep(Duration::from_millis(1050)).await;
        drop(handle);
        time::sleep(Duration::from_secs(20)).await;

        let events = drain(&mut rx);
        assert_eq!(candle_closes(&events).len(), 1);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_config_never_spawns() {
        let config = SimulationConfig::new(1000.0, Duration::ZERO);
        assert!(matches!(
            SimulationDriver::new(config, StdRng::seed_from_u64(0)),
            Err(SimError::ZeroDuration)
        ));
    }
}
