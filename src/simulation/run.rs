use log::debug;
use rand::Rng;

use super::config::SimulationConfig;
use super::lifecycle::{Lifecycle, RunInput, RunOutput, RunState};
use crate::error::SimError;
use crate::generator::{CandleGenerator, MarketPhase};
use crate::models::Candle;
use crate::services::CandleWindow;

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub candle: Candle,
    pub progress: f64,
    pub phase: MarketPhase,
    pub target: f64,
    pub completed: bool,
}

/// The synchronous core of a run: one call to [`SimulationRun::advance`] per
/// timer tick. Timers live in the driver.
pub struct SimulationRun<R> {
    config: SimulationConfig,
    generator: CandleGenerator<R>,
    window: CandleWindow,
    lifecycle: Lifecycle,
    elapsed_ticks: u64,
    total_ticks: u64,
    last_close: f64,
    fixed_target: Option<f64>,
    started_at: u64,
}

impl<R: Rng> SimulationRun<R> {
    pub fn new(config: SimulationConfig, rng: R) -> Result<Self, SimError> {
        config.validate()?;
        let generator =
            CandleGenerator::new(rng, config.initial_value).with_volatility(config.volatility);
        Ok(Self {
            window: CandleWindow::with_capacity(config.window_capacity),
            lifecycle: Lifecycle::new(),
            elapsed_ticks: 0,
            total_ticks: config.total_ticks(),
            last_close: config.initial_value,
            fixed_target: None,
            started_at: 0,
            generator,
            config,
        })
    }

    fn fire(&mut self, input: RunInput) -> Result<Option<RunOutput>, SimError> {
        let state = *self.lifecycle.state();
        self.lifecycle
            .consume(&input)
            .map_err(|_| SimError::InvalidTransition {
                state: format!("{:?}", state),
                input: format!("{:?}", input),
            })
    }

    /// Moves the run from `Idle` to `Running`. `started_at` is the epoch
    /// millisecond timestamp of the run start.
    pub fn start(&mut self, started_at: u64) -> Result<(), SimError> {
        self.fire(RunInput::Start)?;
        self.started_at = started_at;
        if self.config.fixed_target {
            let range = self.config.target_multiplier;
            self.fixed_target = Some(self.generator.sample_target(range.min, range.max));
        }
        Ok(())
    }

    fn target(&mut self) -> f64 {
        match self.fixed_target {
            Some(target) => target,
            None => {
                let range = self.config.target_multiplier;
                self.generator.sample_target(range.min, range.max)
            }
        }
    }

    /// Generates the next candle. Returns `None` unless the run is
    /// `Running`.
    pub fn advance(&mut self) -> Result<Option<TickReport>, SimError> {
        if *self.lifecycle.state() != RunState::Running {
            return Ok(None);
        }

        self.elapsed_ticks += 1;
        let progress = (self.elapsed_ticks as f64 / self.total_ticks as f64).min(1.0);
        let target = self.target();
        let timestamp = self.started_at
            + self.elapsed_ticks * self.config.tick_interval.as_millis() as u64;

        let candle = self
            .generator
            .next_candle(self.last_close, target, progress, timestamp);
        self.last_close = candle.close;
        self.window.push(candle.clone());

        let completed = self.elapsed_ticks >= self.total_ticks;
        if completed {
            self.fire(RunInput::Finish)?;
        }

        debug!(
            "tick {}/{} close {:.2} target {:.2}",
            self.elapsed_ticks, self.total_ticks, candle.close, target
        );

        Ok(Some(TickReport {
            candle,
            progress,
            phase: MarketPhase::from_progress(progress),
            target,
            completed,
        }))
    }

    /// Cancels a run that has not completed. Completed runs are left as is.
    pub fn teardown(&mut self) -> bool {
        matches!(self.fire(RunInput::Teardown), Ok(Some(RunOutput::Released)))
    }

    pub fn state(&self) -> RunState {
        *self.lifecycle.state()
    }

    pub fn window(&self) -> &CandleWindow {
        &self.window
    }

    pub fn last_close(&self) -> f64 {
        self.last_close
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
