use std::time::Duration;

use crate::cli::Args;
use crate::error::SimError;
use crate::generator::DEFAULT_VOLATILITY;
use crate::services::WINDOW_CAPACITY;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_DURATION: Duration = Duration::from_secs(90);

/// Multipliers applied to the initial value to pick the run's target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRange {
    pub min: f64,
    pub max: f64,
}

impl Default for TargetRange {
    fn default() -> Self {
        Self {
            min: 102.0,
            max: 104.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub initial_value: f64,
    pub duration: Duration,
    pub tick_interval: Duration,
    pub progress_interval: Duration,
    pub target_multiplier: TargetRange,
    pub window_capacity: usize,
    pub volatility: f64,
    /// Sample the target once per run instead of on every tick.
    pub fixed_target: bool,
}

impl SimulationConfig {
    pub fn new(initial_value: f64, duration: Duration) -> Self {
        Self {
            initial_value,
            duration,
            tick_interval: DEFAULT_TICK_INTERVAL,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            target_multiplier: TargetRange::default(),
            window_capacity: WINDOW_CAPACITY,
            volatility: DEFAULT_VOLATILITY,
            fixed_target: false,
        }
    }

    pub fn with_intervals(mut self, tick: Duration, progress: Duration) -> Self {
        self.tick_interval = tick;
        self.progress_interval = progress;
        self
    }

    pub fn with_fixed_target(mut self, fixed_target: bool) -> Self {
        self.fixed_target = fixed_target;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !self.initial_value.is_finite() || self.initial_value <= 0.0 {
            return Err(SimError::InvalidAmount(self.initial_value));
        }
        if self.duration.is_zero() {
            return Err(SimError::ZeroDuration);
        }
        if self.tick_interval.is_zero() || self.progress_interval.is_zero() {
            return Err(SimError::ZeroInterval);
        }
        if self.tick_interval.as_nanos() % self.progress_interval.as_nanos() != 0 {
            return Err(SimError::MisalignedIntervals {
                tick: self.tick_interval,
                progress: self.progress_interval,
            });
        }
        let TargetRange { min, max } = self.target_multiplier;
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
            return Err(SimError::InvalidTargetRange { min, max });
        }
        if self.window_capacity == 0 {
            return Err(SimError::InvalidWindowCapacity);
        }
        if !self.volatility.is_finite() || self.volatility <= 0.0 {
            return Err(SimError::InvalidVolatility(self.volatility));
        }
        Ok(())
    }

    /// Number of candles in a run. A trailing partial interval still gets
    /// its candle.
    pub fn total_ticks(&self) -> u64 {
        let tick = self.tick_interval.as_nanos().max(1);
        let ticks = self.duration.as_nanos().div_ceil(tick);
        (ticks as u64).max(1)
    }

    pub fn steps_per_tick(&self) -> u64 {
        let step = self.progress_interval.as_nanos().max(1);
        ((self.tick_interval.as_nanos() / step) as u64).max(1)
    }

    pub fn total_steps(&self) -> u64 {
        self.total_ticks() * self.steps_per_tick()
    }
}

impl TryFrom<&Args> for SimulationConfig {
    type Error = SimError;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let config = SimulationConfig {
            volatility: args.volatility,
            ..SimulationConfig::new(args.amount, args.time)
                .with_intervals(args.tick, args.progress_interval)
                .with_fixed_target(args.fixed_target)
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_validate() {
        let config = SimulationConfig::new(1000.0, DEFAULT_DURATION);
        assert!(config.validate().is_ok());
        assert_eq!(config.total_ticks(), 90);
        assert_eq!(config.steps_per_tick(), 10);
        assert_eq!(config.total_steps(), 900);
    }

    #[test]
    fn test_partial_interval_rounds_up() {
        let config = SimulationConfig::new(1000.0, Duration::from_millis(2500));
        assert_eq!(config.total_ticks(), 3);

        let short = SimulationConfig::new(1000.0, Duration::from_millis(10));
        assert_eq!(short.total_ticks(), 1);
    }

    #[test]
    fn test_rejects_invalid_configs() {
        let base = SimulationConfig::new(1000.0, Duration::from_secs(2));

        let config = SimulationConfig {
            initial_value: 0.0,
            ..base.clone()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidAmount(_))));

        let config = SimulationConfig {
            duration: Duration::ZERO,
            ..base.clone()
        };
        assert!(matches!(config.validate(), Err(SimError::ZeroDuration)));

        let config = base
            .clone()
            .with_intervals(Duration::from_millis(1000), Duration::from_millis(300));
        assert!(matches!(
            config.validate(),
            Err(SimError::MisalignedIntervals { .. })
        ));

        let config = base
            .clone()
            .with_intervals(Duration::from_millis(1000), Duration::ZERO);
        assert!(matches!(config.validate(), Err(SimError::ZeroInterval)));

        let config = SimulationConfig {
            target_multiplier: TargetRange {
                min: 104.0,
                max: 102.0,
            },
            ..base.clone()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidTargetRange { .. })
        ));

        let config = SimulationConfig {
            window_capacity: 0,
            ..base.clone()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidWindowCapacity)
        ));

        let config = SimulationConfig {
            volatility: -1.0,
            ..base
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidVolatility(_))
        ));
    }

    #[test]
    fn test_from_args() {
        let args = Args::try_parse_from([
            "candlesim",
            "Asha",
            "--amount",
            "500",
            "--time",
            "2s",
            "--tick",
            "500ms",
            "--fixed-target",
        ])
        .unwrap();
        let config = SimulationConfig::try_from(&args).unwrap();
        assert_eq!(config.initial_value, 500.0);
        assert_eq!(config.duration, Duration::from_secs(2));
        assert_eq!(config.total_ticks(), 4);
        assert_eq!(config.steps_per_tick(), 5);
        assert!(config.fixed_target);
    }

    #[test]
    fn test_from_args_rejects_bad_amount() {
        let args = Args::try_parse_from(["candlesim", "Asha", "--amount", "0"]).unwrap();
        assert!(SimulationConfig::try_from(&args).is_err());
    }
}
