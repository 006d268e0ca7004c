use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("investor name must not be empty")]
    EmptyName,

    #[error("investment amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("simulation duration must be positive")]
    ZeroDuration,

    #[error("timer intervals must be positive")]
    ZeroInterval,

    #[error("tick interval {tick:?} is not a multiple of progress interval {progress:?}")]
    MisalignedIntervals { tick: Duration, progress: Duration },

    #[error("invalid target multiplier range {min}..={max}")]
    InvalidTargetRange { min: f64, max: f64 },

    #[error("candle window capacity must be positive")]
    InvalidWindowCapacity,

    #[error("volatility must be a positive number, got {0}")]
    InvalidVolatility(f64),

    #[error("cannot apply {input} to a run in state {state}")]
    InvalidTransition { state: String, input: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON encoding error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
