pub mod phase;

pub use phase::MarketPhase;

use std::f64::consts::PI;

use rand::Rng;

use crate::helpers::round_to_cents;
use crate::models::Candle;

pub const DEFAULT_VOLATILITY: f64 = 0.015;

const PROBABILITY_JITTER: f64 = 0.3;
const MIN_BULLISH_PROBABILITY: f64 = 0.2;
const MAX_BULLISH_PROBABILITY: f64 = 0.8;
const FORCED_BEARISH_UNTIL: f64 = 0.7;
const FORCED_BEARISH_PROBABILITY: f64 = 0.4;
const MEAN_REVERSION_ANCHOR: f64 = 1.5;

/// Lower and upper bound for a candle close.
pub fn close_bounds(initial_price: f64, previous_close: f64, target_price: f64) -> (f64, f64) {
    let min = (initial_price * 0.6).min(previous_close * 0.85);
    let max = (target_price * 1.1).max(previous_close * 1.2);
    (min, max)
}

fn body_volume_factor(body: f64, swing: f64) -> f64 {
    body / swing + 0.2
}

/// Fabricates OHLCV candles that wander around a rising target.
///
/// The price path is not a stochastic model of any real market: a phase
/// table and a forced-bearish override shape it into visible drawdowns that
/// recover towards the target.
pub struct CandleGenerator<R> {
    rng: R,
    initial_price: f64,
    volatility: f64,
}

impl<R: Rng> CandleGenerator<R> {
    pub fn new(rng: R, initial_price: f64) -> Self {
        Self {
            rng,
            initial_price,
            volatility: DEFAULT_VOLATILITY,
        }
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Draws `initial_price * m` with `m` uniform in `min..=max`.
    pub fn sample_target(&mut self, min_multiplier: f64, max_multiplier: f64) -> f64 {
        self.initial_price * self.rng.random_range(min_multiplier..=max_multiplier)
    }

    fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Picks the candle direction. Before `FORCED_BEARISH_UNTIL` a share of
    /// candles is bearish whatever the phase says.
    fn draw_bullish(&mut self, phase: MarketPhase, progress: f64) -> bool {
        let bullish_probability = (phase.bullish_probability()
            + (self.unit() - 0.5) * PROBABILITY_JITTER)
            .clamp(MIN_BULLISH_PROBABILITY, MAX_BULLISH_PROBABILITY);

        let forced_bearish =
            progress < FORCED_BEARISH_UNTIL && self.unit() < FORCED_BEARISH_PROBABILITY;
        !forced_bearish && self.unit() < bullish_probability
    }

    pub fn next_candle(
        &mut self,
        previous_close: f64,
        target_price: f64,
        progress: f64,
        timestamp: u64,
    ) -> Candle {
        let progress = progress.clamp(0.0, 1.0);
        let phase = MarketPhase::from_progress(progress);
        let phase_volatility = phase.volatility_multiplier();
        let volatility = self.volatility;
        let initial = self.initial_price;

        let bullish = self.draw_bullish(phase, progress);

        let open = previous_close;
        let swing = volatility * previous_close;

        let random_walk = (self.unit() - 0.5) * swing * phase_volatility;
        let momentum = (progress * PI * 8.0 + phase.index() as f64).sin() * swing * 0.8;
        let trend_force = (target_price - initial) * progress * 0.05;
        let mean_reversion = (initial * MEAN_REVERSION_ANCHOR - open) * 0.001;

        let close = if bullish {
            let upward = random_walk.abs() * 0.7 + momentum * 0.6 + trend_force;
            let downward = (self.unit() - 0.7) * swing * 0.3;
            open + upward + downward + mean_reversion
        } else {
            let downward = random_walk.abs() * 0.8 + momentum.abs() * 0.4;
            let upward = (self.unit() - 0.8) * swing * 0.2;
            open - downward + upward + trend_force * 0.3 + mean_reversion
        };

        let (min_close, max_close) = close_bounds(initial, previous_close, target_price);
        let close = close.clamp(min_close, max_close);

        let body = (close - open).abs();
        let wick = 2.0 + self.unit() * 3.0;
        let body_top = open.max(close);
        let body_bottom = open.min(close);

        let (mut high, mut low) = if bullish {
            (
                body_top + body * wick * (0.4 + self.unit() * 0.8),
                body_bottom - body * wick * (0.2 + self.unit() * 0.6),
            )
        } else {
            (
                body_top + body * wick * (0.3 + self.unit() * 0.7),
                body_bottom - body * wick * (0.5 + self.unit() * 0.8),
            )
        };

        high += (self.unit() - 0.3) * swing * phase_volatility;
        low -= (self.unit() - 0.3) * swing * phase_volatility;
        let high = high.max(body_top);
        let low = low.min(body_bottom);

        let base_volume = 1500.0 + self.unit() * 10_000.0;
        let body_factor = body_volume_factor(body, swing);
        let volume = (base_volume
            * body_factor
            * phase.volume_multiplier()
            * (0.7 + self.unit() * 0.6))
            .floor()
            .max(0.0) as u64;

        Candle {
            timestamp,
            open: round_to_cents(open),
            high: round_to_cents(high),
            low: round_to_cents(low),
            close: round_to_cents(close),
            volume,
        }
    }
}
