/// Cyclic sentiment regime. The run cycles through all four phases three
/// times from start to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketPhase {
    Accumulation,
    Uptrend,
    Correction,
    Recovery,
}

const CYCLES_PER_RUN: f64 = 12.0;

impl MarketPhase {
    pub fn from_progress(progress: f64) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        match (progress * CYCLES_PER_RUN).floor() as u32 % 4 {
            0 => MarketPhase::Accumulation,
            1 => MarketPhase::Uptrend,
            2 => MarketPhase::Correction,
            _ => MarketPhase::Recovery,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            MarketPhase::Accumulation => 0,
            MarketPhase::Uptrend => 1,
            MarketPhase::Correction => 2,
            MarketPhase::Recovery => 3,
        }
    }

    pub fn bullish_probability(self) -> f64 {
        match self {
            MarketPhase::Accumulation => 0.45,
            MarketPhase::Uptrend => 0.65,
            MarketPhase::Correction => 0.30,
            MarketPhase::Recovery => 0.55,
        }
    }

    pub fn volatility_multiplier(self) -> f64 {
        match self {
            MarketPhase::Accumulation => 0.8,
            MarketPhase::Uptrend => 1.2,
            MarketPhase::Correction => 1.8,
            MarketPhase::Recovery => 1.0,
        }
    }

    pub fn volume_multiplier(self) -> f64 {
        match self {
            MarketPhase::Correction => 1.5,
            _ => 1.0,
        }
    }
}
