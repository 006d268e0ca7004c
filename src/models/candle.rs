use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Epoch milliseconds.
    pub timestamp: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    pub fn direction(&self) -> Direction {
        if self.close > self.open {
            Direction::Bullish
        } else {
            Direction::Bearish
        }
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, close: f64) -> Candle {
        Candle {
            timestamp: 0,
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 10,
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(candle(100.0, 101.0).direction(), Direction::Bullish);
        assert_eq!(candle(100.0, 99.0).direction(), Direction::Bearish);
        // A doji is drawn as bearish
        assert_eq!(candle(100.0, 100.0).direction(), Direction::Bearish);
    }

    #[test]
    fn test_consistency() {
        let mut c = candle(100.0, 105.0);
        assert!(c.is_consistent());
        c.high = 104.0;
        assert!(!c.is_consistent());
    }

    #[test]
    fn test_serializes_volume_as_integer() {
        let json = serde_json::to_string(&candle(1.0, 2.0)).unwrap();
        assert!(json.contains("\"volume\":10"));
    }
}
