use std::collections::VecDeque;

use crate::models::Candle;

pub const WINDOW_CAPACITY: usize = 20;

/// Most recent candles in generation order, oldest first.
#[derive(Debug, Clone)]
pub struct CandleWindow {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl Default for CandleWindow {
    fn default() -> Self {
        Self::with_capacity(WINDOW_CAPACITY)
    }
}

impl CandleWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            candles: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends a candle and returns the one evicted to make room, if any.
    pub fn push(&mut self, candle: Candle) -> Option<Candle> {
        self.candles.push_back(candle);
        if self.candles.len() > self.capacity {
            self.candles.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> + '_ {
        self.candles.iter()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    /// Lowest low and highest high across the window.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        if self.candles.is_empty() {
            return None;
        }
        let (min, max) = self
            .candles
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), c| {
                (min.min(c.low), max.max(c.high))
            });
        Some((min, max))
    }

    fn recent(&self, count: usize) -> impl Iterator<Item = &Candle> + '_ {
        self.candles
            .iter()
            .skip(self.candles.len().saturating_sub(count))
    }

    pub fn recent_high(&self, count: usize) -> Option<f64> {
        self.recent(count).map(|c| c.high).reduce(f64::max)
    }

    pub fn recent_low(&self, count: usize) -> Option<f64> {
        self.recent(count).map(|c| c.low).reduce(f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(timestamp: u64, close: f64) -> Candle {
        Candle {
            timestamp,
            open: close - 1.0,
            high: close + 2.0,
            low: close - 3.0,
            close,
            volume: 100,
        }
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut window = CandleWindow::new();
        for i in 0..WINDOW_CAPACITY as u64 {
            assert!(window.push(candle(i, 100.0 + i as f64)).is_none());
        }
        assert_eq!(window.len(), 20);

        let evicted = window.push(candle(20, 200.0)).unwrap();
        assert_eq!(evicted.timestamp, 0);
        assert_eq!(window.len(), 20);
        assert_eq!(window.iter().next().unwrap().timestamp, 1);
        assert_eq!(window.last().unwrap().timestamp, 20);
    }

    #[test]
    fn test_window_keeps_generation_order() {
        let mut window = CandleWindow::with_capacity(5);
        for i in 0..12 {
            window.push(candle(i, i as f64));
        }
        let stamps: Vec<u64> = window.iter().map(|c| c.timestamp).collect();
        assert_eq!(stamps, vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_price_range_and_recent_extremes() {
        let mut window = CandleWindow::new();
        assert_eq!(window.price_range(), None);
        assert_eq!(window.recent_high(5), None);

        for (i, close) in [100.0, 150.0, 90.0, 120.0, 110.0, 105.0, 101.0].iter().enumerate() {
            window.push(candle(i as u64, *close));
        }

        assert_eq!(window.price_range(), Some((87.0, 152.0)));
        // last five closes: 90, 120, 110, 105, 101
        assert_eq!(window.recent_high(5), Some(122.0));
        assert_eq!(window.recent_low(5), Some(87.0));
        assert_eq!(window.recent_low(2), Some(98.0));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut window = CandleWindow::with_capacity(0);
        window.push(candle(0, 1.0));
        window.push(candle(1, 2.0));
        assert_eq!(window.len(), 1);
        assert_eq!(window.capacity(), 1);
    }
}
