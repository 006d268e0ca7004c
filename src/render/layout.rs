use chrono::{DateTime, Local};

use crate::models::Direction;
use crate::services::CandleWindow;

/// Number of equal price bands; the chart draws one more gridline than this.
pub const GRID_DIVISIONS: usize = 5;
pub const TIME_LABEL_EVERY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Insets {
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }
}

/// A drawing surface of fixed size, in whatever unit the backend draws in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    pub insets: Insets,
    pub min_candle_width: f64,
    pub candle_gap: f64,
    pub min_body_height: f64,
}

impl Surface {
    /// Pixel canvas with 40px padding on every side.
    pub fn canvas(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            insets: Insets::uniform(40.0),
            min_candle_width: 6.0,
            candle_gap: 4.0,
            min_body_height: 1.0,
        }
    }

    /// Terminal cell grid. The left inset holds price labels, the top row the
    /// title and the bottom row the time labels.
    pub fn terminal(width: u16, height: u16, label_width: u16) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
            insets: Insets {
                left: label_width as f64 + 1.0,
                right: 1.0,
                top: 1.0,
                bottom: 2.0,
            },
            min_candle_width: 1.0,
            candle_gap: 1.0,
            min_body_height: 0.0,
        }
    }

    pub fn chart_width(&self) -> f64 {
        self.width - self.insets.left - self.insets.right
    }

    pub fn chart_height(&self) -> f64 {
        self.height - self.insets.top - self.insets.bottom
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub y: f64,
    pub price: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandleGlyph {
    pub x: f64,
    pub width: f64,
    pub y_high: f64,
    pub y_low: f64,
    pub y_open: f64,
    pub y_close: f64,
    pub body_top: f64,
    pub body_height: f64,
    pub direction: Direction,
    pub time_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub min_price: f64,
    pub max_price: f64,
    pub grid: Vec<GridLine>,
    pub candles: Vec<CandleGlyph>,
}

pub fn format_price_label(price: f64) -> String {
    format!("₹{:.0}", price)
}

pub fn format_time_label(timestamp_ms: u64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Price range drawn for a window. A flat window is widened by one unit each
/// way.
pub fn price_bounds(window: &CandleWindow) -> Option<(f64, f64)> {
    let (min, max) = window.price_range()?;
    if max - min <= f64::EPSILON {
        Some((min - 1.0, max + 1.0))
    } else {
        Some((min, max))
    }
}

/// Lays out gridlines and candles for `window` on `surface`. Returns `None`
/// when there is nothing to draw or no room to draw it.
pub fn layout(window: &CandleWindow, surface: &Surface) -> Option<ChartGeometry> {
    let (min_price, max_price) = price_bounds(window)?;
    let chart_width = surface.chart_width();
    let chart_height = surface.chart_height();
    if chart_width <= 0.0 || chart_height <= 0.0 {
        return None;
    }

    let range = max_price - min_price;
    let top = surface.insets.top;
    let left = surface.insets.left;
    let to_y = |price: f64| top + (max_price - price) / range * chart_height;

    let grid = (0..=GRID_DIVISIONS)
        .map(|i| {
            let price = max_price - range / GRID_DIVISIONS as f64 * i as f64;
            GridLine {
                y: top + chart_height / GRID_DIVISIONS as f64 * i as f64,
                price,
                label: format_price_label(price),
            }
        })
        .collect();

    let count = window.len() as f64;
    let slot = chart_width / count;
    let width = (slot - surface.candle_gap).max(surface.min_candle_width);

    let candles = window
        .iter()
        .enumerate()
        .map(|(index, candle)| {
            let y_open = to_y(candle.open);
            let y_close = to_y(candle.close);
            CandleGlyph {
                x: left + slot * index as f64 + slot / 2.0,
                width,
                y_high: to_y(candle.high),
                y_low: to_y(candle.low),
                y_open,
                y_close,
                body_top: y_open.min(y_close),
                body_height: (y_close - y_open).abs().max(surface.min_body_height),
                direction: candle.direction(),
                time_label: (index % TIME_LABEL_EVERY == 0)
                    .then(|| format_time_label(candle.timestamp)),
            }
        })
        .collect();

    Some(ChartGeometry {
        min_price,
        max_price,
        grid,
        candles,
    })
}
