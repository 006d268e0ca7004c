use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

use super::layout::{format_price_label, layout, price_bounds, Surface};
use crate::models::Direction;
use crate::services::CandleWindow;

const WICK: &str = "│";
const BODY: &str = "█";
const GRID: &str = "─";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartTheme {
    pub background: Color,
    pub grid: Color,
    pub price_label: Color,
    pub time_label: Color,
    pub title: Color,
    pub bullish_wick: Color,
    pub bullish_body: Color,
    pub bearish_wick: Color,
    pub bearish_body: Color,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(255, 255, 255),
            grid: Color::Rgb(229, 231, 235),
            price_label: Color::Rgb(107, 114, 128),
            time_label: Color::Rgb(156, 163, 175),
            title: Color::Rgb(31, 41, 55),
            bullish_wick: Color::Rgb(5, 150, 105),
            bullish_body: Color::Rgb(16, 185, 129),
            bearish_wick: Color::Rgb(220, 38, 38),
            bearish_body: Color::Rgb(239, 68, 68),
        }
    }
}

impl ChartTheme {
    fn colors(&self, direction: Direction) -> (Color, Color) {
        match direction {
            Direction::Bullish => (self.bullish_wick, self.bullish_body),
            Direction::Bearish => (self.bearish_wick, self.bearish_body),
        }
    }
}

/// Candlestick chart of a [`CandleWindow`]. Every render clears its area and
/// draws the whole window again.
pub struct CandleChart<'a> {
    window: &'a CandleWindow,
    theme: ChartTheme,
    title: &'a str,
}

impl<'a> CandleChart<'a> {
    pub fn new(window: &'a CandleWindow) -> Self {
        Self {
            window,
            theme: ChartTheme::default(),
            title: "Live Trading Chart",
        }
    }

    pub fn theme(mut self, theme: ChartTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }
}

/// Writes `symbol` at a position relative to `area`, if it falls inside.
fn put(buf: &mut Buffer, area: Rect, x: i32, y: i32, symbol: &str, fg: Color) {
    if x < 0 || y < 0 || x >= area.width as i32 || y >= area.height as i32 {
        return;
    }
    if let Some(cell) = buf.cell_mut((area.x + x as u16, area.y + y as u16)) {
        cell.set_symbol(symbol).set_fg(fg);
    }
}

fn put_str(buf: &mut Buffer, area: Rect, x: i32, y: i32, text: &str, fg: Color) {
    let len = text.chars().count() as i32;
    if x < 0 || y < 0 || x + len > area.width as i32 || y >= area.height as i32 {
        return;
    }
    let mut utf8 = [0u8; 4];
    for (offset, ch) in text.chars().enumerate() {
        put(buf, area, x + offset as i32, y, ch.encode_utf8(&mut utf8), fg);
    }
}

fn put_centered(buf: &mut Buffer, area: Rect, center: i32, y: i32, text: &str, fg: Color) {
    let len = text.chars().count() as i32;
    put_str(buf, area, center - len / 2, y, text, fg);
}

impl Widget for CandleChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let base = Style::default().bg(self.theme.background);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.reset();
                    cell.set_style(base);
                }
            }
        }
        if area.is_empty() {
            return;
        }

        let middle = area.width as i32 / 2;
        put_centered(buf, area, middle, 0, self.title, self.theme.title);

        let Some((min_price, max_price)) = price_bounds(self.window) else {
            put_centered(
                buf,
                area,
                middle,
                area.height as i32 / 2,
                "Waiting for market data...",
                self.theme.price_label,
            );
            return;
        };

        let label_width = format_price_label(min_price)
            .chars()
            .count()
            .max(format_price_label(max_price).chars().count()) as u16;
        let surface = Surface::terminal(area.width, area.height, label_width);
        let Some(geometry) = layout(self.window, &surface) else {
            return;
        };

        let grid_start = surface.insets.left as i32;
        let grid_end = (surface.width - surface.insets.right) as i32;
        for line in &geometry.grid {
            let row = line.y.round() as i32;
            for col in grid_start..grid_end {
                put(buf, area, col, row, GRID, self.theme.grid);
            }
            let label_len = line.label.chars().count() as i32;
            put_str(
                buf,
                area,
                grid_start - 1 - label_len,
                row,
                &line.label,
                self.theme.price_label,
            );
        }

        let label_row = area.height as i32 - 1;
        for glyph in &geometry.candles {
            let (wick, body) = self.theme.colors(glyph.direction);

            let wick_col = glyph.x.floor() as i32;
            for row in glyph.y_high.round() as i32..=glyph.y_low.round() as i32 {
                put(buf, area, wick_col, row, WICK, wick);
            }

            let left = (glyph.x - glyph.width / 2.0).round() as i32;
            let right = ((glyph.x + glyph.width / 2.0).round() as i32).max(left + 1);
            let top = glyph.body_top.round() as i32;
            let bottom = (glyph.body_top + glyph.body_height).round() as i32;
            for row in top..=bottom.max(top) {
                for col in left..right {
                    put(buf, area, col, row, BODY, body);
                }
            }

            if let Some(label) = &glyph.time_label {
                put_centered(buf, area, wick_col, label_row, label, self.theme.time_label);
            }
        }
    }
}
