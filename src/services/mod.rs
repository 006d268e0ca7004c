pub mod candle_window;

pub use candle_window::{CandleWindow, WINDOW_CAPACITY};
