pub mod chart;
pub mod layout;

pub use chart::{CandleChart, ChartTheme};
pub use layout::{layout, ChartGeometry, Surface};
