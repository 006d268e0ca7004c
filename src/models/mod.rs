pub mod candle;
pub mod investment;

pub use candle::{Candle, Direction};
pub use investment::InvestmentRequest;
