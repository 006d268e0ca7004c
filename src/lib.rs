pub mod cli;
pub mod dashboard;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod models;
pub mod payout;
pub mod render;
pub mod services;
pub mod simulation;

pub use error::SimError;
