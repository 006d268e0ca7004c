pub mod config;
pub mod driver;
pub mod lifecycle;
pub mod listener;
pub mod run;

pub use config::{SimulationConfig, TargetRange};
pub use driver::{RunSummary, SimulationDriver, SimulationHandle};
pub use lifecycle::{RunLifecycle, RunState};
pub use listener::{SimulationEvent, SimulationListener};
pub use run::{SimulationRun, TickReport};
