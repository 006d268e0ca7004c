use tokio::sync::mpsc::UnboundedSender;

use crate::models::Candle;
use crate::services::CandleWindow;

/// Callbacks a host view receives from a running simulation.
pub trait SimulationListener: Send {
    /// Fraction of the run elapsed, reported on every progress step.
    fn on_progress(&mut self, _fraction: f64) {}

    /// A new candle and the window it was appended to.
    fn on_candle(&mut self, _candle: &Candle, _window: &CandleWindow) {}

    fn on_tick(&mut self, close: f64);

    fn on_complete(&mut self);
}

#[derive(Debug, Clone)]
pub enum SimulationEvent {
    Progress(f64),
    Candle { candle: Candle, window: CandleWindow },
    Tick(f64),
    Complete,
}

impl SimulationListener for UnboundedSender<SimulationEvent> {
    fn on_progress(&mut self, fraction: f64) {
        let _ = self.send(SimulationEvent::Progress(fraction));
    }

    fn on_candle(&mut self, candle: &Candle, window: &CandleWindow) {
        let _ = self.send(SimulationEvent::Candle {
            candle: candle.clone(),
            window: window.clone(),
        });
    }

    fn on_tick(&mut self, close: f64) {
        let _ = self.send(SimulationEvent::Tick(close));
    }

    fn on_complete(&mut self) {
        let _ = self.send(SimulationEvent::Complete);
    }
}
