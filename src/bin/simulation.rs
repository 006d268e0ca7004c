use std::io::{self, Stdout};
use std::time::Duration;

use candlesim::{
    cli::Args,
    dashboard::DashboardState,
    models::{Candle, InvestmentRequest},
    payout::PayoutQuote,
    services::CandleWindow,
    simulation::{SimulationConfig, SimulationDriver, SimulationEvent, SimulationHandle, SimulationListener},
};
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Headless listener: logs every candle and optionally echoes it as JSON.
struct ConsoleListener {
    json: bool,
}

impl SimulationListener for ConsoleListener {
    fn on_candle(&mut self, candle: &Candle, window: &CandleWindow) {
        info!(
            "candle {} O {:.2} H {:.2} L {:.2} C {:.2} V {} ({} in window)",
            candle.timestamp,
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            candle.volume,
            window.len()
        );
        if self.json {
            match serde_json::to_string(candle) {
                Ok(line) => println!("{}", line),
                Err(e) => error!("failed to encode candle: {}", e),
            }
        }
    }

    fn on_tick(&mut self, _close: f64) {}

    fn on_complete(&mut self) {
        info!("simulation complete");
    }
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

async fn run_headless(mut handle: SimulationHandle, investor: &InvestmentRequest) -> anyhow::Result<()> {
    tokio::select! {
        summary = handle.join() => match summary {
            Some(summary) => {
                let quote = PayoutQuote::new(investor.amount);
                println!(
                    "{}: {} candles, final close ₹{:.2}, state {:?}",
                    investor.name, summary.candles, summary.final_close, summary.state
                );
                println!(
                    "Payout ₹{:.2} (profit ₹{:.2}, base GST ₹{:.2})",
                    quote.final_amount,
                    quote.profit(),
                    quote.base_gst()
                );
            }
            None => warn!("run {} ended without a summary", handle.run_id()),
        },
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupted, tearing down run {}", handle.run_id());
            handle.teardown();
        }
    }
    Ok(())
}

fn init_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

async fn ui_loop(
    terminal: &mut Tui,
    state: &mut DashboardState,
    rx: &mut mpsc::UnboundedReceiver<SimulationEvent>,
) -> anyhow::Result<()> {
    let mut keys = EventStream::new();
    let mut countdown = time::interval(Duration::from_secs(1));
    countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        terminal.draw(|frame| frame.render_widget(&*state, frame.area()))?;

        tokio::select! {
            Some(event) = rx.recv() => state.apply(event),
            Some(event) = keys.next() => {
                let Event::Key(key) = event? else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('d') => state.cycle_discount(),
                    KeyCode::Char('g') => state.issue_gst_bill(),
                    KeyCode::Char('c') => state.issue_cancel_slip(),
                    KeyCode::Char('p') => {
                        let was_running = state.countdown_running();
                        state.show_payout();
                        if !was_running && state.countdown_running() {
                            countdown.reset();
                        }
                    }
                    _ => {}
                }
            }
            _ = countdown.tick(), if state.countdown_running() => {
                state.countdown.tick();
            }
            else => break,
        }
    }
    Ok(())
}

async fn run_dashboard(
    config: SimulationConfig,
    rng: StdRng,
    investor: InvestmentRequest,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut handle = SimulationDriver::new(config, rng)?.spawn(tx)?;
    let mut state = DashboardState::new(investor);

    let mut terminal = init_terminal()?;
    let result = ui_loop(&mut terminal, &mut state, &mut rx).await;
    handle.teardown();
    restore_terminal(&mut terminal)?;
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let investor = InvestmentRequest::new(&args.name, args.amount)?;
    let config = SimulationConfig::try_from(&args)?;
    let rng = rng_for(args.seed);

    if args.headless {
        let handle = SimulationDriver::new(config, rng)?.spawn(ConsoleListener { json: args.json })?;
        run_headless(handle, &investor).await
    } else {
        run_dashboard(config, rng, investor).await
    }
}
