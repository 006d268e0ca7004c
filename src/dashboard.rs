use chrono::Utc;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph, Widget};

use crate::models::InvestmentRequest;
use crate::payout::{CancelSlip, GstBill, GstDiscount, PayoutCountdown, PayoutQuote};
use crate::render::CandleChart;
use crate::services::CandleWindow;
use crate::simulation::SimulationEvent;

const STATS_LOOKBACK: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// Run complete, payout slip not opened yet.
    Pending,
    Payout,
    GstBill(GstBill),
    CancelSlip(CancelSlip),
}

/// Everything the dashboard draws, folded from simulation events and key
/// presses.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub investor: InvestmentRequest,
    pub progress: f64,
    pub current_value: f64,
    pub window: CandleWindow,
    pub complete: bool,
    pub discount: GstDiscount,
    pub countdown: PayoutCountdown,
    pub document: Document,
    quote: PayoutQuote,
}

impl DashboardState {
    pub fn new(investor: InvestmentRequest) -> Self {
        Self {
            progress: 0.0,
            current_value: investor.amount,
            window: CandleWindow::new(),
            complete: false,
            discount: GstDiscount::default(),
            countdown: PayoutCountdown::default(),
            document: Document::Pending,
            quote: PayoutQuote::new(investor.amount),
            investor,
        }
    }

    pub fn apply(&mut self, event: SimulationEvent) {
        match event {
            SimulationEvent::Progress(fraction) => self.progress = fraction.clamp(0.0, 1.0),
            SimulationEvent::Candle { window, .. } => self.window = window,
            SimulationEvent::Tick(close) => self.current_value = close,
            SimulationEvent::Complete => {
                self.progress = 1.0;
                self.complete = true;
            }
        }
    }

    pub fn cycle_discount(&mut self) {
        self.discount = self.discount.next();
    }

    fn slip_open(&self) -> bool {
        self.complete && self.document != Document::Pending
    }

    /// The countdown runs from the moment the payout slip is first opened.
    pub fn countdown_running(&self) -> bool {
        self.slip_open() && !self.countdown.is_expired()
    }

    pub fn issue_gst_bill(&mut self) {
        if self.slip_open() {
            self.document = Document::GstBill(GstBill::issue(&self.quote, self.discount, Utc::now()));
        }
    }

    pub fn issue_cancel_slip(&mut self) {
        if self.slip_open() {
            self.document = Document::CancelSlip(CancelSlip::issue(&self.quote, Utc::now()));
        }
    }

    pub fn show_payout(&mut self) {
        if self.complete {
            self.document = Document::Payout;
        }
    }

    /// Open of the latest candle and the extremes of the last few.
    pub fn stats(&self) -> (f64, f64, f64, f64) {
        let initial = self.investor.amount;
        let open = self.window.last().map_or(initial, |c| c.open);
        let high = self.window.recent_high(STATS_LOOKBACK).unwrap_or(initial);
        let low = self.window.recent_low(STATS_LOOKBACK).unwrap_or(initial);
        (open, high, low, self.current_value)
    }

    fn header(&self) -> Paragraph<'_> {
        Paragraph::new(vec![
            Line::from(vec![
                Span::raw("Investor: "),
                Span::styled(&self.investor.name, Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![
                Span::raw("Initial: "),
                Span::styled(format!("₹{:.2}", self.investor.amount), Style::default().fg(Color::Cyan)),
                Span::raw("   Current: "),
                Span::styled(format!("₹{:.2}", self.current_value), Style::default().fg(Color::Green)),
            ]),
        ])
        .block(Block::bordered().title("Investment Analysis in Progress"))
    }

    fn stats_line(&self) -> Paragraph<'_> {
        let (open, high, low, close) = self.stats();
        Paragraph::new(Line::from(vec![
            Span::raw("Open "),
            Span::styled(format!("₹{:.2}", open), Style::default().fg(Color::Cyan)),
            Span::raw("   High "),
            Span::styled(format!("₹{:.2}", high), Style::default().fg(Color::Green)),
            Span::raw("   Low "),
            Span::styled(format!("₹{:.2}", low), Style::default().fg(Color::Red)),
            Span::raw("   Close "),
            Span::styled(format!("₹{:.2}", close), Style::default().bold()),
        ]))
        .alignment(Alignment::Center)
        .block(Block::bordered())
    }

    fn completion_lines(&self) -> Vec<Line<'_>> {
        let quote = &self.quote;
        let mut lines = vec![
            Line::from(format!(
                "Investment complete! Your investment has grown by {:.0}%",
                quote.growth_percent()
            ))
            .green()
            .bold(),
        ];
        match &self.document {
            Document::Pending => {
                lines.push(Line::from(format!(
                    "Final amount ₹{:.2}   Profit ₹{:.2}",
                    quote.final_amount,
                    quote.profit()
                )));
                lines.push(Line::from("[p] view payout slip  [q] quit").dark_gray());
            }
            Document::Payout => {
                lines.push(Line::from(format!(
                    "Final amount ₹{:.2}   Profit ₹{:.2}   Base GST (18%) ₹{:.2}",
                    quote.final_amount,
                    quote.profit(),
                    quote.base_gst()
                )));
                lines.push(Line::from(format!(
                    "Discount {}%   GST due ₹{:.2}   Time left {}",
                    self.discount.percent(),
                    quote.final_gst(self.discount),
                    self.countdown.display()
                )));
                lines.push(Line::from("[d] discount  [g] pay GST  [c] cancel  [q] quit").dark_gray());
            }
            Document::GstBill(bill) => {
                lines.push(Line::from(format!(
                    "GST bill {}   issued {}",
                    bill.bill_number,
                    bill.issued_at.format("%Y-%m-%d %H:%M:%S")
                )));
                lines.push(Line::from(format!(
                    "Profit ₹{:.2}   Base GST ₹{:.2}   Discount {}%   Paid ₹{:.2}",
                    bill.profit,
                    bill.base_gst,
                    bill.discount.percent(),
                    bill.amount_paid
                )));
                lines.push(Line::from("[p] back  [q] quit").dark_gray());
            }
            Document::CancelSlip(slip) => {
                lines.push(Line::from(format!(
                    "Cancellation {}   issued {}",
                    slip.cancellation_id,
                    slip.issued_at.format("%Y-%m-%d %H:%M:%S")
                )));
                lines.push(Line::from(format!(
                    "Refund ₹{:.2} (full investment)   Forfeited profit ₹{:.2}",
                    slip.refund, slip.forfeited_profit
                )));
                lines.push(Line::from("[p] back  [q] quit").dark_gray());
            }
        }
        lines
    }
}

impl Widget for &DashboardState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let footer = if self.complete { 6 } else { 0 };
        let [header, progress, chart, stats, completion] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(footer),
        ])
        .areas(area);

        self.header().render(header, buf);

        Gauge::default()
            .block(Block::bordered().title("Progress"))
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(self.progress.clamp(0.0, 1.0))
            .label(format!("{:.0}%", self.progress * 100.0))
            .render(progress, buf);

        CandleChart::new(&self.window).render(chart, buf);
        self.stats_line().render(stats, buf);

        if self.complete {
            Paragraph::new(self.completion_lines())
                .block(Block::bordered().title("Payout"))
                .render(completion, buf);
        }
    }
}
