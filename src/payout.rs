use chrono::{DateTime, Utc};

pub const PAYOUT_MULTIPLIER: f64 = 102.0;
pub const GST_RATE: f64 = 0.18;
pub const PAYOUT_WINDOW_SECS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GstDiscount {
    #[default]
    Fifty,
    Thirty,
    Twenty,
}

impl GstDiscount {
    pub fn fraction(self) -> f64 {
        match self {
            GstDiscount::Fifty => 0.5,
            GstDiscount::Thirty => 0.3,
            GstDiscount::Twenty => 0.2,
        }
    }

    pub fn percent(self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    pub fn next(self) -> Self {
        match self {
            GstDiscount::Fifty => GstDiscount::Thirty,
            GstDiscount::Thirty => GstDiscount::Twenty,
            GstDiscount::Twenty => GstDiscount::Fifty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoutQuote {
    pub initial_amount: f64,
    pub final_amount: f64,
}

impl PayoutQuote {
    pub fn new(initial_amount: f64) -> Self {
        Self {
            initial_amount,
            final_amount: initial_amount * PAYOUT_MULTIPLIER,
        }
    }

    pub fn profit(&self) -> f64 {
        self.final_amount - self.initial_amount
    }

    pub fn growth_percent(&self) -> f64 {
        self.profit() / self.initial_amount * 100.0
    }

    pub fn base_gst(&self) -> f64 {
        self.profit() * GST_RATE
    }

    pub fn final_gst(&self, discount: GstDiscount) -> f64 {
        self.base_gst() * (1.0 - discount.fraction())
    }
}

/// Last eight digits of the epoch-millisecond timestamp, zero padded.
fn document_suffix(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(100_000_000);
    format!("{:08}", millis)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GstBill {
    pub bill_number: String,
    pub issued_at: DateTime<Utc>,
    pub profit: f64,
    pub base_gst: f64,
    pub discount: GstDiscount,
    pub amount_paid: f64,
}

impl GstBill {
    pub fn issue(quote: &PayoutQuote, discount: GstDiscount, now: DateTime<Utc>) -> Self {
        Self {
            bill_number: format!("GST-{}", document_suffix(now)),
            issued_at: now,
            profit: quote.profit(),
            base_gst: quote.base_gst(),
            discount,
            amount_paid: quote.final_gst(discount),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancelSlip {
    pub cancellation_id: String,
    pub issued_at: DateTime<Utc>,
    pub forfeited_profit: f64,
    pub refund: f64,
}

impl CancelSlip {
    pub fn issue(quote: &PayoutQuote, now: DateTime<Utc>) -> Self {
        Self {
            cancellation_id: format!("CANCEL-{}", document_suffix(now)),
            issued_at: now,
            forfeited_profit: quote.profit(),
            refund: quote.initial_amount,
        }
    }
}

/// Seconds left to claim the payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutCountdown {
    remaining: u32,
}

impl Default for PayoutCountdown {
    fn default() -> Self {
        Self {
            remaining: PAYOUT_WINDOW_SECS,
        }
    }
}

impl PayoutCountdown {
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
