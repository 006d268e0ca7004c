use crate::error::SimError;

/// A validated investor name and amount.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentRequest {
    pub name: String,
    pub amount: f64,
}

impl InvestmentRequest {
    pub fn new(name: &str, amount: f64) -> Result<Self, SimError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SimError::EmptyName);
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(SimError::InvalidAmount(amount));
        }
        Ok(Self {
            name: name.to_string(),
            amount,
        })
    }
}
