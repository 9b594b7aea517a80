use crate::errors::{ExpenseError, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Monthly spending limit entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget(Decimal);

impl Budget {
    pub const DEFAULT: Budget = Budget(Decimal::from_parts(500000, 0, 0, false, 2));

    pub fn new(amount: Decimal) -> Result<Self> {
        if amount < Decimal::ZERO {
            return Err(ExpenseError::validation("Budget cannot be negative"));
        }
        Ok(Budget(amount))
    }

    pub fn amount(self) -> Decimal {
        self.0
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Budget {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| {
            ExpenseError::validation(format!(
                "Invalid budget amount '{}'. Must be a valid number",
                s.trim()
            ))
        })?;
        Budget::new(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        assert_eq!(Budget::default().amount(), Decimal::new(500000, 2));
    }

    #[test]
    fn test_zero_budget_allowed() {
        assert_eq!(Budget::new(Decimal::ZERO).unwrap().amount(), Decimal::ZERO);
    }

    #[test]
    fn test_negative_budget_error() {
        let result = Budget::new(Decimal::new(-1, 0));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().to_string(), "Budget cannot be negative");
    }

    #[test]
    fn test_parse_budget() {
        assert_eq!("1200.50".parse::<Budget>().unwrap().amount(), Decimal::new(120050, 2));
        let err = "lots".parse::<Budget>().unwrap_err();
        assert!(err.to_string().contains("Invalid budget amount"));
    }
}
