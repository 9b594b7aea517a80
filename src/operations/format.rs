use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Display-only settings shared by the dashboard and the text reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl DisplayConfig {
    pub fn money(&self, amount: Decimal) -> String {
        format_currency(&self.currency, amount)
    }
}

/// `₹ 1,234.50` style: two decimals with grouped thousands.
pub fn format_currency(symbol: &str, amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{} {}{}.{}", symbol, sign, grouped, fraction)
}

/// Table date format, e.g. `05 Jan 2024`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}
