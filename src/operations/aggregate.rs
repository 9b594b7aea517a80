use crate::errors::{ExpenseError, Result};
use crate::models::budget::Budget;
use crate::models::expense::ExpenseRecord;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;

/// Pie slices start here, measured counter-clockwise from the positive x axis.
pub const PIE_START_ANGLE_DEGREES: f64 = 140.0;

fn overflow(what: &str) -> ExpenseError {
    ExpenseError::Overflow(format!("{} exceeds the largest representable amount", what))
}

/// Sum of every amount. Fails instead of wrapping when the sum leaves `Decimal` range.
pub fn total_spent(records: &[ExpenseRecord]) -> Result<Decimal> {
    records.iter().try_fold(Decimal::ZERO, |acc, record| {
        acc.checked_add(record.amount)
            .ok_or_else(|| overflow("total spent"))
    })
}

/// Budget left over; negative once spending exceeds the budget.
pub fn remaining(budget: Budget, total_spent: Decimal) -> Result<Decimal> {
    budget
        .amount()
        .checked_sub(total_spent)
        .ok_or_else(|| overflow("remaining balance"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    OnTrack,
    OverBudget,
}

impl BudgetStatus {
    pub fn from_remaining(remaining: Decimal) -> Self {
        if remaining < Decimal::ZERO {
            BudgetStatus::OverBudget
        } else {
            BudgetStatus::OnTrack
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BudgetStatus::OnTrack => "On track",
            BudgetStatus::OverBudget => "Over budget!",
        }
    }
}

/// Sums amounts per category label. Labels are compared exactly.
pub fn by_category(records: &[ExpenseRecord]) -> Result<HashMap<String, Decimal>> {
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for record in records {
        let entry = totals
            .entry(record.category.clone())
            .or_insert(Decimal::ZERO);
        *entry = entry
            .checked_add(record.amount)
            .ok_or_else(|| overflow(&format!("total for '{}'", record.category)))?;
    }
    Ok(totals)
}

/// Largest total first; equal totals fall back to the label.
pub fn sorted_category_totals(totals: &HashMap<String, Decimal>) -> Vec<(String, Decimal)> {
    let mut sorted: Vec<(String, Decimal)> = totals
        .iter()
        .map(|(category, amount)| (category.clone(), *amount))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    pub percent: f64,
    /// Radians.
    pub start_angle: f64,
    /// Radians.
    pub sweep: f64,
}

/// Splits the full circle between categories in label order, each taking its
/// part of `total`.
///
/// Returns nothing when there is no positive total to divide up.
pub fn category_shares(totals: &HashMap<String, Decimal>, total: Decimal) -> Vec<CategoryShare> {
    if total <= Decimal::ZERO {
        return Vec::new();
    }
    let total = total.to_f64().unwrap_or(0.0);
    if total <= 0.0 {
        return Vec::new();
    }

    let mut ordered: Vec<(&String, &Decimal)> = totals.iter().collect();
    ordered.sort_by(|a, b| a.0.cmp(b.0));

    let mut shares = Vec::with_capacity(ordered.len());
    let mut start_angle = PIE_START_ANGLE_DEGREES.to_radians();
    for (category, amount) in ordered {
        let ratio = amount.to_f64().unwrap_or(0.0) / total;
        let sweep = ratio * std::f64::consts::TAU;
        shares.push(CategoryShare {
            category: category.clone(),
            amount: *amount,
            percent: ratio * 100.0,
            start_angle,
            sweep,
        });
        start_angle += sweep;
    }
    shares
}
