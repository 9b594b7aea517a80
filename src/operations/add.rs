use crate::errors::{ExpenseError, Result};
use crate::models::expense::{Category, ExpenseRecord};
use crate::operations::aggregate::{by_category, total_spent};
use crate::store::LedgerStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{info, warn};

/// Typed form fields, before the amount check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseInput {
    pub date: NaiveDate,
    pub category: Category,
    pub amount: Decimal,
}

/// Parses raw form fields. An empty date means `today`.
pub fn parse_expense_input(
    date: &str,
    category: &str,
    amount: &str,
    today: NaiveDate,
) -> Result<ExpenseInput> {
    let date = date.trim();
    let date = if date.is_empty() {
        today
    } else {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ExpenseError::validation("Invalid date format. Please use YYYY-MM-DD."))?
    };

    let category = Category::from_str(category)?;

    let amount = amount.trim();
    let amount = Decimal::from_str(amount).map_err(|_| {
        ExpenseError::validation(format!(
            "Invalid amount format {}. Please provide a valid decimal number.",
            amount
        ))
    })?;

    Ok(ExpenseInput {
        date,
        category,
        amount,
    })
}

/// Validates and persists one expense. Rejected input never touches the store.
///
/// An amount that would push the ledger's totals out of range is rejected too,
/// so the stored file always stays summable.
pub fn add_expense(
    store: &LedgerStore,
    date: NaiveDate,
    category: Category,
    amount: Decimal,
) -> Result<ExpenseRecord> {
    let record = ExpenseRecord::new(date, category, amount)
        .and_then(|record| ensure_summable(store, record))
        .inspect_err(|e| {
            warn!(error = %e, "rejected expense");
        })?;
    store.append(&record)?;
    info!(category = %record.category, amount = %record.amount, "added expense");
    Ok(record)
}

fn ensure_summable(store: &LedgerStore, record: ExpenseRecord) -> Result<ExpenseRecord> {
    let mut projected = store.load()?;
    projected.push(record.clone());
    match total_spent(&projected).and_then(|_| by_category(&projected)) {
        Ok(_) => Ok(record),
        Err(ExpenseError::Overflow(_)) => Err(ExpenseError::validation(
            "Amount is too large: the running total would exceed the largest supported value.",
        )),
        Err(e) => Err(e),
    }
}

pub fn add_expense_from_input(
    store: &LedgerStore,
    date: &str,
    category: &str,
    amount: &str,
    today: NaiveDate,
) -> Result<ExpenseRecord> {
    let input = parse_expense_input(date, category, amount, today)?;
    add_expense(store, input.date, input.category, input.amount)
}
