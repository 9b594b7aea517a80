use crate::errors::Result;
use crate::models::budget::Budget;
use crate::models::expense::ExpenseRecord;
use crate::operations::aggregate::{
    BudgetStatus, by_category, remaining, sorted_category_totals, total_spent,
};
use crate::operations::format::{DisplayConfig, format_display_date};
use std::fmt::Write;

/// Plain-text expense table in file order.
pub fn expense_table(records: &[ExpenseRecord], config: &DisplayConfig) -> String {
    if records.is_empty() {
        return "No expenses recorded yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<12}  {:<15}  {:>16}", "Date", "Category", "Amount");
    for record in records {
        let _ = writeln!(
            out,
            "{:<12}  {:<15}  {:>16}",
            format_display_date(record.date),
            record.category,
            config.money(record.amount)
        );
    }
    out
}

/// Budget cards followed by the per-category totals, largest first.
pub fn summary_report(
    budget: Budget,
    records: &[ExpenseRecord],
    config: &DisplayConfig,
) -> Result<String> {
    let spent = total_spent(records)?;
    let left = remaining(budget, spent)?;
    let status = BudgetStatus::from_remaining(left);

    let mut out = String::new();
    let _ = writeln!(out, "{:<18} {}", "Monthly Budget:", config.money(budget.amount()));
    let _ = writeln!(out, "{:<18} {}", "Total Spent:", config.money(spent));
    let _ = writeln!(
        out,
        "{:<18} {} ({})",
        "Remaining Balance:",
        config.money(left),
        status.label()
    );

    let totals = sorted_category_totals(&by_category(records)?);
    if totals.is_empty() {
        return Ok(out);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{:<15}  {:>16}", "Category", "Total Spent");
    for (category, total) in totals {
        let _ = writeln!(out, "{:<15}  {:>16}", category, config.money(total));
    }
    Ok(out)
}
