use super::state::{DashboardState, Focus, FormField, Notice};
use crate::errors::Result;
use crate::models::expense::Category;
use crate::operations::aggregate::{
    BudgetStatus, by_category, category_shares, remaining, sorted_category_totals, total_spent,
};
use crate::operations::format::{DisplayConfig, format_display_date};

pub const TITLE: &str = "Expense Tracker";
pub const TAGLINE: &str = "Track your spending, stick to your budget!";
pub const EMPTY_MESSAGE: &str =
    "No expenses recorded yet. Add your first expense from the sidebar!";

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub title: &'static str,
    pub value: String,
    pub status: Option<BudgetStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRow {
    pub date: String,
    pub category: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub category: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub category: String,
    pub label: String,
    pub start_angle: f64,
    pub sweep: f64,
    /// Position in the chart palette; wraps for more than five categories.
    pub color_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFieldView {
    pub label: &'static str,
    pub value: String,
    pub focused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeView {
    pub kind: NoticeKind,
    pub message: String,
}

/// Everything the terminal needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub title: &'static str,
    pub tagline: &'static str,
    pub budget_input: Option<String>,
    pub cards: Vec<SummaryCard>,
    pub expenses: Vec<ExpenseRow>,
    pub empty_message: Option<&'static str>,
    pub pie: Vec<PieSlice>,
    pub category_summary: Vec<CategoryRow>,
    pub can_clear: bool,
    pub confirm_clear: bool,
    pub form: Vec<FormFieldView>,
    pub form_active: bool,
    pub notice: Option<NoticeView>,
    pub hint: &'static str,
}

pub const PIE_PALETTE_LEN: usize = 5;

/// Builds the frame description from the current state. No I/O happens here.
///
/// Fails only when the loaded amounts cannot be summed.
pub fn render(state: &DashboardState, config: &DisplayConfig) -> Result<DashboardView> {
    let spent = total_spent(&state.records)?;
    let left = remaining(state.budget, spent)?;

    let cards = vec![
        SummaryCard {
            title: "Monthly Budget",
            value: config.money(state.budget.amount()),
            status: None,
        },
        SummaryCard {
            title: "Total Spent",
            value: config.money(spent),
            status: None,
        },
        SummaryCard {
            title: "Remaining Balance",
            value: config.money(left),
            status: Some(BudgetStatus::from_remaining(left)),
        },
    ];

    let expenses: Vec<ExpenseRow> = state
        .records
        .iter()
        .map(|record| ExpenseRow {
            date: format_display_date(record.date),
            category: record.category.clone(),
            amount: config.money(record.amount),
        })
        .collect();

    let has_records = !state.records.is_empty();
    let (pie, category_summary) = if has_records {
        let totals = by_category(&state.records)?;
        let pie = category_shares(&totals, spent)
            .into_iter()
            .enumerate()
            .map(|(idx, share)| PieSlice {
                label: format!("{:.1}%", share.percent),
                category: share.category,
                start_angle: share.start_angle,
                sweep: share.sweep,
                color_index: idx % PIE_PALETTE_LEN,
            })
            .collect();
        let summary = sorted_category_totals(&totals)
            .into_iter()
            .map(|(category, total)| CategoryRow {
                category,
                total: config.money(total),
            })
            .collect();
        (pie, summary)
    } else {
        (Vec::new(), Vec::new())
    };

    let focused_field = match state.focus {
        Focus::Form(field) => Some(field),
        _ => None,
    };
    let category_value = if focused_field == Some(FormField::Category) {
        format!("< {} >", state.form.category)
    } else {
        state.form.category.to_string()
    };
    let form = vec![
        FormFieldView {
            label: "Date",
            value: state.form.date.clone(),
            focused: focused_field == Some(FormField::Date),
        },
        FormFieldView {
            label: "Category",
            value: category_value,
            focused: focused_field == Some(FormField::Category),
        },
        FormFieldView {
            label: "Amount",
            value: state.form.amount.clone(),
            focused: focused_field == Some(FormField::Amount),
        },
    ];

    Ok(DashboardView {
        title: TITLE,
        tagline: TAGLINE,
        budget_input: (state.focus == Focus::Budget).then(|| state.budget_input.clone()),
        cards,
        expenses,
        empty_message: (!has_records).then_some(EMPTY_MESSAGE),
        pie,
        category_summary,
        can_clear: state.can_clear(),
        confirm_clear: state.focus == Focus::ConfirmClear,
        form,
        form_active: focused_field.is_some(),
        notice: state.notice.as_ref().map(|notice| notice_view(notice, config)),
        hint: hint_for(state.focus),
    })
}

fn notice_view(notice: &Notice, config: &DisplayConfig) -> NoticeView {
    match notice {
        Notice::Added { category, amount } => NoticeView {
            kind: NoticeKind::Success,
            message: format!("Added {} under '{}'!", config.money(*amount), category),
        },
        Notice::BudgetUpdated(amount) => NoticeView {
            kind: NoticeKind::Success,
            message: format!("Budget set to {}", config.money(*amount)),
        },
        Notice::Cleared => NoticeView {
            kind: NoticeKind::Success,
            message: "All expenses cleared!".to_string(),
        },
        Notice::Rejected(message) | Notice::ClearFailed(message) => NoticeView {
            kind: NoticeKind::Error,
            message: message.clone(),
        },
    }
}

fn hint_for(focus: Focus) -> &'static str {
    match focus {
        Focus::Overview => "a add expense  b budget  x clear all  q/Esc quit",
        Focus::Form(FormField::Category) => "←/→ category  Tab next field  Enter add  Esc back",
        Focus::Form(_) => "Type value  Tab next field  Enter add  Esc back",
        Focus::Budget => "Type budget  Enter apply  Esc cancel",
        Focus::ConfirmClear => "Delete every expense? y/Enter confirm  n/Esc cancel",
    }
}

/// Category labels in selector order, for the sidebar.
pub fn category_choices() -> Vec<&'static str> {
    Category::ALL.iter().map(|c| c.as_str()).collect()
}
