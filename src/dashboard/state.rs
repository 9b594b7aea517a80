use crate::errors::{ExpenseError, Result};
use crate::models::budget::Budget;
use crate::models::expense::{Category, ExpenseRecord};
use crate::operations::add::{add_expense, parse_expense_input};
use crate::operations::clear::clear_expenses;
use crate::store::LedgerStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Category,
    Amount,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Date => FormField::Category,
            FormField::Category => FormField::Amount,
            FormField::Amount => FormField::Date,
        }
    }

    fn previous(self) -> Self {
        match self {
            FormField::Date => FormField::Amount,
            FormField::Category => FormField::Date,
            FormField::Amount => FormField::Category,
        }
    }
}

/// Which part of the dashboard receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Overview,
    Form(FormField),
    Budget,
    ConfirmClear,
}

/// Sidebar fields for a new expense, kept as typed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseForm {
    pub date: String,
    pub category: Category,
    pub amount: String,
}

impl ExpenseForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            category: Category::Food,
            amount: "0.00".to_string(),
        }
    }
}

/// Outcome of the last action, shown until the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Added { category: String, amount: Decimal },
    Rejected(String),
    BudgetUpdated(Decimal),
    Cleared,
    ClearFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    FocusForm,
    FocusBudget,
    NextField,
    PreviousField,
    NextCategory,
    PreviousCategory,
    Input(char),
    Backspace,
    Submit,
    RequestClear,
    ConfirmClear,
    Cancel,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub budget: Budget,
    pub budget_input: String,
    pub records: Vec<ExpenseRecord>,
    pub form: ExpenseForm,
    pub focus: Focus,
    pub notice: Option<Notice>,
}

impl DashboardState {
    pub fn load(store: &LedgerStore, budget: Budget, today: NaiveDate) -> Result<Self> {
        Ok(Self {
            budget,
            budget_input: budget.amount().to_string(),
            records: store.load()?,
            form: ExpenseForm::new(today),
            focus: Focus::Overview,
            notice: None,
        })
    }

    pub fn can_clear(&self) -> bool {
        !self.records.is_empty()
    }

    /// Handles one input event, then re-reads the ledger.
    ///
    /// Rejected input becomes a notice; store failures other than a missing
    /// file on clear are returned to the caller.
    pub fn apply(
        &mut self,
        store: &LedgerStore,
        action: DashboardAction,
        today: NaiveDate,
    ) -> Result<Control> {
        debug!(?action, focus = ?self.focus, "dashboard action");
        match (self.focus, action) {
            (_, DashboardAction::Quit) => return Ok(Control::Quit),

            (Focus::Overview, DashboardAction::FocusForm) => {
                self.focus = Focus::Form(FormField::Date);
            }
            (Focus::Overview, DashboardAction::FocusBudget) => {
                self.budget_input = self.budget.amount().to_string();
                self.focus = Focus::Budget;
            }
            (Focus::Overview, DashboardAction::RequestClear) => {
                if self.can_clear() {
                    self.focus = Focus::ConfirmClear;
                }
            }

            (Focus::Form(field), DashboardAction::NextField) => {
                self.focus = Focus::Form(field.next());
            }
            (Focus::Form(field), DashboardAction::PreviousField) => {
                self.focus = Focus::Form(field.previous());
            }
            (Focus::Form(FormField::Category), DashboardAction::NextCategory) => {
                self.form.category = self.form.category.next();
            }
            (Focus::Form(FormField::Category), DashboardAction::PreviousCategory) => {
                self.form.category = self.form.category.previous();
            }
            (Focus::Form(FormField::Date), DashboardAction::Input(ch)) => self.form.date.push(ch),
            (Focus::Form(FormField::Amount), DashboardAction::Input(ch)) => {
                self.form.amount.push(ch)
            }
            (Focus::Form(FormField::Date), DashboardAction::Backspace) => {
                self.form.date.pop();
            }
            (Focus::Form(FormField::Amount), DashboardAction::Backspace) => {
                self.form.amount.pop();
            }
            (Focus::Form(_), DashboardAction::Submit) => self.submit_expense(store, today)?,

            (Focus::Budget, DashboardAction::Input(ch)) => self.budget_input.push(ch),
            (Focus::Budget, DashboardAction::Backspace) => {
                self.budget_input.pop();
            }
            (Focus::Budget, DashboardAction::Submit) => self.submit_budget(),

            (Focus::ConfirmClear, DashboardAction::ConfirmClear | DashboardAction::Submit) => {
                self.focus = Focus::Overview;
                match clear_expenses(store) {
                    Ok(()) => self.notice = Some(Notice::Cleared),
                    Err(e @ ExpenseError::NotFound(_)) => {
                        self.notice = Some(Notice::ClearFailed(e.to_string()))
                    }
                    Err(e) => return Err(e),
                }
            }

            (_, DashboardAction::Cancel) => self.focus = Focus::Overview,
            _ => {}
        }

        self.records = store.load()?;
        Ok(Control::Continue)
    }

    fn submit_expense(&mut self, store: &LedgerStore, today: NaiveDate) -> Result<()> {
        let parsed = parse_expense_input(
            &self.form.date,
            self.form.category.as_str(),
            &self.form.amount,
            today,
        )
        .and_then(|input| add_expense(store, input.date, input.category, input.amount));

        match parsed {
            Ok(record) => {
                self.notice = Some(Notice::Added {
                    category: record.category,
                    amount: record.amount,
                });
                Ok(())
            }
            Err(ExpenseError::Validation(message)) => {
                self.notice = Some(Notice::Rejected(message));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn submit_budget(&mut self) {
        match Budget::from_str(&self.budget_input) {
            Ok(budget) => {
                self.budget = budget;
                self.focus = Focus::Overview;
                self.notice = Some(Notice::BudgetUpdated(budget.amount()));
            }
            Err(e) => self.notice = Some(Notice::Rejected(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).expect("Invalid date")
    }

    fn setup() -> (TempDir, LedgerStore, DashboardState) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LedgerStore::new(dir.path().join("expenses.csv"));
        let state = DashboardState::load(&store, Budget::default(), today()).unwrap();
        (dir, store, state)
    }

    fn type_text(state: &mut DashboardState, store: &LedgerStore, text: &str) {
        for ch in text.chars() {
            state.apply(store, DashboardAction::Input(ch), today()).unwrap();
        }
    }

    fn clear_field(state: &mut DashboardState, store: &LedgerStore) {
        for _ in 0..16 {
            state.apply(store, DashboardAction::Backspace, today()).unwrap();
        }
    }

    #[test]
    fn test_initial_state() {
        let (_dir, _store, state) = setup();
        assert_eq!(state.focus, Focus::Overview);
        assert!(state.records.is_empty());
        assert_eq!(state.form.date, "2024-01-05");
        assert_eq!(state.form.amount, "0.00");
        assert!(!state.can_clear());
    }

    #[test]
    fn test_submit_default_amount_is_rejected() {
        let (_dir, store, mut state) = setup();
        state.apply(&store, DashboardAction::FocusForm, today()).unwrap();
        state.apply(&store, DashboardAction::Submit, today()).unwrap();

        assert_eq!(
            state.notice,
            Some(Notice::Rejected("Please enter an amount greater than 0.".to_string()))
        );
        assert!(state.records.is_empty());
        assert!(!store.exists());
    }

    #[test]
    fn test_add_expense_through_form() {
        let (_dir, store, mut state) = setup();
        state.apply(&store, DashboardAction::FocusForm, today()).unwrap();
        state.apply(&store, DashboardAction::NextField, today()).unwrap();
        state.apply(&store, DashboardAction::NextCategory, today()).unwrap();
        assert_eq!(state.form.category, Category::Travel);

        state.apply(&store, DashboardAction::NextField, today()).unwrap();
        assert_eq!(state.focus, Focus::Form(FormField::Amount));
        clear_field(&mut state, &store);
        type_text(&mut state, &store, "80.50");
        state.apply(&store, DashboardAction::Submit, today()).unwrap();

        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].category, "Travel");
        assert_eq!(
            state.notice,
            Some(Notice::Added {
                category: "Travel".to_string(),
                amount: Decimal::new(8050, 2),
            })
        );
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let (_dir, store, mut state) = setup();
        state.apply(&store, DashboardAction::FocusForm, today()).unwrap();
        type_text(&mut state, &store, "x");
        state.form.amount = "10".to_string();
        state.apply(&store, DashboardAction::Submit, today()).unwrap();

        assert!(matches!(state.notice, Some(Notice::Rejected(_))));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_budget_edit() {
        let (_dir, store, mut state) = setup();
        state.apply(&store, DashboardAction::FocusBudget, today()).unwrap();
        clear_field(&mut state, &store);
        type_text(&mut state, &store, "1200");
        state.apply(&store, DashboardAction::Submit, today()).unwrap();

        assert_eq!(state.budget.amount(), Decimal::new(1200, 0));
        assert_eq!(state.focus, Focus::Overview);
    }

    #[test]
    fn test_negative_budget_keeps_previous() {
        let (_dir, store, mut state) = setup();
        state.apply(&store, DashboardAction::FocusBudget, today()).unwrap();
        clear_field(&mut state, &store);
        type_text(&mut state, &store, "-5");
        state.apply(&store, DashboardAction::Submit, today()).unwrap();

        assert_eq!(state.budget, Budget::default());
        assert_eq!(state.focus, Focus::Budget);
        assert!(matches!(state.notice, Some(Notice::Rejected(_))));
    }

    #[test]
    fn test_clear_requires_records_and_confirmation() {
        let (_dir, store, mut state) = setup();
        state.apply(&store, DashboardAction::RequestClear, today()).unwrap();
        assert_eq!(state.focus, Focus::Overview);

        state.form.amount = "25".to_string();
        state.apply(&store, DashboardAction::FocusForm, today()).unwrap();
        state.apply(&store, DashboardAction::Submit, today()).unwrap();
        state.apply(&store, DashboardAction::Cancel, today()).unwrap();
        assert_eq!(state.records.len(), 1);

        state.apply(&store, DashboardAction::RequestClear, today()).unwrap();
        assert_eq!(state.focus, Focus::ConfirmClear);
        state.apply(&store, DashboardAction::Cancel, today()).unwrap();
        assert_eq!(state.records.len(), 1);

        state.apply(&store, DashboardAction::RequestClear, today()).unwrap();
        state.apply(&store, DashboardAction::ConfirmClear, today()).unwrap();
        assert!(state.records.is_empty());
        assert_eq!(state.notice, Some(Notice::Cleared));
    }

    #[test]
    fn test_clear_after_external_delete_reports_not_found() {
        let (_dir, store, mut state) = setup();
        state.form.amount = "25".to_string();
        state.apply(&store, DashboardAction::FocusForm, today()).unwrap();
        state.apply(&store, DashboardAction::Submit, today()).unwrap();
        state.apply(&store, DashboardAction::Cancel, today()).unwrap();
        state.apply(&store, DashboardAction::RequestClear, today()).unwrap();

        std::fs::remove_file(store.path()).unwrap();
        state.apply(&store, DashboardAction::ConfirmClear, today()).unwrap();
        assert!(matches!(state.notice, Some(Notice::ClearFailed(_))));
    }

    #[test]
    fn test_each_pass_rereads_the_store() {
        let (_dir, store, mut state) = setup();
        let record = ExpenseRecord::new(today(), Category::Bills, Decimal::new(99, 0)).unwrap();
        store.append(&record).unwrap();
        assert!(state.records.is_empty());

        state.apply(&store, DashboardAction::Cancel, today()).unwrap();
        assert_eq!(state.records, vec![record]);
    }

    #[test]
    fn test_quit() {
        let (_dir, store, mut state) = setup();
        let control = state.apply(&store, DashboardAction::Quit, today()).unwrap();
        assert_eq!(control, Control::Quit);
    }
}
