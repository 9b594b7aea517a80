use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the ledger store, the entry-time checks and the dashboard.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Rejected user input. Nothing was written.
    #[error("{0}")]
    Validation(String),
    #[error("No expense file found at '{}'", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// A persisted row that cannot be parsed back into a record.
    #[error("Malformed expense file on line {line}: {message}")]
    Malformed { line: usize, message: String },
    /// A sum or difference left the range `Decimal` can represent.
    #[error("Amount overflow: {0}")]
    Overflow(String),
    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, ExpenseError>;

impl ExpenseError {
    pub fn validation(message: impl Into<String>) -> Self {
        ExpenseError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ExpenseError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_path() {
        let err = ExpenseError::NotFound(PathBuf::from("data/expenses.csv"));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No expense file found at 'data/expenses.csv'");
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = ExpenseError::validation("Please enter an amount greater than 0.");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Please enter an amount greater than 0.");
    }

    #[test]
    fn test_overflow_message() {
        let err = ExpenseError::Overflow("total spent".to_string());
        assert_eq!(err.to_string(), "Amount overflow: total spent");
    }

    #[test]
    fn test_malformed_message_includes_line() {
        let err = ExpenseError::Malformed {
            line: 3,
            message: "invalid amount 'abc'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed expense file on line 3: invalid amount 'abc'"
        );
    }
}
