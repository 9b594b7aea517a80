use crate::errors::{ExpenseError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Labels offered when entering an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Bills,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Bills,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Other => "Other",
        }
    }

    /// Next label in selector order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                ExpenseError::validation(format!(
                    "Invalid category '{}'. Use one of: Food, Travel, Shopping, Bills, Other.",
                    trimmed
                ))
            })
    }
}

/// One logged expense. Records carry no identifier and are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub category: String,
    pub amount: Decimal,
}

impl ExpenseRecord {
    /// Entry-time constructor; the amount must be strictly positive.
    pub fn new(date: NaiveDate, category: Category, amount: Decimal) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(ExpenseError::validation(
                "Please enter an amount greater than 0.",
            ));
        }
        Ok(Self {
            date,
            category: category.as_str().to_string(),
            amount,
        })
    }

    /// Rebuilds a record read back from disk. Fields are taken as-is.
    pub fn from_stored(date: NaiveDate, category: String, amount: Decimal) -> Self {
        Self {
            date,
            category,
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).expect("Invalid date")
    }

    #[test]
    fn test_new_record_success() {
        let record = ExpenseRecord::new(date(), Category::Food, Decimal::new(12000, 2)).unwrap();
        assert_eq!(record.category, "Food");
        assert_eq!(record.amount, Decimal::new(12000, 2));
        assert_eq!(record.date, date());
    }

    #[test]
    fn test_new_record_rejects_zero() {
        let result = ExpenseRecord::new(date(), Category::Food, Decimal::ZERO);
        assert!(matches!(result, Err(ExpenseError::Validation(_))));
    }

    #[test]
    fn test_new_record_rejects_negative() {
        let result = ExpenseRecord::new(date(), Category::Bills, Decimal::new(-1, 0));
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Please enter an amount greater than 0."
        );
    }

    #[test]
    fn test_from_stored_keeps_free_form_category() {
        let record = ExpenseRecord::from_stored(date(), "food ".to_string(), Decimal::ZERO);
        assert_eq!(record.category, "food ");
        assert_eq!(record.amount, Decimal::ZERO);
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("travel".parse::<Category>().unwrap(), Category::Travel);
        assert_eq!(" BILLS ".parse::<Category>().unwrap(), Category::Bills);
    }

    #[test]
    fn test_category_parse_unknown() {
        let result = "Rent".parse::<Category>();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid category 'Rent'"));
    }

    #[test]
    fn test_category_cycle_wraps() {
        assert_eq!(Category::Other.next(), Category::Food);
        assert_eq!(Category::Food.previous(), Category::Other);
        assert_eq!(Category::Travel.next(), Category::Shopping);
    }
}
