use crate::errors::Result;
use crate::store::LedgerStore;
use tracing::warn;

/// Removes every stored expense. Fails with `NotFound` when there is nothing to clear.
pub fn clear_expenses(store: &LedgerStore) -> Result<()> {
    store.clear().inspect_err(|e| {
        if e.is_not_found() {
            warn!(path = %store.path().display(), "clear requested but no expense file exists");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expense::{Category, ExpenseRecord};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    #[test]
    fn test_clear_empty_store_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::new(dir.path().join("expenses.csv"));
        let err = clear_expenses(&store).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_clear_non_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::new(dir.path().join("expenses.csv"));
        let record = ExpenseRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            Category::Food,
            Decimal::new(10, 0),
        )
        .unwrap();
        store.append(&record).unwrap();

        clear_expenses(&store).unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
