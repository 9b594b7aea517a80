pub mod budget;
pub mod expense;
