pub mod add;
pub mod aggregate;
pub mod clear;
pub mod format;
pub mod report;
