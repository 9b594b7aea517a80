//! Interactive budget dashboard.
//!
//! Every key press is one full pass: act on the input, reload the ledger from
//! disk, rebuild the view with [`view::render`] and draw it. Nothing is cached
//! between passes.

pub mod state;
pub mod tui;
pub mod view;

pub use tui::run_dashboard;
