mod dashboard;
mod errors;
mod models;
mod operations;
mod store;

use chrono::Local;
use clap::{Parser, Subcommand};
use models::budget::Budget;
use operations::add::add_expense_from_input;
use operations::clear::clear_expenses;
use operations::format::{DEFAULT_CURRENCY_SYMBOL, DisplayConfig};
use operations::report::{expense_table, summary_report};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Once;
use store::LedgerStore;
use tracing::error;

static TRACING_INIT: Once = Once::new();

/// Warnings from this crate only, unless `RUST_LOG` says otherwise.
const DEFAULT_LOG_DIRECTIVE: &str = concat!(env!("CARGO_CRATE_NAME"), "=warn");

/// Log to stderr so tables on stdout and the dashboard stay clean.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

#[derive(Parser, Debug)]
#[command(name = "spent", version, about = "Log expenses and keep an eye on your budget")]
struct Cli {
    /// Location of the expense file.
    #[arg(long, env = "EXPENSES_FILE", default_value = "expenses.csv", global = true)]
    file: PathBuf,

    /// Currency symbol used when displaying amounts.
    #[arg(long, default_value = DEFAULT_CURRENCY_SYMBOL, global = true)]
    currency: String,

    #[command(subcommand)]
    command: Option<UserCommand>,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Record a new expense.
    Add {
        /// YYYY-MM-DD; defaults to today.
        #[arg(long, default_value = "")]
        date: String,
        /// Food, Travel, Shopping, Bills or Other.
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: String,
    },
    /// Print every recorded expense.
    List,
    /// Print budget, spending and category totals.
    Summary {
        #[arg(long, default_value = "5000")]
        budget: Budget,
    },
    /// Delete all recorded expenses.
    Clear,
    /// Open the interactive dashboard.
    Dashboard {
        #[arg(long, default_value = "5000")]
        budget: Budget,
    },
}

fn run(cli: Cli) -> errors::Result<()> {
    let store = LedgerStore::new(cli.file);
    let config = DisplayConfig {
        currency: cli.currency,
    };

    match cli.command.unwrap_or(UserCommand::Dashboard {
        budget: Budget::default(),
    }) {
        UserCommand::Add {
            date,
            category,
            amount,
        } => {
            let today = Local::now().date_naive();
            let record = add_expense_from_input(&store, &date, &category, &amount, today)?;
            println!(
                "Added {} under '{}'!",
                config.money(record.amount),
                record.category
            );
        }
        UserCommand::List => {
            print!("{}", expense_table(&store.load()?, &config));
        }
        UserCommand::Summary { budget } => {
            print!("{}", summary_report(budget, &store.load()?, &config)?);
        }
        UserCommand::Clear => {
            clear_expenses(&store)?;
            println!("All expenses cleared!");
        }
        UserCommand::Dashboard { budget } => {
            dashboard::run_dashboard(&store, budget, &config)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal::Decimal;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_log_directive_targets_this_crate() {
        let (target, level) = DEFAULT_LOG_DIRECTIVE.split_once('=').unwrap();
        assert_eq!(level, "warn");
        assert!(module_path!().starts_with(target));
        assert!(
            DEFAULT_LOG_DIRECTIVE
                .parse::<tracing_subscriber::filter::Directive>()
                .is_ok()
        );
    }

    #[test]
    fn test_parse_add_command() {
        let cli = Cli::try_parse_from([
            "spent",
            "--file",
            "data.csv",
            "add",
            "--date",
            "2024-01-05",
            "--category",
            "Food",
            "--amount",
            "120.00",
        ])
        .unwrap();
        assert_eq!(cli.file, PathBuf::from("data.csv"));
        match cli.command {
            Some(UserCommand::Add { date, category, amount }) => {
                assert_eq!(date, "2024-01-05");
                assert_eq!(category, "Food");
                assert_eq!(amount, "120.00");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_summary_budget() {
        let cli = Cli::try_parse_from(["spent", "summary", "--budget", "1200.50"]).unwrap();
        match cli.command {
            Some(UserCommand::Summary { budget }) => {
                assert_eq!(budget.amount(), Decimal::new(120050, 2))
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_negative_budget_rejected() {
        let result = Cli::try_parse_from(["spent", "dashboard", "--budget=-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_subcommand_defaults_to_dashboard() {
        let cli = Cli::try_parse_from(["spent", "--currency", "$"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.currency, "$");
    }

    #[test]
    fn test_run_add_rejects_zero_amount() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("expenses.csv");
        let cli = Cli::try_parse_from([
            "spent",
            "--file",
            file.to_str().unwrap(),
            "add",
            "--category",
            "Food",
            "--amount",
            "0",
        ])
        .unwrap();

        let err = run(cli).unwrap_err();
        assert!(matches!(err, errors::ExpenseError::Validation(_)));
        assert!(!file.exists());
    }

    #[test]
    fn test_run_clear_without_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("expenses.csv");
        let cli = Cli::try_parse_from(["spent", "--file", file.to_str().unwrap(), "clear"]).unwrap();
        assert!(run(cli).unwrap_err().is_not_found());
    }
}
