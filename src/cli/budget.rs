//! Budget CLI commands

use chrono::Utc;
use clap::Subcommand;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BudgetPeriod, Money};
use crate::services::LedgerService;
use crate::session::Signer;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set or replace a category limit
    Set {
        /// Category name
        category: String,
        /// Limit amount (e.g., "400" or "400.00")
        amount: String,
    },

    /// Remove a category limit
    Remove {
        /// Category name
        category: String,
    },

    /// Set the period all limits apply to (weekly, monthly, yearly)
    Period {
        /// New period
        period: String,
    },

    /// List configured limits
    List,

    /// Evaluate every limit against the current period's spending
    #[command(alias = "status")]
    Evaluate,
}

/// Handle a budget command
pub async fn handle_budget_command(
    service: &LedgerService,
    signer: Option<&dyn Signer>,
    cmd: BudgetCommands,
) -> LedgerResult<()> {
    match cmd {
        BudgetCommands::Set { category, amount } => {
            let limit = Money::parse(&amount)
                .map_err(|e| LedgerError::Validation(format!("Invalid amount: {}", e)))?;
            if limit.is_negative() {
                return Err(LedgerError::Validation(
                    "Budget limits cannot be negative".to_string(),
                ));
            }

            let book = service.set_budget(&category, limit)?;
            println!("Set {} budget for '{}' ({})", limit, category, book.period);
        }

        BudgetCommands::Remove { category } => {
            let removed = service.remove_budget(&category)?;
            println!("Removed '{}' budget (was {})", category, removed);
        }

        BudgetCommands::Period { period } => {
            let period: BudgetPeriod = period.parse().map_err(LedgerError::Validation)?;
            service.set_budget_period(period)?;
            println!("Budget period set to {}", period);
        }

        BudgetCommands::List => {
            let book = service.budgets()?;
            if book.is_empty() {
                println!("No budgets configured.");
                return Ok(());
            }

            println!("Budgets ({}):", book.period);
            for (category, limit) in &book.limits {
                println!("  {:24} {:>10}", category, limit.to_string());
            }
        }

        BudgetCommands::Evaluate => {
            let reports = service.evaluate_budgets(signer, Utc::now()).await?;
            if reports.is_empty() {
                println!("No budgets configured.");
                return Ok(());
            }

            for report in &reports {
                println!("  {}", report);
            }
        }
    }

    Ok(())
}
