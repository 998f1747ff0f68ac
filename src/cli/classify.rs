//! Classifier CLI commands

use clap::Subcommand;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;
use crate::services::LedgerService;
use crate::session::Signer;

/// Classifier subcommands
#[derive(Subcommand)]
pub enum ClassifyCommands {
    /// Suggest a category for a note and amount
    Suggest {
        /// Transaction note
        note: String,
        /// Amount the suggestion should consider
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        amount: String,
    },

    /// Train the classifier on a note/category pair
    Train {
        /// Transaction note
        note: String,
        /// The category it belongs to
        category: String,
    },
}

/// Handle a classifier command
pub fn handle_classify_command(
    service: &LedgerService,
    signer: Option<&dyn Signer>,
    cmd: ClassifyCommands,
) -> LedgerResult<()> {
    match cmd {
        ClassifyCommands::Suggest { note, amount } => {
            let amount = Money::parse(&amount)
                .map_err(|e| LedgerError::Validation(format!("Invalid amount: {}", e)))?;
            let suggestion = service.suggest(&note, amount, signer)?;
            println!(
                "{} (confidence {:.0}%)",
                suggestion.category,
                suggestion.confidence * 100.0
            );
        }

        ClassifyCommands::Train { note, category } => {
            service.train(&note, &category, signer)?;
            println!("Trained '{}' toward '{}'", note, category);
        }
    }

    Ok(())
}
