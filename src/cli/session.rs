//! Wallet session CLI commands

use clap::Subcommand;

use crate::cache::LedgerCache;
use crate::error::LedgerResult;
use crate::session::WalletSession;
use crate::storage::Storage;

/// Session subcommands
#[derive(Subcommand)]
pub enum SessionCommands {
    /// Connect a wallet identity
    Login {
        /// Wallet address
        address: String,
    },

    /// Disconnect the active wallet
    Logout,

    /// Show the active session
    Status,
}

/// Handle a session command
pub fn handle_session_command(
    storage: &Storage,
    cache: &LedgerCache,
    cmd: SessionCommands,
) -> LedgerResult<()> {
    match cmd {
        SessionCommands::Login { address } => {
            storage.save_session(&WalletSession::new(address.clone()))?;
            // Anything cached belongs to the previous identity
            cache.clear();
            println!("Logged in as {}", address);
        }

        SessionCommands::Logout => {
            storage.clear_session()?;
            cache.clear();
            println!("Logged out.");
        }

        SessionCommands::Status => match storage.load_session()? {
            Some(session) => {
                println!("Active session: {}", session.address);
                println!(
                    "Connected at:   {}",
                    session.connected_at.format("%Y-%m-%d %H:%M UTC")
                );
            }
            None => println!("No active session."),
        },
    }

    Ok(())
}
