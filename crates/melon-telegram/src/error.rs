//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur while starting or running the bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN environment variable.")]
    NoToken,

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Catalog, file store or configuration error.
    #[error(transparent)]
    Core(#[from] melon_core::MelonError),

    /// Push scheduler error.
    #[error(transparent)]
    Scheduler(#[from] melon_runtime::SchedulerError),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;
