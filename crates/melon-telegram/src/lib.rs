//! Telegram bot interface for the Melon catalog.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `MELON_BASE_URL`: Catalog backend root
//! - `MELON_PUSH_ENABLED`, `MELON_PUSH_TIMES`, `MELON_PUSH_CHECK_HOURS`,
//!   `MELON_PUSH_TARGET_GROUPS`: Scheduled digest
//! - `MELON_ONEBOT_URL`, `MELON_ONEBOT_TOKEN`, `MELON_FILE_GROUP`: Shared-file lookup for `/cid`
//!
//! # Example
//!
//! ```no_run
//! use melon_core::Settings;
//! use melon_telegram::MelonBot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bot = MelonBot::new(Settings::from_env()?)?;
//!     bot.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/search <keyword>` - Keyword search
//! - `/cid <code>` - Item detail, shared files first
//! - `/latest [hours]` - Recent updates digest
//! - `/push` - Send the digest to the push groups now
//! - `/pushstatus` - Scheduled push status

pub mod bot;
pub mod error;
pub mod handlers;
pub mod notifier;
pub mod state;

pub use bot::MelonBot;
pub use error::{BotError, Result};
pub use handlers::Command;
pub use notifier::{split_message, TelegramNotifier};
pub use state::{parse_hours, BotState, Reply};
