//! Main Telegram bot implementation.

use std::sync::Arc;

use melon_core::Settings;
use teloxide::prelude::*;
use tracing::{info, warn};

use crate::error::{BotError, Result};
use crate::handlers::{handle_command, Command};
use crate::notifier::TelegramNotifier;
use crate::state::BotState;

/// The Telegram bot for the Melon catalog.
pub struct MelonBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers.
    state: Arc<BotState>,
}

impl MelonBot {
    /// Create a new bot from settings.
    ///
    /// Requires `TELEGRAM_BOT_TOKEN` environment variable to be set.
    pub fn new(settings: Settings) -> Result<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(BotError::NoToken)?;

        let bot = Bot::new(token);
        let notifier = Arc::new(TelegramNotifier::new(bot.clone()));
        let state = Arc::new(BotState::new(settings, notifier)?);

        Ok(Self { bot, state })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| BotError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Run in polling mode until Ctrl+C, with the push scheduler alongside.
    pub async fn run(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        if self.state.start_push().await? {
            let push = &self.state.settings().push;
            info!(
                times = ?push.times,
                targets = ?push.target_groups,
                hours = push.check_hours,
                "Scheduled push running"
            );
        }

        let state = Arc::clone(&self.state);

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state);
                        info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        // Unrecognized commands only; plain chat is ignored.
                        msg.text().map(|t| t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(|bot: Bot, msg: Message| async move {
                        if let Some(text) = msg.text() {
                            info!(cmd = %text, "Unrecognized command");
                            bot.send_message(
                                msg.chat.id,
                                format!(
                                    "Unknown command: {}\n\nUse /help to see available commands.",
                                    text.split_whitespace().next().unwrap_or(text)
                                ),
                            )
                            .await?;
                        }
                        Ok(())
                    }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|_upd| async {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Dispatcher stopped, shutting down push scheduler");
        if let Err(e) = self.state.stop_push().await {
            warn!(error = %e, "Push scheduler did not stop cleanly");
        }

        info!("Bot stopped");
        Ok(())
    }
}
