//! Command handlers for the Telegram bot.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::notifier::{split_message, MAX_MESSAGE_CHARS};
use crate::state::{BotState, Reply};

/// Telegram rejects photo captions longer than this many characters.
const MAX_CAPTION_CHARS: usize = 1024;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and get help")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Search the catalog: /search <keyword>")]
    Search(String),

    #[command(description = "Show one item, checking group files first: /cid <code>")]
    Cid(String),

    #[command(description = "Show recent updates: /latest [hours]")]
    Latest(String),

    #[command(description = "Send the update digest to the push groups now")]
    Push,

    #[command(description = "Show scheduled push status")]
    Pushstatus,
}

/// Handle the /start command.
pub async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
    let welcome = format!(
        "Welcome to the Melon catalog bot! 🍈\n\n\
        Search with /search <keyword>, then send /cid <code> for details.\n\
        /latest shows what changed recently.\n\n{}",
        Command::descriptions()
    );

    bot.send_message(msg.chat.id, welcome).await?;

    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "User started bot");
    Ok(())
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    let help_text = Command::descriptions().to_string();
    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}

/// Handle the /search command.
pub async fn handle_search(bot: Bot, msg: Message, state: Arc<BotState>, keyword: String) -> ResponseResult<()> {
    info!(chat_id = %msg.chat.id, keyword = %keyword.trim(), "Search requested");
    let text = state.search(&keyword).await;
    send_text(&bot, msg.chat.id, &text).await
}

/// Handle the /cid command.
pub async fn handle_cid(bot: Bot, msg: Message, state: Arc<BotState>, code: String) -> ResponseResult<()> {
    info!(chat_id = %msg.chat.id, code = %code.trim(), "Detail requested");

    match state.detail(&code).await {
        Reply::Text(text) => send_text(&bot, msg.chat.id, &text).await,
        Reply::Photo { url, caption } => send_cover(&bot, msg.chat.id, &url, &caption).await,
    }
}

/// Handle the /latest command.
pub async fn handle_latest(bot: Bot, msg: Message, state: Arc<BotState>, hours: String) -> ResponseResult<()> {
    let text = state.latest(&hours).await;
    send_text(&bot, msg.chat.id, &text).await
}

/// Handle the /push command.
pub async fn handle_push(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    info!(chat_id = %msg.chat.id, "Manual push requested");
    bot.send_message(msg.chat.id, "Sending digest...").await?;

    let text = state.push_now().await;
    send_text(&bot, msg.chat.id, &text).await
}

/// Handle the /pushstatus command.
pub async fn handle_push_status(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let text = state.push_status().await;
    send_text(&bot, msg.chat.id, &text).await
}

/// Dispatch a parsed command to its handler.
pub async fn handle_command(bot: Bot, msg: Message, cmd: Command, state: Arc<BotState>) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Search(keyword) => handle_search(bot, msg, state, keyword).await,
        Command::Cid(code) => handle_cid(bot, msg, state, code).await,
        Command::Latest(hours) => handle_latest(bot, msg, state, hours).await,
        Command::Push => handle_push(bot, msg, state).await,
        Command::Pushstatus => handle_push_status(bot, msg, state).await,
    }
}

/// Send text, split to fit Telegram's message limit.
async fn send_text(bot: &Bot, chat_id: ChatId, text: &str) -> ResponseResult<()> {
    for part in split_message(text, MAX_MESSAGE_CHARS) {
        bot.send_message(chat_id, part).await?;
    }
    Ok(())
}

/// Send a cover image with the detail text.
///
/// A cover Telegram cannot fetch degrades to the text alone.
async fn send_cover(bot: &Bot, chat_id: ChatId, url: &str, caption: &str) -> ResponseResult<()> {
    let parsed = match url::Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(url = %url, error = %e, "Cover URL is invalid");
            return send_text(bot, chat_id, caption).await;
        }
    };

    let fits = caption.chars().count() <= MAX_CAPTION_CHARS;
    let mut request = bot.send_photo(chat_id, InputFile::url(parsed));
    if fits {
        request = request.caption(caption);
    }

    match request.await {
        Ok(_) if fits => Ok(()),
        Ok(_) => send_text(bot, chat_id, caption).await,
        Err(e) => {
            warn!(chat_id = %chat_id, url = %url, error = %e, "Failed to send cover");
            send_text(bot, chat_id, caption).await
        }
    }
}
