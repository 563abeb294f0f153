//! Push delivery over Telegram.

use async_trait::async_trait;
use melon_runtime::{Notifier, SchedulerError};
use teloxide::prelude::*;
use tracing::debug;

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Sends digest text to chats through the bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, target: i64, text: &str) -> melon_runtime::Result<()> {
        let parts = split_message(text, MAX_MESSAGE_CHARS);
        debug!(target, parts = parts.len(), "Sending push");

        for part in parts {
            self.bot
                .send_message(ChatId(target), part)
                .await
                .map_err(|e| SchedulerError::Send {
                    target,
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

/// Split `text` into chunks of at most `limit` characters.
///
/// Chunks break on line boundaries where possible; a single line longer
/// than `limit` is cut mid-line.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { line_len + 1 };

        if current_len + needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            continue;
        }

        if !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let mut chars = line.chars().peekable();
        while chars.peek().is_some() {
            let piece: String = chars.by_ref().take(limit).collect();
            let piece_len = piece.chars().count();
            if piece_len == limit {
                parts.push(piece);
            } else {
                current = piece;
                current_len = piece_len;
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(split_message("hello\nworld", 20), vec!["hello\nworld"]);
    }

    #[test]
    fn test_splits_on_lines() {
        let parts = split_message("aaaa\nbbbb\ncccc", 9);
        assert_eq!(parts, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn test_long_line_is_cut() {
        let parts = split_message("abcdefghij\nxy", 4);
        assert_eq!(parts, vec!["abcd", "efgh", "ij", "xy"]);
        assert!(parts.iter().all(|p| p.chars().count() <= 4));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "【一】\n【二】";
        assert_eq!(split_message(text, 7), vec![text]);
        assert_eq!(split_message(text, 3), vec!["【一】", "【二】"]);
    }
}
