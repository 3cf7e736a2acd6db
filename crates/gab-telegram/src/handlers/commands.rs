use std::sync::Arc;

use teloxide::prelude::*;

use gab_core::domain::{ChatId, UserId};

use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let chat_id = ChatId(msg.chat.id.0);
    let conv = &state.conversation;

    let (cmd, arg) = parse_command(text);
    tracing::debug!(user = user_id.0, %cmd, "command");

    match cmd.as_str() {
        "start" | "help" => conv.start(user_id, chat_id).await,
        "info" => conv.info(chat_id).await,
        "generate" => {
            conv.begin_generate(user_id, chat_id).await;
            // `/generate you@gmail.com` skips the address prompt.
            if !arg.is_empty() {
                conv.handle_text(user_id, chat_id, &arg).await;
            }
        }
        "statusemail" => {
            conv.begin_status(user_id, chat_id).await;
            if !arg.is_empty() {
                conv.handle_text(user_id, chat_id, &arg).await;
            }
        }
        "resetemail" => {
            conv.begin_reset(user_id, chat_id).await;
            if !arg.is_empty() {
                conv.handle_text(user_id, chat_id, &arg).await;
            }
        }
        "cancel" => conv.cancel(user_id, chat_id).await,
        _ => conv.hint(chat_id).await,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_bot_suffix_and_args() {
        assert_eq!(
            parse_command("/StatusEmail@alias_bot  me@gmail.com "),
            ("statusemail".to_string(), "me@gmail.com".to_string())
        );
    }

    #[test]
    fn parses_bare_command() {
        assert_eq!(
            parse_command("/start"),
            ("start".to_string(), String::new())
        );
    }
}
