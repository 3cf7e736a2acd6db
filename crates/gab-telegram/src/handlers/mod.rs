//! Telegram update handlers.
//!
//! Each handler is a small adapter that extracts ids and text from the update and
//! calls into the `gab-core` conversation.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use gab_core::domain::ChatId;

use crate::router::AppState;

mod commands;
mod text;

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Command,
    Text,
    /// Photos, stickers and the like in a private chat.
    Hint,
    /// Non-text updates in groups, including service messages.
    Ignore,
}

fn route(text: Option<&str>, is_private: bool) -> Route {
    match text {
        Some(t) if t.starts_with('/') => Route::Command,
        Some(_) => Route::Text,
        None if is_private => Route::Hint,
        None => Route::Ignore,
    }
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let route = route(msg.text(), msg.chat.is_private());
    if route == Route::Ignore {
        return Ok(());
    }

    // Modes advance one message at a time; keep a chat's updates ordered.
    let _guard = state.chat_locks.lock_chat(msg.chat.id.0).await;

    match route {
        Route::Command => commands::handle_command(msg.clone(), state.clone()).await,
        Route::Text => text::handle_text(msg.clone(), state.clone()).await,
        Route::Hint => {
            state.conversation.hint(ChatId(msg.chat.id.0)).await;
            Ok(())
        }
        Route::Ignore => Ok(()),
    }
}
