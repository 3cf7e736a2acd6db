use std::sync::Arc;

use teloxide::prelude::*;

use gab_core::domain::{ChatId, UserId};

use crate::router::AppState;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let chat_id = ChatId(msg.chat.id.0);

    if text.trim().is_empty() {
        return Ok(());
    }

    state
        .conversation
        .handle_text(user_id, chat_id, text)
        .await;
    Ok(())
}
