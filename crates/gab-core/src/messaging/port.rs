use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{MessagingCapabilities, ReplyMenu},
    Result,
};

/// Outbound port used by the conversation flow.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    /// Send a message and (re)attach the reply keyboard.
    async fn send_html_with_menu(
        &self,
        chat_id: ChatId,
        html: &str,
        menu: &ReplyMenu,
    ) -> Result<MessageRef>;
}
