//! Conversation flow: turns user text into alias-service calls and replies.

use std::sync::Arc;

use crate::{
    domain::{ChatId, UserId},
    errors::AliasError,
    formatting as fmt,
    ledger::Durability,
    messaging::{port::MessagingPort, types::ReplyMenu},
    normalize::is_gmail_address,
    service::{AliasService, ResetOutcome},
    session::{Mode, SessionStore},
    utils::parse_count,
};

const RESET_PHRASES: [&str; 2] = ["YES RESET", "YA RESET"];

/// Per-user alias conversation.
///
/// The caller serialises updates per chat; modes live in [`SessionStore`].
pub struct Conversation {
    service: Arc<AliasService>,
    sessions: SessionStore,
    messenger: Arc<dyn MessagingPort>,
    batch_limit: u64,
    menu: ReplyMenu,
}

impl Conversation {
    pub fn new(
        service: Arc<AliasService>,
        messenger: Arc<dyn MessagingPort>,
        batch_limit: u64,
    ) -> Self {
        Self {
            service,
            sessions: SessionStore::new(),
            messenger,
            batch_limit: batch_limit.max(1),
            menu: fmt::main_menu(),
        }
    }

    pub async fn mode(&self, user: UserId) -> Mode {
        self.sessions.get(user).await
    }

    pub async fn start(&self, user: UserId, chat: ChatId) {
        self.sessions.clear(user).await;
        self.reply(chat, &fmt::welcome()).await;
    }

    pub async fn info(&self, chat: ChatId) {
        self.reply(chat, &fmt::info()).await;
    }

    pub async fn hint(&self, chat: ChatId) {
        self.reply(chat, &fmt::idle_hint()).await;
    }

    pub async fn cancel(&self, user: UserId, chat: ChatId) {
        self.sessions.clear(user).await;
        self.reply(chat, &fmt::cancelled()).await;
    }

    pub async fn begin_generate(&self, user: UserId, chat: ChatId) {
        self.sessions.set(user, Mode::AskEmail).await;
        self.reply(chat, &fmt::ask_email()).await;
    }

    pub async fn begin_status(&self, user: UserId, chat: ChatId) {
        self.sessions.set(user, Mode::AskStatusEmail).await;
        self.reply(chat, &fmt::ask_status_email()).await;
    }

    pub async fn begin_reset(&self, user: UserId, chat: ChatId) {
        self.sessions.set(user, Mode::AskResetEmail).await;
        self.reply(chat, &fmt::ask_reset_email()).await;
    }

    /// Handle a free-text message according to the user's current mode.
    pub async fn handle_text(&self, user: UserId, chat: ChatId, text: &str) {
        let text = text.trim();
        match text {
            fmt::GENERATE_BUTTON => return self.begin_generate(user, chat).await,
            fmt::INFO_BUTTON => return self.info(chat).await,
            _ => {}
        }

        match self.sessions.get(user).await {
            Mode::Idle => self.hint(chat).await,
            Mode::AskEmail => self.on_generate_email(user, chat, text).await,
            Mode::AskCount { email } => self.on_count(user, chat, &email, text).await,
            Mode::AskStatusEmail => self.on_status_email(user, chat, text).await,
            Mode::AskResetEmail => self.on_reset_email(user, chat, text).await,
            Mode::ConfirmReset { email } => self.on_reset_confirm(user, chat, &email, text).await,
        }
    }

    async fn on_generate_email(&self, user: UserId, chat: ChatId, text: &str) {
        if !is_gmail_address(text) {
            return self.reply(chat, &fmt::invalid_email()).await;
        }
        let summary = match self.service.status(text).await {
            Ok(s) => s,
            Err(e) => return self.fail(user, chat, e).await,
        };
        if summary.remaining == 0 {
            return self.fail(user, chat, AliasError::SpaceExhausted).await;
        }

        self.sessions
            .set(
                user,
                Mode::AskCount {
                    email: text.to_string(),
                },
            )
            .await;
        self.reply(chat, &fmt::email_accepted(&summary, self.batch_limit))
            .await;
    }

    async fn on_count(&self, user: UserId, chat: ChatId, email: &str, text: &str) {
        let Some(count) = parse_count(text) else {
            return self.reply(chat, &fmt::invalid_count()).await;
        };
        if count > self.batch_limit {
            // Name whichever limit is tighter for this address.
            let summary = match self.service.status(email).await {
                Ok(s) => s,
                Err(e) => return self.fail(user, chat, e).await,
            };
            if summary.remaining == 0 {
                return self.fail(user, chat, AliasError::SpaceExhausted).await;
            }
            let body = if count > summary.remaining {
                fmt::too_large(summary.remaining)
            } else {
                fmt::over_batch_limit(self.batch_limit)
            };
            return self.reply(chat, &body).await;
        }

        // The offset is re-read here; another chat may have advanced it since the
        // address was accepted.
        let batch = match self.service.generate(email, count).await {
            Ok(b) => b,
            Err(AliasError::RequestTooLarge { remaining, .. }) => {
                return self.reply(chat, &fmt::too_large(remaining)).await;
            }
            Err(e) => return self.fail(user, chat, e).await,
        };

        self.reply(chat, &fmt::batch_header(&batch)).await;
        for alias in &batch.aliases {
            self.send(chat, &fmt::alias_line(alias)).await;
        }
        if batch.durability == Durability::InMemoryOnly {
            self.send(chat, &fmt::not_saved_warning()).await;
        }
        self.sessions.clear(user).await;
        self.reply(chat, &fmt::batch_done(&batch)).await;
    }

    async fn on_status_email(&self, user: UserId, chat: ChatId, text: &str) {
        if !is_gmail_address(text) {
            return self.reply(chat, &fmt::invalid_email()).await;
        }
        match self.service.status(text).await {
            Ok(s) => {
                self.sessions.clear(user).await;
                self.reply(chat, &fmt::status(&s)).await;
            }
            Err(e) => self.fail(user, chat, e).await,
        }
    }

    async fn on_reset_email(&self, user: UserId, chat: ChatId, text: &str) {
        if !is_gmail_address(text) {
            return self.reply(chat, &fmt::invalid_email()).await;
        }
        let summary = match self.service.status(text).await {
            Ok(s) => s,
            Err(e) => return self.fail(user, chat, e).await,
        };
        if !summary.recorded || summary.offset == 0 {
            self.sessions.clear(user).await;
            return self.reply(chat, &fmt::nothing_to_reset()).await;
        }

        self.sessions
            .set(
                user,
                Mode::ConfirmReset {
                    email: text.to_string(),
                },
            )
            .await;
        self.reply(chat, &fmt::confirm_reset(&summary)).await;
    }

    async fn on_reset_confirm(&self, user: UserId, chat: ChatId, email: &str, text: &str) {
        self.sessions.clear(user).await;
        if !is_reset_phrase(text) {
            return self.reply(chat, &fmt::reset_cancelled()).await;
        }
        match self.service.reset(email).await {
            Ok(ResetOutcome::Reset {
                base, durability, ..
            }) => {
                self.reply(chat, &fmt::reset_done(&base)).await;
                if durability == Durability::InMemoryOnly {
                    self.send(chat, &fmt::not_saved_warning()).await;
                }
            }
            Ok(ResetOutcome::NothingToReset { .. }) => {
                self.reply(chat, &fmt::nothing_to_reset()).await;
            }
            Err(e) => self.fail(user, chat, e).await,
        }
    }

    /// Report a request-ending error and return the user to idle.
    async fn fail(&self, user: UserId, chat: ChatId, err: AliasError) {
        self.sessions.clear(user).await;
        let body = match err {
            AliasError::InvalidAddress => fmt::invalid_email(),
            AliasError::EmptyLocalPart => fmt::empty_local_part(),
            AliasError::SpaceExhausted => fmt::exhausted(),
            AliasError::RequestTooLarge { remaining, .. } => fmt::too_large(remaining),
        };
        self.reply(chat, &body).await;
    }

    async fn reply(&self, chat: ChatId, html: &str) {
        if let Err(e) = self
            .messenger
            .send_html_with_menu(chat, html, &self.menu)
            .await
        {
            tracing::warn!(chat = chat.0, error = %e, "failed to send reply");
        }
    }

    async fn send(&self, chat: ChatId, html: &str) {
        if let Err(e) = self.messenger.send_html(chat, html).await {
            tracing::warn!(chat = chat.0, error = %e, "failed to send message");
        }
    }
}

fn is_reset_phrase(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    RESET_PHRASES.contains(&upper.as_str())
}
