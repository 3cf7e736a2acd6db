//! Per-user conversational mode.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::UserId;

/// What the bot expects from a user's next text message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Idle,
    AskEmail,
    /// Address accepted; waiting for how many aliases to issue.
    AskCount { email: String },
    AskStatusEmail,
    AskResetEmail,
    /// Waiting for the reset confirmation phrase.
    ConfirmReset { email: String },
}

/// Modes keyed by user. Absent means [`Mode::Idle`].
#[derive(Debug, Default)]
pub struct SessionStore {
    modes: Mutex<HashMap<UserId, Mode>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user: UserId) -> Mode {
        self.modes
            .lock()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn set(&self, user: UserId, mode: Mode) {
        let mut modes = self.modes.lock().await;
        if mode == Mode::Idle {
            modes.remove(&user);
        } else {
            modes.insert(user, mode);
        }
    }

    pub async fn clear(&self, user: UserId) {
        self.modes.lock().await.remove(&user);
    }

    pub async fn active_users(&self) -> usize {
        self.modes.lock().await.len()
    }
}
