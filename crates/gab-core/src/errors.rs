/// Core error type for the alias bot.
///
/// Adapter crates map their specific errors into this type so the bot core can
/// handle failures consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable outcomes of an alias request.
///
/// None of these mutate the ledger; the caller may retry with different input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AliasError {
    #[error("not a usable email address")]
    InvalidAddress,

    #[error("local part is empty after normalization")]
    EmptyLocalPart,

    #[error("every alias combination for this address has already been issued")]
    SpaceExhausted,

    #[error("requested {requested} aliases but only {remaining} remain")]
    RequestTooLarge { requested: u64, remaining: u64 },
}
