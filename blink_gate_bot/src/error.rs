use teloxide::RequestError;

/// The one thing users get to see when anything goes wrong.
pub const APOLOGY: &str =
    "Sorry, there was an error processing your command. Please try again later.";

/// Anything that can go wrong while handling an update.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Telegram request failed: {0}")]
    Request(#[from] RequestError),
    #[error("database error: {0}")]
    Database(#[from] crate::database::Error),
    #[error("indexer request failed: {0}")]
    Indexer(#[from] reqwest::Error),
}
