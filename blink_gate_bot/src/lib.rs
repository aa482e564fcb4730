//! Source code for a Telegram bot that gates private groups behind an NFT
//! collection or SPL token, by handing out a Solana blink that admits whoever
//! completes its transaction.

/// Links to the blink of a gated chat.
mod blink;

/// Startup configuration from the environment.
mod config;

/// Gating and membership records.
mod database;

/// Entry function that starts the bot.
mod entry;
pub use entry::*;

mod error;

/// Text formatting helpers.
pub mod formatting;

/// Functions that handle events from Telegram.
mod handlers;

/// Asset lookups against a DAS indexer.
mod indexer;

/// Miscellaneous functions.
mod misc;
