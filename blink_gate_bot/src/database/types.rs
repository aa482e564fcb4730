use std::fmt::Display;

use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, UserId};

/// Placeholder stored instead of a timestamp when none is known.
pub const UNKNOWN_TIMESTAMP: &str = "Unknown";

fn unknown_timestamp() -> String {
    UNKNOWN_TIMESTAMP.to_string()
}

/// Telegram user IDs fit in 52 bits, but BSON only has signed integers.
#[must_use]
pub fn user_id_to_i64(user_id: UserId) -> i64 {
    i64::try_from(user_id.0).unwrap_or(i64::MAX)
}

/// What kind of asset a chat is gated behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatingType {
    /// An NFT collection.
    Collection,
    /// A fungible SPL token.
    Token,
    /// Not checked against the indexer.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Display for GatingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GatingType::Collection => "NFT collection",
            GatingType::Token => "SPL token",
            GatingType::Unknown => "unknown asset",
        })
    }
}

/// A chat being gated behind an asset. Appended once per successful `/magic`,
/// never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupGatingRecord {
    pub chat_id: i64,
    #[serde(default)]
    pub chat_name: Option<String>,
    #[serde(default)]
    pub chat_type: String,
    /// Admin who set up the gating.
    pub chat_user_id: i64,
    /// Collection or token address the chat is gated behind.
    pub spl_address: String,
    #[serde(default)]
    pub gating_type: GatingType,
    /// Seconds since the epoch as decimal text, or [`UNKNOWN_TIMESTAMP`].
    #[serde(default = "unknown_timestamp")]
    pub timestamp: String,
}

impl GroupGatingRecord {
    #[must_use]
    pub fn chat_id(&self) -> ChatId {
        ChatId(self.chat_id)
    }
}

/// A member of a gated chat, as far as the bot has seen them join.
///
/// The `transacted` flag is set externally once the user completes the
/// blink's on-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMembershipRecord {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub joined: bool,
    pub chat_id: i64,
    #[serde(default)]
    pub transacted: bool,
}

impl UserMembershipRecord {
    /// The record after a user joined the chat: the existing one marked as
    /// joined, or a fresh one that hasn't transacted yet.
    ///
    /// A known username is refreshed, but never forgotten.
    #[must_use]
    pub fn after_join(
        existing: Option<Self>,
        chat_id: ChatId,
        user_id: UserId,
        username: Option<&str>,
    ) -> Self {
        match existing {
            Some(mut record) => {
                record.joined = true;
                record.user_id = user_id_to_i64(user_id);
                if let Some(username) = username {
                    record.username = Some(username.to_string());
                }
                record
            }
            None => UserMembershipRecord {
                user_id: user_id_to_i64(user_id),
                username: username.map(str::to_string),
                joined: true,
                chat_id: chat_id.0,
                transacted: false,
            },
        }
    }

    /// Whether this record matches a user by either ID or username.
    #[cfg(test)]
    #[must_use]
    pub fn is_user(&self, user_id: UserId, username: Option<&str>) -> bool {
        self.user_id == user_id_to_i64(user_id)
            || username.is_some_and(|name| self.username.as_deref() == Some(name))
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId(u64::try_from(self.user_id).unwrap_or_default())
    }

    /// Joined, but never went through with the transaction.
    #[cfg(test)]
    #[must_use]
    pub fn is_prunable(&self) -> bool {
        self.joined && !self.transacted
    }
}
