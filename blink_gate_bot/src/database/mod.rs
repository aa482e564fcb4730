#[cfg(test)]
mod memory;
mod mongo;
mod types;

use std::future::Future;

#[cfg(test)]
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use mongodb::error::Error;
pub use types::*;

use teloxide::types::{ChatId, UserId};

/// Where gating and membership records live. Handlers get one of these
/// injected, so tests can use [`MemoryStore`] instead of MongoDB.
pub trait Store: Send + Sync + 'static {
    /// Append a new gating record.
    fn insert_gating(
        &self,
        record: &GroupGatingRecord,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// All gating records of a chat, oldest first.
    fn gatings_for_chat(
        &self,
        chat_id: ChatId,
    ) -> impl Future<Output = Result<Vec<GroupGatingRecord>, Error>> + Send;

    /// Find the member by username or user ID within the chat and mark them as
    /// joined, creating the record if there is none. Returns the record as it
    /// is after the change.
    fn record_join(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        username: Option<&str>,
    ) -> impl Future<Output = Result<UserMembershipRecord, Error>> + Send;

    /// Members of the chat who joined but never transacted.
    fn non_transacted_members(
        &self,
        chat_id: ChatId,
    ) -> impl Future<Output = Result<Vec<UserMembershipRecord>, Error>> + Send;
}
