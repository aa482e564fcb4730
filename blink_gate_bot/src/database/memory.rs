use std::sync::Mutex;

use teloxide::types::{ChatId, UserId};

use super::{Error, GroupGatingRecord, Store, UserMembershipRecord};

/// In-memory [`Store`] for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    groups: Mutex<Vec<GroupGatingRecord>>,
    users: Mutex<Vec<UserMembershipRecord>>,
}

impl MemoryStore {
    /// Put a member record in directly, like the transaction backend would.
    pub fn put_user(&self, record: UserMembershipRecord) {
        self.users.lock().unwrap().push(record);
    }

    pub fn users(&self) -> Vec<UserMembershipRecord> {
        self.users.lock().unwrap().clone()
    }
}

impl Store for MemoryStore {
    async fn insert_gating(&self, record: &GroupGatingRecord) -> Result<(), Error> {
        self.groups.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn gatings_for_chat(&self, chat_id: ChatId) -> Result<Vec<GroupGatingRecord>, Error> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.chat_id() == chat_id)
            .cloned()
            .collect())
    }

    async fn record_join(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        username: Option<&str>,
    ) -> Result<UserMembershipRecord, Error> {
        let mut users = self.users.lock().unwrap();
        let existing = users
            .iter()
            .position(|record| record.chat_id == chat_id.0 && record.is_user(user_id, username));

        let record = match existing {
            Some(index) => {
                let updated = UserMembershipRecord::after_join(
                    Some(users[index].clone()),
                    chat_id,
                    user_id,
                    username,
                );
                users[index] = updated.clone();
                updated
            }
            None => {
                let created = UserMembershipRecord::after_join(None, chat_id, user_id, username);
                users.push(created.clone());
                created
            }
        };
        Ok(record)
    }

    async fn non_transacted_members(
        &self,
        chat_id: ChatId,
    ) -> Result<Vec<UserMembershipRecord>, Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.chat_id == chat_id.0 && record.is_prunable())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn join_then_rejoin() {
        let store = MemoryStore::default();
        let chat = ChatId(-100);

        let first = store.record_join(chat, UserId(1), Some("alice")).await.unwrap();
        assert!(first.joined);

        // Same user in another chat is a separate record.
        store.record_join(ChatId(-200), UserId(1), Some("alice")).await.unwrap();

        // Found again by username even with a different ID.
        store.record_join(chat, UserId(2), Some("alice")).await.unwrap();
        assert_eq!(store.users().len(), 2);
    }

    #[tokio::test]
    async fn prunable_members() {
        let store = MemoryStore::default();
        let chat = ChatId(-100);
        store.put_user(UserMembershipRecord {
            user_id: 5,
            username: None,
            joined: true,
            chat_id: chat.0,
            transacted: true,
        });
        store.put_user(UserMembershipRecord {
            user_id: 6,
            username: None,
            joined: false,
            chat_id: chat.0,
            transacted: false,
        });
        store.record_join(chat, UserId(7), None).await.unwrap();
        store.record_join(chat, UserId(6), None).await.unwrap();

        let mut ids: Vec<_> = store
            .non_transacted_members(chat)
            .await
            .unwrap()
            .iter()
            .map(|r| r.user_id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, [6, 7]);
        assert!(store.non_transacted_members(ChatId(-1)).await.unwrap().is_empty());
    }
}
