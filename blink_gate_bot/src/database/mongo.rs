use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::ReturnDocument,
    Client, Collection,
};
use teloxide::types::{ChatId, UserId};

use super::{user_id_to_i64, Error, GroupGatingRecord, Store, UserMembershipRecord};

const GROUPS_COLLECTION: &str = "groups";
const USERS_COLLECTION: &str = "users";

pub struct MongoStore {
    groups: Collection<GroupGatingRecord>,
    users: Collection<UserMembershipRecord>,
}

impl MongoStore {
    /// Connect to the database and make sure it answers.
    pub async fn connect(uri: &str, database_name: &str) -> Result<MongoStore, Error> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database_name);

        database.run_command(doc! { "ping": 1 }).await?;
        log::info!("Connected to MongoDB database {database_name}");

        Ok(MongoStore {
            groups: database.collection(GROUPS_COLLECTION),
            users: database.collection(USERS_COLLECTION),
        })
    }
}

/// Filter for a member of a chat by user ID, or by username if there is one.
fn member_filter(chat_id: ChatId, user_id: UserId, username: Option<&str>) -> Document {
    let mut either = vec![doc! { "userId": user_id_to_i64(user_id) }];
    if let Some(username) = username {
        either.push(doc! { "username": username });
    }
    doc! { "chatId": chat_id.0, "$or": either }
}

impl Store for MongoStore {
    async fn insert_gating(&self, record: &GroupGatingRecord) -> Result<(), Error> {
        self.groups.insert_one(record).await?;
        Ok(())
    }

    async fn gatings_for_chat(&self, chat_id: ChatId) -> Result<Vec<GroupGatingRecord>, Error> {
        self.groups
            .find(doc! { "chatId": chat_id.0 })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await
    }

    async fn record_join(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        username: Option<&str>,
    ) -> Result<UserMembershipRecord, Error> {
        let mut set = doc! { "joined": true, "userId": user_id_to_i64(user_id) };
        if let Some(username) = username {
            set.insert("username", username);
        }

        let updated = self
            .users
            .find_one_and_update(
                member_filter(chat_id, user_id, username),
                doc! { "$set": set },
            )
            .return_document(ReturnDocument::After)
            .await?;

        if let Some(record) = updated {
            return Ok(record);
        }

        let record = UserMembershipRecord::after_join(None, chat_id, user_id, username);
        self.users.insert_one(&record).await?;
        Ok(record)
    }

    async fn non_transacted_members(
        &self,
        chat_id: ChatId,
    ) -> Result<Vec<UserMembershipRecord>, Error> {
        self.users
            .find(doc! {
                "chatId": chat_id.0,
                "joined": true,
                // Missing counts as not transacted.
                "transacted": { "$ne": true },
            })
            .await?
            .try_collect()
            .await
    }
}
