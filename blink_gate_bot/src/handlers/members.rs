use teloxide::types::{Message, User};

use crate::{database::Store, error::Error};

/// Note down people joining the chat, so that `/audit` and `/prune` know
/// about them. Bots are left alone.
pub async fn handle_new_members<S: Store>(
    store: &S,
    message: &Message,
    users: &[User],
) -> Result<(), Error> {
    for user in users.iter().filter(|user| !user.is_bot) {
        let record = store
            .record_join(message.chat.id, user.id, user.username.as_deref())
            .await?;

        log::debug!(
            "User {} joined chat {}, transacted: {}",
            user.id,
            message.chat.id,
            record.transacted
        );
    }

    Ok(())
}
