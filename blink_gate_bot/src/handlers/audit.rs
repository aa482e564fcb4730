use bot_commons::{
    get_admin_of, teloxide_retry,
    useful_methods::{BotStuff, ReplyBatcher},
};
use teloxide::{
    prelude::*,
    types::{Me, Message},
};

use super::{reply, require_group_admin};
use crate::{
    database::{Store, UserMembershipRecord},
    error::Error,
    misc::member_name_prettyprint,
};

/// Build the `/audit` reply, batched to fit into messages.
fn audit_report(members: &[UserMembershipRecord]) -> Vec<String> {
    if members.is_empty() {
        return vec![String::from(
            "Everyone who joined has completed the transaction.",
        )];
    }

    let mut batcher = ReplyBatcher::default();
    batcher.push(&format!(
        "<b>Members who haven't completed the transaction ({}):</b>",
        members.len()
    ));
    for member in members {
        batcher.push(&format!("- {}", member_name_prettyprint(member)));
    }
    batcher.finish()
}

fn prune_summary(removed: usize, failed: usize) -> String {
    match (removed, failed) {
        (0, 0) => String::from("No members to remove."),
        (removed, 0) => format!("Removed {removed} members who haven't completed the transaction."),
        (removed, failed) => format!(
            "Removed {removed} members who haven't completed the transaction. \
            Failed to remove {failed}, see if I have the permissions for it."
        ),
    }
}

/// `/audit`: list members who joined but never went through with the
/// transaction.
pub async fn handle_audit<S: Store>(bot: &Bot, message: &Message, store: &S) -> Result<(), Error> {
    bot.typing(message.chat.id).await?;

    if !require_group_admin(bot, message).await? {
        return Ok(());
    }

    let members = store.non_transacted_members(message.chat.id).await?;

    for batch in audit_report(&members) {
        reply(bot, message, &batch).await?;
    }

    Ok(())
}

/// `/prune`: ban everyone `/audit` would list.
pub async fn handle_prune<S: Store>(
    bot: &Bot,
    me: &Me,
    message: &Message,
    store: &S,
) -> Result<(), Error> {
    bot.typing(message.chat.id).await?;

    if !require_group_admin(bot, message).await? {
        return Ok(());
    }

    let can_ban = get_admin_of(bot, me.id, message.chat.id)
        .await?
        .is_some_and(|member| member.kind.can_restrict_members());

    if !can_ban {
        reply(
            bot,
            message,
            "I need to be an admin with the permission to ban users to do that.",
        )
        .await?;
        return Ok(());
    }

    let members = store.non_transacted_members(message.chat.id).await?;

    let mut removed = 0;
    let mut failed = 0;

    for member in &members {
        match teloxide_retry!(bot.ban_chat_member(message.chat.id, member.user_id()).await) {
            Ok(_) => removed += 1,
            Err(e) => {
                log::warn!(
                    "Failed to remove user {} from chat {}: {e}",
                    member.user_id,
                    message.chat.id
                );
                failed += 1;
            }
        }
    }

    log::info!(
        "Pruned chat {}: {removed} removed, {failed} failed",
        message.chat.id
    );

    reply(bot, message, &prune_summary(removed, failed)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(user_id: i64, username: Option<&str>) -> UserMembershipRecord {
        UserMembershipRecord {
            user_id,
            username: username.map(str::to_string),
            joined: true,
            chat_id: -100,
            transacted: false,
        }
    }

    #[test]
    fn report() {
        let batches = audit_report(&[member(1, Some("alice")), member(2, None)]);
        assert_eq!(
            batches,
            [concat!(
                "<b>Members who haven't completed the transaction (2):</b>\n",
                "- @alice (userid 1)\n",
                "- <a href=\"tg://user?id=2\">userid 2</a>"
            )]
        );
    }

    #[test]
    fn empty_report() {
        let batches = audit_report(&[]);
        assert_eq!(batches.len(), 1);
        assert!(batches[0].starts_with("Everyone"));
    }

    #[test]
    fn long_report_is_batched() {
        let members: Vec<_> = (0..500)
            .map(|id| member(id, Some("somebody_with_a_long_name")))
            .collect();
        let batches = audit_report(&members);
        assert!(batches.len() > 1);
        assert!(batches.iter().all(|b| b.chars().count() <= 4000));
        let lines: usize = batches.iter().map(|b| b.lines().count()).sum();
        assert_eq!(lines, 501);
    }

    #[test]
    fn summaries() {
        assert_eq!(prune_summary(0, 0), "No members to remove.");
        assert_eq!(
            prune_summary(3, 0),
            "Removed 3 members who haven't completed the transaction."
        );
        assert!(prune_summary(1, 2).contains("Failed to remove 2"));
    }
}
