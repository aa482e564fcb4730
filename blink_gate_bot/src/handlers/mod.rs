use std::sync::Arc;

use bot_commons::{is_sender_admin, teloxide_retry, useful_methods::BotSendLong};
use teloxide::{
    prelude::*,
    sugar::request::RequestReplyExt,
    types::{Me, Message},
    RequestError,
};
use url::Url;

use crate::{
    config::Config,
    database::Store,
    error::{Error, APOLOGY},
    indexer::Indexer,
    misc::is_group_chat,
};

use self::commands::{CommandCall, AUDIT, COMMANDS_KEYBOARD, GATES, HELP, MAGIC, PRUNE, START};

mod audit;
pub mod commands;
mod gating;
mod info;
mod members;

const GROUP_ONLY: &str = "This bot can only be used in group chats.";
const ADMIN_ONLY: &str = "Sorry, only administrators and the group owner can use this command.";

/// Deployment-specific knobs the handlers need.
#[derive(Debug, Clone)]
pub struct Settings {
    pub blink_base_url: Url,
    pub dial_cluster: String,
    pub indexer: Option<Indexer>,
}

impl Settings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Settings {
            blink_base_url: config.blink_base_url.clone(),
            dial_cluster: config.dial_cluster.clone(),
            indexer: config.indexer_url.clone().map(Indexer::new),
        }
    }
}

/// Reply to the message with HTML text, splitting it if it's too long.
async fn reply(bot: &Bot, message: &Message, text: &str) -> Result<(), RequestError> {
    bot.send_long(message.chat.id, text, message.id).await?;
    Ok(())
}

/// Make sure a command is used by an admin in a group. If not, tells them
/// off and returns `false`.
async fn require_group_admin(bot: &Bot, message: &Message) -> Result<bool, Error> {
    if !is_group_chat(&message.chat) {
        reply(bot, message, GROUP_ONLY).await?;
        return Ok(false);
    }

    if !is_sender_admin(bot, message).await? {
        reply(bot, message, ADMIN_ONLY).await?;
        return Ok(false);
    }

    Ok(true)
}

/// Entry point for every new message. Any failure gets logged and turned
/// into an apology in the chat.
pub async fn handle_message<S: Store>(
    bot: Bot,
    me: Me,
    message: Message,
    store: Arc<S>,
    settings: Arc<Settings>,
) -> Result<(), RequestError> {
    // Service messages about members joining.
    if let Some(new_members) = message.new_chat_members() {
        if let Err(e) = members::handle_new_members(&*store, &message, new_members).await {
            log::error!(
                "Failed to record new members of chat {}: {e}",
                message.chat.id
            );
        }
        return Ok(());
    }

    if let Err(e) = handle_text(&bot, &me, &message, &*store, &settings).await {
        log::error!(
            "Error processing message {} in chat {}: {e}",
            message.id,
            message.chat.id
        );
        teloxide_retry!(
            bot.send_message(message.chat.id, APOLOGY)
                .reply_to(message.id)
                .await
        )?;
    }

    Ok(())
}

async fn handle_text<S: Store>(
    bot: &Bot,
    me: &Me,
    message: &Message,
    store: &S,
    settings: &Settings,
) -> Result<(), Error> {
    // Bot ignores messages made by itself.
    if message.from.as_ref().map(|from| from.id) == Some(me.id) {
        return Ok(());
    }

    let Some(text) = message.text() else {
        return Ok(());
    };

    // Reply keyboard buttons send their label as plain text.
    match text.trim() {
        info::MAKE_PRIVATE_BUTTON => return info::handle_make_private(bot, message).await,
        info::HELP_BUTTON => return info::handle_help(bot, message).await,
        _ => (),
    }

    let Some(call) = CommandCall::parse(text, me.username()) else {
        return Ok(());
    };

    log::debug!("Seen command {} in chat {}", call.command, message.chat.id);

    if call.is(&START) {
        info::handle_start(bot, me, message).await
    } else if call.is(&HELP) {
        info::handle_help(bot, message).await
    } else if call.is(&COMMANDS_KEYBOARD) {
        info::handle_commands_keyboard(bot, message).await
    } else if call.is(&MAGIC) {
        gating::handle_magic(bot, message, call.params, store, settings).await
    } else if call.is(&GATES) {
        gating::handle_gates(bot, message, store).await
    } else if call.is(&AUDIT) {
        audit::handle_audit(bot, message, store).await
    } else if call.is(&PRUNE) {
        audit::handle_prune(bot, me, message, store).await
    } else {
        // Not ours.
        Ok(())
    }
}
