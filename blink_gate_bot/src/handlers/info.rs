use bot_commons::useful_methods::BotStuff;
use teloxide::{
    payloads::SendMessageSetters,
    prelude::*,
    sugar::request::RequestReplyExt,
    types::{KeyboardButton, KeyboardMarkup, Me, Message},
};

use super::{commands::Command, reply, GROUP_ONLY};
use crate::{error::Error, misc::is_group_chat};

pub const MAKE_PRIVATE_BUTTON: &str = "Make the group private";
pub const HELP_BUTTON: &str = "Help";
const MAGIC_BUTTON: &str = "/magic <address>";

fn keyboard(rows: &[&str]) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.iter()
            .map(|label| vec![KeyboardButton::new(*label)])
            .collect::<Vec<_>>(),
    )
    .resize_keyboard()
    .one_time_keyboard()
}

pub async fn handle_start(bot: &Bot, me: &Me, message: &Message) -> Result<(), Error> {
    bot.typing(message.chat.id).await?;

    if !is_group_chat(&message.chat) {
        reply(bot, message, GROUP_ONLY).await?;
        return Ok(());
    }

    bot.send_message(
        message.chat.id,
        format!(
            concat!(
                "Hello! I'm @{}. Follow the steps below:\n\n",
                "1. Make the group private (select the option below and follow instructions)\n",
                "2. Use /magic <address> with an NFT collection or SPL token address to proceed",
            ),
            me.username()
        ),
    )
    .reply_markup(keyboard(&[MAKE_PRIVATE_BUTTON, MAGIC_BUTTON]))
    .reply_to(message.id)
    .await?;

    Ok(())
}

pub async fn handle_help(bot: &Bot, message: &Message) -> Result<(), Error> {
    bot.typing(message.chat.id).await?;
    reply(bot, message, &Command::generate_help()).await?;
    Ok(())
}

pub async fn handle_commands_keyboard(bot: &Bot, message: &Message) -> Result<(), Error> {
    bot.typing(message.chat.id).await?;
    bot.send_message(message.chat.id, "Choose a command:")
        .reply_markup(keyboard(&[MAGIC_BUTTON, "/start", HELP_BUTTON]))
        .reply_to(message.id)
        .await?;
    Ok(())
}

pub async fn handle_make_private(bot: &Bot, message: &Message) -> Result<(), Error> {
    // Telegram automatically trims preceding and following newlines, so this is fine.
    reply(
        bot,
        message,
        "
To make the group private, follow these steps:

1. Open the group chat.
2. Tap on the group name to open the group info.
3. Tap on 'Edit' (or the pencil icon) to edit the group settings.
4. Tap on 'Group Type' and select 'Private Group'.
5. Save the changes.

After making the group private, you can proceed with the /magic command.",
    )
    .await?;
    Ok(())
}
