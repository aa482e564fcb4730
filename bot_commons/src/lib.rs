//! Shared plumbing for the bots in this workspace, because some things
//! are just boilerplate.

use std::future::Future;

use teloxide::{prelude::*, types::ChatMember, RequestError};

pub mod useful_methods;

/// Retry a teloxide request expression up to 3 times total while Telegram
/// keeps answering with a flood wait. Sleeps for the requested duration
/// between attempts. Any other result is returned as is.
///
/// The expression is evaluated anew on each attempt, so it should contain
/// the full request, including `.await`.
#[macro_export]
macro_rules! teloxide_retry {
    ($request:expr) => {{
        let mut attempts: u8 = 0;
        loop {
            attempts += 1;
            match $request {
                Err(::teloxide::RequestError::RetryAfter(wait)) if attempts < 3 => {
                    ::log::debug!("Flood wait of {:?}, retrying...", wait.duration());
                    ::tokio::time::sleep(wait.duration()).await;
                }
                other => break other,
            }
        }
    }};
}

/// Load the `.env` file if there is one, initialize logging, and start the
/// `closure` in an async runtime.
///
/// Logging is enabled by default on level `info` unless overridden
/// by environment variable `RUST_LOG`. This uses the crate
/// [pretty_env_logger][] internally, see its documentation for more details.
///
/// [pretty_env_logger]: https://docs.rs/pretty_env_logger
///
/// # Panics
///
/// Panics if the tokio runtime can't be built.
pub fn start_everything(closure: impl Future<Output = ()>) {
    // A missing .env is fine, the environment may be set up some other way.
    let dotenv_result = dotenvy::dotenv();

    let log_level = std::env::var_os("RUST_LOG")
        .unwrap_or_else(|| std::ffi::OsString::from("info"))
        .into_string()
        .unwrap_or_else(|_| String::from("info"));

    let running_as_systemd_service = std::env::var_os("JOURNAL_STREAM").is_some();

    let mut builder = match running_as_systemd_service {
        true => pretty_env_logger::formatted_builder(),
        false => pretty_env_logger::formatted_timed_builder(),
    };

    builder.parse_filters(&log_level);

    if builder.try_init().is_err() {
        log::error!("Tried to init logger twice!");
    }

    match dotenv_result {
        Ok(path) => log::info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No .env file, using the process environment."),
        Err(e) => log::warn!("Failed to read .env file: {e}"),
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build the tokio runtime")
        .block_on(closure);
}

/// Find out if a user of this ID is an admin of the specified chat of that ID.
/// If so, returns the `ChatMember` object describing their permissions,
/// otherwise `None`.
pub async fn get_admin_of(
    bot: &Bot,
    user: UserId,
    chat: ChatId,
) -> Result<Option<ChatMember>, RequestError> {
    Ok(teloxide_retry!(bot.get_chat_administrators(chat).await)?
        .into_iter()
        .find(|x| x.user.id == user))
}

/// Checks if the sender of this message is an admin of the chat it was sent in.
/// Returns `true` if this is a private chat between the bot and the user.
///
/// Anonymous admins (messages sent on behalf of the chat itself) and posts
/// from the channel linked to this chat count as admins too.
pub async fn is_sender_admin(bot: &Bot, message: &Message) -> Result<bool, RequestError> {
    if message.chat.is_private() {
        return Ok(true);
    }

    // In such a case, "from" is @GroupAnonymousBot for backwards compatibility,
    // so look at the sender chat first.
    let is_admin = if let Some(sender_chat) = &message.sender_chat {
        if sender_chat.id == message.chat.id {
            true
        } else {
            let chat_full = teloxide_retry!(bot.get_chat(message.chat.id).await)?;

            chat_full.linked_chat_id() == Some(sender_chat.id.0)
        }
    } else if let Some(user) = &message.from {
        let ChatMember { kind, .. } =
            teloxide_retry!(bot.get_chat_member(message.chat.id, user.id).await)?;
        kind.is_privileged()
    } else {
        false
    };

    Ok(is_admin)
}
