use std::{net::SocketAddr, sync::Arc};

use bot_commons::teloxide_retry;
use teloxide::{
    dptree::deps,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    update_listeners::webhooks::{self, Options},
};

use crate::{
    config::Config,
    database::MongoStore,
    handlers::{commands::Command, handle_message, Settings},
};

/// Re-register the command list every so often, in case it was changed
/// or lost on Telegram's side.
async fn refresh_commands_spinloop(bot: Bot) {
    use tokio::time::{sleep, Duration};
    loop {
        match teloxide_retry!(bot.set_my_commands(Command::generate_bot_commands()).await) {
            Ok(_) => log::debug!("Bot commands registered."),
            Err(e) => log::warn!("Failed to set bot commands: {e}"),
        }

        sleep(Duration::from_secs(60 * 60)).await;
    }
}

pub async fn entry() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Bad configuration: {e}");
            return;
        }
    };

    let bot = Bot::new(&config.bot_token);

    let store = match MongoStore::connect(&config.mongo_uri, &config.mongo_db_name).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("Failed to connect to the database: {e}");
            return;
        }
    };

    let settings = Arc::new(Settings::from_config(&config));

    if settings.indexer.is_none() {
        log::warn!("ENV_INDEXER_URL is not set, gating targets won't be checked.");
    }

    tokio::spawn(refresh_commands_spinloop(bot.clone()));

    log::info!("Creating the handler...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message::<MongoStore>));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .default_handler(|_| async {})
        .dependencies(deps![store, settings])
        .enable_ctrlc_handler()
        .build();

    log::info!("Dispatching the dispatcher!");

    match config.webhook_url {
        Some(url) => {
            let address = SocketAddr::from(([0, 0, 0, 0], config.port));
            log::info!("Listening for webhook updates on {address} for {url}");

            let listener = match webhooks::axum(bot, Options::new(address, url)).await {
                Ok(listener) => listener,
                Err(e) => {
                    log::error!("Failed to set up the webhook: {e}");
                    return;
                }
            };

            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => dispatcher.dispatch().await,
    }

    log::info!("it appears we have been bonked.");
}
