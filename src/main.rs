use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::requests::Request;
use teloxide::types::{CallbackQuery, Message, Update};

use turnstile::telegram::{inbound_from_callback, inbound_from_message, TelegramGateway};
use turnstile::{config, App, BroadcastLedger, Registry};

fn config_path() -> PathBuf {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return PathBuf::from(path);
            }
        }
    }
    PathBuf::from("config.yaml")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load(&config_path())?;

    let filter = cfg.log_level.clone().unwrap_or_else(|| "info".into());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let bot = Bot::new(cfg.token.clone());
    let me = bot.get_me().send().await.context("query bot identity")?;
    info!("Starting as @{}", me.username());

    let registry = Arc::new(Registry::new(cfg.registry_path.clone()));
    let ledger = Arc::new(BroadcastLedger::new(cfg.ledger_path.clone()));
    info!("Registry holds {} active users", registry.count_active());

    let gateway = Arc::new(TelegramGateway::new(bot.clone()));
    let app = Arc::new(App::new(gateway, registry, ledger, &cfg));

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(
            |msg: Message, app: Arc<App<TelegramGateway>>| async move {
                if let Some(inbound) = inbound_from_message(&msg) {
                    app.handle(inbound).await;
                }
                respond(())
            },
        ))
        .branch(Update::filter_callback_query().endpoint(
            |query: CallbackQuery, bot: Bot, app: Arc<App<TelegramGateway>>| async move {
                // Ack first so the client stops its spinner even when the
                // update itself goes nowhere.
                if let Err(e) = bot.answer_callback_query(query.id.clone()).send().await {
                    debug!("Failed to answer callback query: {e}");
                }
                if let Some(inbound) = inbound_from_callback(&query) {
                    app.handle(inbound).await;
                }
                respond(())
            },
        ));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![app])
        .default_handler(|update| async move {
            debug!("Unhandled update: {:?}", update.kind);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("Update handler failed"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
