mod cache;
mod catalog;
mod config;
mod discography;
mod error;
mod help;
mod pages;
mod sample;
mod segment;
mod spotify;
mod turnon;
mod youtube;
mod ytmusic;

use std::env;

use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    framework::standard::{macros::group, StandardFramework},
    model::gateway::Ready,
    prelude::GatewayIntents,
};
use tokio::signal;

use crate::cache::CacheStore;
use crate::catalog::{CatalogCache, CatalogCacheKey};
use crate::discography::{DISCOGRAPHY_COMMAND, DISCOGRAPHY_YTMUSIC_COMMAND};
use crate::help::HELP_COMMAND;
use crate::sample::SAMPLE_COMMAND;
use crate::turnon::TURNON_COMMAND;

#[group]
#[commands(turnon, sample, discography, discography_ytmusic, help)]
struct General;

struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        println!("🎶 Bot connected as {}!", ready.user.name);
    }
}

#[tokio::main]
async fn main() {
    // Initialize logger - must be done before any logging calls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error"))
        .format_timestamp_secs()
        .init();

    // Load configuration from botconfig.txt into the environment; running
    // with plain environment variables and no file is also fine.
    match config::load_bot_config() {
        Ok(path) => println!("✅ Configuration loaded from {}", path),
        Err(_) => println!("ℹ️ No botconfig.txt found, relying on the process environment"),
    }

    // All four provider secrets are required before serving any requests.
    let token = match config::validate_required_secrets() {
        Ok(token) => token,
        Err(e) => {
            log::error!("❌ {}", e);
            eprintln!("❌ {}", e);
            eprintln!(
                "Provide DISCORD_TOKEN, YOUTUBE_API_KEY, SPOTIFY_CLIENT_ID and \
                 SPOTIFY_CLIENT_SECRET via botconfig.txt or the environment."
            );
            return;
        }
    };

    let prefix = env::var("PREFIX").unwrap_or_else(|_| "^".to_string());
    println!("🤖 Starting bot with prefix: '{}'", prefix);

    let framework = StandardFramework::new()
        .configure(|c| {
            c.prefix(&prefix)
                .case_insensitivity(true)
                .no_dm_prefix(true)
                .with_whitespace(true)
        })
        .after(|_ctx, msg, command_name, result| {
            Box::pin(async move {
                match result {
                    Ok(()) => {}
                    Err(e) => {
                        log::error!(
                            "❌ Command '{}' failed for user {} ({}): {:?}",
                            command_name,
                            msg.author.name,
                            msg.author.id,
                            e
                        );
                    }
                }
            })
        })
        .group(&GENERAL_GROUP);

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match Client::builder(&token, intents)
        .event_handler(Handler)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Error creating Discord client: {:?}", e);
            eprintln!("❌ Error creating Discord client: {:?}", e);
            eprintln!("Check your DISCORD_TOKEN in botconfig.txt");
            return;
        }
    };

    // The two-tier video cache lives in the shared TypeMap so every command
    // handler sees the same snapshot.
    {
        let mut data = client.data.write().await;
        data.insert::<CatalogCacheKey>(CatalogCache::new(CacheStore::new(config::CACHE_FILE)));
    }

    println!("🚀 Bot is running... press Ctrl+C to stop");
    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\n⏹️ Stopping bot gracefully...");
        }
        result = client.start() => {
            if let Err(why) = result {
                log::error!("❌ Client error: {:?}", why);
                eprintln!("❌ Client error: {:?}", why);
            }
        }
    }

    println!("✅ Bot stopped");
}
