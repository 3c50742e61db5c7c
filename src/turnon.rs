use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

use log::{error, info, warn};

use crate::catalog::{self, CatalogCacheKey};
use crate::config::{self, CatalogConfig};
use crate::youtube::YouTubeClient;

#[command]
/// Sweep the configured channel roster and cache the merged upload listing.
/// The cache is replaced wholesale; there is no incremental refresh.
pub async fn turnon(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    let _typing = ctx.http.start_typing(msg.channel_id.0)?;

    let catalog_config = match CatalogConfig::from_env() {
        Ok(catalog_config) => catalog_config,
        Err(e) => {
            error!("❌ Catalog configuration unavailable: {}", e);
            msg.reply(ctx, "❌ Catalog configuration is incomplete, check the bot credentials.")
                .await?;
            return Ok(());
        }
    };

    let client = match YouTubeClient::new(&catalog_config.youtube_api_key) {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Could not build YouTube client: {}", e);
            msg.reply(ctx, "❌ Error fetching videos.").await?;
            return Ok(());
        }
    };

    info!(
        "⚡ Roster sweep requested by {} ({})",
        msg.author.name, msg.author.id
    );
    let videos = catalog::sweep_roster(&client, config::CHANNELS).await;

    if videos.is_empty() {
        msg.reply(ctx, "⚠️ Couldn't fetch any videos.").await?;
        return Ok(());
    }

    let count = videos.len();
    let persisted = {
        let mut data = ctx.data.write().await;
        let cache = data
            .get_mut::<CatalogCacheKey>()
            .expect("Catalog cache not initialized");
        cache.replace(videos)
    };

    match persisted {
        Ok(()) => {
            msg.reply(
                ctx,
                format!("✅ Cached {} total videos from all channels!", count),
            )
            .await?;
        }
        Err(e) => {
            warn!("⚠️ Cache snapshot not persisted: {}", e);
            msg.reply(
                ctx,
                format!(
                    "✅ Cached {} videos for this session (snapshot could not be written to disk).",
                    count
                ),
            )
            .await?;
        }
    }

    Ok(())
}
