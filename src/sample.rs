use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

use log::info;
use rand::seq::SliceRandom;

use crate::catalog::CatalogCacheKey;
use crate::youtube;

#[command]
/// Send one random video from the cached roster listing. Falls back to the
/// disk snapshot when memory is cold; a stale snapshot is served as-is.
pub async fn sample(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    let _typing = ctx.http.start_typing(msg.channel_id.0)?;

    let video = {
        let mut data = ctx.data.write().await;
        let cache = data
            .get_mut::<CatalogCacheKey>()
            .expect("Catalog cache not initialized");
        cache.current().choose(&mut rand::thread_rng()).cloned()
    };

    let video = match video {
        Some(video) => video,
        None => {
            msg.reply(ctx, "⚠️ You need to run `^turnon` first!").await?;
            return Ok(());
        }
    };

    let video_id = match youtube::extract_video_id(&video) {
        Some(id) => id,
        None => {
            msg.reply(ctx, "⚠️ Could not find a valid video ID in this entry.")
                .await?;
            return Ok(());
        }
    };

    let title = youtube::video_title(&video);
    let channel_name = youtube::video_owner(&video);
    let url = youtube::watch_url(video_id);
    let thumbnail = youtube::video_thumbnail(&video);

    info!(
        "🎧 Sampling '{}' from {} for user {}",
        title, channel_name, msg.author.name
    );

    if let Err(e) = msg
        .channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| {
                e.title(title);
                e.description(format!(
                    "👤 **{}**\n🎥 [Watch on YouTube]({})",
                    channel_name, url
                ));
                e.color(0xED4245);
                if let Some(thumb) = thumbnail {
                    e.thumbnail(thumb);
                }
                e
            })
        })
        .await
    {
        log::error!("❌ Failed to send sample embed: {}", e);
        msg.reply(ctx, "❌ Failed to send the video!").await?;
    }

    Ok(())
}
