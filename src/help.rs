use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

#[command]
pub async fn help(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    let _typing = ctx.http.start_typing(msg.channel_id.0)?;

    let response = format!(
        "**Sample Bot - Music Catalog Aggregator**\n\n\
        **Video Catalog:**\n\
        • `^turnon` - Fetch and cache uploads from all configured channels\n\
        • `^sample` - Send a random video from the cached listing\n\n\
        **Discographies:**\n\
        • `^discography <artist-url>` - Spotify discography with cover art\n\
        • `^discography_ytmusic <artist>` - YouTube Music discography\n\
        • **Aliases:** `^discography_spotify`\n\n\
        **Notes:**\n\
        • The video cache persists to `video_cache.json` and survives restarts\n\
        • Long tracklists arrive as multiple messages\n\n\
        **Setup:** `botconfig.txt` with DISCORD_TOKEN, YOUTUBE_API_KEY,\n\
        SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET"
    );

    msg.reply(ctx, &response).await?;
    Ok(())
}
