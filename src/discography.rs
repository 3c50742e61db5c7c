use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

use log::{error, info};

use crate::catalog;
use crate::config::{CatalogConfig, FRAME_LIMIT};
use crate::error::CatalogError;
use crate::segment::split_message;
use crate::spotify::SpotifyClient;
use crate::ytmusic::{AlbumHit, AlbumPage, YtMusicClient};

/// Numbered tracklist text, one track per line, ready for frame splitting.
fn render_tracklist<S: AsRef<str>>(tracks: &[S]) -> String {
    let mut text = String::new();
    for (idx, track) in tracks.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", idx + 1, track.as_ref()));
    }
    text
}

async fn send_frames(
    ctx: &Context,
    msg: &Message,
    tracklist: &str,
) -> Result<(), serenity::Error> {
    for frame in split_message(tracklist, FRAME_LIMIT) {
        msg.channel_id
            .say(&ctx.http, format!("```{}```", frame))
            .await?;
    }
    Ok(())
}

#[command]
#[aliases("discography_spotify")]
/// Spotify discography: one embed per release with full-size cover art,
/// most recent release first, each followed by its tracklist in
/// code-block frames.
pub async fn discography(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let artist_url = args.message().trim();

    if artist_url.is_empty() {
        msg.reply(
            ctx,
            "Please provide a Spotify artist URL! Usage: `^discography <artist-url>`",
        )
        .await?;
        return Ok(());
    }

    let catalog_config = match CatalogConfig::from_env() {
        Ok(catalog_config) => catalog_config,
        Err(e) => {
            error!("❌ Catalog configuration unavailable: {}", e);
            msg.reply(ctx, "❌ Catalog configuration is incomplete, check the bot credentials.")
                .await?;
            return Ok(());
        }
    };

    let client = match SpotifyClient::new(
        &catalog_config.spotify_client_id,
        &catalog_config.spotify_client_secret,
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Could not build Spotify client: {}", e);
            msg.reply(ctx, "❌ Error fetching Spotify discography.").await?;
            return Ok(());
        }
    };

    let _typing = ctx.http.start_typing(msg.channel_id.0)?;
    info!(
        "📀 Spotify discography requested for '{}' by {}",
        artist_url, msg.author.name
    );

    let listings = match catalog::fetch_discography(&client, artist_url).await {
        Ok(listings) => listings,
        Err(CatalogError::Resolve(reason)) => {
            info!("❓ Rejected discography request: {}", reason);
            msg.reply(ctx, "❌ Invalid Spotify artist URL.").await?;
            return Ok(());
        }
        Err(e) => {
            error!("❌ Spotify discography failed: {}", e);
            msg.reply(ctx, "❌ Error fetching Spotify discography.").await?;
            return Ok(());
        }
    };

    if listings.is_empty() {
        msg.reply(ctx, "❌ No albums, singles, or EPs found.").await?;
        return Ok(());
    }

    // Frames already sent stay sent; a rejected frame is not retried.
    if let Err(e) = deliver_spotify_listings(ctx, msg, &listings).await {
        error!("❌ Discography delivery failed: {}", e);
        msg.reply(ctx, "❌ Delivery failed part-way through the discography.")
            .await?;
    }

    Ok(())
}

async fn deliver_spotify_listings(
    ctx: &Context,
    msg: &Message,
    listings: &[catalog::ReleaseListing],
) -> Result<(), serenity::Error> {
    for listing in listings {
        let album = &listing.album;

        msg.channel_id
            .send_message(&ctx.http, |m| {
                m.embed(|e| {
                    e.title(format!(
                        "{} ({}) — {}",
                        album.name,
                        album.release_year(),
                        album.kind()
                    ));
                    e.color(0x1DB954);
                    if let Some(cover) = album.cover_url() {
                        e.image(cover);
                    }
                    e
                })
            })
            .await?;

        let names: Vec<&str> = listing.tracks.iter().map(|t| t.name.as_str()).collect();
        send_frames(ctx, msg, &render_tracklist(&names)).await?;
    }
    Ok(())
}

#[command]
/// YouTube Music discography: album search hits in provider order, each
/// delivered as a cover embed plus tracklist frames.
pub async fn discography_ytmusic(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let artist_name = args.message().trim();

    if artist_name.is_empty() {
        msg.reply(
            ctx,
            "Please provide an artist name! Usage: `^discography_ytmusic <artist>`",
        )
        .await?;
        return Ok(());
    }

    let client = match YtMusicClient::new() {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Could not build YouTube Music client: {}", e);
            msg.reply(ctx, "❌ Error fetching YouTube Music discography.")
                .await?;
            return Ok(());
        }
    };

    let _typing = ctx.http.start_typing(msg.channel_id.0)?;
    info!(
        "📀 YouTube Music discography requested for '{}' by {}",
        artist_name, msg.author.name
    );

    let albums = match catalog::fetch_ytmusic_discography(&client, artist_name).await {
        Ok(albums) => albums,
        Err(e) => {
            error!("❌ YouTube Music discography failed: {}", e);
            msg.reply(ctx, "❌ Error fetching YouTube Music discography.")
                .await?;
            return Ok(());
        }
    };

    if albums.is_empty() {
        msg.reply(ctx, "❌ No albums found on YouTube Music.").await?;
        return Ok(());
    }

    if let Err(e) = deliver_ytmusic_albums(ctx, msg, &albums).await {
        error!("❌ Discography delivery failed: {}", e);
        msg.reply(ctx, "❌ Delivery failed part-way through the discography.")
            .await?;
    }

    Ok(())
}

async fn deliver_ytmusic_albums(
    ctx: &Context,
    msg: &Message,
    albums: &[(AlbumHit, AlbumPage)],
) -> Result<(), serenity::Error> {
    for (hit, page) in albums {
        msg.channel_id
            .send_message(&ctx.http, |m| {
                m.embed(|e| {
                    e.title(&hit.title);
                    e.color(0x3498DB);
                    if let Some(cover) = &page.cover_url {
                        e.image(cover);
                    }
                    e
                })
            })
            .await?;

        send_frames(ctx, msg, &render_tracklist(&page.tracks)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracklist_is_numbered_from_one() {
        let text = render_tracklist(&["Intro", "Outro"]);
        assert_eq!(text, "1. Intro\n2. Outro\n");
    }

    #[test]
    fn empty_tracklist_renders_empty_and_produces_no_frames() {
        let text = render_tracklist::<&str>(&[]);
        assert!(text.is_empty());
        assert!(split_message(&text, FRAME_LIMIT).is_empty());
    }
}
