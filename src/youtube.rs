use std::time::Duration;

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::error::CatalogError;
use crate::pages::{collect_paged, Page};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Client for YouTube Data API v3 upload listings.
///
/// Retrieval is two-step: resolve the channel's uploads playlist, then page
/// through that playlist's items. Items are kept in provider-native JSON
/// because the cache persists raw provider records.
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Deserialize)]
struct ChannelItem {
    #[serde(rename = "contentDetails")]
    content_details: ContentDetails,
}

#[derive(Deserialize)]
struct ContentDetails {
    #[serde(rename = "relatedPlaylists")]
    related_playlists: RelatedPlaylists,
}

#[derive(Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Deserialize)]
struct PlaylistItemsPage {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
        })
    }

    /// Resolve the uploads playlist backing a channel's video listing.
    /// Failing here fails the whole channel; there is nothing to page yet.
    async fn resolve_uploads_playlist(&self, channel_id: &str) -> Result<String, CatalogError> {
        let url = format!("{}/channels", API_BASE);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("part", "contentDetails"),
                ("id", channel_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(
                format!("channel lookup for {}", channel_id),
                response.status(),
            ));
        }

        let data: ChannelListResponse = response.json().await?;
        data.items
            .into_iter()
            .next()
            .and_then(|item| item.content_details.related_playlists.uploads)
            .ok_or_else(|| {
                CatalogError::Resolve(format!("channel {} has no uploads playlist", channel_id))
            })
    }

    async fn uploads_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<Value>, CatalogError> {
        let url = format!("{}/playlistItems", API_BASE);
        let mut request = self.http.get(&url).query(&[
            ("part", "snippet"),
            ("maxResults", "50"),
            ("playlistId", playlist_id),
            ("key", self.api_key.as_str()),
        ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status(
                format!("playlistItems for {}", playlist_id),
                response.status(),
            ));
        }

        let page: PlaylistItemsPage = response.json().await?;
        Ok(Page {
            items: page.items,
            next_cursor: page.next_page_token,
        })
    }

    /// Fetch every upload of a channel in provider pagination order. A page
    /// failure keeps whatever was already retrieved; only a failed playlist
    /// resolution loses the channel entirely.
    pub async fn fetch_uploads(&self, channel_id: &str) -> Result<Vec<Value>, CatalogError> {
        let playlist_id = self.resolve_uploads_playlist(channel_id).await?;

        let client = self.clone();
        let (videos, aborted) = collect_paged(move |cursor| {
            let client = client.clone();
            let playlist_id = playlist_id.clone();
            async move { client.uploads_page(&playlist_id, cursor.as_deref()).await }
        })
        .await;

        if let Some(e) = aborted {
            warn!(
                "⚠️ Upload listing for {} aborted after {} videos: {}",
                channel_id,
                videos.len(),
                e
            );
        }
        Ok(videos)
    }
}

#[async_trait::async_trait]
impl crate::catalog::UploadSource for YouTubeClient {
    async fn fetch_uploads(&self, channel_id: &str) -> Result<Vec<Value>, CatalogError> {
        YouTubeClient::fetch_uploads(self, channel_id).await
    }
}

/// Pull the video id out of a listing entry. The payload shape varies by
/// endpoint: playlistItems nest it under `snippet.resourceId.videoId`,
/// other listings carry it at `snippet.id`. Both paths are kept.
pub fn extract_video_id(video: &Value) -> Option<&str> {
    let snippet = video.get("snippet")?;
    snippet
        .pointer("/resourceId/videoId")
        .and_then(Value::as_str)
        .or_else(|| snippet.get("id").and_then(Value::as_str))
}

pub fn video_title(video: &Value) -> &str {
    video
        .pointer("/snippet/title")
        .and_then(Value::as_str)
        .unwrap_or("Unknown Title")
}

pub fn video_owner(video: &Value) -> &str {
    video
        .pointer("/snippet/videoOwnerChannelTitle")
        .and_then(Value::as_str)
        .unwrap_or("Unknown Channel")
}

pub fn video_thumbnail(video: &Value) -> Option<&str> {
    video
        .pointer("/snippet/thumbnails/high/url")
        .and_then(Value::as_str)
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn video_id_from_playlist_item_shape() {
        let video = json!({
            "snippet": {
                "title": "Morning Tape",
                "resourceId": {"videoId": "abc123XYZ"}
            }
        });
        assert_eq!(extract_video_id(&video), Some("abc123XYZ"));
    }

    #[test]
    fn video_id_falls_back_to_snippet_id() {
        let video = json!({"snippet": {"id": "fallback99", "title": "B-side"}});
        assert_eq!(extract_video_id(&video), Some("fallback99"));
    }

    #[test]
    fn video_id_prefers_resource_id_when_both_present() {
        let video = json!({
            "snippet": {
                "id": "secondary",
                "resourceId": {"videoId": "primary"}
            }
        });
        assert_eq!(extract_video_id(&video), Some("primary"));
    }

    #[test]
    fn entry_without_any_id_yields_none() {
        let video = json!({"snippet": {"title": "untitled"}});
        assert_eq!(extract_video_id(&video), None);
        assert_eq!(extract_video_id(&json!({})), None);
    }

    #[test]
    fn snippet_accessors_default_when_fields_are_absent() {
        let video = json!({"snippet": {}});
        assert_eq!(video_title(&video), "Unknown Title");
        assert_eq!(video_owner(&video), "Unknown Channel");
        assert_eq!(video_thumbnail(&video), None);
    }

    #[test]
    fn playlist_page_deserializes_with_and_without_cursor() {
        let with_cursor: PlaylistItemsPage = serde_json::from_value(json!({
            "items": [{"snippet": {"title": "t"}}],
            "nextPageToken": "CAUQAA"
        }))
        .unwrap();
        assert_eq!(with_cursor.items.len(), 1);
        assert_eq!(with_cursor.next_page_token.as_deref(), Some("CAUQAA"));

        let last_page: PlaylistItemsPage =
            serde_json::from_value(json!({"items": []})).unwrap();
        assert!(last_page.items.is_empty());
        assert!(last_page.next_page_token.is_none());
    }
}
