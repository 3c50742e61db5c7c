use std::time::Duration;

use log::warn;
use serde_json::{json, Value};

use crate::error::CatalogError;
use crate::pages::{collect_paged, Page};

const API_BASE: &str = "https://music.youtube.com/youtubei/v1";
/// Web-client context the music frontend sends with every request; the
/// endpoints reject bodies without it.
const CLIENT_NAME: &str = "WEB_REMIX";
const CLIENT_VERSION: &str = "1.20240101.01.00";
/// Search filter parameter restricting results to albums.
const ALBUM_FILTER_PARAMS: &str = "EgWKAQIYAWoMEA4QChADEAQQCRAF";

/// One album search hit: enough to browse the full album.
#[derive(Debug, Clone)]
pub struct AlbumHit {
    pub title: String,
    pub browse_id: String,
}

/// Browse result for one album.
#[derive(Debug, Clone)]
pub struct AlbumPage {
    pub tracks: Vec<String>,
    pub cover_url: Option<String>,
}

/// Client for the YouTube Music internal web API, the same surface the
/// music frontend itself talks to. No credential is needed for searching
/// and browsing public albums.
#[derive(Clone)]
pub struct YtMusicClient {
    http: reqwest::Client,
}

impl YtMusicClient {
    pub fn new() -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }

    fn base_body() -> Value {
        json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION,
                    "hl": "en"
                }
            }
        })
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<Value, CatalogError> {
        let url = format!("{}/{}?prettyPrint=false", API_BASE, endpoint);
        let response = self
            .http
            .post(&url)
            .header("Origin", "https://music.youtube.com")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(
                format!("youtubei {}", endpoint),
                response.status(),
            ));
        }

        Ok(response.json().await?)
    }

    async fn search_page(
        &self,
        query: &str,
        continuation: Option<&str>,
    ) -> Result<Page<AlbumHit>, CatalogError> {
        let mut body = Self::base_body();
        match continuation {
            Some(token) => {
                body["continuation"] = json!(token);
            }
            None => {
                body["query"] = json!(query);
                body["params"] = json!(ALBUM_FILTER_PARAMS);
            }
        }

        let data = self.post("search", body).await?;
        Ok(parse_search_page(&data))
    }

    /// Album search with continuation paging, provider return order. A
    /// continuation failure keeps the hits already collected.
    pub async fn search_albums(&self, query: &str) -> Result<Vec<AlbumHit>, CatalogError> {
        let client = self.clone();
        let query_owned = query.to_string();

        let (hits, aborted) = collect_paged(move |cursor| {
            let client = client.clone();
            let query = query_owned.clone();
            async move { client.search_page(&query, cursor.as_deref()).await }
        })
        .await;

        if let Some(e) = aborted {
            warn!(
                "⚠️ Album search for '{}' aborted after {} hits: {}",
                query,
                hits.len(),
                e
            );
        }
        Ok(hits)
    }

    /// Tracklist and cover art for one album browse id.
    pub async fn album_tracks(&self, browse_id: &str) -> Result<AlbumPage, CatalogError> {
        let mut body = Self::base_body();
        body["browseId"] = json!(browse_id);

        let data = self.post("browse", body).await?;
        parse_album_page(&data)
    }
}

/// Depth-first collection of every value held under `key` anywhere in the
/// response tree. The music frontend reshuffles its renderer nesting
/// between experiments, so structural pinpointing breaks more often than
/// it helps; item renderers are found wherever they sit.
fn find_all<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    out.push(v);
                }
                find_all(v, key, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                find_all(v, key, out);
            }
        }
        _ => {}
    }
}

fn first_run_text(column: &Value) -> Option<&str> {
    column.pointer("/text/runs/0/text").and_then(Value::as_str)
}

fn item_title(renderer: &Value) -> Option<&str> {
    renderer
        .pointer("/flexColumns/0/musicResponsiveListItemFlexColumnRenderer")
        .and_then(first_run_text)
}

fn item_browse_id(renderer: &Value) -> Option<&str> {
    renderer
        .pointer("/navigationEndpoint/browseEndpoint/browseId")
        .and_then(Value::as_str)
        .or_else(|| {
            renderer
                .pointer(
                    "/flexColumns/0/musicResponsiveListItemFlexColumnRenderer/text/runs/0\
                     /navigationEndpoint/browseEndpoint/browseId",
                )
                .and_then(Value::as_str)
        })
}

fn continuation_token(data: &Value) -> Option<String> {
    let mut nodes = Vec::new();
    find_all(data, "nextContinuationData", &mut nodes);
    if let Some(token) = nodes
        .first()
        .and_then(|n| n.get("continuation"))
        .and_then(Value::as_str)
    {
        return Some(token.to_string());
    }

    let mut commands = Vec::new();
    find_all(data, "continuationCommand", &mut commands);
    commands
        .first()
        .and_then(|n| n.get("token"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_search_page(data: &Value) -> Page<AlbumHit> {
    let mut renderers = Vec::new();
    find_all(data, "musicResponsiveListItemRenderer", &mut renderers);

    let mut hits = Vec::new();
    for renderer in renderers {
        let title = match item_title(renderer) {
            Some(title) => title,
            None => continue,
        };
        let browse_id = match item_browse_id(renderer) {
            Some(id) => id,
            None => continue,
        };
        hits.push(AlbumHit {
            title: title.to_string(),
            browse_id: browse_id.to_string(),
        });
    }

    Page {
        items: hits,
        next_cursor: continuation_token(data),
    }
}

fn parse_album_page(data: &Value) -> Result<AlbumPage, CatalogError> {
    let mut renderers = Vec::new();
    find_all(data, "musicResponsiveListItemRenderer", &mut renderers);

    let tracks: Vec<String> = renderers
        .iter()
        .filter_map(|renderer| item_title(renderer).map(str::to_string))
        .collect();

    if tracks.is_empty() {
        return Err(CatalogError::Shape(
            "album browse response had no track rows".to_string(),
        ));
    }

    let mut thumbs = Vec::new();
    find_all(data, "musicThumbnailRenderer", &mut thumbs);
    // Thumbnails are listed smallest first; the last one is the full-size cover.
    let cover_url = thumbs
        .first()
        .and_then(|thumb| thumb.pointer("/thumbnail/thumbnails"))
        .and_then(Value::as_array)
        .and_then(|list| list.last())
        .and_then(|entry| entry.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(AlbumPage { tracks, cover_url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_result_item(title: &str, browse_id: &str) -> Value {
        json!({
            "musicResponsiveListItemRenderer": {
                "flexColumns": [{
                    "musicResponsiveListItemFlexColumnRenderer": {
                        "text": {"runs": [{"text": title}]}
                    }
                }],
                "navigationEndpoint": {"browseEndpoint": {"browseId": browse_id}}
            }
        })
    }

    #[test]
    fn search_page_extracts_titles_and_browse_ids() {
        let data = json!({
            "contents": {
                "sectionListRenderer": {
                    "contents": [{
                        "musicShelfRenderer": {
                            "contents": [
                                search_result_item("First Album", "MPREb_first"),
                                search_result_item("Second Album", "MPREb_second")
                            ]
                        }
                    }]
                }
            }
        });

        let page = parse_search_page(&data);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "First Album");
        assert_eq!(page.items[0].browse_id, "MPREb_first");
        assert_eq!(page.items[1].browse_id, "MPREb_second");
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn search_page_picks_up_continuation_token() {
        let data = json!({
            "contents": {
                "musicShelfRenderer": {
                    "contents": [search_result_item("Only Hit", "MPREb_only")],
                    "continuations": [{
                        "nextContinuationData": {"continuation": "CONT_TOKEN_1"}
                    }]
                }
            }
        });

        let page = parse_search_page(&data);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("CONT_TOKEN_1"));
    }

    #[test]
    fn hits_without_a_browse_id_are_skipped() {
        let data = json!({
            "contents": [{
                "musicResponsiveListItemRenderer": {
                    "flexColumns": [{
                        "musicResponsiveListItemFlexColumnRenderer": {
                            "text": {"runs": [{"text": "No Endpoint"}]}
                        }
                    }]
                }
            }]
        });

        let page = parse_search_page(&data);
        assert!(page.items.is_empty());
    }

    #[test]
    fn album_page_extracts_tracks_and_largest_cover() {
        let data = json!({
            "header": {
                "musicDetailHeaderRenderer": {
                    "thumbnail": {
                        "croppedSquareThumbnailRenderer": {
                            "musicThumbnailRenderer": {
                                "thumbnail": {
                                    "thumbnails": [
                                        {"url": "https://img/small", "width": 60},
                                        {"url": "https://img/large", "width": 544}
                                    ]
                                }
                            }
                        }
                    }
                }
            },
            "contents": {
                "musicShelfRenderer": {
                    "contents": [
                        search_result_item("Opening Theme", "ignored"),
                        search_result_item("Closing Theme", "ignored")
                    ]
                }
            }
        });

        let page = parse_album_page(&data).unwrap();
        assert_eq!(page.tracks, vec!["Opening Theme", "Closing Theme"]);
        assert_eq!(page.cover_url.as_deref(), Some("https://img/large"));
    }

    #[test]
    fn album_page_without_tracks_is_a_shape_error() {
        let data = json!({"contents": {}});
        assert!(parse_album_page(&data).is_err());
    }
}
