use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use serenity::prelude::TypeMapKey;
use tokio::time::sleep;

use crate::cache::{CacheSnapshot, CacheStore};
use crate::error::CatalogError;
use crate::spotify::{self, Album, SpotifyClient, Track};
use crate::ytmusic::{AlbumHit, AlbumPage, YtMusicClient};

/// Pause between per-owner retrieval passes in a roster sweep. This is a
/// deliberate throughput cap so the provider is never burst; do not
/// parallelize the sweep without rethinking the rate limit.
const SWEEP_PAUSE: Duration = Duration::from_millis(500);

/// One upload-listing source the aggregator can sweep.
#[async_trait]
pub trait UploadSource {
    async fn fetch_uploads(&self, channel_id: &str) -> Result<Vec<Value>, CatalogError>;
}

/// Sweep every roster entry strictly sequentially, concatenating per-owner
/// results in roster order. A failed owner contributes nothing and the
/// sweep continues; no cross-source dedup is applied since roster channels
/// are owner-disjoint.
pub async fn sweep_roster<S>(source: &S, roster: &[(&str, &str)]) -> Vec<Value>
where
    S: UploadSource + Sync,
{
    let mut all_videos = Vec::new();

    for (name, channel_id) in roster {
        info!("📡 Fetching videos from {}...", name);
        match source.fetch_uploads(channel_id).await {
            Ok(videos) => {
                info!("✅ Found {} videos from {}", videos.len(), name);
                all_videos.extend(videos);
            }
            Err(e) => {
                warn!("⚠️ Error fetching channel {}: {}", channel_id, e);
            }
        }
        sleep(SWEEP_PAUSE).await;
    }

    all_videos
}

/// Two-tier video cache. The in-memory list is consulted first and falls
/// back to the disk snapshot on a cold start; both tiers are replaced
/// wholesale after every successful sweep. There is no incremental update.
pub struct CatalogCache {
    memory: Vec<Value>,
    store: CacheStore,
}

impl CatalogCache {
    pub fn new(store: CacheStore) -> Self {
        Self {
            memory: Vec::new(),
            store,
        }
    }

    /// Replace both tiers with the result of a finished sweep. The
    /// in-memory tier is updated even when persistence fails; the save
    /// error comes back so the caller can surface a warning.
    pub fn replace(&mut self, videos: Vec<Value>) -> Result<(), CatalogError> {
        let snapshot = CacheSnapshot::now(videos.clone());
        self.memory = videos;
        self.store.save(&snapshot)
    }

    /// Current item list, loading the disk snapshot when memory is cold.
    /// Staleness is advisory: an out-of-window snapshot is logged and
    /// served anyway.
    pub fn current(&mut self) -> &[Value] {
        if self.memory.is_empty() {
            let snapshot = self.store.load();
            if !snapshot.is_empty() {
                if snapshot.is_fresh() {
                    info!("📂 Loaded {} videos from disk cache", snapshot.videos.len());
                } else {
                    info!(
                        "📂 Serving stale disk cache ({} videos, {}h old)",
                        snapshot.videos.len(),
                        snapshot.age_secs() / 3600
                    );
                }
                self.memory = snapshot.videos;
            }
        }
        &self.memory
    }
}

pub struct CatalogCacheKey;

impl TypeMapKey for CatalogCacheKey {
    type Value = CatalogCache;
}

/// One release plus its tracklist, in delivery order.
#[derive(Debug, Clone)]
pub struct ReleaseListing {
    pub album: Album,
    pub tracks: Vec<Track>,
}

/// Sort releases most-recent-first. Release dates are ISO-like string
/// prefixes, so a descending string sort is a date sort; a missing date
/// compares lowest and lands last. The sort is stable, so provider return
/// order breaks ties.
pub fn sort_releases(albums: &mut [Album]) {
    albums.sort_by(|a, b| b.release_date.cmp(&a.release_date));
}

/// Full music-store discography flow: resolve the artist from the URL,
/// fetch a fresh token, page the album listing, reduce it to owned unique
/// releases, sort, then fetch each release's tracks in listing order.
pub async fn fetch_discography(
    client: &SpotifyClient,
    artist_url: &str,
) -> Result<Vec<ReleaseListing>, CatalogError> {
    let artist_id = spotify::artist_id_from_url(artist_url)
        .ok_or_else(|| CatalogError::Resolve(format!("not a Spotify artist URL: {}", artist_url)))?;

    let token = client.request_token().await?;
    let albums = client.fetch_artist_albums(&token, &artist_id).await;
    let mut albums = spotify::filter_owned_releases(albums, &artist_id);
    sort_releases(&mut albums);

    let mut listings = Vec::new();
    for album in albums {
        let tracks = client.fetch_album_tracks(&token, &album.id).await;
        listings.push(ReleaseListing { album, tracks });
    }

    Ok(listings)
}

/// Music-search discography: album hits in provider order, no re-sort.
/// An album whose track fetch fails is skipped, not fatal.
pub async fn fetch_ytmusic_discography(
    client: &YtMusicClient,
    artist: &str,
) -> Result<Vec<(AlbumHit, AlbumPage)>, CatalogError> {
    let hits = client.search_albums(artist).await?;

    let mut albums = Vec::new();
    for hit in hits {
        match client.album_tracks(&hit.browse_id).await {
            Ok(page) => albums.push((hit, page)),
            Err(e) => warn!("⚠️ Skipping album '{}': {}", hit.title, e),
        }
    }

    Ok(albums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{collect_paged, Page};
    use serde_json::json;
    use uuid::Uuid;

    fn dated_album(id: &str, release_date: Option<&str>) -> Album {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("release {}", id),
            "release_date": release_date,
            "artists": [{"id": "me"}]
        }))
        .unwrap()
    }

    #[test]
    fn releases_sort_descending_with_missing_dates_last() {
        let mut albums = vec![
            dated_album("old", Some("2020-01-01")),
            dated_album("new", Some("2022-05-05")),
            dated_album("undated", None),
        ];
        sort_releases(&mut albums);

        let order: Vec<&str> = albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "undated"]);
    }

    #[test]
    fn release_sort_is_stable_on_equal_dates() {
        let mut albums = vec![
            dated_album("first", Some("2021-06-01")),
            dated_album("second", Some("2021-06-01")),
            dated_album("third", Some("2021-06-01")),
        ];
        sort_releases(&mut albums);

        let order: Vec<&str> = albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    /// Fake source: one channel loses its third page mid-sweep, one channel
    /// has nothing at all.
    struct FakeSource;

    #[async_trait]
    impl UploadSource for FakeSource {
        async fn fetch_uploads(&self, channel_id: &str) -> Result<Vec<Value>, CatalogError> {
            match channel_id {
                "UC_flaky" => {
                    let (items, aborted) = collect_paged(|cursor| async move {
                        match cursor.as_deref() {
                            None => Ok(Page {
                                items: vec![json!({"v": 1}), json!({"v": 2})],
                                next_cursor: Some("page2".to_string()),
                            }),
                            Some("page2") => Ok(Page {
                                items: vec![json!({"v": 3})],
                                next_cursor: Some("page3".to_string()),
                            }),
                            Some(_) => {
                                Err(CatalogError::Shape("third page unavailable".to_string()))
                            }
                        }
                    })
                    .await;
                    assert!(aborted.is_some());
                    Ok(items)
                }
                "UC_empty" => Ok(Vec::new()),
                other => panic!("unexpected channel {}", other),
            }
        }
    }

    #[tokio::test]
    async fn sweep_merges_partials_and_always_completes() {
        let roster = [("flaky", "UC_flaky"), ("empty", "UC_empty")];
        let videos = sweep_roster(&FakeSource, &roster).await;

        assert_eq!(
            videos,
            vec![json!({"v": 1}), json!({"v": 2}), json!({"v": 3})]
        );
    }

    #[test]
    fn cold_cache_falls_back_to_disk_and_stays_warm() {
        let path =
            std::env::temp_dir().join(format!("catalog_cache_test_{}.json", Uuid::new_v4()));

        let mut warm = CatalogCache::new(CacheStore::new(&path));
        warm.replace(vec![json!({"v": "persisted"})]).unwrap();

        let mut cold = CatalogCache::new(CacheStore::new(&path));
        assert_eq!(cold.current(), &[json!({"v": "persisted"})]);
        // Second read comes from memory even if the file disappears.
        let _ = std::fs::remove_file(&path);
        assert_eq!(cold.current(), &[json!({"v": "persisted"})]);
    }

    #[test]
    fn empty_cache_with_no_snapshot_stays_empty() {
        let path =
            std::env::temp_dir().join(format!("catalog_cache_test_{}.json", Uuid::new_v4()));
        let mut cache = CatalogCache::new(CacheStore::new(&path));
        assert!(cache.current().is_empty());
    }
}
