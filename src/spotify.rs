use std::collections::HashSet;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::CatalogError;
use crate::pages::{collect_paged, Page};

const ACCOUNTS_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

static ARTIST_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"artist/([A-Za-z0-9]+)").expect("artist URL pattern is valid"));

/// Extract the artist id from an open.spotify.com artist URL. Query strings
/// and locale path segments are tolerated.
pub fn artist_id_from_url(url: &str) -> Option<String> {
    ARTIST_URL_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub album_type: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

impl Album {
    /// "2014" out of "2014-06-23"; unknown dates render as "????".
    pub fn release_year(&self) -> &str {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .unwrap_or("????")
    }

    /// Capitalized album type for the release header ("Album", "Single").
    pub fn kind(&self) -> String {
        let kind = self.album_type.as_deref().unwrap_or("album");
        let mut chars = kind.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }

    /// Spotify orders images largest first.
    pub fn cover_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
struct PagedResponse<T> {
    #[serde(default)]
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client for the Spotify Web API with client-credentials auth.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl SpotifyClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    /// Exchange client credentials for a short-lived bearer token. Called
    /// once per discography request; tokens are never cached or shared
    /// across requests.
    pub async fn request_token(&self) -> Result<String, CatalogError> {
        let credentials =
            general_purpose::STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http
            .post(ACCOUNTS_TOKEN_URL)
            .header("Authorization", format!("Basic {}", credentials))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(
                "token endpoint".to_string(),
                response.status(),
            ));
        }

        let token: TokenResponse = response.json().await?;
        token
            .access_token
            .ok_or_else(|| CatalogError::Shape("token response had no access_token".to_string()))
    }

    async fn fetch_page<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
    ) -> Result<Page<T>, CatalogError> {
        let response = self.http.get(url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(url.to_string(), response.status()));
        }

        let page: PagedResponse<T> = response.json().await?;
        Ok(Page {
            items: page.items,
            next_cursor: page.next,
        })
    }

    async fn albums_page(
        &self,
        token: &str,
        artist_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Album>, CatalogError> {
        // The continuation cursor is the full `next` URL Spotify returns.
        let url = match cursor {
            Some(next) => next.to_string(),
            None => format!(
                "{}/artists/{}/albums?limit=50&include_groups=album,single",
                API_BASE, artist_id
            ),
        };
        self.fetch_page(token, &url).await
    }

    async fn tracks_page(
        &self,
        token: &str,
        album_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Track>, CatalogError> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => format!("{}/albums/{}/tracks?limit=50", API_BASE, album_id),
        };
        self.fetch_page(token, &url).await
    }

    /// Every album/single listing for the artist, Spotify return order.
    /// A page failure keeps the albums already retrieved.
    pub async fn fetch_artist_albums(&self, token: &str, artist_id: &str) -> Vec<Album> {
        let client = self.clone();
        let token = token.to_string();
        let artist = artist_id.to_string();

        let (albums, aborted) = collect_paged(move |cursor| {
            let client = client.clone();
            let token = token.clone();
            let artist = artist.clone();
            async move { client.albums_page(&token, &artist, cursor.as_deref()).await }
        })
        .await;

        if let Some(e) = aborted {
            warn!(
                "⚠️ Album listing for {} aborted after {} albums: {}",
                artist_id,
                albums.len(),
                e
            );
        }
        albums
    }

    /// Track listing for one album, provider order preserved.
    pub async fn fetch_album_tracks(&self, token: &str, album_id: &str) -> Vec<Track> {
        let client = self.clone();
        let token = token.to_string();
        let album = album_id.to_string();

        let (tracks, aborted) = collect_paged(move |cursor| {
            let client = client.clone();
            let token = token.clone();
            let album = album.clone();
            async move { client.tracks_page(&token, &album, cursor.as_deref()).await }
        })
        .await;

        if let Some(e) = aborted {
            warn!(
                "⚠️ Track listing for album {} aborted after {} tracks: {}",
                album_id,
                tracks.len(),
                e
            );
        }
        tracks
    }
}

/// Ownership filter plus duplicate collapse for the music-store listing.
///
/// Spotify returns the same release duplicated across regional markets and
/// compilation credits. Pass 1 drops albums the requested artist is not
/// credited on; pass 2 iterates in arrival order and keeps only the first
/// occurrence of each distinct album name. Kept order is first-seen order.
pub fn filter_owned_releases(albums: Vec<Album>, artist_id: &str) -> Vec<Album> {
    let owned = albums
        .into_iter()
        .filter(|album| album.artists.iter().any(|artist| artist.id == artist_id));

    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for album in owned {
        if seen.insert(album.name.clone()) {
            unique.push(album);
        }
    }
    unique
}
