use super::http::{decode, require, ProviderError};
use super::{key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

const API_URL: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumImage {
    pub url: String,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<AlbumImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub duration_ms: u64,
    pub explicit: bool,
    pub popularity: Option<u32>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Album,
    pub external_urls: ExternalUrls,
}

impl Track {
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `m:ss`
    pub fn duration_display(&self) -> String {
        let secs = self.duration_ms / 1000;
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.album.images.first().map(|i| i.url.as_str())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize, Serialize)]
struct Tracks {
    items: Vec<Track>,
}

#[derive(Deserialize, Serialize)]
struct SearchResponse {
    tracks: Tracks,
}

pub struct Spotify {
    client: Client,
    cache: FileCache,
    client_id: Option<String>,
    client_secret: Option<String>,
    token: Mutex<Option<(String, Instant)>>,
}

impl Spotify {
    pub fn new(
        client: Client,
        cache: FileCache,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            client,
            cache,
            client_id,
            client_secret,
            token: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Client-credentials token, reused until a minute before it expires.
    async fn access_token(&self) -> Result<String> {
        let id = require(&self.client_id, "SPOTIFY_CLIENT_ID")?;
        let secret = require(&self.client_secret, "SPOTIFY_CLIENT_SECRET")?;

        let mut guard = self.token.lock().await;
        if let Some((token, expires_at)) = guard.as_ref() {
            if Instant::now() < *expires_at {
                return Ok(token.clone());
            }
        }

        debug!("Requesting new Spotify access token");
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = decode("spotify", response).await?;
        let lifetime = Duration::from_secs(token.expires_in.saturating_sub(60));
        *guard = Some((token.access_token.clone(), Instant::now() + lifetime));
        Ok(token.access_token)
    }

    pub async fn search_track(&self, query: &str) -> Result<Vec<Track>> {
        if query.trim().is_empty() {
            return Err(ProviderError::InvalidArgument("search query is empty".into()));
        }
        let key = format!("search/track/{}.json", key_segment(query));
        self.cache
            .get_or_fetch(&key, || async move {
                let token = self.access_token().await?;
                let response = self
                    .client
                    .get(format!("{}/search", API_URL))
                    .bearer_auth(token)
                    .query(&[("q", query.trim()), ("type", "track"), ("limit", "5")])
                    .send()
                    .await?;
                let found: SearchResponse = decode("spotify", response).await?;
                Ok(found.tracks.items)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_decode_search() {
        let body = r#"{"tracks": {"items": [{
            "id": "4uLU6hMCjMI75M1A2tKUQC",
            "name": "Tank!",
            "duration_ms": 211000,
            "explicit": false,
            "popularity": 60,
            "artists": [{ "name": "SEATBELTS" }, { "name": "Yoko Kanno" }],
            "album": { "name": "COWBOY BEBOP", "release_date": "1998-05-21", "images": [{ "url": "https://i.scdn.co/a.jpg", "width": 640 }] },
            "external_urls": { "spotify": "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC" }
        }]}}"#;
        let found: SearchResponse = parse_json(body).unwrap();
        let track = &found.tracks.items[0];
        assert_eq!(track.artist_names(), "SEATBELTS, Yoko Kanno");
        assert_eq!(track.duration_display(), "3:31");
        assert_eq!(track.cover_url(), Some("https://i.scdn.co/a.jpg"));
    }

    #[tokio::test]
    async fn test_missing_secret() {
        let dir = tempfile::tempdir().unwrap();
        let spotify = Spotify::new(
            Client::new(),
            FileCache::new(dir.path(), Duration::from_secs(60)),
            Some("id".into()),
            None,
        );
        assert!(matches!(
            spotify.search_track("tank").await,
            Err(ProviderError::MissingCredential("SPOTIFY_CLIENT_SECRET"))
        ));
    }
}
