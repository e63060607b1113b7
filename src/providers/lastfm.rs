use super::http::{decode, require, ProviderError};
use super::{key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "#text")]
    pub url: String,
    pub size: String,
}

/// Last.fm sends every scalar as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub realname: Option<String>,
    pub url: String,
    pub country: Option<String>,
    pub playcount: Option<String>,
    pub artist_count: Option<String>,
    pub track_count: Option<String>,
    pub album_count: Option<String>,
    #[serde(default)]
    pub image: Vec<Image>,
    pub registered: Option<Registered>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registered {
    pub unixtime: String,
}

impl User {
    pub fn avatar_url(&self) -> Option<&str> {
        self.image
            .iter()
            .rev()
            .map(|i| i.url.as_str())
            .find(|u| !u.is_empty())
    }

    pub fn registered_unix(&self) -> Option<i64> {
        self.registered.as_ref()?.unixtime.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    #[serde(rename = "#text")]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowPlaying {
    pub nowplaying: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub url: String,
    pub artist: Text,
    pub album: Option<Text>,
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(rename = "@attr")]
    pub attr: Option<NowPlaying>,
}

impl Track {
    pub fn is_now_playing(&self) -> bool {
        self.attr.as_ref().is_some_and(|a| a.nowplaying == "true")
    }
}

#[derive(Deserialize, Serialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct RecentTracks {
    #[serde(default)]
    track: Vec<Track>,
}

#[derive(Deserialize)]
struct RecentEnvelope {
    recenttracks: RecentTracks,
}

/// Last.fm reports errors with HTTP 200 and an `error` code in the body.
#[derive(Deserialize)]
struct ApiError {
    error: u32,
    message: String,
}

pub struct LastFm {
    client: Client,
    cache: FileCache,
    api_key: Option<String>,
}

impl LastFm {
    pub fn new(client: Client, cache: FileCache, api_key: Option<String>) -> Self {
        Self {
            client,
            cache,
            api_key,
        }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    async fn call<T: serde::de::DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> Result<T> {
        let api_key = require(&self.api_key, "LASTFM_API_KEY")?;
        let response = self
            .client
            .get(BASE_URL)
            .query(&[("method", method), ("api_key", api_key), ("format", "json")])
            .query(query)
            .send()
            .await?;
        let value: serde_json::Value = decode("lastfm", response).await?;
        if let Ok(err) = serde_json::from_value::<ApiError>(value.clone()) {
            // 6: user or item not found
            return Err(if err.error == 6 {
                ProviderError::NotFound(err.message)
            } else {
                ProviderError::Http {
                    provider: "lastfm",
                    status: 200,
                    message: err.message,
                }
            });
        }
        super::http::parse_json(&value.to_string())
    }

    pub async fn user(&self, username: &str) -> Result<User> {
        let key = format!("user/{}.json", key_segment(username));
        self.cache
            .get_or_fetch(&key, || async move {
                let envelope: UserEnvelope =
                    self.call("user.getinfo", &[("user", username.trim())]).await?;
                Ok(envelope.user)
            })
            .await
    }

    /// Latest scrobbles, newest first. Never cached.
    pub async fn recent_tracks(&self, username: &str, limit: u8) -> Result<Vec<Track>> {
        let limit = limit.clamp(1, 50).to_string();
        let envelope: RecentEnvelope = self
            .call(
                "user.getrecenttracks",
                &[("user", username.trim()), ("limit", &limit)],
            )
            .await?;
        Ok(envelope.recenttracks.track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_decode_user() {
        let body = r##"{"user": {
            "name": "nattadasu",
            "realname": "",
            "url": "https://www.last.fm/user/nattadasu",
            "country": "Indonesia",
            "playcount": "123456",
            "image": [
                { "#text": "https://lastfm/s.png", "size": "small" },
                { "#text": "https://lastfm/xl.png", "size": "extralarge" }
            ],
            "registered": { "unixtime": "1420070400", "#text": 1420070400 }
        }}"##;
        let envelope: UserEnvelope = parse_json(body).unwrap();
        assert_eq!(envelope.user.avatar_url(), Some("https://lastfm/xl.png"));
        assert_eq!(envelope.user.registered_unix(), Some(1420070400));
    }

    #[test]
    fn test_decode_now_playing() {
        let body = r##"{"recenttracks": {"track": [
            {
                "name": "Tank!",
                "url": "https://www.last.fm/music/Seatbelts/_/Tank!",
                "artist": { "#text": "The Seatbelts" },
                "album": { "#text": "Cowboy Bebop" },
                "@attr": { "nowplaying": "true" }
            },
            {
                "name": "Rush",
                "url": "https://www.last.fm/music/Seatbelts/_/Rush",
                "artist": { "#text": "The Seatbelts" }
            }
        ]}}"##;
        let envelope: RecentEnvelope = parse_json(body).unwrap();
        let tracks = envelope.recenttracks.track;
        assert!(tracks[0].is_now_playing());
        assert!(!tracks[1].is_now_playing());
    }

    #[test]
    fn test_body_error_shape() {
        let err: ApiError =
            serde_json::from_str(r#"{"error": 6, "message": "User not found"}"#).unwrap();
        assert_eq!(err.error, 6);
    }
}
