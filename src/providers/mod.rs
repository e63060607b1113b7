//! HTTP wrappers around the upstream metadata services.
//!
//! Each wrapper owns a [`FileCache`] under `<cache dir>/<provider>/` and follows
//! the same read-cache, fetch, write-cache sequence through
//! [`FileCache::get_or_fetch`].

pub mod animeapi;
pub mod anilist;
pub mod exchange;
pub mod http;
pub mod jikan;
pub mod kitsu;
pub mod lastfm;
pub mod rawg;
pub mod shikimori;
pub mod simkl;
pub mod spotify;
pub mod trakt;
pub mod urban;

use crate::cache::FileCache;
use crate::config::Config;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

pub use http::ProviderError;

pub type Result<T> = std::result::Result<T, ProviderError>;

const HOUR: Duration = Duration::from_secs(3600);
const DAY: Duration = Duration::from_secs(86400);

/// Every provider client, built once at startup.
pub struct Providers {
    pub anilist: anilist::AniList,
    pub jikan: jikan::Jikan,
    pub shikimori: shikimori::Shikimori,
    pub simkl: simkl::Simkl,
    pub kitsu: kitsu::Kitsu,
    pub animeapi: animeapi::AnimeApi,
    pub trakt: trakt::Trakt,
    pub rawg: rawg::Rawg,
    pub lastfm: lastfm::LastFm,
    pub spotify: spotify::Spotify,
    pub exchange: exchange::ExchangeRates,
    pub urban: urban::Urban,
}

impl Providers {
    pub fn new(config: &Config, client: Client) -> Self {
        let cache = |name: &str, default: Duration| {
            FileCache::new(config.cache_root(name), config.cache_ttl(name, default))
        };

        Self {
            anilist: anilist::AniList::new(client.clone(), cache("anilist", DAY)),
            jikan: jikan::Jikan::new(client.clone(), cache("jikan", DAY)),
            shikimori: shikimori::Shikimori::new(client.clone(), cache("shikimori", DAY)),
            simkl: simkl::Simkl::new(
                client.clone(),
                cache("simkl", DAY),
                config.simkl_client_id.clone(),
            ),
            kitsu: kitsu::Kitsu::new(client.clone(), cache("kitsu", 7 * DAY)),
            animeapi: animeapi::AnimeApi::new(client.clone(), cache("animeapi", DAY)),
            trakt: trakt::Trakt::new(
                client.clone(),
                cache("trakt", DAY),
                config.trakt_api_key.clone(),
            ),
            rawg: rawg::Rawg::new(
                client.clone(),
                cache("rawg", 7 * DAY),
                config.rawg_api_key.clone(),
            ),
            lastfm: lastfm::LastFm::new(
                client.clone(),
                cache("lastfm", DAY),
                config.lastfm_api_key.clone(),
            ),
            spotify: spotify::Spotify::new(
                client.clone(),
                cache("spotify", DAY),
                config.spotify_client_id.clone(),
                config.spotify_client_secret.clone(),
            ),
            exchange: exchange::ExchangeRates::new(client.clone(), cache("exchange", 12 * HOUR)),
            urban: urban::Urban::new(client, cache("urban", DAY)),
        }
    }

    /// `(root, max_age)` for the cache sweep task.
    pub fn cache_targets(&self) -> Vec<(PathBuf, Duration)> {
        [
            self.anilist.cache(),
            self.jikan.cache(),
            self.shikimori.cache(),
            self.simkl.cache(),
            self.kitsu.cache(),
            self.animeapi.cache(),
            self.trakt.cache(),
            self.rawg.cache(),
            self.lastfm.cache(),
            self.spotify.cache(),
            self.exchange.cache(),
            self.urban.cache(),
        ]
        .into_iter()
        .map(|c| (c.root().to_path_buf(), c.ttl()))
        .collect()
    }
}

/// Turn free text into a single file-name-safe cache key segment.
pub fn key_segment(text: &str) -> String {
    urlencoding::encode(&text.trim().to_lowercase()).into_owned()
}

/// Deserialize an identifier that upstream sends as either a number or a
/// string. Empty strings and nulls become `None`.
pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| id_from_value(&v)))
}

pub(crate) fn id_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Ids {
        #[serde(default, deserialize_with = "de_opt_id")]
        a: Option<String>,
        #[serde(default, deserialize_with = "de_opt_id")]
        b: Option<String>,
        #[serde(default, deserialize_with = "de_opt_id")]
        c: Option<String>,
        #[serde(default, deserialize_with = "de_opt_id")]
        d: Option<String>,
    }

    #[test]
    fn test_lenient_ids() {
        let ids: Ids = serde_json::from_str(r#"{"a": 12, "b": "tt0123", "c": null}"#).unwrap();
        assert_eq!(ids.a.as_deref(), Some("12"));
        assert_eq!(ids.b.as_deref(), Some("tt0123"));
        assert!(ids.c.is_none());
        assert!(ids.d.is_none());
    }

    #[test]
    fn test_key_segment_is_path_safe() {
        let key = key_segment(" Cowboy/Bebop ");
        assert!(!key.contains('/'));
        assert!(key.starts_with("cowboy"));
    }
}
