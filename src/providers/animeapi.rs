use super::http::{decode, ProviderError};
use super::{de_opt_id, key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://animeapi.my.id";

/// Cross-platform id map for one title, as returned by AnimeAPI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeApiRelations {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub anidb: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub anilist: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub animeplanet: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub anisearch: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub annict: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub imdb: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub kaize: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub kitsu: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub livechart: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub myanimelist: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub notify: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub otakotaku: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub shikimori: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub shoboi: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub silveryasha: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub simkl: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub themoviedb: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub trakt: Option<String>,
    pub trakt_type: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub trakt_season: Option<String>,
}

pub struct AnimeApi {
    client: Client,
    cache: FileCache,
}

impl AnimeApi {
    pub fn new(client: Client, cache: FileCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Look up every known id for `id` on `platform` (an AnimeAPI slug such
    /// as `anilist` or `myanimelist`).
    pub async fn relations(&self, platform: &str, id: &str) -> Result<AnimeApiRelations> {
        if id.trim().is_empty() {
            return Err(ProviderError::InvalidArgument("empty id".into()));
        }
        let key = format!("{}/{}.json", platform, key_segment(id));
        self.cache
            .get_or_fetch(&key, || async move {
                let response = self
                    .client
                    .get(format!(
                        "{}/{}/{}",
                        BASE_URL,
                        platform,
                        urlencoding::encode(id.trim())
                    ))
                    .send()
                    .await?;
                decode("animeapi", response).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_decode_relations() {
        let body = r#"{
            "title": "Cowboy Bebop",
            "anidb": 23,
            "anilist": 1,
            "animeplanet": "cowboy-bebop",
            "anisearch": 1572,
            "annict": 360,
            "imdb": "tt0213338",
            "kaize": "cowboy-bebop",
            "kitsu": 1,
            "livechart": null,
            "myanimelist": 1,
            "notify": "Tk3ccKimg",
            "otakotaku": 1149,
            "shikimori": 1,
            "shoboi": 538,
            "silveryasha": 2652,
            "simkl": 37089,
            "themoviedb": 30991,
            "trakt": 30857,
            "trakt_type": "shows",
            "trakt_season": 1
        }"#;
        let rel: AnimeApiRelations = parse_json(body).unwrap();
        assert_eq!(rel.myanimelist.as_deref(), Some("1"));
        assert_eq!(rel.animeplanet.as_deref(), Some("cowboy-bebop"));
        assert_eq!(rel.trakt_season.as_deref(), Some("1"));
        assert!(rel.livechart.is_none());
    }
}
