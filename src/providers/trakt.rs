use super::http::{decode, require, ProviderError};
use super::{de_opt_id, key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.trakt.tv";

/// Id kinds accepted by `/search/{id_type}/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraktIdType {
    Trakt,
    Imdb,
    Tmdb,
    Tvdb,
}

impl TraktIdType {
    pub fn as_str(self) -> &'static str {
        match self {
            TraktIdType::Trakt => "trakt",
            TraktIdType::Imdb => "imdb",
            TraktIdType::Tmdb => "tmdb",
            TraktIdType::Tvdb => "tvdb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraktMediaType {
    Show,
    Movie,
}

impl TraktMediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            TraktMediaType::Show => "show",
            TraktMediaType::Movie => "movie",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraktIds {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub trakt: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub imdb: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub tmdb: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub tvdb: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktItem {
    pub title: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub ids: TraktIds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktSearchHit {
    #[serde(rename = "type")]
    pub kind: String,
    pub show: Option<TraktItem>,
    pub movie: Option<TraktItem>,
}

impl TraktSearchHit {
    pub fn item(&self) -> Option<&TraktItem> {
        self.show.as_ref().or(self.movie.as_ref())
    }
}

pub struct Trakt {
    client: Client,
    cache: FileCache,
    api_key: Option<String>,
}

impl Trakt {
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

    /// Find the show or movie carrying `id`. `None` when Trakt has no match.
    pub async fn lookup(
        &self,
        id_type: TraktIdType,
        id: &str,
        media_type: TraktMediaType,
    ) -> Result<Option<TraktSearchHit>> {
        if id.trim().is_empty() {
            return Err(ProviderError::InvalidArgument("empty id".into()));
        }
        let api_key = require(&self.api_key, "TRAKT_API_KEY")?;
        let key = format!(
            "{}/{}/{}.json",
            media_type.as_str(),
            id_type.as_str(),
            key_segment(id)
        );
        self.cache
            .get_or_fetch(&key, || async move {
                let response = self
                    .client
                    .get(format!(
                        "{}/search/{}/{}",
                        BASE_URL,
                        id_type.as_str(),
                        urlencoding::encode(id.trim())
                    ))
                    .query(&[("type", media_type.as_str())])
                    .header("trakt-api-key", api_key)
                    .header("trakt-api-version", "2")
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .send()
                    .await?;
                let hits: Vec<TraktSearchHit> = decode("trakt", response).await?;
                Ok(hits.into_iter().next())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_decode_search_hit() {
        let body = r#"[{
            "type": "show",
            "score": null,
            "show": {
                "title": "Cowboy Bebop",
                "year": 1998,
                "ids": { "trakt": 30857, "slug": "cowboy-bebop", "tvdb": 76885, "imdb": "tt0213338", "tmdb": 30991 }
            }
        }]"#;
        let hits: Vec<TraktSearchHit> = parse_json(body).unwrap();
        let item = hits[0].item().unwrap();
        assert_eq!(item.ids.trakt.as_deref(), Some("30857"));
        assert_eq!(item.ids.tvdb.as_deref(), Some("76885"));
    }

    #[tokio::test]
    async fn test_lookup_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let trakt = Trakt::new(
            Client::new(),
            FileCache::new(dir.path(), std::time::Duration::from_secs(60)),
            None,
        );
        let err = trakt
            .lookup(TraktIdType::Imdb, "tt0213338", TraktMediaType::Show)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential("TRAKT_API_KEY")));
    }
}
