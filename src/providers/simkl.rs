use super::http::{decode, require, ProviderError};
use super::{id_from_value, key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const BASE_URL: &str = "https://api.simkl.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimklMediaType {
    Anime,
    Tv,
    Movie,
}

impl SimklMediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            SimklMediaType::Anime => "anime",
            SimklMediaType::Tv => "tv",
            SimklMediaType::Movie => "movies",
        }
    }
}

impl fmt::Display for SimklMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimklMediaType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "anime" => Ok(SimklMediaType::Anime),
            "tv" | "show" | "shows" => Ok(SimklMediaType::Tv),
            "movie" | "movies" => Ok(SimklMediaType::Movie),
            other => Err(ProviderError::InvalidArgument(format!(
                "SIMKL media type must be anime, tv or movie, got '{}'",
                other
            ))),
        }
    }
}

/// Identifier kinds accepted by `/search/id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimklIdType {
    Simkl,
    Mal,
    Anidb,
    Anilist,
    Kitsu,
    Imdb,
    Tmdb,
    Tvdb,
}

impl SimklIdType {
    pub fn as_str(self) -> &'static str {
        match self {
            SimklIdType::Simkl => "simkl",
            SimklIdType::Mal => "mal",
            SimklIdType::Anidb => "anidb",
            SimklIdType::Anilist => "anilist",
            SimklIdType::Kitsu => "kitsu",
            SimklIdType::Imdb => "imdb",
            SimklIdType::Tmdb => "tmdb",
            SimklIdType::Tvdb => "tvdb",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimklRating {
    pub rating: Option<f64>,
    pub votes: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ratings {
    pub simkl: Option<SimklRating>,
    pub imdb: Option<SimklRating>,
    pub mal: Option<SimklRating>,
}

/// A search hit or full title record. SIMKL mixes numbers and strings in
/// `ids`, so they are kept raw and read through [`SimklTitle::id`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimklTitle {
    pub title: String,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub ids: HashMap<String, serde_json::Value>,
    pub poster: Option<String>,
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub ratings: Ratings,
    pub total_episodes: Option<u32>,
    pub runtime: Option<u32>,
    pub status: Option<String>,
    pub anime_type: Option<String>,
    pub network: Option<String>,
    pub country: Option<String>,
}

impl SimklTitle {
    pub fn id(&self, key: &str) -> Option<String> {
        self.ids.get(key).and_then(id_from_value)
    }

    /// The SIMKL id; search results call it `simkl_id`.
    pub fn simkl_id(&self) -> Option<String> {
        self.id("simkl").or_else(|| self.id("simkl_id"))
    }

    pub fn poster_url(&self) -> Option<String> {
        self.poster
            .as_ref()
            .map(|p| format!("https://wsrv.nl/?url=https://simkl.in/posters/{}_m.jpg", p))
    }

    pub fn page_url(&self, media_type: SimklMediaType) -> Option<String> {
        let kind = match media_type {
            SimklMediaType::Anime => "anime",
            SimklMediaType::Tv => "tv",
            SimklMediaType::Movie => "movies",
        };
        self.simkl_id()
            .map(|id| format!("https://simkl.com/{}/{}", kind, id))
    }
}

pub struct Simkl {
    client: Client,
    cache: FileCache,
    client_id: Option<String>,
}

impl Simkl {
    pub fn new(client: Client, cache: FileCache, client_id: Option<String>) -> Self {
        Self {
            client,
            cache,
            client_id,
        }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let client_id = require(&self.client_id, "SIMKL_CLIENT_ID")?;
        let response = self
            .client
            .get(format!("{}{}", BASE_URL, path))
            .query(query)
            .query(&[("client_id", client_id)])
            .send()
            .await?;
        decode("simkl", response).await
    }

    /// Cross-reference an external id. Empty when SIMKL does not know it.
    ///
    /// TMDB reuses numbers across shows and movies, so `media_type` picks
    /// which one a TMDB id means. Other id types ignore it.
    pub async fn search_by_id(
        &self,
        id_type: SimklIdType,
        id: &str,
        media_type: SimklMediaType,
    ) -> Result<Vec<SimklTitle>> {
        let query = id_search_query(id_type, id, media_type);
        let key = match query.get(1) {
            Some((_, tmdb_type)) => format!("ids/tmdb/{}/{}.json", tmdb_type, key_segment(id)),
            None => format!("ids/{}/{}.json", id_type.as_str(), key_segment(id)),
        };
        self.cache
            .get_or_fetch(&key, || async move {
                // SIMKL answers an unknown id with `null` or `[]`
                let found: Option<Vec<SimklTitle>> = self.get("/search/id", &query).await?;
                Ok(found.unwrap_or_default())
            })
            .await
    }

    pub async fn search(&self, query: &str, media_type: SimklMediaType) -> Result<Vec<SimklTitle>> {
        if query.trim().is_empty() {
            return Err(ProviderError::InvalidArgument("search query is empty".into()));
        }
        let key = format!("search/{}/{}.json", media_type, key_segment(query));
        self.cache
            .get_or_fetch(&key, || async move {
                let path = format!("/search/{}", media_type.as_str());
                let found: Option<Vec<SimklTitle>> = self
                    .get(&path, &[("q", query.trim()), ("extended", "full"), ("limit", "10")])
                    .await?;
                Ok(found.unwrap_or_default())
            })
            .await
    }

    /// Full record for a SIMKL id, including every cross-reference id.
    pub async fn title(&self, id: &str, media_type: SimklMediaType) -> Result<SimklTitle> {
        if id.trim().is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ProviderError::InvalidArgument(format!(
                "SIMKL id must be numeric, got '{}'",
                id
            )));
        }
        let key = format!("{}/{}.json", media_type, id);
        self.cache
            .get_or_fetch(&key, || async move {
                self.get(&format!("/{}/{}", media_type.as_str(), id), &[("extended", "full")])
                    .await
            })
            .await
    }
}

/// Query pairs for `/search/id`. TMDB lookups also carry `type`.
fn id_search_query<'a>(
    id_type: SimklIdType,
    id: &'a str,
    media_type: SimklMediaType,
) -> Vec<(&'static str, &'a str)> {
    let mut query = vec![(id_type.as_str(), id)];
    if id_type == SimklIdType::Tmdb {
        let tmdb_type = match media_type {
            SimklMediaType::Movie => "movie",
            SimklMediaType::Anime | SimklMediaType::Tv => "show",
        };
        query.push(("type", tmdb_type));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_tmdb_id_search_carries_type() {
        assert_eq!(
            id_search_query(SimklIdType::Tmdb, "603", SimklMediaType::Movie),
            vec![("tmdb", "603"), ("type", "movie")]
        );
        assert_eq!(
            id_search_query(SimklIdType::Tmdb, "30991", SimklMediaType::Anime),
            vec![("tmdb", "30991"), ("type", "show")]
        );
        assert_eq!(
            id_search_query(SimklIdType::Imdb, "tt0213338", SimklMediaType::Movie),
            vec![("imdb", "tt0213338")]
        );
    }

    #[test]
    fn test_media_type_parsing() {
        assert_eq!("TV".parse::<SimklMediaType>().unwrap(), SimklMediaType::Tv);
        assert_eq!("movie".parse::<SimklMediaType>().unwrap(), SimklMediaType::Movie);
        assert!(matches!(
            "book".parse::<SimklMediaType>(),
            Err(ProviderError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_title_id_rejected_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let simkl = Simkl::new(
            Client::new(),
            FileCache::new(dir.path(), std::time::Duration::from_secs(60)),
            Some("id".into()),
        );
        let err = simkl.title("abc", SimklMediaType::Anime).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_missing_client_id() {
        let dir = tempfile::tempdir().unwrap();
        let simkl = Simkl::new(
            Client::new(),
            FileCache::new(dir.path(), std::time::Duration::from_secs(60)),
            None,
        );
        let err = simkl.title("1", SimklMediaType::Tv).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential("SIMKL_CLIENT_ID")));
    }

    #[test]
    fn test_decode_mixed_ids() {
        let body = r#"{
            "title": "Cowboy Bebop",
            "year": 1998,
            "type": "anime",
            "ids": { "simkl": 37089, "slug": "cowboy-bebop", "mal": "1", "imdb": "tt0213338", "tmdb": "30991", "anidb": "23" },
            "poster": "74/74415673dcdc9cdd",
            "genres": ["Action"],
            "ratings": { "simkl": { "rating": 8.6, "votes": 2000 } },
            "total_episodes": 26,
            "anime_type": "tv"
        }"#;
        let title: SimklTitle = parse_json(body).unwrap();
        assert_eq!(title.simkl_id().as_deref(), Some("37089"));
        assert_eq!(title.id("mal").as_deref(), Some("1"));
        assert_eq!(
            title.page_url(SimklMediaType::Anime).as_deref(),
            Some("https://simkl.com/anime/37089")
        );
        assert!(title.poster_url().unwrap().contains("74415673dcdc9cdd"));
    }
}
