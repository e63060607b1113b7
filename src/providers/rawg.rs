use super::http::{decode, require, ProviderError};
use super::{key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.rawg.io/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEntry {
    pub platform: NamedRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: u64,
    pub slug: String,
    pub name: String,
    pub released: Option<String>,
    pub rating: Option<f64>,
    pub metacritic: Option<u32>,
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub slug: String,
    pub name: String,
    pub name_original: Option<String>,
    pub description_raw: Option<String>,
    pub released: Option<String>,
    pub tba: Option<bool>,
    pub rating: Option<f64>,
    pub ratings_count: Option<u64>,
    pub metacritic: Option<u32>,
    pub playtime: Option<u32>,
    pub esrb_rating: Option<NamedRef>,
    pub background_image: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub genres: Vec<NamedRef>,
    #[serde(default)]
    pub developers: Vec<NamedRef>,
    #[serde(default)]
    pub publishers: Vec<NamedRef>,
    #[serde(default)]
    pub platforms: Vec<PlatformEntry>,
}

impl Game {
    pub fn page_url(&self) -> String {
        format!("https://rawg.io/games/{}", self.slug)
    }
}

#[derive(Deserialize, Serialize)]
struct Page<T> {
    results: Vec<T>,
}

pub struct Rawg {
    client: Client,
    cache: FileCache,
    api_key: Option<String>,
}

impl Rawg {
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

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let key = require(&self.api_key, "RAWG_API_KEY")?;
        let response = self
            .client
            .get(format!("{}{}", BASE_URL, path))
            .query(query)
            .query(&[("key", key)])
            .send()
            .await?;
        decode("rawg", response).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<GameSummary>> {
        if query.trim().is_empty() {
            return Err(ProviderError::InvalidArgument("search query is empty".into()));
        }
        let key = format!("search/{}.json", key_segment(query));
        self.cache
            .get_or_fetch(&key, || async move {
                let page: Page<GameSummary> = self
                    .get("/games", &[("search", query.trim()), ("page_size", "10")])
                    .await?;
                Ok(page.results)
            })
            .await
    }

    pub async fn game(&self, slug: &str) -> Result<Game> {
        let key = format!("games/{}.json", key_segment(slug));
        self.cache
            .get_or_fetch(&key, || async move {
                self.get(&format!("/games/{}", urlencoding::encode(slug.trim())), &[])
                    .await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_decode_game() {
        let body = r#"{
            "id": 3498,
            "slug": "grand-theft-auto-v",
            "name": "Grand Theft Auto V",
            "description_raw": "Rockstar Games went bigger.",
            "released": "2013-09-17",
            "rating": 4.47,
            "metacritic": 92,
            "esrb_rating": { "id": 4, "name": "Mature", "slug": "mature" },
            "genres": [{ "id": 4, "name": "Action" }],
            "platforms": [{ "platform": { "id": 4, "name": "PC" } }]
        }"#;
        let game: Game = parse_json(body).unwrap();
        assert_eq!(game.page_url(), "https://rawg.io/games/grand-theft-auto-v");
        assert_eq!(game.platforms[0].platform.name, "PC");
        assert!(game.developers.is_empty());
    }

    #[tokio::test]
    async fn test_empty_search_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let rawg = Rawg::new(
            Client::new(),
            FileCache::new(dir.path(), std::time::Duration::from_secs(60)),
            Some("k".into()),
        );
        assert!(matches!(
            rawg.search("   ").await,
            Err(ProviderError::InvalidArgument(_))
        ));
    }
}
