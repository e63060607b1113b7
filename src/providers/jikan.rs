//! MyAnimeList data through the unofficial Jikan v4 API.

use super::http::{decode, ProviderError};
use super::{key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.jikan.moe/v4";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSet {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub jpg: ImageSet,
}

impl Images {
    pub fn best(&self) -> Option<&str> {
        self.jpg
            .large_image_url
            .as_deref()
            .or(self.jpg.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub string: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anime {
    pub mal_id: u64,
    pub url: String,
    #[serde(default)]
    pub images: Images,
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub source: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    #[serde(default)]
    pub aired: DateRange,
    pub duration: Option<String>,
    pub rating: Option<String>,
    pub score: Option<f64>,
    pub scored_by: Option<u64>,
    pub rank: Option<u64>,
    pub popularity: Option<u64>,
    pub members: Option<u64>,
    pub synopsis: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<Named>,
    #[serde(default)]
    pub studios: Vec<Named>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manga {
    pub mal_id: u64,
    pub url: String,
    #[serde(default)]
    pub images: Images,
    pub title: String,
    pub title_english: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub chapters: Option<u32>,
    pub volumes: Option<u32>,
    pub status: Option<String>,
    #[serde(default)]
    pub published: DateRange,
    pub score: Option<f64>,
    pub synopsis: Option<String>,
    #[serde(default)]
    pub genres: Vec<Named>,
    #[serde(default)]
    pub authors: Vec<Named>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeStats {
    pub days_watched: f64,
    pub mean_score: f64,
    pub watching: u32,
    pub completed: u32,
    pub on_hold: u32,
    pub dropped: u32,
    pub plan_to_watch: u32,
    pub total_entries: u32,
    pub episodes_watched: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MangaStats {
    pub days_read: f64,
    pub mean_score: f64,
    pub reading: u32,
    pub completed: u32,
    pub on_hold: u32,
    pub dropped: u32,
    pub plan_to_read: u32,
    pub total_entries: u32,
    pub chapters_read: u32,
    pub volumes_read: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStatistics {
    #[serde(default)]
    pub anime: AnimeStats,
    #[serde(default)]
    pub manga: MangaStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub mal_id: Option<u64>,
    pub username: String,
    pub url: String,
    #[serde(default)]
    pub images: Images,
    pub last_online: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<String>,
    pub location: Option<String>,
    pub joined: Option<String>,
    #[serde(default)]
    pub statistics: UserStatistics,
}

#[derive(Deserialize, Serialize)]
struct Envelope<T> {
    data: T,
}

pub struct Jikan {
    client: Client,
    cache: FileCache,
}

impl Jikan {
    pub fn new(client: Client, cache: FileCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(format!("{}{}", BASE_URL, path))
            .query(query)
            .send()
            .await?;
        let envelope: Envelope<T> = decode("jikan", response).await?;
        Ok(envelope.data)
    }

    pub async fn anime(&self, id: u64) -> Result<Anime> {
        self.cache
            .get_or_fetch(&format!("anime/{}.json", id), || async move {
                self.get(&format!("/anime/{}", id), &[]).await
            })
            .await
    }

    pub async fn manga(&self, id: u64) -> Result<Manga> {
        self.cache
            .get_or_fetch(&format!("manga/{}.json", id), || async move {
                self.get(&format!("/manga/{}", id), &[]).await
            })
            .await
    }

    pub async fn search_anime(&self, title: &str) -> Result<Vec<Anime>> {
        if title.trim().is_empty() {
            return Err(ProviderError::InvalidArgument("search title is empty".into()));
        }
        let key = format!("search/anime/{}.json", key_segment(title));
        self.cache
            .get_or_fetch(&key, || async move {
                self.get("/anime", &[("q", title.trim()), ("limit", "10"), ("sfw", "true")])
                    .await
            })
            .await
    }

    pub async fn user(&self, username: &str) -> Result<UserProfile> {
        let key = format!("user/{}.json", key_segment(username));
        self.cache
            .get_or_fetch(&key, || async move {
                self.get(&format!("/users/{}/full", urlencoding::encode(username)), &[])
                    .await
            })
            .await
    }

    /// A random title. Never cached.
    pub async fn random_anime(&self) -> Result<Anime> {
        self.get("/random/anime", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_decode_anime_envelope() {
        let body = r#"{
            "data": {
                "mal_id": 1,
                "url": "https://myanimelist.net/anime/1/Cowboy_Bebop",
                "images": { "jpg": { "image_url": "https://cdn/1.jpg", "large_image_url": "https://cdn/1l.jpg" } },
                "title": "Cowboy Bebop",
                "title_english": "Cowboy Bebop",
                "title_japanese": "カウボーイビバップ",
                "type": "TV",
                "source": "Original",
                "episodes": 26,
                "status": "Finished Airing",
                "aired": { "string": "Apr 3, 1998 to Apr 24, 1999" },
                "duration": "24 min per ep",
                "rating": "R - 17+ (violence & profanity)",
                "score": 8.75,
                "scored_by": 1000000,
                "rank": 40,
                "popularity": 43,
                "members": 1900000,
                "synopsis": "Crime is timeless.",
                "season": "spring",
                "year": 1998,
                "genres": [{ "mal_id": 1, "type": "anime", "name": "Action", "url": "" }],
                "studios": [{ "mal_id": 14, "type": "anime", "name": "Sunrise", "url": "" }]
            }
        }"#;
        let envelope: Envelope<Anime> = parse_json(body).unwrap();
        let anime = envelope.data;
        assert_eq!(anime.kind.as_deref(), Some("TV"));
        assert_eq!(anime.images.best(), Some("https://cdn/1l.jpg"));
        assert_eq!(anime.studios[0].name, "Sunrise");
    }

    #[test]
    fn test_decode_user_profile_with_missing_statistics() {
        let body = r#"{
            "username": "nattadasu",
            "url": "https://myanimelist.net/profile/nattadasu",
            "images": { "jpg": { "image_url": null } },
            "last_online": null,
            "joined": "2016-02-14T00:00:00+00:00"
        }"#;
        let profile: UserProfile = parse_json(body).unwrap();
        assert_eq!(profile.username, "nattadasu");
        assert_eq!(profile.statistics.anime.total_entries, 0);
        assert!(profile.images.best().is_none());
    }
}
