use super::http::{decode, ProviderError};
use super::{key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const ENDPOINT: &str = "https://graphql.anilist.co";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Anime,
    Manga,
}

impl MediaType {
    fn as_graphql(self) -> &'static str {
        match self {
            MediaType::Anime => "ANIME",
            MediaType::Manga => "MANGA",
        }
    }

    fn dir(self) -> &'static str {
        match self {
            MediaType::Anime => "anime",
            MediaType::Manga => "manga",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

impl MediaTitle {
    pub fn preferred(&self) -> &str {
        self.romaji
            .as_deref()
            .or(self.english.as_deref())
            .or(self.native.as_deref())
            .unwrap_or("Unknown title")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl FuzzyDate {
    pub fn display(&self) -> Option<String> {
        let year = self.year?;
        Some(match (self.month, self.day) {
            (Some(m), Some(d)) => format!("{year}-{m:02}-{d:02}"),
            (Some(m), None) => format!("{year}-{m:02}"),
            _ => year.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: u64,
    pub id_mal: Option<u64>,
    pub site_url: Option<String>,
    #[serde(default)]
    pub title: MediaTitle,
    #[serde(default)]
    pub synonyms: Vec<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub volumes: Option<u32>,
    pub duration: Option<u32>,
    pub average_score: Option<u32>,
    pub popularity: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub start_date: FuzzyDate,
    #[serde(default)]
    pub end_date: FuzzyDate,
    pub season: Option<String>,
    pub season_year: Option<i32>,
    pub cover_image: Option<CoverImage>,
    pub banner_image: Option<String>,
    #[serde(default)]
    pub is_adult: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeStatistics {
    pub count: u32,
    pub episodes_watched: u32,
    pub minutes_watched: u64,
    pub mean_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaStatistics {
    pub count: u32,
    pub chapters_read: u32,
    pub volumes_read: u32,
    pub mean_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStatistics {
    #[serde(default)]
    pub anime: AnimeStatistics,
    #[serde(default)]
    pub manga: MangaStatistics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Avatar {
    pub large: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub site_url: Option<String>,
    pub about: Option<String>,
    pub avatar: Option<Avatar>,
    pub banner_image: Option<String>,
    pub created_at: Option<i64>,
    #[serde(default)]
    pub statistics: UserStatistics,
}

const MEDIA_FIELDS: &str = r#"
    id idMal siteUrl
    title { romaji english native }
    synonyms
    description(asHtml: false)
    format status episodes chapters volumes duration
    averageScore popularity genres
    startDate { year month day }
    endDate { year month day }
    season seasonYear
    coverImage { extraLarge large color }
    bannerImage isAdult
"#;

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

pub struct AniList {
    client: Client,
    cache: FileCache,
}

impl AniList {
    pub fn new(client: Client, cache: FileCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(ENDPOINT)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let body: GraphQlResponse<T> = decode("anilist", response).await?;
        match body.data {
            Some(data) => Ok(data),
            None => Err(ProviderError::NotFound(
                body.errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }

    async fn media(&self, media_type: MediaType, id: u64) -> Result<Media> {
        let key = format!("{}/{}.json", media_type.dir(), id);
        self.cache
            .get_or_fetch(&key, || async move {
                debug!("AniList: fetching {} {}", media_type.dir(), id);

                #[derive(Deserialize)]
                struct Data {
                    #[serde(rename = "Media")]
                    media: Option<Media>,
                }

                let query = format!(
                    "query ($id: Int, $type: MediaType) {{ Media(id: $id, type: $type) {{ {MEDIA_FIELDS} }} }}"
                );
                let data: Data = self
                    .query(&query, json!({ "id": id, "type": media_type.as_graphql() }))
                    .await?;
                data.media
                    .ok_or_else(|| ProviderError::NotFound(format!("AniList {} {}", media_type.dir(), id)))
            })
            .await
    }

    pub async fn anime(&self, id: u64) -> Result<Media> {
        self.media(MediaType::Anime, id).await
    }

    pub async fn manga(&self, id: u64) -> Result<Media> {
        self.media(MediaType::Manga, id).await
    }

    pub async fn search(&self, title: &str, media_type: MediaType) -> Result<Vec<Media>> {
        if title.trim().is_empty() {
            return Err(ProviderError::InvalidArgument("search title is empty".into()));
        }

        let key = format!("search/{}/{}.json", media_type.dir(), key_segment(title));
        self.cache
            .get_or_fetch(&key, || async move {
                #[derive(Deserialize)]
                struct Page {
                    media: Vec<Media>,
                }
                #[derive(Deserialize)]
                struct Data {
                    #[serde(rename = "Page")]
                    page: Page,
                }

                let query = format!(
                    "query ($search: String, $type: MediaType) {{ Page(perPage: 10) {{ media(search: $search, type: $type) {{ {MEDIA_FIELDS} }} }} }}"
                );
                let data: Data = self
                    .query(
                        &query,
                        json!({ "search": title.trim(), "type": media_type.as_graphql() }),
                    )
                    .await?;
                Ok(data.page.media)
            })
            .await
    }

    pub async fn user(&self, name: &str) -> Result<User> {
        let key = format!("user/{}.json", key_segment(name));
        self.cache
            .get_or_fetch(&key, || async move {
                #[derive(Deserialize)]
                struct Data {
                    #[serde(rename = "User")]
                    user: Option<User>,
                }

                let query = r#"
query ($name: String) {
  User(name: $name) {
    id name siteUrl about createdAt bannerImage
    avatar { large }
    statistics {
      anime { count episodesWatched minutesWatched meanScore }
      manga { count chaptersRead volumesRead meanScore }
    }
  }
}
"#;
                let data: Data = self.query(query, json!({ "name": name })).await?;
                data.user
                    .ok_or_else(|| ProviderError::NotFound(format!("AniList user {}", name)))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_decode_media_fixture() {
        let body = r##"{
            "data": {
                "Media": {
                    "id": 1,
                    "idMal": 1,
                    "siteUrl": "https://anilist.co/anime/1",
                    "title": { "romaji": "Cowboy Bebop", "english": "Cowboy Bebop", "native": "カウボーイビバップ" },
                    "synonyms": [],
                    "description": "In the year 2071...",
                    "format": "TV",
                    "status": "FINISHED",
                    "episodes": 26,
                    "chapters": null,
                    "volumes": null,
                    "duration": 24,
                    "averageScore": 86,
                    "popularity": 300000,
                    "genres": ["Action", "Sci-Fi"],
                    "startDate": { "year": 1998, "month": 4, "day": 3 },
                    "endDate": { "year": 1999, "month": 4, "day": 24 },
                    "season": "SPRING",
                    "seasonYear": 1998,
                    "coverImage": { "extraLarge": "https://img/1.jpg", "large": null, "color": "#f1785d" },
                    "bannerImage": null,
                    "isAdult": false
                }
            }
        }"##;

        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "Media")]
            media: Option<Media>,
        }

        let parsed: GraphQlResponse<Data> = parse_json(body).unwrap();
        let media = parsed.data.unwrap().media.unwrap();
        assert_eq!(media.id_mal, Some(1));
        assert_eq!(media.title.preferred(), "Cowboy Bebop");
        assert_eq!(media.start_date.display().as_deref(), Some("1998-04-03"));
        assert_eq!(media.cover_image.unwrap().color.as_deref(), Some("#f1785d"));
    }

    #[test]
    fn test_decode_user_statistics() {
        let body = r#"{
            "id": 5, "name": "someone", "siteUrl": null, "about": null,
            "avatar": { "large": "https://img/a.png" }, "bannerImage": null, "createdAt": 1500000000,
            "statistics": {
                "anime": { "count": 10, "episodesWatched": 120, "minutesWatched": 2880, "meanScore": 75.5 },
                "manga": { "count": 2, "chaptersRead": 40, "volumesRead": 4, "meanScore": 80.0 }
            }
        }"#;
        let user: User = parse_json(body).unwrap();
        assert_eq!(user.statistics.anime.minutes_watched, 2880);
        assert_eq!(user.statistics.manga.volumes_read, 4);
    }

    #[test]
    fn test_fuzzy_date_display() {
        let partial = FuzzyDate { year: Some(2020), month: Some(1), day: None };
        assert_eq!(partial.display().as_deref(), Some("2020-01"));
        assert!(FuzzyDate::default().display().is_none());
    }
}
