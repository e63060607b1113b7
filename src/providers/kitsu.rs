use super::http::{decode, ProviderError};
use super::{key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://kitsu.io/api/edge";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitsuMediaType {
    Anime,
    Manga,
}

impl KitsuMediaType {
    fn as_str(self) -> &'static str {
        match self {
            KitsuMediaType::Anime => "anime",
            KitsuMediaType::Manga => "manga",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PosterImage {
    pub original: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    pub slug: Option<String>,
    pub canonical_title: Option<String>,
    pub synopsis: Option<String>,
    pub average_rating: Option<String>,
    pub episode_count: Option<u32>,
    pub chapter_count: Option<u32>,
    pub subtype: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub poster_image: Option<PosterImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitsuMedia {
    pub id: String,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Deserialize, Serialize)]
struct Single {
    data: KitsuMedia,
}

#[derive(Deserialize, Serialize)]
struct Many {
    data: Vec<KitsuMedia>,
}

pub struct Kitsu {
    client: Client,
    cache: FileCache,
}

impl Kitsu {
    pub fn new(client: Client, cache: FileCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Map a URL slug (`cowboy-bebop`) to Kitsu's numeric id.
    pub async fn resolve_slug(&self, slug: &str, media_type: KitsuMediaType) -> Result<String> {
        let key = format!("slug/{}/{}.json", media_type.as_str(), key_segment(slug));
        self.cache
            .get_or_fetch(&key, || async move {
                let response = self
                    .client
                    .get(format!("{}/{}", BASE_URL, media_type.as_str()))
                    .query(&[("filter[slug]", slug)])
                    .send()
                    .await?;
                let found: Many = decode("kitsu", response).await?;
                found
                    .data
                    .into_iter()
                    .next()
                    .map(|m| m.id)
                    .ok_or_else(|| ProviderError::NotFound(format!("Kitsu slug {}", slug)))
            })
            .await
    }

    pub async fn media(&self, id: &str, media_type: KitsuMediaType) -> Result<KitsuMedia> {
        if !id.chars().all(|c| c.is_ascii_digit()) || id.is_empty() {
            return Err(ProviderError::InvalidArgument(format!(
                "Kitsu id must be numeric, got '{}'",
                id
            )));
        }
        let key = format!("{}/{}.json", media_type.as_str(), id);
        self.cache
            .get_or_fetch(&key, || async move {
                let response = self
                    .client
                    .get(format!("{}/{}/{}", BASE_URL, media_type.as_str(), id))
                    .send()
                    .await?;
                let single: Single = decode("kitsu", response).await?;
                Ok(single.data)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_decode_slug_lookup() {
        let body = r#"{
            "data": [{
                "id": "1",
                "type": "anime",
                "attributes": {
                    "slug": "cowboy-bebop",
                    "canonicalTitle": "Cowboy Bebop",
                    "averageRating": "82.26",
                    "episodeCount": 26,
                    "posterImage": { "original": "https://media.kitsu.io/1.jpg" }
                }
            }],
            "meta": { "count": 1 }
        }"#;
        let many: Many = parse_json(body).unwrap();
        assert_eq!(many.data[0].id, "1");
        assert_eq!(many.data[0].attributes.episode_count, Some(26));
    }
}
