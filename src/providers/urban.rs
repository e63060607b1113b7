use super::http::{decode, ProviderError};
use super::{key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.urbandictionary.com/v0/define";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    pub defid: u64,
    pub word: String,
    pub definition: String,
    pub example: Option<String>,
    pub author: Option<String>,
    pub permalink: String,
    pub thumbs_up: i64,
    pub thumbs_down: i64,
    pub written_on: Option<String>,
}

/// Urban Dictionary marks cross-links as `[term]`; strip the brackets.
pub fn strip_links(text: &str) -> String {
    text.replace(['[', ']'], "")
}

#[derive(Deserialize, Serialize)]
struct DefineResponse {
    list: Vec<Definition>,
}

pub struct Urban {
    client: Client,
    cache: FileCache,
}

impl Urban {
    pub fn new(client: Client, cache: FileCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Definitions sorted by net votes, best first.
    pub async fn define(&self, term: &str) -> Result<Vec<Definition>> {
        if term.trim().is_empty() {
            return Err(ProviderError::InvalidArgument("term is empty".into()));
        }
        let key = format!("{}.json", key_segment(term));
        let mut list: Vec<Definition> = self
            .cache
            .get_or_fetch(&key, || async move {
                let response = self
                    .client
                    .get(BASE_URL)
                    .query(&[("term", term.trim())])
                    .send()
                    .await?;
                let found: DefineResponse = decode("urban", response).await?;
                Ok::<_, ProviderError>(found.list)
            })
            .await?;
        list.sort_by_key(|d| std::cmp::Reverse(d.thumbs_up - d.thumbs_down));
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_strip_links() {
        assert_eq!(strip_links("a [weeb] is a [fan]"), "a weeb is a fan");
    }

    #[test]
    fn test_decode_definitions() {
        let body = r#"{"list": [{
            "defid": 1,
            "word": "weeb",
            "definition": "A [fan] of anime.",
            "example": "He's a weeb.",
            "author": "someone",
            "permalink": "https://weeb.urbanup.com/1",
            "thumbs_up": 10,
            "thumbs_down": 2,
            "written_on": "2012-01-01T00:00:00.000Z",
            "current_vote": "",
            "sound_urls": []
        }]}"#;
        let found: DefineResponse = parse_json(body).unwrap();
        assert_eq!(found.list[0].thumbs_up, 10);
    }
}
