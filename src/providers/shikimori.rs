use super::http::decode;
use super::{key_segment, Result};
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://shikimori.one";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserImage {
    pub x160: Option<String>,
    pub x148: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub nickname: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub image: UserImage,
    pub url: Option<String>,
    pub last_online_at: Option<String>,
    pub last_online: Option<String>,
    pub name: Option<String>,
    pub sex: Option<String>,
    pub full_years: Option<u32>,
    pub website: Option<String>,
    pub locale: Option<String>,
}

impl User {
    pub fn avatar_url(&self) -> Option<&str> {
        self.image
            .x160
            .as_deref()
            .or(self.image.x148.as_deref())
            .or(self.avatar.as_deref())
    }

    pub fn profile_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("{}/{}", BASE_URL, urlencoding::encode(&self.nickname)))
    }
}

pub struct Shikimori {
    client: Client,
    cache: FileCache,
}

impl Shikimori {
    pub fn new(client: Client, cache: FileCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub async fn user(&self, nickname: &str) -> Result<User> {
        let key = format!("user/{}.json", key_segment(nickname));
        self.cache
            .get_or_fetch(&key, || async move {
                let response = self
                    .client
                    .get(format!(
                        "{}/api/users/{}",
                        BASE_URL,
                        urlencoding::encode(nickname)
                    ))
                    .query(&[("is_nickname", "1")])
                    .send()
                    .await?;
                decode("shikimori", response).await
            })
            .await
    }
}
