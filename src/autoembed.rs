use crate::embeds;
use crate::providers::anilist::MediaType;
use crate::Data;
use poise::serenity_prelude as serenity;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    AniList,
    MyAnimeList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaLink {
    pub source: LinkSource,
    pub media_type: MediaType,
    pub id: u64,
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https?://(?:www\.)?(anilist\.co|myanimelist\.net)/(anime|manga)/(\d+)")
            .expect("valid regex")
    })
}

/// First AniList or MyAnimeList title link in `text`.
pub fn detect(text: &str) -> Option<MediaLink> {
    link_pattern().captures_iter(text).find_map(|caps| {
        let source = match &caps[1] {
            "anilist.co" => LinkSource::AniList,
            _ => LinkSource::MyAnimeList,
        };
        let media_type = match &caps[2] {
            "anime" => MediaType::Anime,
            _ => MediaType::Manga,
        };
        let id = caps[3].parse().ok()?;
        Some(MediaLink {
            source,
            media_type,
            id,
        })
    })
}

/// Reply to `message` with an embed for the first media link, when its
/// author opted in.
pub async fn handle_message(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> anyhow::Result<()> {
    if message.author.bot {
        return Ok(());
    }
    let Some(link) = detect(&message.content) else {
        return Ok(());
    };
    if !data.db.autoembed.is_allowed(message.author.id.get()) {
        return Ok(());
    }
    debug!("Auto-embedding {:?} for {}", link, message.author.id);

    let providers = &data.providers;
    let embed = match (link.source, link.media_type) {
        (LinkSource::AniList, MediaType::Anime) => {
            embeds::anilist_media_embed(&providers.anilist.anime(link.id).await?, MediaType::Anime)
        }
        (LinkSource::AniList, MediaType::Manga) => {
            embeds::anilist_media_embed(&providers.anilist.manga(link.id).await?, MediaType::Manga)
        }
        (LinkSource::MyAnimeList, MediaType::Anime) => {
            embeds::mal_anime_embed(&providers.jikan.anime(link.id).await?)
        }
        (LinkSource::MyAnimeList, MediaType::Manga) => {
            embeds::mal_manga_embed(&providers.jikan.manga(link.id).await?)
        }
    };

    let builder = serenity::CreateMessage::new()
        .embed(embed)
        .reference_message(message)
        .allowed_mentions(serenity::CreateAllowedMentions::new().replied_user(false));
    if let Err(e) = message.channel_id.send_message(&ctx.http, builder).await {
        warn!("Failed to send auto-embed in {}: {}", message.channel_id, e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_first_link() {
        let text = "look at https://anilist.co/anime/1/Cowboy-Bebop/ and https://myanimelist.net/manga/2";
        assert_eq!(
            detect(text),
            Some(MediaLink {
                source: LinkSource::AniList,
                media_type: MediaType::Anime,
                id: 1,
            })
        );
    }

    #[test]
    fn test_detect_mal_manga() {
        let link = detect("https://www.myanimelist.net/manga/2/Berserk").unwrap();
        assert_eq!(link.source, LinkSource::MyAnimeList);
        assert_eq!(link.media_type, MediaType::Manga);
        assert_eq!(link.id, 2);
    }

    #[test]
    fn test_no_link() {
        assert!(detect("https://anilist.co/user/someone").is_none());
        assert!(detect("just chatting").is_none());
    }
}
