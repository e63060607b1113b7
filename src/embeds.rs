//! Embed builders shared by commands and auto-embeds.

use crate::config::{DISCORD_EMBED_LIMIT, DISCORD_FIELD_LIMIT};
use crate::providers::anilist::{Media, MediaType};
use crate::providers::jikan;
use crate::relations::Relations;
use poise::serenity_prelude as serenity;
use regex::Regex;
use std::sync::OnceLock;

pub const COLOR_DEFAULT: u32 = 0x5865F2;
pub const COLOR_ERROR: u32 = 0xED4245;
pub const COLOR_ANILIST: u32 = 0x02A9FF;
pub const COLOR_MAL: u32 = 0x2E51A2;

/// Cut `text` to at most `max` characters, ending with an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Reduce AniList's HTML descriptions to plain Discord markdown.
pub fn strip_html(text: &str) -> String {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();
    let text = BREAK
        .get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"))
        .replace_all(text, "\n");
    let text = text
        .replace("<i>", "*")
        .replace("</i>", "*")
        .replace("<b>", "**")
        .replace("</b>", "**");
    let text = TAG
        .get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
        .replace_all(&text, "");
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("\n\n\n", "\n\n")
        .trim()
        .to_string()
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn title_case(text: &str) -> String {
    text.split('_')
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn error_embed(message: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("Error")
        .description(truncate(message, DISCORD_EMBED_LIMIT))
        .color(COLOR_ERROR)
}

pub fn info_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(truncate(description, DISCORD_EMBED_LIMIT))
        .color(COLOR_DEFAULT)
}

pub fn anilist_media_embed(media: &Media, media_type: MediaType) -> serenity::CreateEmbed {
    let description = media
        .description
        .as_deref()
        .map(strip_html)
        .unwrap_or_else(|| "*No synopsis.*".to_string());

    let mut embed = serenity::CreateEmbed::new()
        .title(truncate(media.title.preferred(), 256))
        .description(truncate(&description, 1000))
        .color(COLOR_ANILIST)
        .field("Format", or_dash(media.format.as_deref().map(title_case)), true)
        .field("Status", or_dash(media.status.as_deref().map(title_case)), true);

    embed = match media_type {
        MediaType::Anime => embed
            .field("Episodes", or_dash(media.episodes), true)
            .field(
                "Season",
                match (&media.season, media.season_year) {
                    (Some(season), Some(year)) => format!("{} {}", title_case(season), year),
                    (None, Some(year)) => year.to_string(),
                    _ => "-".to_string(),
                },
                true,
            ),
        MediaType::Manga => embed
            .field("Chapters", or_dash(media.chapters), true)
            .field("Volumes", or_dash(media.volumes), true),
    };

    embed = embed
        .field(
            "Score",
            or_dash(media.average_score.map(|s| format!("{}/100", s))),
            true,
        )
        .field(
            "Aired",
            format!(
                "{} to {}",
                or_dash(media.start_date.display()),
                or_dash(media.end_date.display())
            ),
            true,
        );

    if !media.genres.is_empty() {
        embed = embed.field(
            "Genres",
            truncate(&media.genres.join(", "), DISCORD_FIELD_LIMIT),
            false,
        );
    }
    if let Some(native) = &media.title.native {
        embed = embed.field("Native title", truncate(native, DISCORD_FIELD_LIMIT), false);
    }
    if let Some(url) = &media.site_url {
        embed = embed.url(url);
    }
    if let Some(cover) = media
        .cover_image
        .as_ref()
        .and_then(|c| c.extra_large.as_ref().or(c.large.as_ref()))
    {
        embed = embed.thumbnail(cover);
    }
    if let Some(banner) = &media.banner_image {
        embed = embed.image(banner);
    }

    let mut footer = format!("AniList ID: {}", media.id);
    if let Some(mal) = media.id_mal {
        footer.push_str(&format!(" • MyAnimeList ID: {}", mal));
    }
    embed.footer(serenity::CreateEmbedFooter::new(footer))
}

pub fn mal_anime_embed(anime: &jikan::Anime) -> serenity::CreateEmbed {
    let studios = anime
        .studios
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let genres = anime
        .genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut embed = serenity::CreateEmbed::new()
        .title(truncate(&anime.title, 256))
        .url(&anime.url)
        .description(truncate(
            anime.synopsis.as_deref().unwrap_or("*No synopsis.*"),
            1000,
        ))
        .color(COLOR_MAL)
        .field("Type", or_dash(anime.kind.as_deref()), true)
        .field("Episodes", or_dash(anime.episodes), true)
        .field("Status", or_dash(anime.status.as_deref()), true)
        .field(
            "Score",
            match (anime.score, anime.scored_by) {
                (Some(score), Some(by)) => format!("{:.2} ({} users)", score, by),
                (Some(score), None) => format!("{:.2}", score),
                _ => "-".to_string(),
            },
            true,
        )
        .field("Rank", or_dash(anime.rank.map(|r| format!("#{}", r))), true)
        .field("Aired", or_dash(anime.aired.string.as_deref()), true);

    if !studios.is_empty() {
        embed = embed.field("Studios", truncate(&studios, DISCORD_FIELD_LIMIT), true);
    }
    if !genres.is_empty() {
        embed = embed.field("Genres", truncate(&genres, DISCORD_FIELD_LIMIT), false);
    }
    if let Some(english) = &anime.title_english {
        embed = embed.field("English title", truncate(english, DISCORD_FIELD_LIMIT), false);
    }
    if let Some(image) = anime.images.best() {
        embed = embed.thumbnail(image);
    }
    embed.footer(serenity::CreateEmbedFooter::new(format!(
        "MyAnimeList ID: {}",
        anime.mal_id
    )))
}

pub fn mal_manga_embed(manga: &jikan::Manga) -> serenity::CreateEmbed {
    let authors = manga
        .authors
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    let mut embed = serenity::CreateEmbed::new()
        .title(truncate(&manga.title, 256))
        .url(&manga.url)
        .description(truncate(
            manga.synopsis.as_deref().unwrap_or("*No synopsis.*"),
            1000,
        ))
        .color(COLOR_MAL)
        .field("Type", or_dash(manga.kind.as_deref()), true)
        .field("Chapters", or_dash(manga.chapters), true)
        .field("Volumes", or_dash(manga.volumes), true)
        .field("Status", or_dash(manga.status.as_deref()), true)
        .field("Score", or_dash(manga.score.map(|s| format!("{:.2}", s))), true)
        .field("Published", or_dash(manga.published.string.as_deref()), true);

    if !authors.is_empty() {
        embed = embed.field("Authors", truncate(&authors, DISCORD_FIELD_LIMIT), false);
    }
    if let Some(image) = manga.images.best() {
        embed = embed.thumbnail(image);
    }
    embed.footer(serenity::CreateEmbedFooter::new(format!(
        "MyAnimeList ID: {}",
        manga.mal_id
    )))
}

pub fn relations_embed(rel: &Relations) -> serenity::CreateEmbed {
    let links = rel
        .links()
        .into_iter()
        .map(|(platform, url)| format!("**{}**: <{}>", platform.label(), url))
        .collect::<Vec<_>>()
        .join("\n");

    serenity::CreateEmbed::new()
        .title(truncate(
            rel.title.as_deref().unwrap_or("Platform relations"),
            256,
        ))
        .description(truncate(&links, DISCORD_EMBED_LIMIT))
        .color(COLOR_DEFAULT)
        .footer(serenity::CreateEmbedFooter::new(
            "Data from AnimeAPI, SIMKL and Trakt",
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("カウボーイビバップ", 4), "カウボ…");
        assert_eq!(truncate("abcdef", 4).chars().count(), 4);
    }

    #[test]
    fn test_strip_html() {
        let raw = "Crime is <i>timeless</i>.<br><br>\n(Source: MAL &amp; friends)";
        assert_eq!(
            strip_html(raw),
            "Crime is *timeless*.\n\n(Source: MAL & friends)"
        );
        assert_eq!(strip_html("<span class=\"x\">a</span>"), "a");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("FINISHED"), "Finished");
        assert_eq!(title_case("NOT_YET_RELEASED"), "Not Yet Released");
        assert_eq!(title_case("TV_SHORT"), "Tv Short");
    }
}
