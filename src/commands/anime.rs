use super::{report, send_embed};
use crate::embeds;
use crate::i18n::Message;
use crate::providers::anilist::{Media, MediaType};
use crate::providers::ProviderError;
use crate::relations::{self, MediaKind, Platform};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum Source {
    #[name = "MyAnimeList"]
    MyAnimeList,
    #[name = "AniList"]
    AniList,
}

fn numeric_id(id: &str) -> Result<u64, ProviderError> {
    id.trim()
        .parse()
        .map_err(|_| ProviderError::InvalidArgument(format!("'{}' is not a numeric id", id.trim())))
}

fn search_embed(query: &str, results: &[Media], media_type: MediaType) -> serenity::CreateEmbed {
    let lines = results
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let year = m
                .season_year
                .or(m.start_date.year)
                .map(|y| format!(" ({})", y))
                .unwrap_or_default();
            let format = m.format.as_deref().unwrap_or("?");
            match &m.site_url {
                Some(url) => format!("{}. [{}]({}){} • {} • `{}`", i + 1, m.title.preferred(), url, year, format, m.id),
                None => format!("{}. {}{} • {} • `{}`", i + 1, m.title.preferred(), year, format, m.id),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let kind = match media_type {
        MediaType::Anime => "anime",
        MediaType::Manga => "manga",
    };
    serenity::CreateEmbed::new()
        .title(embeds::truncate(&format!("Search results for \"{}\"", query.trim()), 256))
        .description(embeds::truncate(&lines, crate::config::DISCORD_EMBED_LIMIT))
        .color(embeds::COLOR_ANILIST)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Use /{} info with an ID and AniList as the platform for details",
            kind
        )))
}

/// Look up anime
#[poise::command(slash_command, subcommands("info", "search", "relations", "random"))]
pub async fn anime(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show an anime by its ID on any supported site
#[poise::command(slash_command)]
pub async fn info(
    ctx: Context<'_>,
    #[description = "Title ID (or slug) on the chosen platform"] id: String,
    #[description = "Platform the ID belongs to (default: MyAnimeList)"] platform: Option<Platform>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let providers = &ctx.data().providers;

    match platform.unwrap_or(Platform::MyAnimeList) {
        Platform::MyAnimeList => {
            let id = match numeric_id(&id) {
                Ok(id) => id,
                Err(e) => return report(ctx, e).await,
            };
            match providers.jikan.anime(id).await {
                Ok(anime) => send_embed(ctx, embeds::mal_anime_embed(&anime)).await,
                Err(e) => report(ctx, e).await,
            }
        }
        Platform::AniList => {
            let id = match numeric_id(&id) {
                Ok(id) => id,
                Err(e) => return report(ctx, e).await,
            };
            match providers.anilist.anime(id).await {
                Ok(media) => send_embed(ctx, embeds::anilist_media_embed(&media, MediaType::Anime)).await,
                Err(e) => report(ctx, e).await,
            }
        }
        other => {
            let rel = relations::resolve(providers.as_ref(), other, &id, MediaKind::Anime).await;
            let Some(mal) = rel.myanimelist.as_deref().and_then(|m| m.parse().ok()) else {
                return super::notify(ctx, Message::NoResults).await;
            };
            match providers.jikan.anime(mal).await {
                Ok(anime) => send_embed(ctx, embeds::mal_anime_embed(&anime)).await,
                Err(e) => report(ctx, e).await,
            }
        }
    }
}

/// Search anime by title on AniList
#[poise::command(slash_command)]
pub async fn search(
    ctx: Context<'_>,
    #[description = "Title to search for"] title: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().providers.anilist.search(&title, MediaType::Anime).await {
        Ok(results) if results.is_empty() => super::notify(ctx, Message::NoResults).await,
        Ok(results) => send_embed(ctx, search_embed(&title, &results, MediaType::Anime)).await,
        Err(e) => report(ctx, e).await,
    }
}

/// List the same title's IDs across anime and TV databases
#[poise::command(slash_command)]
pub async fn relations(
    ctx: Context<'_>,
    #[description = "Title ID (or slug) on the chosen platform"] id: String,
    #[description = "Platform the ID belongs to"] platform: Platform,
    #[description = "Kind of title (default: anime)"] kind: Option<MediaKind>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let rel = relations::resolve(
        ctx.data().providers.as_ref(),
        platform,
        &id,
        kind.unwrap_or_default(),
    )
    .await;
    if rel.is_empty() {
        return super::notify(ctx, Message::NoResults).await;
    }
    send_embed(ctx, embeds::relations_embed(&rel)).await
}

/// Show a random anime from MyAnimeList
#[poise::command(slash_command)]
pub async fn random(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().providers.jikan.random_anime().await {
        Ok(anime) => send_embed(ctx, embeds::mal_anime_embed(&anime)).await,
        Err(e) => report(ctx, e).await,
    }
}

/// Look up manga
#[poise::command(slash_command, subcommands("manga_info", "manga_search"))]
pub async fn manga(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show a manga by its MyAnimeList or AniList ID
#[poise::command(slash_command, rename = "info")]
pub async fn manga_info(
    ctx: Context<'_>,
    #[description = "Manga ID"] id: String,
    #[description = "Site the ID belongs to (default: MyAnimeList)"] platform: Option<Source>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let id = match numeric_id(&id) {
        Ok(id) => id,
        Err(e) => return report(ctx, e).await,
    };
    let providers = &ctx.data().providers;
    match platform.unwrap_or(Source::MyAnimeList) {
        Source::MyAnimeList => match providers.jikan.manga(id).await {
            Ok(manga) => send_embed(ctx, embeds::mal_manga_embed(&manga)).await,
            Err(e) => report(ctx, e).await,
        },
        Source::AniList => match providers.anilist.manga(id).await {
            Ok(media) => send_embed(ctx, embeds::anilist_media_embed(&media, MediaType::Manga)).await,
            Err(e) => report(ctx, e).await,
        },
    }
}

/// Search manga by title on AniList
#[poise::command(slash_command, rename = "search")]
pub async fn manga_search(
    ctx: Context<'_>,
    #[description = "Title to search for"] title: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().providers.anilist.search(&title, MediaType::Manga).await {
        Ok(results) if results.is_empty() => super::notify(ctx, Message::NoResults).await,
        Ok(results) => send_embed(ctx, search_embed(&title, &results, MediaType::Manga)).await,
        Err(e) => report(ctx, e).await,
    }
}
