use super::{notify, report, send_embed};
use crate::embeds::truncate;
use crate::i18n::Message;
use crate::providers::rawg::Game;
use crate::providers::simkl::{SimklMediaType, SimklTitle};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

const COLOR_RAWG: u32 = 0x202020;
const COLOR_SIMKL: u32 = 0x0B0F10;

fn names(list: &[crate::providers::rawg::NamedRef]) -> String {
    list.iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn game_embed(game: &Game) -> serenity::CreateEmbed {
    let platforms = game
        .platforms
        .iter()
        .map(|p| p.platform.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let rating = match (game.rating, game.ratings_count) {
        (Some(r), Some(n)) if n > 0 => format!("{:.2}/5 ({} ratings)", r, n),
        _ => "-".to_string(),
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(truncate(&game.name, 256))
        .url(game.page_url())
        .description(truncate(
            game.description_raw.as_deref().unwrap_or("*No description.*"),
            1000,
        ))
        .color(COLOR_RAWG)
        .field("Released", game.released.as_deref().unwrap_or("TBA"), true)
        .field("Rating", rating, true)
        .field(
            "Metacritic",
            game.metacritic.map(|m| m.to_string()).unwrap_or_else(|| "-".into()),
            true,
        );

    for (label, list) in [
        ("Genres", &game.genres),
        ("Developers", &game.developers),
        ("Publishers", &game.publishers),
    ] {
        if !list.is_empty() {
            embed = embed.field(label, truncate(&names(list), 1024), true);
        }
    }
    if !platforms.is_empty() {
        embed = embed.field("Platforms", truncate(&platforms, 1024), false);
    }
    if let Some(esrb) = &game.esrb_rating {
        embed = embed.field("ESRB", &esrb.name, true);
    }
    if let Some(image) = &game.background_image {
        embed = embed.image(image);
    }
    embed.footer(serenity::CreateEmbedFooter::new(format!(
        "RAWG ID: {}",
        game.id
    )))
}

fn simkl_results_embed(
    query: &str,
    results: &[SimklTitle],
    media_type: SimklMediaType,
) -> serenity::CreateEmbed {
    let lines = results
        .iter()
        .take(10)
        .enumerate()
        .map(|(i, title)| {
            let year = title.year.map(|y| format!(" ({})", y)).unwrap_or_default();
            match title.page_url(media_type) {
                Some(url) => format!("{}. [{}]({}){}", i + 1, title.title, url, year),
                None => format!("{}. {}{}", i + 1, title.title, year),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut embed = serenity::CreateEmbed::new()
        .title(truncate(&format!("Search results for \"{}\"", query.trim()), 256))
        .description(truncate(&lines, crate::config::DISCORD_EMBED_LIMIT))
        .color(COLOR_SIMKL)
        .footer(serenity::CreateEmbedFooter::new("Data from SIMKL"));
    if let Some(poster) = results.first().and_then(|t| t.poster_url()) {
        embed = embed.thumbnail(poster);
    }
    embed
}

async fn simkl_search(ctx: Context<'_>, title: String, media_type: SimklMediaType) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().providers.simkl.search(&title, media_type).await {
        Ok(results) if results.is_empty() => notify(ctx, Message::NoResults).await,
        Ok(results) => send_embed(ctx, simkl_results_embed(&title, &results, media_type)).await,
        Err(e) => report(ctx, e).await,
    }
}

/// Look up video games
#[poise::command(slash_command, subcommands("games_search"))]
pub async fn games(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Find a game on RAWG
#[poise::command(slash_command, rename = "search")]
pub async fn games_search(
    ctx: Context<'_>,
    #[description = "Game title"] title: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    let rawg = &ctx.data().providers.rawg;
    let hits = match rawg.search(&title).await {
        Ok(hits) => hits,
        Err(e) => return report(ctx, e).await,
    };
    let Some(best) = hits.first() else {
        return notify(ctx, Message::NoResults).await;
    };
    match rawg.game(&best.slug).await {
        Ok(game) => send_embed(ctx, game_embed(&game)).await,
        Err(e) => report(ctx, e).await,
    }
}

/// Look up TV shows
#[poise::command(slash_command, subcommands("tv_search"))]
pub async fn tv(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Search TV shows on SIMKL
#[poise::command(slash_command, rename = "search")]
pub async fn tv_search(
    ctx: Context<'_>,
    #[description = "Show title"] title: String,
) -> Result<(), Error> {
    simkl_search(ctx, title, SimklMediaType::Tv).await
}

/// Look up movies
#[poise::command(slash_command, subcommands("movies_search"))]
pub async fn movies(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Search movies on SIMKL
#[poise::command(slash_command, rename = "search")]
pub async fn movies_search(
    ctx: Context<'_>,
    #[description = "Movie title"] title: String,
) -> Result<(), Error> {
    simkl_search(ctx, title, SimklMediaType::Movie).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_join() {
        let list = vec![
            crate::providers::rawg::NamedRef { name: "Action".into() },
            crate::providers::rawg::NamedRef { name: "RPG".into() },
        ];
        assert_eq!(names(&list), "Action, RPG");
    }
}
