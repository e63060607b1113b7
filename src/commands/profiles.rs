use super::{notify, report, send_embed, target_username, Account};
use crate::embeds::{self, truncate};
use crate::i18n::Message;
use crate::providers::{anilist, jikan, lastfm, shikimori, spotify};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

const COLOR_SHIKIMORI: u32 = 0x343434;
const COLOR_LASTFM: u32 = 0xD51007;
const COLOR_SPOTIFY: u32 = 0x1DB954;

fn mal_profile_embed(user: &jikan::UserProfile) -> serenity::CreateEmbed {
    let anime = &user.statistics.anime;
    let manga = &user.statistics.manga;
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}'s MyAnimeList profile", user.username))
        .url(&user.url)
        .color(embeds::COLOR_MAL)
        .field(
            "Anime",
            format!(
                "**{}** entries • {} completed\n{:.1} days • mean {:.2}\n{} episodes watched",
                anime.total_entries, anime.completed, anime.days_watched, anime.mean_score, anime.episodes_watched
            ),
            true,
        )
        .field(
            "Manga",
            format!(
                "**{}** entries • {} completed\n{:.1} days • mean {:.2}\n{} chapters read",
                manga.total_entries, manga.completed, manga.days_read, manga.mean_score, manga.chapters_read
            ),
            true,
        );
    if let Some(joined) = user.joined.as_deref().and_then(|j| j.get(..10)) {
        embed = embed.field("Joined", joined, false);
    }
    if let Some(avatar) = user.images.best() {
        embed = embed.thumbnail(avatar);
    }
    match user.mal_id {
        Some(id) => embed.footer(serenity::CreateEmbedFooter::new(format!("MAL ID: {}", id))),
        None => embed,
    }
}

fn anilist_profile_embed(user: &anilist::User) -> serenity::CreateEmbed {
    let anime = &user.statistics.anime;
    let manga = &user.statistics.manga;
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}'s AniList profile", user.name))
        .color(embeds::COLOR_ANILIST)
        .field(
            "Anime",
            format!(
                "**{}** titles • {} episodes\n{:.1} days • mean {:.1}",
                anime.count,
                anime.episodes_watched,
                anime.minutes_watched as f64 / 1440.0,
                anime.mean_score
            ),
            true,
        )
        .field(
            "Manga",
            format!(
                "**{}** titles • {} chapters\n{} volumes • mean {:.1}",
                manga.count, manga.chapters_read, manga.volumes_read, manga.mean_score
            ),
            true,
        );
    if let Some(about) = user.about.as_deref().filter(|a| !a.trim().is_empty()) {
        embed = embed.description(truncate(&embeds::strip_html(about), 500));
    }
    if let Some(url) = &user.site_url {
        embed = embed.url(url);
    }
    if let Some(created) = user.created_at {
        embed = embed.field("Joined", format!("<t:{}:D>", created), false);
    }
    if let Some(avatar) = user.avatar.as_ref().and_then(|a| a.large.as_deref()) {
        embed = embed.thumbnail(avatar);
    }
    if let Some(banner) = &user.banner_image {
        embed = embed.image(banner);
    }
    embed.footer(serenity::CreateEmbedFooter::new(format!("AniList ID: {}", user.id)))
}

fn shikimori_profile_embed(user: &shikimori::User) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}'s Shikimori profile", user.nickname))
        .url(user.profile_url())
        .color(COLOR_SHIKIMORI);
    if let Some(name) = user.name.as_deref().filter(|n| !n.is_empty()) {
        embed = embed.field("Name", name, true);
    }
    if let Some(sex) = user.sex.as_deref().filter(|s| !s.is_empty()) {
        embed = embed.field("Sex", sex, true);
    }
    if let Some(age) = user.full_years {
        embed = embed.field("Age", age.to_string(), true);
    }
    if let Some(seen) = user.last_online.as_deref() {
        embed = embed.field("Last online", seen, true);
    }
    if let Some(site) = user.website.as_deref().filter(|w| !w.is_empty()) {
        embed = embed.field("Website", site, false);
    }
    if let Some(avatar) = user.avatar_url() {
        embed = embed.thumbnail(avatar);
    }
    embed.footer(serenity::CreateEmbedFooter::new(format!("Shikimori ID: {}", user.id)))
}

fn track_lines(tracks: &[lastfm::Track]) -> String {
    tracks
        .iter()
        .map(|t| {
            let marker = if t.is_now_playing() { "▶️ " } else { "" };
            format!("{}[{}]({}) by {}", marker, t.name, t.url, t.artist.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn lastfm_profile_embed(user: &lastfm::User, tracks: &[lastfm::Track]) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}'s Last.fm profile", user.name))
        .url(&user.url)
        .color(COLOR_LASTFM)
        .field("Scrobbles", user.playcount.as_deref().unwrap_or("0"), true)
        .field("Artists", user.artist_count.as_deref().unwrap_or("0"), true)
        .field("Tracks", user.track_count.as_deref().unwrap_or("0"), true);
    if let Some(real) = user.realname.as_deref().filter(|r| !r.is_empty()) {
        embed = embed.description(real);
    }
    if let Some(since) = user.registered_unix() {
        embed = embed.field("Scrobbling since", format!("<t:{}:D>", since), true);
    }
    if !tracks.is_empty() {
        embed = embed.field("Recent tracks", truncate(&track_lines(tracks), 1024), false);
    }
    if let Some(avatar) = user.avatar_url() {
        embed = embed.thumbnail(avatar);
    }
    embed
}

fn spotify_track_embed(track: &spotify::Track) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(truncate(&track.name, 256))
        .description(format!("by **{}**", track.artist_names()))
        .color(COLOR_SPOTIFY)
        .field("Album", &track.album.name, true)
        .field("Duration", track.duration_display(), true)
        .field(
            "Released",
            track.album.release_date.as_deref().unwrap_or("-"),
            true,
        );
    if track.explicit {
        embed = embed.field("Explicit", "Yes", true);
    }
    if let Some(url) = &track.external_urls.spotify {
        embed = embed.url(url);
    }
    if let Some(cover) = track.cover_url() {
        embed = embed.thumbnail(cover);
    }
    embed.footer(serenity::CreateEmbedFooter::new(format!("Spotify ID: {}", track.id)))
}

/// MyAnimeList commands
#[poise::command(slash_command, subcommands("mal_profile"))]
pub async fn myanimelist(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show a MyAnimeList profile
#[poise::command(slash_command, rename = "profile")]
pub async fn mal_profile(
    ctx: Context<'_>,
    #[description = "Registered user to look up"] user: Option<serenity::User>,
    #[description = "MyAnimeList username"] username: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let Some(name) = target_username(ctx, Account::MyAnimeList, user, username).await? else {
        return Ok(());
    };
    match ctx.data().providers.jikan.user(&name).await {
        Ok(profile) => send_embed(ctx, mal_profile_embed(&profile)).await,
        Err(e) => report(ctx, e).await,
    }
}

/// AniList commands
#[poise::command(slash_command, subcommands("anilist_profile"))]
pub async fn anilist(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show an AniList profile
#[poise::command(slash_command, rename = "profile")]
pub async fn anilist_profile(
    ctx: Context<'_>,
    #[description = "Registered user to look up"] user: Option<serenity::User>,
    #[description = "AniList username"] username: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let Some(name) = target_username(ctx, Account::AniList, user, username).await? else {
        return Ok(());
    };
    match ctx.data().providers.anilist.user(&name).await {
        Ok(profile) => send_embed(ctx, anilist_profile_embed(&profile)).await,
        Err(e) => report(ctx, e).await,
    }
}

/// Shikimori commands
#[poise::command(slash_command, subcommands("shikimori_profile"))]
pub async fn shikimori(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show a Shikimori profile
#[poise::command(slash_command, rename = "profile")]
pub async fn shikimori_profile(
    ctx: Context<'_>,
    #[description = "Registered user to look up"] user: Option<serenity::User>,
    #[description = "Shikimori nickname"] username: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let Some(name) = target_username(ctx, Account::Shikimori, user, username).await? else {
        return Ok(());
    };
    match ctx.data().providers.shikimori.user(&name).await {
        Ok(profile) => send_embed(ctx, shikimori_profile_embed(&profile)).await,
        Err(e) => report(ctx, e).await,
    }
}

/// Last.fm commands
#[poise::command(slash_command, subcommands("lastfm_profile", "lastfm_recent"))]
pub async fn lastfm(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Recent scrobbles, newest first; the now-playing entry comes on top of `limit`.
async fn recent(ctx: Context<'_>, username: &str, limit: u8) -> Result<Option<Vec<lastfm::Track>>, Error> {
    match ctx.data().providers.lastfm.recent_tracks(username, limit).await {
        Ok(mut list) => {
            list.truncate(limit as usize);
            Ok(Some(list))
        }
        Err(e) => {
            report(ctx, e).await?;
            Ok(None)
        }
    }
}

/// Show a Last.fm profile
#[poise::command(slash_command, rename = "profile")]
pub async fn lastfm_profile(
    ctx: Context<'_>,
    #[description = "Registered user to look up"] user: Option<serenity::User>,
    #[description = "Last.fm username"] username: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let Some(name) = target_username(ctx, Account::LastFm, user, username).await? else {
        return Ok(());
    };
    let profile = match ctx.data().providers.lastfm.user(&name).await {
        Ok(profile) => profile,
        Err(e) => return report(ctx, e).await,
    };
    let Some(tracks) = recent(ctx, &name, 3).await? else {
        return Ok(());
    };
    send_embed(ctx, lastfm_profile_embed(&profile, &tracks)).await
}

/// List recently played tracks on Last.fm
#[poise::command(slash_command, rename = "recent")]
pub async fn lastfm_recent(
    ctx: Context<'_>,
    #[description = "Registered user to look up"] user: Option<serenity::User>,
    #[description = "Last.fm username"] username: Option<String>,
    #[description = "How many tracks (default: 10)"]
    #[min = 1]
    #[max = 25]
    limit: Option<u8>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let Some(name) = target_username(ctx, Account::LastFm, user, username).await? else {
        return Ok(());
    };
    let Some(tracks) = recent(ctx, &name, limit.unwrap_or(10)).await? else {
        return Ok(());
    };
    if tracks.is_empty() {
        return notify(ctx, Message::NoResults).await;
    }

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}'s recent tracks", name))
        .url(format!("https://www.last.fm/user/{}", urlencoding::encode(&name)))
        .description(truncate(&track_lines(&tracks), crate::config::DISCORD_EMBED_LIMIT))
        .color(COLOR_LASTFM);
    if let Some(art) = tracks[0].image.iter().rev().map(|i| i.url.as_str()).find(|u| !u.is_empty()) {
        embed = embed.thumbnail(art);
    }
    send_embed(ctx, embed).await
}

/// Spotify commands
#[poise::command(slash_command, subcommands("spotify_search"))]
pub async fn spotify(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Find a track on Spotify
#[poise::command(slash_command, rename = "search")]
pub async fn spotify_search(
    ctx: Context<'_>,
    #[description = "Track title, optionally with the artist"] query: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().providers.spotify.search_track(&query).await {
        Ok(tracks) => match tracks.first() {
            Some(track) => send_embed(ctx, spotify_track_embed(track)).await,
            None => notify(ctx, Message::NoResults).await,
        },
        Err(e) => report(ctx, e).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_lastfm_embed_marks_now_playing() {
        let user: lastfm::User = parse_json(
            r#"{"name":"rj","url":"https://www.last.fm/user/rj","playcount":"1500",
                "image":[],"registered":{"unixtime":"1037793040"}}"#,
        )
        .unwrap();
        let tracks: Vec<lastfm::Track> = parse_json(
            r##"[{"name":"Song","url":"https://last.fm/t","artist":{"#text":"Band"},
                 "image":[],"@attr":{"nowplaying":"true"}}]"##,
        )
        .unwrap();

        let json = serde_json::to_value(lastfm_profile_embed(&user, &tracks)).unwrap();
        let fields = json["fields"].as_array().unwrap();
        let recent = fields
            .iter()
            .find(|f| f["name"] == "Recent tracks")
            .unwrap();
        assert!(recent["value"].as_str().unwrap().starts_with("▶️ [Song]"));
    }
}
