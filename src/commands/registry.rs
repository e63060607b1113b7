use super::{notify, report, send_embed, Account};
use crate::db::{DatabaseError, LinkedPlatform, PlatformLink, UserRecord};
use crate::embeds::COLOR_DEFAULT;
use crate::i18n::Message;
use crate::providers::ProviderError;
use crate::utilities::snowflake_timestamp;
use crate::{Context, Error};
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use tracing::info;

/// Jikan reports join dates as RFC 3339 strings.
fn parse_joined(joined: Option<&str>) -> Option<i64> {
    DateTime::parse_from_rfc3339(joined?).ok().map(|d| d.timestamp())
}

fn profile_embed(user: &serenity::User, record: &UserRecord) -> serenity::CreateEmbed {
    let mut accounts = vec![format!(
        "**MyAnimeList:** [{0}](https://myanimelist.net/profile/{0})",
        record.mal_username
    )];
    if let Some(name) = Account::AniList.username(record) {
        accounts.push(format!("**AniList:** [{0}](https://anilist.co/user/{0})", name));
    }
    if let Some(name) = Account::Shikimori.username(record) {
        accounts.push(format!("**Shikimori:** [{0}](https://shikimori.one/{0})", name));
    }
    if let Some(name) = Account::LastFm.username(record) {
        accounts.push(format!("**Last.fm:** [{0}](https://www.last.fm/user/{0})", name));
    }

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}'s profile", user.name))
        .description(accounts.join("\n"))
        .field("Discord account created", format!("<t:{}:D>", record.discord_joined), true)
        .field("Registered", format!("<t:{}:R>", record.registered_at), true)
        .thumbnail(user.face())
        .color(COLOR_DEFAULT);
    if let Some(joined) = record.mal_joined {
        embed = embed.field("Joined MyAnimeList", format!("<t:{}:D>", joined), true);
    }
    embed.footer(serenity::CreateEmbedFooter::new(format!("Discord ID: {}", record.discord_id)))
}

/// Show the accounts a member registered with the bot
#[poise::command(slash_command)]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "Member to look up (default: you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target = user.as_ref().unwrap_or_else(|| ctx.author());
    match ctx.data().db.users.get_user(target.id.get())? {
        Some(record) => send_embed(ctx, profile_embed(target, &record)).await,
        None if target.id == ctx.author().id => notify(ctx, Message::NotRegistered).await,
        None => notify(ctx, Message::TargetNotRegistered).await,
    }
}

/// Register your MyAnimeList account with the bot
#[poise::command(slash_command)]
pub async fn register(
    ctx: Context<'_>,
    #[description = "Your MyAnimeList username"] mal_username: String,
) -> Result<(), Error> {
    let author = ctx.author();
    let users = &ctx.data().db.users;
    if users.check_if_registered(author.id.get())? {
        return notify(ctx, Message::AlreadyRegistered).await;
    }

    ctx.defer_ephemeral().await?;
    let mal = match ctx.data().providers.jikan.user(mal_username.trim()).await {
        Ok(profile) => profile,
        Err(e) => return report(ctx, e).await,
    };

    let discord_joined = snowflake_timestamp(author.id.get())
        .map(|t| t.timestamp())
        .unwrap_or_default();
    let record = UserRecord {
        discord_id: author.id.get(),
        discord_username: author.name.clone(),
        discord_joined,
        mal_username: mal.username.clone(),
        mal_id: mal.mal_id,
        mal_joined: parse_joined(mal.joined.as_deref()),
        registered_at: Utc::now().timestamp(),
        registered_guild: ctx.guild_id().map(|g| g.get()),
        registered_by: author.id.get(),
        ..Default::default()
    };

    match users.save_to_database(record) {
        Ok(()) => {
            info!("{} registered as MAL user {}", author.id, mal.username);
            notify(ctx, Message::Registered).await
        }
        // lost a race with a concurrent /register
        Err(DatabaseError::AlreadyRegistered(_)) => notify(ctx, Message::AlreadyRegistered).await,
        Err(e) => Err(e.into()),
    }
}

/// Delete your registration and linked accounts
#[poise::command(slash_command)]
pub async fn unregister(ctx: Context<'_>) -> Result<(), Error> {
    match ctx.data().db.users.drop_user(ctx.author().id.get()) {
        Ok(()) => notify(ctx, Message::Unregistered).await,
        Err(DatabaseError::NotRegistered(_)) => notify(ctx, Message::NotRegistered).await,
        Err(e) => Err(e.into()),
    }
}

/// Link other accounts to your registration
#[poise::command(slash_command, subcommands("link", "unlink"))]
pub async fn platform(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Link an account on another site
#[poise::command(slash_command)]
pub async fn link(
    ctx: Context<'_>,
    #[description = "Site the account is on"] platform: LinkedPlatform,
    #[description = "Your username there"] username: String,
) -> Result<(), Error> {
    let discord_id = ctx.author().id.get();
    if !ctx.data().db.users.check_if_registered(discord_id)? {
        return notify(ctx, Message::NotRegistered).await;
    }

    ctx.defer_ephemeral().await?;
    let providers = &ctx.data().providers;
    let name = username.trim();
    let looked_up: Result<PlatformLink, ProviderError> = match platform {
        LinkedPlatform::Anilist => providers.anilist.user(name).await.map(|u| PlatformLink {
            username: u.name,
            id: Some(u.id),
        }),
        LinkedPlatform::Shikimori => providers.shikimori.user(name).await.map(|u| PlatformLink {
            username: u.nickname,
            id: Some(u.id),
        }),
        LinkedPlatform::Lastfm => providers.lastfm.user(name).await.map(|u| PlatformLink {
            username: u.name,
            id: None,
        }),
    };
    let link = match looked_up {
        Ok(link) => link,
        Err(e) => return report(ctx, e).await,
    };

    info!("{} linked {:?} account {}", discord_id, platform, link.username);
    ctx.data()
        .db
        .users
        .update_platform(discord_id, platform, Some(link))?;
    notify(ctx, Message::SettingsSaved).await
}

/// Remove a linked account
#[poise::command(slash_command)]
pub async fn unlink(
    ctx: Context<'_>,
    #[description = "Site to unlink"] platform: LinkedPlatform,
) -> Result<(), Error> {
    match ctx
        .data()
        .db
        .users
        .update_platform(ctx.author().id.get(), platform, None)
    {
        Ok(_) => notify(ctx, Message::SettingsSaved).await,
        Err(DatabaseError::NotRegistered(_)) => notify(ctx, Message::NotRegistered).await,
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joined() {
        assert_eq!(
            parse_joined(Some("2014-08-01T00:00:00+00:00")),
            Some(1_406_851_200)
        );
        assert_eq!(parse_joined(Some("sometime")), None);
        assert_eq!(parse_joined(None), None);
    }
}
