pub mod admin;
pub mod anime;
pub mod birthday;
pub mod converter;
pub mod media;
pub mod profiles;
pub mod registry;
pub mod settings;
pub mod utilities;

use crate::db::UserRecord;
use crate::embeds;
use crate::i18n::{t, Locale, Message};
use crate::providers::ProviderError;
use crate::{Context, Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        anime::anime(),
        anime::manga(),
        media::games(),
        media::tv(),
        media::movies(),
        profiles::myanimelist(),
        profiles::anilist(),
        profiles::shikimori(),
        profiles::lastfm(),
        profiles::spotify(),
        converter::converter(),
        utilities::utilities(),
        utilities::random(),
        utilities::urban(),
        birthday::birthday(),
        registry::profile(),
        registry::register(),
        registry::unregister(),
        registry::platform(),
        admin::stats(),
        settings::usersettings(),
        settings::hostsettings(),
    ]
}

/// Language for replies to the invoking user.
pub fn locale(ctx: Context<'_>) -> Locale {
    ctx.data()
        .db
        .settings
        .resolve_locale(ctx.author().id.get(), ctx.guild_id().map(|g| g.get()))
}

pub async fn send_embed(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Reply with a localized notice, visible only to the invoker.
pub async fn notify(ctx: Context<'_>, message: Message) -> Result<(), Error> {
    let text = t(locale(ctx), message);
    ctx.send(
        poise::CreateReply::default()
            .embed(embeds::info_embed("ℹ️", text))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Answer expected provider failures in place; anything else propagates to
/// [`on_error`].
pub async fn report(ctx: Context<'_>, err: ProviderError) -> Result<(), Error> {
    match err {
        e if e.is_not_found() => notify(ctx, Message::NoResults).await,
        ProviderError::MissingCredential(name) => {
            warn!("/{} needs {} which is not set", ctx.command().qualified_name, name);
            notify(ctx, Message::NotConfigured).await
        }
        ProviderError::InvalidArgument(reason) => {
            ctx.send(
                poise::CreateReply::default()
                    .embed(embeds::error_embed(&reason))
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
        other => Err(other.into()),
    }
}

/// Accounts a profile command can look up from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Account {
    MyAnimeList,
    AniList,
    Shikimori,
    LastFm,
}

impl Account {
    pub fn username(self, record: &UserRecord) -> Option<&str> {
        match self {
            Account::MyAnimeList => Some(record.mal_username.as_str()).filter(|s| !s.is_empty()),
            Account::AniList => record.anilist_username.as_deref(),
            Account::Shikimori => record.shikimori_username.as_deref(),
            Account::LastFm => record.lastfm_username.as_deref(),
        }
    }
}

/// Username to look up: the explicit one, else the one `user` (or the
/// invoker) registered. Replies and returns `None` when there is none.
pub async fn target_username(
    ctx: Context<'_>,
    account: Account,
    user: Option<serenity::User>,
    username: Option<String>,
) -> Result<Option<String>, Error> {
    if let Some(name) = username.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        return Ok(Some(name));
    }

    let is_self = user.as_ref().map_or(true, |u| u.id == ctx.author().id);
    let target = user.as_ref().map_or(ctx.author().id, |u| u.id);
    let Some(record) = ctx.data().db.users.get_user(target.get())? else {
        let message = if is_self {
            Message::NotRegistered
        } else {
            Message::TargetNotRegistered
        };
        notify(ctx, message).await?;
        return Ok(None);
    };

    match account.username(&record) {
        Some(name) => Ok(Some(name.to_string())),
        None => {
            notify(ctx, Message::PlatformNotLinked).await?;
            Ok(None)
        }
    }
}

pub fn pre_command(ctx: Context<'_>) -> poise::BoxFuture<'_, ()> {
    Box::pin(async move {
        info!(
            "/{} invoked by {} ({}) in {}",
            ctx.command().qualified_name,
            ctx.author().name,
            ctx.author().id,
            ctx.guild_id()
                .map(|g| format!("guild {}", g))
                .unwrap_or_else(|| "DMs".to_string())
        );
    })
}

pub fn post_command(ctx: Context<'_>) -> poise::BoxFuture<'_, ()> {
    Box::pin(async move {
        debug!(
            "/{} finished for {}",
            ctx.command().qualified_name,
            ctx.author().id
        );
    })
}

pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("/{} failed: {}", ctx.command().qualified_name, error);
            let text = t(locale(ctx), Message::GenericError);
            let reply = poise::CreateReply::default()
                .embed(embeds::error_embed(text))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to report command error: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
