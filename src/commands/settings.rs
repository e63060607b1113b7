use super::{locale, notify, send_embed};
use crate::db::Scope;
use crate::embeds::COLOR_DEFAULT;
use crate::i18n::{Locale, Message};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use poise::ChoiceParameter;
use tracing::info;

/// Your personal bot settings
#[poise::command(slash_command, subcommands("user_view", "user_language", "autoembed", "user_reset"))]
pub async fn usersettings(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show your current settings
#[poise::command(slash_command, rename = "view")]
pub async fn user_view(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let user_id = ctx.author().id.get();
    let stored = data.db.settings.get(Scope::Member, user_id)?;
    let autoembed = data.db.autoembed.is_allowed(user_id);

    let language = match stored {
        Some(l) => l.name().to_string(),
        None => format!("{} (inherited)", locale(ctx).name()),
    };
    let embed = serenity::CreateEmbed::new()
        .title("⚙️ Your settings")
        .field("Language", language, true)
        .field("Auto-embed links", if autoembed { "On" } else { "Off" }, true)
        .color(COLOR_DEFAULT);
    send_embed(ctx, embed).await
}

/// Pick the language the bot answers you in
#[poise::command(slash_command, rename = "language")]
pub async fn user_language(
    ctx: Context<'_>,
    #[description = "Language"] language: Locale,
) -> Result<(), Error> {
    ctx.data()
        .db
        .settings
        .set(Scope::Member, ctx.author().id.get(), language)?;
    info!("User {} set language {}", ctx.author().id, language);
    notify(ctx, Message::SettingsSaved).await
}

/// Turn automatic embeds for AniList and MyAnimeList links on or off
#[poise::command(slash_command)]
pub async fn autoembed(
    ctx: Context<'_>,
    #[description = "Embed links you post"] enabled: bool,
) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let allowlist = &ctx.data().db.autoembed;
    if enabled {
        allowlist.allow(user_id)?;
    } else {
        allowlist.disallow(user_id)?;
    }
    notify(ctx, Message::SettingsSaved).await
}

/// Reset your settings to defaults
#[poise::command(slash_command, rename = "reset")]
pub async fn user_reset(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let user_id = ctx.author().id.get();
    data.db.settings.clear(Scope::Member, user_id)?;
    data.db.autoembed.disallow(user_id)?;
    notify(ctx, Message::SettingsReset).await
}

/// Server-wide bot settings
#[poise::command(
    slash_command,
    subcommands("server_view", "server_language", "server_reset"),
    required_permissions = "MANAGE_GUILD",
    guild_only
)]
pub async fn hostsettings(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show this server's settings
#[poise::command(slash_command, rename = "view", guild_only)]
pub async fn server_view(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let stored = ctx.data().db.settings.get(Scope::Server, guild_id.get())?;

    let (language, source) = match stored {
        Some(l) => (l, "Server Custom Settings"),
        None => (Locale::default(), "Default Configuration"),
    };
    let embed = serenity::CreateEmbed::new()
        .title("⚙️ Server settings")
        .field("Language", language.name(), true)
        .footer(serenity::CreateEmbedFooter::new(source))
        .color(COLOR_DEFAULT);
    send_embed(ctx, embed).await
}

/// Set the default language for this server
#[poise::command(slash_command, rename = "language", guild_only)]
pub async fn server_language(
    ctx: Context<'_>,
    #[description = "Language"] language: Locale,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    ctx.data()
        .db
        .settings
        .set(Scope::Server, guild_id.get(), language)?;
    info!("Guild {} set language {}", guild_id, language);
    notify(ctx, Message::SettingsSaved).await
}

/// Reset this server's settings to defaults
#[poise::command(slash_command, rename = "reset", guild_only)]
pub async fn server_reset(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    ctx.data().db.settings.clear(Scope::Server, guild_id.get())?;
    notify(ctx, Message::SettingsReset).await
}
