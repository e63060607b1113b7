use crate::embeds::COLOR_DEFAULT;
use crate::{Context, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;

fn format_uptime(secs: i64) -> String {
    let secs = secs.max(0) as u64;
    let std = std::time::Duration::from_secs(secs);
    humantime::format_duration(std).to_string()
}

/// Show bot statistics
#[poise::command(slash_command)]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let uptime = (Utc::now() - data.started_at).num_seconds();
    let registered = data.db.users.count()?;
    let guilds = ctx.serenity_context().cache.guilds().len();
    let commands = ctx.framework().options().commands.len();

    let embed = serenity::CreateEmbed::new()
        .title("📊 Bot statistics")
        .field("Uptime", format_uptime(uptime), true)
        .field("Servers", guilds.to_string(), true)
        .field("Registered users", registered.to_string(), true)
        .field("Commands", commands.to_string(), true)
        .field("Version", env!("CARGO_PKG_VERSION"), true)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Up since {}",
            data.started_at.format("%Y-%m-%d %H:%M UTC")
        )))
        .color(COLOR_DEFAULT);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(3_723), "1h 2m 3s");
        assert_eq!(format_uptime(-5), "0s");
    }
}
