use super::{locale, notify};
use crate::db::BirthdayRecord;
use crate::embeds::COLOR_DEFAULT;
use crate::i18n::{t, Locale, Message};
use crate::{Context, Error};
use chrono::{Datelike, Utc};
use poise::serenity_prelude as serenity;
use tracing::{debug, info};

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

fn format_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

fn format_date(record: &BirthdayRecord) -> String {
    match record.year {
        Some(year) => format!("{:04}-{:02}-{:02}", year, record.month, record.day),
        None => format!("{:02}-{:02}", record.month, record.day),
    }
}

fn saved_text(locale: Locale, record: &BirthdayRecord) -> String {
    format!(
        "✅ {}\n📅 **{}** ({}) → <#{}>",
        t(locale, Message::BirthdaySaved),
        format_date(record),
        format_offset(record.utc_offset_minutes),
        record.channel_id
    )
}

/// Birthday greetings for this server
#[poise::command(slash_command, subcommands("set", "remove", "show"), guild_only)]
pub async fn birthday(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Save your birthday so the bot greets you on the day
#[poise::command(slash_command, guild_only)]
pub async fn set(
    ctx: Context<'_>,
    #[description = "Month (1-12)"]
    #[min = 1]
    #[max = 12]
    month: u32,
    #[description = "Day of the month"]
    #[min = 1]
    #[max = 31]
    day: u32,
    #[description = "Birth year, to show your age"]
    #[min = 1900]
    year: Option<i32>,
    #[description = "Your offset from UTC in minutes, e.g. 420 for UTC+7 (default: 0)"]
    utc_offset_minutes: Option<i32>,
    #[description = "Channel for the greeting (default: this channel)"]
    #[channel_types("Text")]
    channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    if let Err(reason) = BirthdayRecord::validate(month, day, year) {
        debug!("Rejected birthday from {}: {}", ctx.author().id, reason);
        return notify(ctx, Message::BirthdayInvalidDate).await;
    }
    if year.is_some_and(|y| y > Utc::now().year()) {
        return notify(ctx, Message::BirthdayFutureYear).await;
    }
    let offset = utc_offset_minutes.unwrap_or(0);
    if offset.abs() > MAX_UTC_OFFSET_MINUTES {
        return notify(ctx, Message::BirthdayBadOffset).await;
    }

    let channel_id = channel.map_or(ctx.channel_id(), |c| c.id);
    let record = BirthdayRecord {
        discord_id: ctx.author().id.get(),
        guild_id: guild_id.get(),
        channel_id: channel_id.get(),
        month,
        day,
        year,
        utc_offset_minutes: offset,
        last_greeted_year: None,
    };
    let reply = saved_text(locale(ctx), &record);
    let date = format_date(&record);
    ctx.data().db.birthdays.set(record)?;

    info!(
        "Saved birthday {} for user {} in guild {}",
        date,
        ctx.author().id,
        guild_id
    );
    ctx.say(reply).await?;
    Ok(())
}

/// Forget your birthday on this server
#[poise::command(slash_command, guild_only)]
pub async fn remove(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    if ctx
        .data()
        .db
        .birthdays
        .remove(ctx.author().id.get(), guild_id.get())?
    {
        notify(ctx, Message::BirthdayRemoved).await
    } else {
        notify(ctx, Message::BirthdayNotSet).await
    }
}

/// Show a saved birthday
#[poise::command(slash_command, guild_only)]
pub async fn show(
    ctx: Context<'_>,
    #[description = "Member to look up (default: you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let target = user.as_ref().unwrap_or_else(|| ctx.author());

    let Some(record) = ctx.data().db.birthdays.get(target.id.get(), guild_id.get())? else {
        let message = if target.id == ctx.author().id {
            Message::BirthdayNotSet
        } else {
            Message::BirthdayTargetNotSet
        };
        return notify(ctx, message).await;
    };

    let embed = serenity::CreateEmbed::new()
        .title(format!("🎂 {}'s birthday", target.name))
        .field("Date", format_date(&record), true)
        .field("Timezone", format_offset(record.utc_offset_minutes), true)
        .field("Channel", format!("<#{}>", record.channel_id), true)
        .color(COLOR_DEFAULT);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(420), "UTC+07:00");
        assert_eq!(format_offset(-330), "UTC-05:30");
        assert_eq!(format_offset(0), "UTC+00:00");
    }

    #[test]
    fn test_format_date() {
        let mut record = BirthdayRecord {
            discord_id: 1,
            guild_id: 2,
            channel_id: 3,
            month: 2,
            day: 29,
            year: None,
            utc_offset_minutes: 0,
            last_greeted_year: None,
        };
        assert_eq!(format_date(&record), "02-29");
        record.year = Some(2000);
        assert_eq!(format_date(&record), "2000-02-29");
    }

    #[test]
    fn test_saved_text_follows_locale() {
        let record = BirthdayRecord {
            discord_id: 1,
            guild_id: 2,
            channel_id: 3,
            month: 8,
            day: 17,
            year: None,
            utc_offset_minutes: 420,
            last_greeted_year: None,
        };
        assert_eq!(
            saved_text(Locale::EnUs, &record),
            "✅ Birthday saved.\n📅 **08-17** (UTC+07:00) → <#3>"
        );
        assert!(saved_text(Locale::IdId, &record).starts_with("✅ Ulang tahun disimpan."));
    }
}
